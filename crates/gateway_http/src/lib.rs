//! HTTP implementation of the gateway boundary.
//!
//! The backend process exposes one JSON endpoint per capability under
//! `/api/{method}`; every call is a single POST with a fixed-shape params
//! object (empty when the operation takes no input) and a fixed-shape
//! response. Expected failures ride inside the response payload; anything
//! that keeps a payload from arriving intact (connect error, non-2xx,
//! decode failure) becomes a [`GatewayError`].

use async_trait::async_trait;
use client_core::{GatewayError, GatewayResult, VoiceGateway};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{ChannelId, GuildId, UserId},
    protocol::{
        AckResponse, AppStatusResponse, AuthResponse, ChannelsResponse, EventsResponse,
        FullSyncResponse, GuildsResponse, SettingsResponse, ToggleFlagsResponse, VoiceStateResponse,
        VolumeResponse,
    },
    settings::SettingsPatch,
};
use tracing::debug;
use url::Url;

#[derive(Serialize)]
struct Empty {}

#[derive(Serialize)]
struct VolumeParams {
    volume: u16,
}

#[derive(Serialize)]
struct UserVolumeParams<'a> {
    user_id: &'a UserId,
    volume: u16,
}

#[derive(Serialize)]
struct MuteUserParams<'a> {
    user_id: &'a UserId,
    muted: bool,
}

#[derive(Serialize)]
struct ChannelParams<'a> {
    channel_id: &'a ChannelId,
}

#[derive(Serialize)]
struct GuildParams<'a> {
    guild_id: &'a GuildId,
}

#[derive(Serialize)]
struct ChannelsParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    guild_id: Option<&'a GuildId>,
}

pub struct HttpGateway {
    http: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    async fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> GatewayResult<T> {
        let url = self
            .base_url
            .join(&format!("api/{method}"))
            .map_err(|err| GatewayError::Transport(format!("bad endpoint {method}: {err}")))?;
        debug!("gateway call method={method}");

        let response = self
            .http
            .post(url)
            .json(params)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        response
            .json::<T>()
            .await
            .map_err(|err| GatewayError::Decode(err.to_string()))
    }
}

#[async_trait]
impl VoiceGateway for HttpGateway {
    async fn authenticate(&self) -> GatewayResult<AuthResponse> {
        self.call("authenticate", &Empty {}).await
    }

    async fn check_auth_status(&self) -> GatewayResult<AuthResponse> {
        self.call("check_auth_status", &Empty {}).await
    }

    async fn logout(&self) -> GatewayResult<AckResponse> {
        self.call("logout", &Empty {}).await
    }

    async fn get_voice_state(&self) -> GatewayResult<VoiceStateResponse> {
        self.call("get_voice_state", &Empty {}).await
    }

    async fn toggle_mute(&self) -> GatewayResult<ToggleFlagsResponse> {
        self.call("toggle_mute", &Empty {}).await
    }

    async fn toggle_deafen(&self) -> GatewayResult<ToggleFlagsResponse> {
        self.call("toggle_deafen", &Empty {}).await
    }

    async fn set_input_volume(&self, volume: u16) -> GatewayResult<VolumeResponse> {
        self.call("set_input_volume", &VolumeParams { volume }).await
    }

    async fn set_output_volume(&self, volume: u16) -> GatewayResult<VolumeResponse> {
        self.call("set_output_volume", &VolumeParams { volume })
            .await
    }

    async fn leave_voice(&self) -> GatewayResult<AckResponse> {
        self.call("leave_voice", &Empty {}).await
    }

    async fn get_voice_channels(
        &self,
        guild_id: Option<&GuildId>,
    ) -> GatewayResult<ChannelsResponse> {
        self.call("get_voice_channels", &ChannelsParams { guild_id })
            .await
    }

    async fn join_voice_channel(&self, channel_id: &ChannelId) -> GatewayResult<AckResponse> {
        self.call("join_voice_channel", &ChannelParams { channel_id })
            .await
    }

    async fn set_user_volume(&self, user_id: &UserId, volume: u16) -> GatewayResult<AckResponse> {
        self.call("set_user_volume", &UserVolumeParams { user_id, volume })
            .await
    }

    async fn mute_user(&self, user_id: &UserId, muted: bool) -> GatewayResult<AckResponse> {
        self.call("mute_user", &MuteUserParams { user_id, muted })
            .await
    }

    async fn get_guilds(&self) -> GatewayResult<GuildsResponse> {
        self.call("get_guilds", &Empty {}).await
    }

    async fn select_guild(&self, guild_id: &GuildId) -> GatewayResult<AckResponse> {
        self.call("select_guild", &GuildParams { guild_id }).await
    }

    async fn check_installed(&self) -> GatewayResult<AppStatusResponse> {
        self.call("check_installed", &Empty {}).await
    }

    async fn check_running(&self) -> GatewayResult<AppStatusResponse> {
        self.call("check_running", &Empty {}).await
    }

    async fn launch_app(&self) -> GatewayResult<AckResponse> {
        self.call("launch_app", &Empty {}).await
    }

    async fn sync_full_state(&self) -> GatewayResult<FullSyncResponse> {
        self.call("sync_full_state", &Empty {}).await
    }

    async fn get_pending_events(&self) -> GatewayResult<EventsResponse> {
        self.call("get_pending_events", &Empty {}).await
    }

    async fn get_settings(&self) -> GatewayResult<SettingsResponse> {
        self.call("get_settings", &Empty {}).await
    }

    async fn save_settings(&self, patch: &SettingsPatch) -> GatewayResult<AckResponse> {
        self.call("save_settings", patch).await
    }
}
