//! Typed boundary to the external backend process.
//!
//! Every backend capability is one round-trip call with a fixed input and
//! output shape. Expected failures come back inside the payload as
//! `success: false` plus a message; an `Err` here means the transport itself
//! failed (backend unreachable, malformed response) and call sites degrade
//! to a generic localized error instead of crashing.

use async_trait::async_trait;
use shared::{
    domain::{ChannelId, GuildId, UserId},
    protocol::{
        AckResponse, AppStatusResponse, AuthResponse, ChannelsResponse, EventsResponse,
        FullSyncResponse, GuildsResponse, SettingsResponse, ToggleFlagsResponse, VoiceStateResponse,
        VolumeResponse,
    },
    settings::SettingsPatch,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("malformed backend response: {0}")]
    Decode(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn authenticate(&self) -> GatewayResult<AuthResponse>;
    async fn check_auth_status(&self) -> GatewayResult<AuthResponse>;
    async fn logout(&self) -> GatewayResult<AckResponse>;

    async fn get_voice_state(&self) -> GatewayResult<VoiceStateResponse>;
    async fn toggle_mute(&self) -> GatewayResult<ToggleFlagsResponse>;
    async fn toggle_deafen(&self) -> GatewayResult<ToggleFlagsResponse>;
    async fn set_input_volume(&self, volume: u16) -> GatewayResult<VolumeResponse>;
    async fn set_output_volume(&self, volume: u16) -> GatewayResult<VolumeResponse>;
    async fn leave_voice(&self) -> GatewayResult<AckResponse>;

    async fn get_voice_channels(
        &self,
        guild_id: Option<&GuildId>,
    ) -> GatewayResult<ChannelsResponse>;
    async fn join_voice_channel(&self, channel_id: &ChannelId) -> GatewayResult<AckResponse>;
    async fn set_user_volume(&self, user_id: &UserId, volume: u16) -> GatewayResult<AckResponse>;
    async fn mute_user(&self, user_id: &UserId, muted: bool) -> GatewayResult<AckResponse>;
    async fn get_guilds(&self) -> GatewayResult<GuildsResponse>;
    async fn select_guild(&self, guild_id: &GuildId) -> GatewayResult<AckResponse>;

    async fn check_installed(&self) -> GatewayResult<AppStatusResponse>;
    async fn check_running(&self) -> GatewayResult<AppStatusResponse>;
    async fn launch_app(&self) -> GatewayResult<AckResponse>;

    async fn sync_full_state(&self) -> GatewayResult<FullSyncResponse>;
    async fn get_pending_events(&self) -> GatewayResult<EventsResponse>;
    async fn get_settings(&self) -> GatewayResult<SettingsResponse>;
    async fn save_settings(&self, patch: &SettingsPatch) -> GatewayResult<AckResponse>;
}

/// Placeholder gateway for wiring a client without a backend; every call
/// reports the transport as unavailable.
pub struct MissingGateway;

macro_rules! missing {
    () => {
        Err(GatewayError::Transport("gateway not wired".into()))
    };
}

#[async_trait]
impl VoiceGateway for MissingGateway {
    async fn authenticate(&self) -> GatewayResult<AuthResponse> {
        missing!()
    }

    async fn check_auth_status(&self) -> GatewayResult<AuthResponse> {
        missing!()
    }

    async fn logout(&self) -> GatewayResult<AckResponse> {
        missing!()
    }

    async fn get_voice_state(&self) -> GatewayResult<VoiceStateResponse> {
        missing!()
    }

    async fn toggle_mute(&self) -> GatewayResult<ToggleFlagsResponse> {
        missing!()
    }

    async fn toggle_deafen(&self) -> GatewayResult<ToggleFlagsResponse> {
        missing!()
    }

    async fn set_input_volume(&self, _volume: u16) -> GatewayResult<VolumeResponse> {
        missing!()
    }

    async fn set_output_volume(&self, _volume: u16) -> GatewayResult<VolumeResponse> {
        missing!()
    }

    async fn leave_voice(&self) -> GatewayResult<AckResponse> {
        missing!()
    }

    async fn get_voice_channels(
        &self,
        _guild_id: Option<&GuildId>,
    ) -> GatewayResult<ChannelsResponse> {
        missing!()
    }

    async fn join_voice_channel(&self, _channel_id: &ChannelId) -> GatewayResult<AckResponse> {
        missing!()
    }

    async fn set_user_volume(&self, _user_id: &UserId, _volume: u16) -> GatewayResult<AckResponse> {
        missing!()
    }

    async fn mute_user(&self, _user_id: &UserId, _muted: bool) -> GatewayResult<AckResponse> {
        missing!()
    }

    async fn get_guilds(&self) -> GatewayResult<GuildsResponse> {
        missing!()
    }

    async fn select_guild(&self, _guild_id: &GuildId) -> GatewayResult<AckResponse> {
        missing!()
    }

    async fn check_installed(&self) -> GatewayResult<AppStatusResponse> {
        missing!()
    }

    async fn check_running(&self) -> GatewayResult<AppStatusResponse> {
        missing!()
    }

    async fn launch_app(&self) -> GatewayResult<AckResponse> {
        missing!()
    }

    async fn sync_full_state(&self) -> GatewayResult<FullSyncResponse> {
        missing!()
    }

    async fn get_pending_events(&self) -> GatewayResult<EventsResponse> {
        missing!()
    }

    async fn get_settings(&self) -> GatewayResult<SettingsResponse> {
        missing!()
    }

    async fn save_settings(&self, _patch: &SettingsPatch) -> GatewayResult<AckResponse> {
        missing!()
    }
}
