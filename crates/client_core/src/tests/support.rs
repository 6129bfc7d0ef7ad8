//! Shared test doubles: a fully scriptable gateway and a recording notifier.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use shared::{
    domain::{ChannelId, Guild, GuildId, UserId, VoiceChannel, VoiceMember},
    protocol::{
        AckResponse, AppStatusResponse, AuthResponse, AuthUser, ChannelsResponse, EventsResponse,
        FullSyncResponse, GuildsResponse, PendingEvent, SettingsResponse, ToggleFlagsResponse,
        VoiceEventKind, VoiceStateResponse, VolumeResponse,
    },
    settings::{Settings, SettingsPatch},
};

use crate::gateway::{GatewayError, GatewayResult, VoiceGateway};
use crate::notify::{Notifier, Toast};

pub(crate) fn ok_voice_state() -> VoiceStateResponse {
    VoiceStateResponse {
        success: true,
        in_voice: true,
        is_muted: false,
        is_deafened: false,
        input_volume: 80,
        output_volume: 100,
        channel_id: Some(ChannelId::from("c1")),
        channel_name: Some("General".to_string()),
        guild_id: Some(GuildId::from("g1")),
        members: vec![member("10", "ana"), member("11", "bruno")],
        speaking_users: vec![UserId::from("10")],
        message: None,
    }
}

pub(crate) fn member(id: &str, username: &str) -> VoiceMember {
    VoiceMember {
        user_id: UserId::from(id),
        username: username.to_string(),
        avatar: None,
        mute: false,
        deaf: false,
        volume: 100,
    }
}

pub(crate) fn join_event(id: &str, username: &str) -> PendingEvent {
    PendingEvent {
        kind: VoiceEventKind::VoiceJoin,
        user_id: Some(UserId::from(id)),
        username: Some(username.to_string()),
        avatar: None,
    }
}

pub(crate) fn leave_event(id: &str, username: &str) -> PendingEvent {
    PendingEvent {
        kind: VoiceEventKind::VoiceLeave,
        user_id: Some(UserId::from(id)),
        username: Some(username.to_string()),
        avatar: None,
    }
}

pub(crate) fn authenticated_as(username: &str) -> AuthResponse {
    AuthResponse {
        success: true,
        authenticated: true,
        user: Some(AuthUser {
            username: username.to_string(),
            id: UserId::from("10"),
        }),
        message: None,
    }
}

fn unauthenticated() -> AuthResponse {
    AuthResponse {
        success: true,
        authenticated: false,
        user: None,
        message: Some("no session".to_string()),
    }
}

/// Scriptable [`VoiceGateway`] double. Every call records its method name;
/// methods listed in `fail` return a transport fault instead of their
/// configured response. `save_settings` applies patches to the stored
/// settings the way the real backend merges partial saves.
pub(crate) struct TestGateway {
    pub calls: Mutex<Vec<&'static str>>,
    pub fail: Mutex<HashSet<&'static str>>,
    pub installed: Mutex<bool>,
    pub running: Mutex<bool>,
    pub auth: Mutex<AuthResponse>,
    pub auth_status: Mutex<AuthResponse>,
    pub voice_state: Mutex<VoiceStateResponse>,
    pub toggle_mute_response: Mutex<ToggleFlagsResponse>,
    pub toggle_deafen_response: Mutex<ToggleFlagsResponse>,
    pub input_volume_response: Mutex<VolumeResponse>,
    pub output_volume_response: Mutex<VolumeResponse>,
    pub leave_response: Mutex<AckResponse>,
    pub channels_response: Mutex<ChannelsResponse>,
    pub channels_requested_guild: Mutex<Vec<Option<GuildId>>>,
    pub join_response: Mutex<AckResponse>,
    pub guilds_response: Mutex<GuildsResponse>,
    pub full_sync_response: Mutex<Option<FullSyncResponse>>,
    pub pending_events: Mutex<Vec<PendingEvent>>,
    pub settings: Mutex<Settings>,
    pub saved_patches: Mutex<Vec<SettingsPatch>>,
    pub volume_requests: Mutex<Vec<(&'static str, u16)>>,
    pub user_volume_calls: Mutex<Vec<(UserId, u16)>>,
    pub mute_user_calls: Mutex<Vec<(UserId, bool)>>,
    pub launch_response: Mutex<AckResponse>,
}

impl Default for TestGateway {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: Mutex::new(HashSet::new()),
            installed: Mutex::new(true),
            running: Mutex::new(true),
            auth: Mutex::new(authenticated_as("ana")),
            auth_status: Mutex::new(unauthenticated()),
            voice_state: Mutex::new(ok_voice_state()),
            toggle_mute_response: Mutex::new(ToggleFlagsResponse {
                success: true,
                is_muted: true,
                is_deafened: false,
                message: None,
            }),
            toggle_deafen_response: Mutex::new(ToggleFlagsResponse {
                success: true,
                is_muted: true,
                is_deafened: true,
                message: None,
            }),
            input_volume_response: Mutex::new(VolumeResponse {
                success: true,
                volume: None,
                message: None,
            }),
            output_volume_response: Mutex::new(VolumeResponse {
                success: true,
                volume: None,
                message: None,
            }),
            leave_response: Mutex::new(AckResponse::ok()),
            channels_response: Mutex::new(ChannelsResponse {
                success: true,
                guild_id: None,
                channels: vec![VoiceChannel {
                    id: ChannelId::from("c1"),
                    name: "General".to_string(),
                    kind: shared::domain::ChannelKind::Voice,
                }],
                message: None,
            }),
            channels_requested_guild: Mutex::new(Vec::new()),
            join_response: Mutex::new(AckResponse::ok()),
            guilds_response: Mutex::new(GuildsResponse {
                success: true,
                guilds: vec![Guild {
                    id: GuildId::from("g1"),
                    name: "Home".to_string(),
                    icon_url: None,
                }],
                selected_guild_id: Some(GuildId::from("g1")),
                message: None,
            }),
            full_sync_response: Mutex::new(None),
            pending_events: Mutex::new(Vec::new()),
            settings: Mutex::new(Settings::default()),
            saved_patches: Mutex::new(Vec::new()),
            volume_requests: Mutex::new(Vec::new()),
            user_volume_calls: Mutex::new(Vec::new()),
            mute_user_calls: Mutex::new(Vec::new()),
            launch_response: Mutex::new(AckResponse::ok()),
        }
    }
}

impl TestGateway {
    pub fn fail_on(&self, method: &'static str) {
        self.fail.lock().unwrap().insert(method);
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|name| **name == method)
            .count()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn hit(&self, method: &'static str) -> GatewayResult<()> {
        self.calls.lock().unwrap().push(method);
        if self.fail.lock().unwrap().contains(method) {
            return Err(GatewayError::Transport(format!("{method} unreachable")));
        }
        Ok(())
    }
}

#[async_trait]
impl VoiceGateway for TestGateway {
    async fn authenticate(&self) -> GatewayResult<AuthResponse> {
        self.hit("authenticate")?;
        Ok(self.auth.lock().unwrap().clone())
    }

    async fn check_auth_status(&self) -> GatewayResult<AuthResponse> {
        self.hit("check_auth_status")?;
        Ok(self.auth_status.lock().unwrap().clone())
    }

    async fn logout(&self) -> GatewayResult<AckResponse> {
        self.hit("logout")?;
        Ok(AckResponse::ok())
    }

    async fn get_voice_state(&self) -> GatewayResult<VoiceStateResponse> {
        self.hit("get_voice_state")?;
        Ok(self.voice_state.lock().unwrap().clone())
    }

    async fn toggle_mute(&self) -> GatewayResult<ToggleFlagsResponse> {
        self.hit("toggle_mute")?;
        Ok(self.toggle_mute_response.lock().unwrap().clone())
    }

    async fn toggle_deafen(&self) -> GatewayResult<ToggleFlagsResponse> {
        self.hit("toggle_deafen")?;
        Ok(self.toggle_deafen_response.lock().unwrap().clone())
    }

    async fn set_input_volume(&self, volume: u16) -> GatewayResult<VolumeResponse> {
        self.hit("set_input_volume")?;
        self.volume_requests.lock().unwrap().push(("input", volume));
        Ok(self.input_volume_response.lock().unwrap().clone())
    }

    async fn set_output_volume(&self, volume: u16) -> GatewayResult<VolumeResponse> {
        self.hit("set_output_volume")?;
        self.volume_requests
            .lock()
            .unwrap()
            .push(("output", volume));
        Ok(self.output_volume_response.lock().unwrap().clone())
    }

    async fn leave_voice(&self) -> GatewayResult<AckResponse> {
        self.hit("leave_voice")?;
        Ok(self.leave_response.lock().unwrap().clone())
    }

    async fn get_voice_channels(
        &self,
        guild_id: Option<&GuildId>,
    ) -> GatewayResult<ChannelsResponse> {
        self.hit("get_voice_channels")?;
        self.channels_requested_guild
            .lock()
            .unwrap()
            .push(guild_id.cloned());
        Ok(self.channels_response.lock().unwrap().clone())
    }

    async fn join_voice_channel(&self, _channel_id: &ChannelId) -> GatewayResult<AckResponse> {
        self.hit("join_voice_channel")?;
        Ok(self.join_response.lock().unwrap().clone())
    }

    async fn set_user_volume(&self, user_id: &UserId, volume: u16) -> GatewayResult<AckResponse> {
        self.hit("set_user_volume")?;
        self.user_volume_calls
            .lock()
            .unwrap()
            .push((user_id.clone(), volume));
        Ok(AckResponse::ok())
    }

    async fn mute_user(&self, user_id: &UserId, muted: bool) -> GatewayResult<AckResponse> {
        self.hit("mute_user")?;
        self.mute_user_calls
            .lock()
            .unwrap()
            .push((user_id.clone(), muted));
        Ok(AckResponse::ok())
    }

    async fn get_guilds(&self) -> GatewayResult<GuildsResponse> {
        self.hit("get_guilds")?;
        Ok(self.guilds_response.lock().unwrap().clone())
    }

    async fn select_guild(&self, _guild_id: &GuildId) -> GatewayResult<AckResponse> {
        self.hit("select_guild")?;
        Ok(AckResponse::ok())
    }

    async fn check_installed(&self) -> GatewayResult<AppStatusResponse> {
        self.hit("check_installed")?;
        Ok(AppStatusResponse {
            success: true,
            installed: Some(*self.installed.lock().unwrap()),
            running: None,
            message: None,
        })
    }

    async fn check_running(&self) -> GatewayResult<AppStatusResponse> {
        self.hit("check_running")?;
        Ok(AppStatusResponse {
            success: true,
            installed: None,
            running: Some(*self.running.lock().unwrap()),
            message: None,
        })
    }

    async fn launch_app(&self) -> GatewayResult<AckResponse> {
        self.hit("launch_app")?;
        Ok(self.launch_response.lock().unwrap().clone())
    }

    async fn sync_full_state(&self) -> GatewayResult<FullSyncResponse> {
        self.hit("sync_full_state")?;
        let configured = self.full_sync_response.lock().unwrap().clone();
        Ok(configured.unwrap_or_else(|| {
            let guilds = self.guilds_response.lock().unwrap();
            FullSyncResponse {
                voice: self.voice_state.lock().unwrap().clone(),
                guilds: guilds.guilds.clone(),
                selected_guild_id: guilds.selected_guild_id.clone(),
            }
        }))
    }

    async fn get_pending_events(&self) -> GatewayResult<EventsResponse> {
        self.hit("get_pending_events")?;
        // Drain semantics: handing events over removes them from the queue.
        let events = std::mem::take(&mut *self.pending_events.lock().unwrap());
        Ok(EventsResponse {
            success: true,
            events,
        })
    }

    async fn get_settings(&self) -> GatewayResult<SettingsResponse> {
        self.hit("get_settings")?;
        Ok(SettingsResponse {
            success: true,
            settings: self.settings.lock().unwrap().clone(),
        })
    }

    async fn save_settings(&self, patch: &SettingsPatch) -> GatewayResult<AckResponse> {
        self.hit("save_settings")?;
        patch.apply(&mut self.settings.lock().unwrap());
        self.saved_patches.lock().unwrap().push(patch.clone());
        Ok(AckResponse::ok())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toast_count(&self) -> usize {
        self.toasts.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}
