//! Voice snapshot ownership and the optimistic mutation discipline.
//!
//! Every mutation is a gateway round trip followed by a local patch of only
//! the fields that operation owns, and only when the response says
//! `success: true`; a failed call leaves the previous value on screen. The
//! periodic refresh and the explicit sync replace the snapshot wholesale.

use std::collections::HashSet;
use std::sync::atomic::Ordering;

use anyhow::Result;
use shared::{
    domain::{ChannelId, GuildId, UserId, VoiceMember},
    protocol::VoiceStateResponse,
};
use tracing::warn;

use crate::{ClientEvent, SessionClient, SYNC_TOAST_DURATION};

/// Authoritative remote voice state, mirrored locally. Replaced wholesale
/// on every successful refresh or sync; patched in place by mutations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoiceSnapshot {
    pub in_voice: bool,
    pub is_muted: bool,
    pub is_deafened: bool,
    pub input_volume: u16,
    pub output_volume: u16,
    pub channel_id: Option<ChannelId>,
    pub channel_name: Option<String>,
    pub guild_id: Option<GuildId>,
    pub members: Vec<VoiceMember>,
    pub speaking_users: HashSet<UserId>,
}

impl From<VoiceStateResponse> for VoiceSnapshot {
    fn from(response: VoiceStateResponse) -> Self {
        Self {
            in_voice: response.in_voice,
            is_muted: response.is_muted,
            is_deafened: response.is_deafened,
            input_volume: response.input_volume,
            output_volume: response.output_volume,
            channel_id: response.channel_id,
            channel_name: response.channel_name,
            guild_id: response.guild_id,
            members: response.members,
            speaking_users: response.speaking_users.into_iter().collect(),
        }
    }
}

impl SessionClient {
    /// Owns `is_muted`. The response carries the authoritative flag; the
    /// locally shown value is whatever came back, not what was asked for.
    pub async fn toggle_mute(&self) -> Result<()> {
        let result = self.gateway.toggle_mute().await?;
        if result.success {
            self.patch_voice(|voice| voice.is_muted = result.is_muted)
                .await;
        }
        Ok(())
    }

    /// Owns `is_deafened` and `is_muted` both: deafening forces mute
    /// upstream, so the response always reports both flags.
    pub async fn toggle_deafen(&self) -> Result<()> {
        let result = self.gateway.toggle_deafen().await?;
        if result.success {
            self.patch_voice(|voice| {
                voice.is_deafened = result.is_deafened;
                voice.is_muted = result.is_muted;
            })
            .await;
        }
        Ok(())
    }

    /// Owns `input_volume`. The value is rounded before transmission and
    /// the backend's (possibly clamped) result wins over the request.
    pub async fn set_input_volume(&self, value: f64) -> Result<()> {
        let requested = round_volume(value);
        let result = self.gateway.set_input_volume(requested).await?;
        if result.success {
            let applied = result.volume.unwrap_or(requested);
            self.patch_voice(|voice| voice.input_volume = applied).await;
        } else {
            warn!(
                "set input volume rejected: {}",
                result.message.as_deref().unwrap_or("no reason given")
            );
        }
        Ok(())
    }

    /// Owns `output_volume`; same contract as [`Self::set_input_volume`].
    pub async fn set_output_volume(&self, value: f64) -> Result<()> {
        let requested = round_volume(value);
        let result = self.gateway.set_output_volume(requested).await?;
        if result.success {
            let applied = result.volume.unwrap_or(requested);
            self.patch_voice(|voice| voice.output_volume = applied).await;
        } else {
            warn!(
                "set output volume rejected: {}",
                result.message.as_deref().unwrap_or("no reason given")
            );
        }
        Ok(())
    }

    /// Owns the channel identity and member list; mute/deafen flags and
    /// volumes are deliberately left as they were.
    pub async fn leave_voice(&self) -> Result<()> {
        let result = self.gateway.leave_voice().await?;
        if result.success {
            self.patch_voice(|voice| {
                voice.in_voice = false;
                voice.channel_id = None;
                voice.channel_name = None;
                voice.members.clear();
                voice.speaking_users.clear();
            })
            .await;
        }
        Ok(())
    }

    /// Full-state resync: replaces the snapshot, the guild list and the
    /// selected guild wholesale, then toasts a member-count summary.
    pub async fn sync(&self) -> Result<()> {
        self.syncing.store(true, Ordering::Relaxed);
        let outcome = self.run_full_sync().await;
        self.syncing.store(false, Ordering::Relaxed);
        outcome
    }

    async fn run_full_sync(&self) -> Result<()> {
        let full = self.gateway.sync_full_state().await?;
        if !full.voice.success {
            return Ok(());
        }

        let snapshot = VoiceSnapshot::from(full.voice);
        let member_count = snapshot.members.len();
        *self.voice.write().await = Some(snapshot.clone());
        self.emit(ClientEvent::VoiceStateChanged(Some(snapshot)));

        {
            let mut selection = self.selection.write().await;
            selection.guilds = full.guilds.clone();
            if full.selected_guild_id.is_some() {
                selection.selected_guild_id = full.selected_guild_id.clone();
            }
        }
        self.emit(ClientEvent::GuildsUpdated {
            guilds: full.guilds,
            selected_guild_id: full.selected_guild_id,
        });

        let t = self.strings().await;
        self.notifier.toast(crate::Toast {
            title: t.sync_complete.to_string(),
            body: format!("{member_count} {}", t.members_in_channel),
            avatar_url: None,
            duration: SYNC_TOAST_DURATION,
        });
        Ok(())
    }

    /// Periodic refresh body. A stale snapshot beats a blanked one, so
    /// failures of any kind only log.
    pub(crate) async fn refresh_voice_state(&self) {
        match self.gateway.get_voice_state().await {
            Ok(response) if response.success => {
                let snapshot = VoiceSnapshot::from(response);
                *self.voice.write().await = Some(snapshot.clone());
                self.emit(ClientEvent::VoiceStateChanged(Some(snapshot)));
            }
            Ok(response) => {
                warn!(
                    "voice refresh rejected: {}",
                    response.message.as_deref().unwrap_or("no reason given")
                );
            }
            Err(err) => warn!("voice refresh failed: {err}"),
        }
    }

    async fn patch_voice(&self, patch: impl FnOnce(&mut VoiceSnapshot)) {
        let mut guard = self.voice.write().await;
        if let Some(voice) = guard.as_mut() {
            patch(voice);
            let snapshot = voice.clone();
            drop(guard);
            self.emit(ClientEvent::VoiceStateChanged(Some(snapshot)));
        }
    }
}

fn round_volume(value: f64) -> u16 {
    value.round().clamp(0.0, u16::MAX as f64) as u16
}

#[cfg(test)]
#[path = "tests/voice_tests.rs"]
mod tests;
