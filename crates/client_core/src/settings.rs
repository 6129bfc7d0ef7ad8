//! Settings cache and persistence.
//!
//! Settings are loaded once at client start and mutated through partial
//! saves: the client only ever sends the changed keys and the backend
//! merges them last-write-wins, so concurrent single-key updates never
//! clobber each other.

use anyhow::Result;
use shared::{
    domain::{UserId, VoiceMember},
    settings::{Language, Settings, SettingsPatch},
};
use tracing::warn;

use crate::{ClientEvent, SessionClient};

impl SessionClient {
    pub(crate) async fn load_settings(&self) -> Result<()> {
        let response = self.gateway.get_settings().await?;
        if response.success {
            *self.settings.write().await = response.settings.clone();
            self.emit(ClientEvent::SettingsChanged(response.settings));
        } else {
            warn!("settings load rejected by backend");
        }
        Ok(())
    }

    pub async fn update_notifications(&self, enabled: bool) -> Result<()> {
        self.settings.write().await.notifications_enabled = enabled;
        self.save_patch(SettingsPatch::notifications_enabled(enabled))
            .await
    }

    pub async fn update_auto_connect(&self, enabled: bool) -> Result<()> {
        self.settings.write().await.auto_connect = enabled;
        self.save_patch(SettingsPatch::auto_connect(enabled)).await
    }

    pub async fn update_game_sync(&self, enabled: bool) -> Result<()> {
        self.settings.write().await.game_sync_enabled = enabled;
        self.save_patch(SettingsPatch::game_sync_enabled(enabled))
            .await
    }

    pub async fn update_language(&self, language: Language) -> Result<()> {
        self.settings.write().await.language = language;
        self.save_patch(SettingsPatch::language(language)).await
    }

    /// Applies a per-member volume override: live on the backend via
    /// `set_user_volume`, and persisted in the override map so it survives
    /// the member leaving and rejoining.
    pub async fn update_user_volume(&self, user_id: UserId, volume: f64) -> Result<()> {
        let rounded = volume.round().clamp(0.0, 200.0) as u16;
        self.gateway.set_user_volume(&user_id, rounded).await?;

        let volumes = {
            let mut settings = self.settings.write().await;
            settings.user_volumes.insert(user_id, rounded);
            settings.user_volumes.clone()
        };
        self.save_patch(SettingsPatch::user_volumes(volumes)).await
    }

    /// Mutes or unmutes another member locally on the backend. No snapshot
    /// patch; the member's flags come back with the next refresh.
    pub async fn mute_user(&self, user_id: UserId, muted: bool) -> Result<()> {
        self.gateway.mute_user(&user_id, muted).await?;
        Ok(())
    }

    /// Display volume for a member: the persisted override if one exists,
    /// else the volume the backend reported for them.
    pub async fn effective_member_volume(&self, member: &VoiceMember) -> u16 {
        let settings = self.settings.read().await;
        settings
            .user_volumes
            .get(&member.user_id)
            .copied()
            .unwrap_or(member.volume)
    }

    async fn save_patch(&self, patch: SettingsPatch) -> Result<()> {
        let ack = self.gateway.save_settings(&patch).await?;
        if !ack.success {
            warn!(
                "settings save rejected: {}",
                ack.message.as_deref().unwrap_or("no reason given")
            );
        }
        self.emit(ClientEvent::SettingsChanged(
            self.settings.read().await.clone(),
        ));
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
