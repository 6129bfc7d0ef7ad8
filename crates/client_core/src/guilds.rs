//! Guild/channel selection flow: pick a guild, fetch its voice channels,
//! join one, confirm through a fresh voice snapshot.

use anyhow::Result;
use shared::domain::{ChannelId, Guild, GuildId, VoiceChannel};

use crate::voice::VoiceSnapshot;
use crate::{ClientEvent, SessionClient};

/// Ephemeral picker state. Guild and channel lists are replaced wholesale
/// per fetch; nothing here is cached across picker sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildSelection {
    pub guilds: Vec<Guild>,
    pub selected_guild_id: Option<GuildId>,
    pub channels: Vec<VoiceChannel>,
    pub picker_open: bool,
    pub loading_channels: bool,
    pub joining_channel: bool,
}

impl SessionClient {
    /// Persists the guild selection remotely, records it locally, then
    /// fetches that guild's voice channels and opens the channel picker.
    /// Selecting a guild always flows straight into channel selection.
    pub async fn select_guild(&self, guild_id: GuildId) -> Result<()> {
        self.selection.write().await.loading_channels = true;
        let outcome = self.run_select_guild(guild_id).await;
        self.selection.write().await.loading_channels = false;
        outcome
    }

    async fn run_select_guild(&self, guild_id: GuildId) -> Result<()> {
        self.gateway.select_guild(&guild_id).await?;
        self.selection.write().await.selected_guild_id = Some(guild_id.clone());

        let channels = self.gateway.get_voice_channels(Some(&guild_id)).await?;
        if channels.success {
            self.open_picker(channels.channels).await;
        }
        Ok(())
    }

    /// Opens the channel picker for the current target guild: the explicit
    /// selection if there is one, else the guild of the current voice
    /// session, else whatever the backend considers default.
    pub async fn load_channels(&self) -> Result<()> {
        self.selection.write().await.loading_channels = true;
        let outcome = self.run_load_channels().await;
        self.selection.write().await.loading_channels = false;
        outcome
    }

    async fn run_load_channels(&self) -> Result<()> {
        let target = match self.selection.read().await.selected_guild_id.clone() {
            Some(guild_id) => Some(guild_id),
            None => self
                .voice
                .read()
                .await
                .as_ref()
                .and_then(|voice| voice.guild_id.clone()),
        };

        let channels = self.gateway.get_voice_channels(target.as_ref()).await?;
        if channels.success {
            self.open_picker(channels.channels).await;
        }
        Ok(())
    }

    /// Joins a voice channel. A successful join invalidates the channel,
    /// member list and speaking set at once, so the whole snapshot is
    /// re-fetched and returned rather than point-patched.
    pub async fn join_channel(&self, channel_id: ChannelId) -> Result<Option<VoiceSnapshot>> {
        self.selection.write().await.joining_channel = true;
        let outcome = self.run_join_channel(channel_id).await;
        self.selection.write().await.joining_channel = false;
        outcome
    }

    async fn run_join_channel(&self, channel_id: ChannelId) -> Result<Option<VoiceSnapshot>> {
        let joined = self.gateway.join_voice_channel(&channel_id).await?;
        if !joined.success {
            return Ok(None);
        }

        self.close_picker().await;

        let voice = self.gateway.get_voice_state().await?;
        if !voice.success {
            return Ok(None);
        }
        let snapshot = VoiceSnapshot::from(voice);
        *self.voice.write().await = Some(snapshot.clone());
        self.emit(ClientEvent::VoiceStateChanged(Some(snapshot.clone())));
        Ok(Some(snapshot))
    }

    pub async fn close_picker(&self) {
        let mut selection = self.selection.write().await;
        if selection.picker_open {
            selection.picker_open = false;
            drop(selection);
            self.emit(ClientEvent::ChannelPickerClosed);
        }
    }

    async fn open_picker(&self, channels: Vec<VoiceChannel>) {
        {
            let mut selection = self.selection.write().await;
            selection.channels = channels.clone();
            selection.picker_open = true;
        }
        self.emit(ClientEvent::ChannelPickerOpened(channels));
    }
}

#[cfg(test)]
#[path = "tests/guilds_tests.rs"]
mod tests;
