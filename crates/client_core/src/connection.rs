//! Connection state machine: installed, then running, then authenticated.
//!
//! `poll_connection_once` walks the chain top to bottom and stops at the
//! first unsatisfied precondition. The status flags only strengthen on
//! success signals; `running` and `authenticated` are actively re-polled and
//! drop to false when the backend says so, and dropping `running` always
//! drops `authenticated` with it, so authenticated implies running implies
//! installed for every reachable state.

use std::sync::Arc;

use tracing::warn;

use crate::gateway::GatewayResult;
use crate::voice::VoiceSnapshot;
use crate::{ClientEvent, SessionClient, LAUNCH_RECHECK_DELAY};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub installed: bool,
    pub running: bool,
    pub authenticated: bool,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub status_message: String,
    /// True until the first status poll has completed.
    pub loading: bool,
    pub connecting: bool,
    pub launching: bool,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::default(),
            status_message: String::new(),
            loading: true,
            connecting: false,
            launching: false,
        }
    }
}

impl SessionClient {
    /// One pass of the status check chain. Transport faults are logged and
    /// swallowed; the next scheduled tick is the retry.
    pub async fn poll_connection_once(&self) {
        if let Err(err) = self.run_status_checks().await {
            warn!("status poll failed: {err}");
        }
        let mut state = self.connection.write().await;
        if state.loading {
            state.loading = false;
            drop(state);
            self.emit_connection().await;
        }
    }

    async fn run_status_checks(&self) -> GatewayResult<()> {
        let t = self.strings().await;

        // Install state is checked only until it first reads true; nothing
        // un-installs the app behind our back mid-session.
        let installed = self.connection.read().await.status.installed;
        if !installed {
            let res = self.gateway.check_installed().await?;
            let installed_now = res.installed.unwrap_or(false);
            {
                let mut state = self.connection.write().await;
                state.status.installed = installed_now;
                if !installed_now {
                    state.status_message = t.app_not_installed.to_string();
                }
            }
            self.emit_connection().await;
            if !installed_now {
                return Ok(());
            }
        }

        let res = self.gateway.check_running().await?;
        let running = res.running.unwrap_or(false);
        {
            let mut state = self.connection.write().await;
            state.status.running = running;
            if !running {
                state.status.authenticated = false;
                state.status.username = None;
                state.status_message = t.app_not_running.to_string();
            }
        }
        if !running {
            self.emit_connection().await;
            return Ok(());
        }

        if self.connection.read().await.status.authenticated {
            // Stable session; nothing left to check this tick.
            return Ok(());
        }

        // A previous session may still be valid backend-side.
        let status = self.gateway.check_auth_status().await?;
        if status.authenticated {
            let username = status.user.map(|user| user.username).unwrap_or_default();
            self.mark_authenticated(&username).await;
            self.load_initial_state().await?;
            return Ok(());
        }

        let auto_connect = self.settings.read().await.auto_connect;
        let connecting = self.connection.read().await.connecting;
        if auto_connect && !connecting {
            self.connect().await;
        } else {
            self.connection.write().await.status_message = t.connect_prompt.to_string();
            self.emit_connection().await;
        }
        Ok(())
    }

    /// Explicit authenticate. Never retried automatically; every failure
    /// path ends in a status message, not an error.
    pub async fn connect(&self) {
        let t = self.strings().await;
        {
            let mut state = self.connection.write().await;
            if state.connecting {
                return;
            }
            state.connecting = true;
            state.status_message = t.connecting.to_string();
        }
        self.emit_connection().await;

        if let Err(err) = self.try_connect().await {
            warn!("connect failed: {err}");
            self.connection.write().await.status_message = t.error.to_string();
        }

        self.connection.write().await.connecting = false;
        self.emit_connection().await;
    }

    async fn try_connect(&self) -> GatewayResult<()> {
        let auth = self.gateway.authenticate().await?;
        if auth.authenticated {
            let username = auth.user.map(|user| user.username).unwrap_or_default();
            self.mark_authenticated(&username).await;
            self.load_initial_state().await?;
        } else {
            let t = self.strings().await;
            let message = auth.message.unwrap_or_else(|| t.error.to_string());
            self.connection.write().await.status_message = message;
            self.emit_connection().await;
        }
        Ok(())
    }

    /// Launches the external app, then re-checks `running` exactly once
    /// after a fixed delay. The only non-repeating timed check in the
    /// system.
    pub async fn launch_app(self: &Arc<Self>) {
        let t = self.strings().await;
        {
            let mut state = self.connection.write().await;
            if state.launching {
                return;
            }
            state.launching = true;
        }

        match self.gateway.launch_app().await {
            Ok(ack) if ack.success => {
                self.connection.write().await.status_message = t.launching.to_string();
                self.emit_connection().await;
                let client = Arc::clone(self);
                tokio::spawn(async move {
                    tokio::time::sleep(LAUNCH_RECHECK_DELAY).await;
                    client.finish_launch_check().await;
                });
            }
            Ok(ack) => {
                let mut state = self.connection.write().await;
                state.status_message = ack.message.unwrap_or_else(|| t.error.to_string());
                state.launching = false;
                drop(state);
                self.emit_connection().await;
            }
            Err(err) => {
                warn!("launch call failed: {err}");
                let mut state = self.connection.write().await;
                state.status_message = t.error.to_string();
                state.launching = false;
                drop(state);
                self.emit_connection().await;
            }
        }
    }

    async fn finish_launch_check(&self) {
        let t = self.strings().await;
        match self.gateway.check_running().await {
            Ok(res) => {
                let running = res.running.unwrap_or(false);
                let mut state = self.connection.write().await;
                state.status.running = running;
                if running {
                    state.status_message = t.open_app.to_string();
                } else {
                    state.status.authenticated = false;
                    state.status.username = None;
                }
                state.launching = false;
            }
            Err(err) => {
                warn!("launch re-check failed: {err}");
                self.connection.write().await.launching = false;
            }
        }
        self.emit_connection().await;
    }

    /// Logs out backend-side and tears down the local session: the voice
    /// snapshot lives only while authenticated.
    pub async fn logout(&self) {
        let t = self.strings().await;
        if let Err(err) = self.gateway.logout().await {
            warn!("logout call failed: {err}");
        }
        {
            let mut state = self.connection.write().await;
            state.status.authenticated = false;
            state.status.username = None;
            state.status_message = t.not_connected.to_string();
        }
        self.emit_connection().await;

        *self.voice.write().await = None;
        self.emit(ClientEvent::VoiceStateChanged(None));
    }

    async fn mark_authenticated(&self, username: &str) {
        let t = self.strings().await;
        {
            let mut state = self.connection.write().await;
            state.status.installed = true;
            state.status.running = true;
            state.status.authenticated = true;
            state.status.username = Some(username.to_string());
            state.status_message = format!("{} {username}", t.connected_as);
        }
        self.emit_connection().await;
    }

    /// One-time load after an authentication transition: current voice
    /// state plus the guild list, delivered through the event stream.
    async fn load_initial_state(&self) -> GatewayResult<()> {
        let voice = self.gateway.get_voice_state().await?;
        if voice.success {
            let snapshot = VoiceSnapshot::from(voice);
            *self.voice.write().await = Some(snapshot.clone());
            self.emit(ClientEvent::VoiceStateChanged(Some(snapshot)));
        }

        let guilds = self.gateway.get_guilds().await?;
        if guilds.success {
            let mut selection = self.selection.write().await;
            selection.guilds = guilds.guilds.clone();
            selection.selected_guild_id = guilds.selected_guild_id.clone();
            drop(selection);
            self.emit(ClientEvent::GuildsUpdated {
                guilds: guilds.guilds,
                selected_guild_id: guilds.selected_guild_id,
            });
        }
        Ok(())
    }

    pub(crate) async fn emit_connection(&self) {
        let state = self.connection.read().await.clone();
        self.emit(ClientEvent::ConnectionChanged(state));
    }
}

#[cfg(test)]
#[path = "tests/connection_tests.rs"]
mod tests;
