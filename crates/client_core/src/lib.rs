//! Session synchronization client for the quick-access voice panel.
//!
//! Keeps local UI state consistent with the remote voice/session backend by
//! polling through the typed [`gateway::VoiceGateway`] boundary and applying
//! user actions optimistically. Mutations patch only the snapshot fields
//! they own; periodic refreshes and explicit syncs replace the snapshot
//! wholesale and win over any patch they overtake (last writer wins per
//! field, not per object).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shared::{
    domain::{Guild, GuildId, VoiceChannel},
    settings::Settings,
};
use tokio::{
    sync::{broadcast, Mutex, RwLock},
    task::JoinHandle,
};
use tracing::warn;

pub mod connection;
pub mod event_poller;
pub mod gateway;
pub mod guilds;
pub mod i18n;
pub mod notify;
pub mod settings;
pub mod voice;

pub use connection::{ConnectionState, ConnectionStatus};
pub use event_poller::EventPoller;
pub use gateway::{GatewayError, GatewayResult, MissingGateway, VoiceGateway};
pub use guilds::GuildSelection;
pub use notify::{Notifier, NullNotifier, Toast};
pub use voice::VoiceSnapshot;

/// Cadence of the connection status checks while the session is not stable.
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(3);
/// Cadence of the voice snapshot refresh while authenticated.
pub const VOICE_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
/// Cadence of the join/leave event drain, for the plugin's whole lifetime.
pub const EVENT_POLL_INTERVAL: Duration = Duration::from_secs(3);
/// One-shot delay before re-checking `running` after launching the app.
pub const LAUNCH_RECHECK_DELAY: Duration = Duration::from_secs(5);

const EVENT_TOAST_DURATION: Duration = Duration::from_secs(4);
const SYNC_TOAST_DURATION: Duration = Duration::from_secs(2);

/// State change notifications for whatever is rendering the panel.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    ConnectionChanged(ConnectionState),
    VoiceStateChanged(Option<VoiceSnapshot>),
    GuildsUpdated {
        guilds: Vec<Guild>,
        selected_guild_id: Option<GuildId>,
    },
    ChannelPickerOpened(Vec<VoiceChannel>),
    ChannelPickerClosed,
    SettingsChanged(Settings),
}

/// Owns the local mirror of the remote session: connection status, the voice
/// snapshot, the guild/channel selection and the settings cache, plus the
/// background tasks that keep them fresh.
pub struct SessionClient {
    gateway: Arc<dyn VoiceGateway>,
    notifier: Arc<dyn Notifier>,
    connection: RwLock<ConnectionState>,
    voice: RwLock<Option<VoiceSnapshot>>,
    selection: RwLock<GuildSelection>,
    settings: RwLock<Settings>,
    syncing: AtomicBool,
    events: broadcast::Sender<ClientEvent>,
    status_poll: Mutex<Option<JoinHandle<()>>>,
    voice_refresh: Mutex<Option<JoinHandle<()>>>,
}

impl SessionClient {
    pub fn new(gateway: Arc<dyn VoiceGateway>, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            gateway,
            notifier,
            connection: RwLock::new(ConnectionState::default()),
            voice: RwLock::new(None),
            selection: RwLock::new(GuildSelection::default()),
            settings: RwLock::new(Settings::default()),
            syncing: AtomicBool::new(false),
            events,
            status_poll: Mutex::new(None),
            voice_refresh: Mutex::new(None),
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn connection(&self) -> ConnectionState {
        self.connection.read().await.clone()
    }

    pub async fn voice_state(&self) -> Option<VoiceSnapshot> {
        self.voice.read().await.clone()
    }

    pub async fn selection(&self) -> GuildSelection {
        self.selection.read().await.clone()
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Relaxed)
    }

    /// Loads persisted settings, then starts the two panel-lifetime polls:
    /// the connection status check and the voice snapshot refresh. Replaces
    /// (and aborts) any previously started tasks.
    pub async fn start(self: &Arc<Self>) {
        if let Err(err) = self.load_settings().await {
            warn!("settings load failed at startup: {err}");
        }

        let status_task = {
            let client = Arc::clone(self);
            tokio::spawn(async move {
                let mut ticks = tokio::time::interval(STATUS_POLL_INTERVAL);
                loop {
                    ticks.tick().await;
                    // Backpressure: a stable session needs no status calls
                    // until either flag drops again.
                    let stable = {
                        let state = client.connection.read().await;
                        state.status.running && state.status.authenticated
                    };
                    if !stable {
                        client.poll_connection_once().await;
                    }
                }
            })
        };
        if let Some(previous) = self.status_poll.lock().await.replace(status_task) {
            previous.abort();
        }

        let refresh_task = {
            let client = Arc::clone(self);
            tokio::spawn(async move {
                let mut ticks = tokio::time::interval(VOICE_REFRESH_INTERVAL);
                loop {
                    ticks.tick().await;
                    let authenticated = client.connection.read().await.status.authenticated;
                    if authenticated {
                        client.refresh_voice_state().await;
                    }
                }
            })
        };
        if let Some(previous) = self.voice_refresh.lock().await.replace(refresh_task) {
            previous.abort();
        }
    }

    /// Stops the background polls. Calls already in flight are not aborted;
    /// their responses land in state that nothing reads afterwards.
    pub async fn stop(&self) {
        if let Some(task) = self.status_poll.lock().await.take() {
            task.abort();
        }
        if let Some(task) = self.voice_refresh.lock().await.take() {
            task.abort();
        }
    }

    pub(crate) fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) async fn strings(&self) -> &'static i18n::Strings {
        i18n::strings(self.settings.read().await.language)
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
