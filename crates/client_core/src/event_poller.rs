//! Process-wide join/leave notification poller.
//!
//! Started once at plugin load and stopped at unload, independent of
//! whether the panel is mounted or anyone is authenticated. Each cycle
//! re-reads the persisted notification settings so toggling notifications
//! takes effect within one tick without restarting the poller, then drains
//! the backend's pending-event queue and raises one toast per event.
//! Events are fire-and-forget: the drain call is the only acknowledgment.

use std::sync::Arc;

use shared::{
    protocol::{PendingEvent, VoiceEventKind},
    settings::Language,
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{info, warn};

use crate::gateway::VoiceGateway;
use crate::notify::{resolve_avatar_url, Notifier, Toast};
use crate::{i18n, EVENT_POLL_INTERVAL, EVENT_TOAST_DURATION};

/// Poller-owned copy of the two settings it cares about, refreshed every
/// cycle from the persisted store.
#[derive(Debug, Clone)]
pub struct NotificationPrefs {
    pub enabled: bool,
    pub language: Language,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            enabled: true,
            language: Language::default(),
        }
    }
}

pub struct EventPoller {
    gateway: Arc<dyn VoiceGateway>,
    notifier: Arc<dyn Notifier>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl EventPoller {
    pub fn new(gateway: Arc<dyn VoiceGateway>, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            notifier,
            task: Mutex::new(None),
        })
    }

    /// Starts the polling loop. Idempotent: a second start while running
    /// is a no-op.
    pub async fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            warn!("event polling already active");
            return;
        }

        let poller = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            let mut prefs = NotificationPrefs::default();
            let mut ticks = tokio::time::interval(EVENT_POLL_INTERVAL);
            loop {
                ticks.tick().await;
                poller.poll_once(&mut prefs).await;
            }
        }));
        info!("event polling started");
    }

    pub async fn stop(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
            info!("event polling stopped");
        }
    }

    /// One poll cycle. Settings are freshened even while notifications are
    /// suppressed, so re-enabling them takes effect within one cycle. The
    /// queue is drained either way to keep it from piling up backend-side;
    /// disabling notifications only suppresses the toasts.
    pub async fn poll_once(&self, prefs: &mut NotificationPrefs) {
        match self.gateway.get_settings().await {
            Ok(response) if response.success => {
                prefs.enabled = response.settings.notifications_enabled;
                prefs.language = response.settings.language;
            }
            Ok(_) => {}
            Err(err) => {
                warn!("event poll settings refresh failed: {err}");
                return;
            }
        }

        match self.gateway.get_pending_events().await {
            Ok(response) if response.success => {
                if !prefs.enabled {
                    return;
                }
                for event in response.events {
                    self.raise(&event, prefs.language);
                }
            }
            Ok(_) => {}
            Err(err) => warn!("event drain failed: {err}"),
        }
    }

    fn raise(&self, event: &PendingEvent, language: Language) {
        // Backend occasionally queues events before it has resolved the
        // member; nothing useful to show for those.
        let Some(username) = event.username.as_deref() else {
            return;
        };

        let t = i18n::strings(language);
        let (icon, verb) = match event.kind {
            VoiceEventKind::VoiceJoin => ("🎤", t.joined),
            VoiceEventKind::VoiceLeave => ("👋", t.left),
        };

        self.notifier.toast(Toast {
            title: format!("{icon} {username}"),
            body: format!("{verb} {}", t.the_call),
            avatar_url: Some(resolve_avatar_url(
                event.user_id.as_ref(),
                event.avatar.as_deref(),
            )),
            duration: EVENT_TOAST_DURATION,
        });
    }
}

#[cfg(test)]
#[path = "tests/event_poller_tests.rs"]
mod tests;
