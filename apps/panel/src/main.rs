//! Headless panel harness.
//!
//! Stands in for the plugin host: wires the HTTP gateway to the session
//! client and the event poller, starts both polls, and logs every state
//! change until interrupted. Useful for driving a local backend without
//! the quick-access UI.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use client_core::{ClientEvent, EventPoller, Notifier, SessionClient, Toast};
use gateway_http::HttpGateway;
use tracing::info;
use url::Url;

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the backend process.
    #[arg(long, default_value = "http://127.0.0.1:8335")]
    backend_url: Url,
}

/// Prints toasts instead of raising host notifications.
struct LogNotifier;

impl Notifier for LogNotifier {
    fn toast(&self, toast: Toast) {
        info!("toast: {} / {}", toast.title, toast.body);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let gateway = Arc::new(HttpGateway::new(args.backend_url));
    let notifier = Arc::new(LogNotifier);

    let client = SessionClient::new(gateway.clone(), notifier.clone());
    let poller = EventPoller::new(gateway, notifier);

    let mut events = client.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ClientEvent::ConnectionChanged(state) => {
                    info!(
                        "connection: installed={} running={} authenticated={} msg={}",
                        state.status.installed,
                        state.status.running,
                        state.status.authenticated,
                        state.status_message
                    );
                }
                ClientEvent::VoiceStateChanged(Some(voice)) => {
                    info!(
                        "voice: in_voice={} channel={:?} members={} muted={} deafened={}",
                        voice.in_voice,
                        voice.channel_name,
                        voice.members.len(),
                        voice.is_muted,
                        voice.is_deafened
                    );
                }
                ClientEvent::VoiceStateChanged(None) => info!("voice: cleared"),
                ClientEvent::GuildsUpdated { guilds, .. } => {
                    info!("guilds: {}", guilds.len());
                }
                ClientEvent::ChannelPickerOpened(channels) => {
                    info!("channel picker opened with {} channels", channels.len());
                }
                ClientEvent::ChannelPickerClosed => info!("channel picker closed"),
                ClientEvent::SettingsChanged(settings) => {
                    info!(
                        "settings: notifications={} auto_connect={}",
                        settings.notifications_enabled, settings.auto_connect
                    );
                }
            }
        }
    });

    client.start().await;
    poller.start().await;
    info!("panel harness running; ctrl-c to stop");

    tokio::signal::ctrl_c().await?;

    client.stop().await;
    poller.stop().await;
    // Give in-flight warns a moment to flush before the runtime drops.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
