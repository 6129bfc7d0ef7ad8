use std::sync::Arc;

use crate::test_support::{RecordingNotifier, TestGateway};
use crate::SessionClient;

use shared::domain::{ChannelId, GuildId};
use shared::protocol::AckResponse;

fn client_with(gateway: Arc<TestGateway>) -> Arc<SessionClient> {
    SessionClient::new(gateway, Arc::new(RecordingNotifier::default()))
}

#[tokio::test]
async fn select_guild_persists_fetches_and_opens_picker() {
    let gateway = Arc::new(TestGateway::default());
    let client = client_with(gateway.clone());

    client.select_guild(GuildId::from("g2")).await.unwrap();

    assert_eq!(gateway.call_count("select_guild"), 1);
    let selection = client.selection().await;
    assert_eq!(selection.selected_guild_id, Some(GuildId::from("g2")));
    assert!(selection.picker_open);
    assert!(!selection.loading_channels);
    assert_eq!(selection.channels.len(), 1);
    assert_eq!(
        gateway.channels_requested_guild.lock().unwrap().as_slice(),
        &[Some(GuildId::from("g2"))]
    );
}

#[tokio::test]
async fn load_channels_falls_back_to_the_voice_guild() {
    let gateway = Arc::new(TestGateway::default());
    let client = client_with(gateway.clone());
    client.refresh_voice_state().await; // snapshot carries guild g1

    client.load_channels().await.unwrap();

    assert_eq!(
        gateway.channels_requested_guild.lock().unwrap().as_slice(),
        &[Some(GuildId::from("g1"))]
    );
    assert!(client.selection().await.picker_open);
}

#[tokio::test]
async fn load_channels_without_any_guild_defers_to_the_backend() {
    let gateway = Arc::new(TestGateway::default());
    let client = client_with(gateway.clone());

    client.load_channels().await.unwrap();

    assert_eq!(
        gateway.channels_requested_guild.lock().unwrap().as_slice(),
        &[None]
    );
}

#[tokio::test]
async fn explicit_selection_beats_the_voice_guild() {
    let gateway = Arc::new(TestGateway::default());
    let client = client_with(gateway.clone());
    client.refresh_voice_state().await;
    client.select_guild(GuildId::from("g9")).await.unwrap();

    client.load_channels().await.unwrap();

    let requested = gateway.channels_requested_guild.lock().unwrap();
    assert_eq!(requested.last(), Some(&Some(GuildId::from("g9"))));
}

#[tokio::test]
async fn join_closes_picker_and_refetches_before_returning() {
    let gateway = Arc::new(TestGateway::default());
    let client = client_with(gateway.clone());
    client.load_channels().await.unwrap();
    assert!(client.selection().await.picker_open);

    let snapshot = client.join_channel(ChannelId::from("c1")).await.unwrap();

    // Join is confirmed by a full voice-state fetch, not a point patch.
    let calls = gateway.call_names();
    let join_at = calls
        .iter()
        .position(|name| *name == "join_voice_channel")
        .unwrap();
    let fetch_at = calls
        .iter()
        .position(|name| *name == "get_voice_state")
        .unwrap();
    assert!(join_at < fetch_at);

    let snapshot = snapshot.expect("join returns the fresh snapshot");
    assert_eq!(snapshot.channel_id, Some(ChannelId::from("c1")));
    assert_eq!(client.voice_state().await, Some(snapshot));

    let selection = client.selection().await;
    assert!(!selection.picker_open);
    assert!(!selection.joining_channel);
}

#[tokio::test]
async fn failed_join_keeps_picker_open_and_skips_the_fetch() {
    let gateway = Arc::new(TestGateway::default());
    *gateway.join_response.lock().unwrap() = AckResponse::failed("channel is full");
    let client = client_with(gateway.clone());
    client.load_channels().await.unwrap();

    let snapshot = client.join_channel(ChannelId::from("c1")).await.unwrap();

    assert!(snapshot.is_none());
    assert!(client.selection().await.picker_open);
    assert_eq!(gateway.call_count("get_voice_state"), 0);
}

#[tokio::test]
async fn channel_lists_are_replaced_per_fetch() {
    let gateway = Arc::new(TestGateway::default());
    let client = client_with(gateway.clone());
    client.load_channels().await.unwrap();
    assert_eq!(client.selection().await.channels.len(), 1);

    gateway.channels_response.lock().unwrap().channels.clear();
    client.load_channels().await.unwrap();

    assert!(client.selection().await.channels.is_empty());
}
