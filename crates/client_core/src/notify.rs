//! Toast seam towards the host runtime.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use shared::domain::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub body: String,
    pub avatar_url: Option<String>,
    pub duration: Duration,
}

/// Raises user-visible notifications. The host plugin runtime provides the
/// real implementation; tests record what would have been shown.
pub trait Notifier: Send + Sync {
    fn toast(&self, toast: Toast);
}

/// Drops every toast. Useful when running headless.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn toast(&self, _toast: Toast) {}
}

const AVATAR_CDN: &str = "https://cdn.discordapp.com";
const FALLBACK_AVATARS: u64 = 5;

/// Resolves the avatar image for a user: the explicit avatar hash when the
/// backend supplied one, else one of the five stock avatars picked
/// deterministically from the user id.
pub fn resolve_avatar_url(user_id: Option<&UserId>, avatar: Option<&str>) -> String {
    if let (Some(user_id), Some(avatar)) = (user_id, avatar) {
        return format!("{AVATAR_CDN}/avatars/{user_id}/{avatar}.png?size=64");
    }
    format!(
        "{AVATAR_CDN}/embed/avatars/{}.png",
        fallback_avatar_index(user_id)
    )
}

fn fallback_avatar_index(user_id: Option<&UserId>) -> u64 {
    let Some(user_id) = user_id else {
        return 0;
    };
    match user_id.as_str().parse::<u64>() {
        Ok(n) => n % FALLBACK_AVATARS,
        // Snowflakes are numeric in practice; hash anything that is not so
        // the fallback stays stable per user.
        Err(_) => {
            let mut hasher = DefaultHasher::new();
            user_id.as_str().hash(&mut hasher);
            hasher.finish() % FALLBACK_AVATARS
        }
    }
}
