//! Canonical notification URLs.

use herald_common::types::Notification;

/// Derive the URL a delivered notification points at.
///
/// An explicit `path` on the notification wins and is passed through
/// verbatim. Otherwise the topic permalink is composed from the slug and the
/// post's index within the topic; with neither path nor post data the link
/// falls back to the forum base URL.
pub fn build_link(
    notification: &Notification,
    topic_slug: Option<&str>,
    post_index: Option<i64>,
    base_url: &str,
) -> String {
    if let Some(path) = &notification.path {
        return path.clone();
    }

    match (topic_slug, post_index) {
        (Some(slug), Some(index)) => format!("{}/topic/{}/{}", base_url, slug, index),
        _ => base_url.to_string(),
    }
}
