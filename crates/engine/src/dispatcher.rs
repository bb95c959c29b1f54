//! Notification fan-out.
//!
//! One inbound event addresses many recipients. Each recipient gets an
//! independently spawned task running the full chain — look up the linked
//! chat id, resolve language, sanitize and translate, build the permalink,
//! compose, send — so no recipient waits on or fails with any other. Tasks
//! report on an mpsc result channel consumed only for logging; nothing
//! propagates to the dispatch caller.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use herald_common::error::AppError;
use herald_common::types::{DeliveryOutcome, Notification, NotificationEvent};

use crate::permalink;
use crate::resolver::LanguageResolver;
use crate::sanitize::{self, ContentSanitizer};
use crate::stores::{PostStore, UserStore};

/// Outbound message channel. The Telegram relay implements this; tests
/// substitute an in-memory sink.
#[async_trait]
pub trait OutboundChannel: Send + Sync {
    /// Attempt delivery to a chat. Transport failures are the
    /// implementation's to log; they are not reported back.
    async fn send(&self, chat_id: i64, text: &str);
}

/// Kind-tag marker for moderation flags, which are never relayed.
const FLAG_NID_MARKER: &str = "post_flag";

/// Orchestrates the per-recipient delivery pipeline.
pub struct NotificationDispatcher {
    resolver: Arc<LanguageResolver>,
    sanitizer: Arc<ContentSanitizer>,
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
    outbound: Arc<dyn OutboundChannel>,
    base_url: String,
}

impl NotificationDispatcher {
    pub fn new(
        resolver: Arc<LanguageResolver>,
        sanitizer: Arc<ContentSanitizer>,
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        outbound: Arc<dyn OutboundChannel>,
        base_url: String,
    ) -> Self {
        Self {
            resolver,
            sanitizer,
            users,
            posts,
            outbound,
            base_url,
        }
    }

    /// Fan an event out to its recipients.
    ///
    /// Returns once every recipient task has reported; callers that must not
    /// wait spawn the returned future. Recipient tasks run concurrently and
    /// unbounded — a large uid list means an equally large burst of sends.
    pub async fn dispatch(&self, event: NotificationEvent) {
        let NotificationEvent { notification, uids } = event;

        if uids.is_empty() {
            return;
        }

        // Moderation flags stay inside the forum.
        if notification
            .nid
            .as_deref()
            .is_some_and(|nid| nid.contains(FLAG_NID_MARKER))
        {
            tracing::debug!(nid = ?notification.nid, "Flag notification suppressed");
            return;
        }

        let (tx, mut rx) = mpsc::channel(uids.len());

        for uid in uids {
            let task = RecipientTask {
                uid,
                notification: notification.clone(),
                resolver: Arc::clone(&self.resolver),
                sanitizer: Arc::clone(&self.sanitizer),
                users: Arc::clone(&self.users),
                posts: Arc::clone(&self.posts),
                outbound: Arc::clone(&self.outbound),
                base_url: self.base_url.clone(),
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(task.run().await).await;
            });
        }
        drop(tx);

        // Outcomes are logged and dropped; a partial failure is visible here
        // and nowhere else.
        while let Some(outcome) = rx.recv().await {
            match outcome {
                DeliveryOutcome::Sent { uid } => {
                    tracing::info!(uid, "Notification relayed");
                }
                DeliveryOutcome::Skipped { uid } => {
                    tracing::debug!(uid, "No linked Telegram id, send skipped");
                }
                DeliveryOutcome::Failed { uid, reason } => {
                    tracing::warn!(uid, %reason, "Notification delivery failed");
                }
            }
        }
    }
}

/// One recipient's linear chain. Each step depends on the previous one;
/// nothing here touches any other recipient.
struct RecipientTask {
    uid: i64,
    notification: Notification,
    resolver: Arc<LanguageResolver>,
    sanitizer: Arc<ContentSanitizer>,
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
    outbound: Arc<dyn OutboundChannel>,
    base_url: String,
}

impl RecipientTask {
    async fn run(self) -> DeliveryOutcome {
        let uid = self.uid;
        match self.deliver().await {
            Ok(outcome) => outcome,
            Err(e) => DeliveryOutcome::Failed {
                uid,
                reason: e.to_string(),
            },
        }
    }

    async fn deliver(&self) -> Result<DeliveryOutcome, AppError> {
        let Some(chat_id) = self.users.telegram_id(self.uid).await? else {
            // Nothing to send to; the send step is skipped, not attempted
            return Ok(DeliveryOutcome::Skipped { uid: self.uid });
        };

        let language = self.resolver.resolve(self.uid).await;

        let clean_body = sanitize::sanitize_body(&self.notification.body_long);
        let title = self
            .sanitizer
            .translate_title(&self.notification.body_short, &language)
            .await?;

        let url = self.permalink().await?;

        let message = format!("{}\n\n{}\n\n{}", title, clean_body, url);

        tracing::debug!(uid = self.uid, "Sending notification");
        self.outbound.send(chat_id, &message).await;

        Ok(DeliveryOutcome::Sent { uid: self.uid })
    }

    /// Slug/index lookups only happen when no explicit path is present.
    async fn permalink(&self) -> Result<String, AppError> {
        if self.notification.path.is_none()
            && let Some(pid) = self.notification.pid
        {
            let slug = self.posts.topic_slug(pid).await?;
            let index = self.posts.post_index(pid, self.uid).await?;
            return Ok(permalink::build_link(
                &self.notification,
                Some(&slug),
                Some(index),
                &self.base_url,
            ));
        }

        Ok(permalink::build_link(
            &self.notification,
            None,
            None,
            &self.base_url,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use crate::lang_cache::LanguageCache;
    use crate::translate::Translator;

    struct FakeUsers {
        telegram_ids: HashMap<i64, i64>,
        failing: HashSet<i64>,
    }

    #[async_trait]
    impl UserStore for FakeUsers {
        async fn language(&self, _uid: i64) -> Result<Option<String>, AppError> {
            Ok(None)
        }

        async fn telegram_id(&self, uid: i64) -> Result<Option<i64>, AppError> {
            if self.failing.contains(&uid) {
                return Err(AppError::Internal("profile store down".to_string()));
            }
            Ok(self.telegram_ids.get(&uid).copied())
        }

        async fn set_telegram_id(
            &self,
            _uid: i64,
            _telegram_id: Option<i64>,
        ) -> Result<(), AppError> {
            Ok(())
        }

        async fn total_users(&self) -> Result<i64, AppError> {
            Ok(self.telegram_ids.len() as i64)
        }
    }

    struct FakePosts;

    #[async_trait]
    impl PostStore for FakePosts {
        async fn topic_slug(&self, _pid: i64) -> Result<String, AppError> {
            Ok("test-topic".to_string())
        }

        async fn post_index(&self, _pid: i64, _uid: i64) -> Result<i64, AppError> {
            Ok(3)
        }
    }

    struct EchoTranslator;

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(&self, text: &str, _lang: &str) -> Result<String, AppError> {
            Ok(text.to_string())
        }
    }

    /// Records every (chat_id, text) handed to it.
    struct RecordingChannel {
        sent: Mutex<Vec<(i64, String)>>,
    }

    impl RecordingChannel {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<(i64, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OutboundChannel for RecordingChannel {
        async fn send(&self, chat_id: i64, text: &str) {
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
        }
    }

    fn dispatcher(
        telegram_ids: &[(i64, i64)],
        failing: &[i64],
        outbound: Arc<RecordingChannel>,
    ) -> NotificationDispatcher {
        let users = Arc::new(FakeUsers {
            telegram_ids: telegram_ids.iter().copied().collect(),
            failing: failing.iter().copied().collect(),
        });
        let cache = Arc::new(LanguageCache::new(None));
        let resolver = Arc::new(LanguageResolver::new(
            cache,
            Arc::clone(&users) as Arc<dyn UserStore>,
            None,
        ));
        let sanitizer = Arc::new(ContentSanitizer::new(Arc::new(EchoTranslator)));

        NotificationDispatcher::new(
            resolver,
            sanitizer,
            users,
            Arc::new(FakePosts),
            outbound,
            "https://forum.example".to_string(),
        )
    }

    fn event(nid: Option<&str>, uids: &[i64]) -> NotificationEvent {
        NotificationEvent {
            notification: Notification {
                nid: nid.map(str::to_string),
                pid: Some(7),
                body_short: "T".to_string(),
                body_long: "<b>B</b>".to_string(),
                path: None,
            },
            uids: uids.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_fan_out_composes_and_sends_per_recipient() {
        let outbound = RecordingChannel::new();
        let dispatcher = dispatcher(&[(1, 111), (2, 222)], &[], Arc::clone(&outbound));

        dispatcher.dispatch(event(None, &[1, 2])).await;

        let mut sent = outbound.sent();
        sent.sort();
        assert_eq!(sent.len(), 2);

        let expected = "T\n\nB\n\nhttps://forum.example/topic/test-topic/3";
        assert_eq!(sent[0], (111, expected.to_string()));
        assert_eq!(sent[1], (222, expected.to_string()));
    }

    #[tokio::test]
    async fn test_flag_notification_reaches_no_recipient() {
        let outbound = RecordingChannel::new();
        let dispatcher = dispatcher(&[(1, 111), (2, 222), (3, 333)], &[], Arc::clone(&outbound));

        dispatcher
            .dispatch(event(Some("post_flag:42:uid:3"), &[1, 2, 3]))
            .await;

        assert!(outbound.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unlinked_recipient_triggers_no_send() {
        let outbound = RecordingChannel::new();
        // uid 2 never linked a Telegram id
        let dispatcher = dispatcher(&[(1, 111)], &[], Arc::clone(&outbound));

        dispatcher.dispatch(event(None, &[1, 2])).await;

        let sent = outbound.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 111);
    }

    #[tokio::test]
    async fn test_failing_recipient_does_not_affect_siblings() {
        let outbound = RecordingChannel::new();
        let dispatcher = dispatcher(&[(1, 111), (2, 222)], &[1], Arc::clone(&outbound));

        dispatcher.dispatch(event(None, &[1, 2])).await;

        let sent = outbound.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 222);
    }

    #[tokio::test]
    async fn test_explicit_path_skips_post_lookups() {
        let outbound = RecordingChannel::new();
        let dispatcher = dispatcher(&[(1, 111)], &[], Arc::clone(&outbound));

        let mut e = event(None, &[1]);
        e.notification.path = Some("/topic/9/elsewhere/1".to_string());
        dispatcher.dispatch(e).await;

        let sent = outbound.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.ends_with("\n\n/topic/9/elsewhere/1"));
    }

    #[tokio::test]
    async fn test_empty_recipient_list_is_a_no_op() {
        let outbound = RecordingChannel::new();
        let dispatcher = dispatcher(&[(1, 111)], &[], Arc::clone(&outbound));

        dispatcher.dispatch(event(None, &[])).await;

        assert!(outbound.sent().is_empty());
    }
}
