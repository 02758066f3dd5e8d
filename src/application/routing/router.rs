//! Topic router
//!
//! Posts a message into the forum thread registered for a topic key, and
//! falls back to a direct message whenever that is not possible. The
//! boolean result only says whether the forum thread received the message.

use std::sync::Arc;

use crate::application::delivery::DeliveryEngine;
use crate::domain::entities::{GroupDestination, Recipient, TopicRegistry};
use crate::domain::traits::TopicChannel;

pub struct TopicRouter {
    channel: Arc<dyn TopicChannel>,
    engine: Arc<DeliveryEngine>,
    registry: Arc<TopicRegistry>,
    group: Option<GroupDestination>,
    recipient: Option<Recipient>,
}

impl TopicRouter {
    pub fn new(
        channel: Arc<dyn TopicChannel>,
        engine: Arc<DeliveryEngine>,
        registry: Arc<TopicRegistry>,
    ) -> Self {
        Self {
            channel,
            engine,
            registry,
            group: None,
            recipient: None,
        }
    }

    pub fn with_group(mut self, group: Option<GroupDestination>) -> Self {
        self.group = group;
        self
    }

    /// Fallback destination for direct messages
    pub fn with_recipient(mut self, recipient: Option<Recipient>) -> Self {
        self.recipient = recipient;
        self
    }

    /// Deliver `text` to the topic's thread, or to the recipient if that fails.
    ///
    /// Makes at most one HTTP attempt. Returns `true` only when the thread
    /// accepted the message.
    pub async fn route(&self, topic_key: &str, text: &str) -> bool {
        if self.post_to_topic(topic_key, text).await {
            return true;
        }

        self.engine.deliver(self.recipient.as_ref(), text).await;
        false
    }

    async fn post_to_topic(&self, topic_key: &str, text: &str) -> bool {
        if self.engine.is_escalated() {
            tracing::warn!("Host restart pending, not posting to topic '{}'", topic_key);
            return false;
        }
        let Some(group) = &self.group else {
            tracing::debug!("No group configured, sending '{}' as direct message", topic_key);
            return false;
        };
        let Some(thread_id) = self.registry.thread_id(topic_key) else {
            tracing::debug!("No topic registered for '{}', sending as direct message", topic_key);
            return false;
        };
        if thread_id <= 0 {
            tracing::warn!(
                "Configured topic id {} for '{}' is invalid; falling back to DM",
                thread_id,
                topic_key
            );
            return false;
        }

        // Posted from its own task; the outcome decides the fallback.
        let channel = Arc::clone(&self.channel);
        let group = group.clone();
        let payload = text.to_string();
        let task = tokio::spawn(async move {
            channel.post_to_thread(&group, thread_id, &payload).await
        });

        match task.await {
            Ok(Ok(())) => {
                tracing::info!("Sent message to topic '{}' (thread {})", topic_key, thread_id);
                true
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to send to topic '{}': {}", topic_key, e);
                false
            }
            Err(e) => {
                tracing::error!("Topic send task for '{}' did not complete: {}", topic_key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, connection_error, Call, FakeBot, FakeHost, FakeTopicChannel, Journal};

    fn router(journal: &Journal, status: u16, registry: TopicRegistry, group: Option<&str>) -> TopicRouter {
        router_with(journal, FakeBot::new(journal.clone()), status, registry, group)
    }

    fn router_with(
        journal: &Journal,
        bot: FakeBot,
        status: u16,
        registry: TopicRegistry,
        group: Option<&str>,
    ) -> TopicRouter {
        let engine = Arc::new(DeliveryEngine::new(
            Arc::new(bot),
            Arc::new(FakeHost::new(journal.clone())),
        ));
        TopicRouter::new(
            Arc::new(FakeTopicChannel::responding(journal.clone(), status)),
            engine,
            Arc::new(registry),
        )
        .with_group(group.and_then(GroupDestination::parse))
        .with_recipient(Recipient::parse("1001"))
    }

    fn stock_registry() -> TopicRegistry {
        TopicRegistry::from_raw([("stock", "42")])
    }

    #[tokio::test]
    async fn accepted_post_is_delivered_without_direct_message() {
        let journal = Journal::default();
        let router = router(&journal, 200, stock_registry(), Some("-100777"));

        let delivered = router.route("stock", "Item X in stock").await;

        assert!(delivered);
        assert_eq!(
            journal.calls(),
            vec![Call::TopicPost {
                group: "-100777".to_string(),
                thread_id: 42,
                text: "Item X in stock".to_string(),
            }]
        );
        assert!(journal.messages().is_empty());
    }

    #[tokio::test]
    async fn rejected_post_falls_back_to_one_direct_message() {
        let journal = Journal::default();
        let router = router(&journal, 500, stock_registry(), Some("-100777"));
        let (logs, _guard) = capture_logs();

        let delivered = router.route("stock", "Item X in stock").await;

        assert!(!delivered);
        assert_eq!(journal.topic_posts(), 1);
        assert_eq!(
            journal.messages(),
            vec![("1001".to_string(), "Item X in stock".to_string())]
        );
        assert!(logs.contents().contains("Failed to send to topic 'stock'"));
    }

    #[tokio::test]
    async fn unknown_key_falls_back_without_posting() {
        let journal = Journal::default();
        let router = router(&journal, 200, stock_registry(), Some("-100777"));

        assert!(!router.route("appointments", "hello").await);
        assert_eq!(journal.topic_posts(), 0);
        assert_eq!(journal.messages().len(), 1);
    }

    #[tokio::test]
    async fn non_positive_id_behaves_like_missing_key() {
        let journal = Journal::default();
        let registry = TopicRegistry::from_raw([("stock", "0"), ("other", "-3")]);
        let router = router(&journal, 200, registry, Some("-100777"));

        assert!(!router.route("stock", "a").await);
        assert!(!router.route("other", "b").await);
        assert_eq!(journal.topic_posts(), 0);
        assert_eq!(journal.messages().len(), 2);
    }

    #[tokio::test]
    async fn missing_group_skips_topic() {
        let journal = Journal::default();
        let router = router(&journal, 200, stock_registry(), None);

        assert!(!router.route("stock", "hello").await);
        assert_eq!(journal.topic_posts(), 0);
        assert_eq!(journal.messages().len(), 1);
    }

    #[tokio::test]
    async fn repeated_routes_post_once_each() {
        let journal = Journal::default();
        let router = router(&journal, 200, stock_registry(), Some("-100777"));

        assert!(router.route("stock", "same").await);
        assert!(router.route("stock", "same").await);

        assert_eq!(journal.topic_posts(), 2);
        assert!(journal.messages().is_empty());
    }

    #[tokio::test]
    async fn invalid_registered_id_falls_back_without_posting() {
        let journal = Journal::default();
        let registry = TopicRegistry::new().with_unchecked("stock", 0);
        let router = router(&journal, 200, registry, Some("-100777"));
        let (logs, _guard) = capture_logs();

        assert!(!router.route("stock", "hello").await);

        assert_eq!(journal.topic_posts(), 0);
        assert_eq!(journal.messages(), vec![("1001".to_string(), "hello".to_string())]);
        assert!(logs.contents().contains("Configured topic id 0 for 'stock' is invalid"));
    }

    #[tokio::test(start_paused = true)]
    async fn no_topic_posts_after_escalation() {
        let journal = Journal::default();
        let bot = FakeBot::new(journal.clone()).fail_next((0..50).map(|_| connection_error()));
        let router = router_with(&journal, bot, 500, stock_registry(), Some("-100777"));

        assert!(!router.route("stock", "first").await);
        assert_eq!(journal.count(&Call::Reboot), 1);
        let calls_after_reboot = journal.calls().len();

        assert!(!router.route("stock", "second").await);

        assert_eq!(journal.topic_posts(), 1);
        assert_eq!(journal.calls().len(), calls_after_reboot);
    }
}
