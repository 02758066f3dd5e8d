//! Delivery engine - direct messages with retry, backoff and escalation

use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::TransportError;
use crate::domain::entities::{FileUpload, Recipient};
use crate::domain::traits::{Bot, Host};

/// Consecutive transient failures tolerated before the host is restarted
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Fixed wait between attempts
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(10);

/// Retry budget for one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

/// How a single delivery ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// No recipient configured
    Skipped,
    /// Permanent failure, not retried
    Abandoned,
    /// Retry budget exhausted, host restart issued
    Escalated,
}

/// Wraps the session client with the retry/escalation policy.
///
/// Callers never see an error: every failure is logged and absorbed here.
/// Once a host restart has been issued the engine stays escalated and every
/// later delivery is dropped.
pub struct DeliveryEngine {
    bot: Arc<dyn Bot>,
    host: Arc<dyn Host>,
    policy: DeliveryPolicy,
    escalated: AtomicBool,
}

impl DeliveryEngine {
    pub fn new(bot: Arc<dyn Bot>, host: Arc<dyn Host>) -> Self {
        Self {
            bot,
            host,
            policy: DeliveryPolicy::default(),
            escalated: AtomicBool::new(false),
        }
    }

    pub fn with_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    /// True after the retry budget ran out and the host restart was issued
    pub fn is_escalated(&self) -> bool {
        self.escalated.load(Ordering::SeqCst)
    }

    /// Send a text message, absorbing every failure.
    pub async fn deliver(&self, recipient: Option<&Recipient>, text: &str) {
        self.send_text(recipient, text).await;
    }

    /// Like [`deliver`](Self::deliver) but reports how the attempt ended.
    pub async fn send_text(&self, recipient: Option<&Recipient>, text: &str) -> DeliveryOutcome {
        let Some(recipient) = recipient else {
            tracing::debug!("No recipient configured, dropping message");
            return DeliveryOutcome::Skipped;
        };
        if self.is_escalated() {
            tracing::warn!("Host restart pending, dropping message to {}", recipient);
            return DeliveryOutcome::Escalated;
        }

        self.with_retry(recipient, "message", move || self.bot.send_message(recipient, text))
            .await
    }

    /// Upload a file, showing the matching chat action first.
    pub async fn deliver_file(&self, recipient: Option<&Recipient>, upload: &FileUpload) -> DeliveryOutcome {
        let Some(recipient) = recipient else {
            tracing::debug!("No recipient configured, dropping file {}", upload.path.display());
            return DeliveryOutcome::Skipped;
        };
        if self.is_escalated() {
            tracing::warn!("Host restart pending, dropping file {}", upload.path.display());
            return DeliveryOutcome::Escalated;
        }

        if let Err(e) = self.bot.send_chat_action(recipient, upload.kind.chat_action()).await {
            tracing::debug!("Chat action failed for {}: {}", recipient, e);
        }

        let what = format!("file {}", upload.file_name());
        self.with_retry(recipient, &what, move || self.bot.send_file(recipient, upload))
            .await
    }

    /// Send the monitor's log file, or explain why there is none.
    pub async fn deliver_log_file(&self, recipient: Option<&Recipient>, log_path: Option<&Path>) -> DeliveryOutcome {
        match log_path {
            Some(path) => {
                let upload = FileUpload::document(path).with_caption("Here's the log file!");
                self.deliver_file(recipient, &upload).await
            }
            None => {
                self.send_text(recipient, "Can't send the log file because there isn't one!")
                    .await
            }
        }
    }

    async fn with_retry<F, Fut>(&self, recipient: &Recipient, what: &str, mut attempt_send: F) -> DeliveryOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, TransportError>>,
    {
        let mut failures: u32 = 0;

        loop {
            if failures > 0 && self.is_escalated() {
                return DeliveryOutcome::Escalated;
            }
            tracing::debug!("Sending {} to {} (attempt {})", what, recipient, failures + 1);

            match attempt_send().await {
                Ok(_) => {
                    tracing::debug!("Delivered {} to {}", what, recipient);
                    return DeliveryOutcome::Delivered;
                }
                Err(TransportError::Unresolvable(reason)) => {
                    tracing::warn!("Skipping {}; unable to resolve '{}': {}", what, recipient, reason);
                    return DeliveryOutcome::Abandoned;
                }
                Err(e) if e.is_transient() => {
                    failures += 1;
                    if failures >= self.policy.max_attempts {
                        if self.escalated.swap(true, Ordering::SeqCst) {
                            return DeliveryOutcome::Escalated;
                        }
                        tracing::error!(
                            "Sending {} to {} failed {} times in a row, rebooting the host now",
                            what,
                            recipient,
                            failures
                        );
                        self.host.reboot().await;
                        return DeliveryOutcome::Escalated;
                    }
                    tracing::warn!(
                        "Connection error sending {} to {}, waiting {} seconds to try again: {}",
                        what,
                        recipient,
                        self.policy.backoff.as_secs(),
                        e
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                }
                Err(e) => {
                    tracing::error!("Giving up on {} to {}: {}", what, recipient, e);
                    return DeliveryOutcome::Abandoned;
                }
            }
        }
    }
}
