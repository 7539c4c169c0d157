use std::collections::BTreeSet;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tokio::time::{timeout_at, Instant};

use crate::error::AlertError;
use crate::models::{DispatchOutcome, Notification, PushMessage};

use super::push::PushSender;

/// Sends one notification per token, at most `concurrency` in flight.
///
/// Sends are independent and never retried. A failed send is logged and
/// counted, it never fails the fan-out as a whole.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: Arc<dyn PushSender>,
    concurrency: usize,
}

impl NotificationDispatcher {
    pub fn new(sender: Arc<dyn PushSender>, concurrency: usize) -> Self {
        Self {
            sender,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn dispatch(
        &self,
        tokens: &BTreeSet<String>,
        notification: &Notification,
    ) -> DispatchOutcome {
        self.run(tokens, notification, None).await.0
    }

    /// Like `dispatch`, but stops waiting at `deadline`. Sends already issued
    /// are not retracted; the partial outcome travels inside the error.
    pub async fn dispatch_until(
        &self,
        tokens: &BTreeSet<String>,
        notification: &Notification,
        deadline: Instant,
    ) -> Result<DispatchOutcome, AlertError> {
        let (outcome, pending) = self.run(tokens, notification, Some(deadline)).await;
        if pending > 0 {
            return Err(AlertError::Timeout { outcome, pending });
        }
        Ok(outcome)
    }

    async fn run(
        &self,
        tokens: &BTreeSet<String>,
        notification: &Notification,
        deadline: Option<Instant>,
    ) -> (DispatchOutcome, usize) {
        let mut outcome = DispatchOutcome::default();
        if tokens.is_empty() {
            return (outcome, 0);
        }

        let sends = stream::iter(tokens.iter().cloned())
            .map(|token| {
                let sender = Arc::clone(&self.sender);
                let msg = PushMessage {
                    token,
                    notification: notification.clone(),
                };
                async move {
                    let res = sender.send(&msg).await;
                    (msg.token, res)
                }
            })
            .buffer_unordered(self.concurrency);
        tokio::pin!(sends);

        loop {
            let next = match deadline {
                Some(d) => match timeout_at(d, sends.next()).await {
                    Ok(n) => n,
                    Err(_) => break,
                },
                None => sends.next().await,
            };

            let Some((token, res)) = next else { break };
            match res {
                Ok(message_id) => {
                    tracing::debug!(%token, %message_id, "notification sent");
                    outcome.succeeded += 1;
                }
                Err(e) => {
                    tracing::warn!(%token, error = %e, "notification send failed");
                    outcome.failed.push(token);
                }
            }
        }

        let pending = tokens.len() - outcome.attempted();
        (outcome, pending)
    }
}
