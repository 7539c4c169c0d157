use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::error::AlertError;
use crate::models::{DispatchOutcome, PriceUpdateEvent};

use super::{
    message_templates::MessageTemplates,
    notification_dispatcher::NotificationDispatcher,
    preference_store::{normalize_quantity_id, PreferenceStore},
    push::PushSender,
    threshold_matcher::ThresholdMatcher,
};

/// Entry point for one value-change event: match, then fan out.
///
/// Holds no per-event state, so invocations may run concurrently and in
/// any order. Redelivering the same event sends the same notifications again.
#[derive(Clone)]
pub struct AlertTrigger {
    matcher: ThresholdMatcher,
    dispatcher: NotificationDispatcher,
    templates: MessageTemplates,
    timeout: Duration,
}

impl AlertTrigger {
    pub fn new(
        matcher: ThresholdMatcher,
        dispatcher: NotificationDispatcher,
        templates: MessageTemplates,
        timeout: Duration,
    ) -> Self {
        Self {
            matcher,
            dispatcher,
            templates,
            timeout,
        }
    }

    pub fn from_parts(
        store: Arc<dyn PreferenceStore>,
        sender: Arc<dyn PushSender>,
        concurrency: usize,
        templates: MessageTemplates,
        timeout: Duration,
    ) -> Self {
        Self::new(
            ThresholdMatcher::new(store),
            NotificationDispatcher::new(sender, concurrency),
            templates,
            timeout,
        )
    }

    /// Store errors and an elapsed deadline are returned to the caller so the
    /// event source can redeliver. Individual send failures are not errors.
    #[tracing::instrument(
        name = "on_price_update",
        skip(self, event),
        fields(quantity = %event.quantity_id, value = event.new_value)
    )]
    pub async fn on_price_update(
        &self,
        event: &PriceUpdateEvent,
    ) -> Result<DispatchOutcome, AlertError> {
        let deadline = Instant::now() + self.timeout;

        let quantity_id = normalize_quantity_id(&event.quantity_id)?;
        if !event.new_value.is_finite() {
            return Err(AlertError::validation("new value must be a finite number"));
        }

        tracing::info!(
            previous = ?event.previous_value,
            "price of {} changed to USD {}",
            quantity_id,
            event.new_value
        );

        let tokens = match timeout_at(
            deadline,
            self.matcher.match_devices(&quantity_id, event.new_value),
        )
        .await
        {
            Ok(res) => res.inspect_err(|e| tracing::error!(error = %e, "matching failed"))?,
            Err(_) => {
                tracing::error!("deadline elapsed while matching devices");
                return Err(AlertError::MatchTimeout);
            }
        };

        tracing::info!("notifying {} device(s)", tokens.len());
        if tokens.is_empty() {
            return Ok(DispatchOutcome::default());
        }

        let notification = self.templates.render(event);
        match self
            .dispatcher
            .dispatch_until(&tokens, &notification, deadline)
            .await
        {
            Ok(outcome) => {
                tracing::info!(
                    succeeded = outcome.succeeded,
                    failed = outcome.failed.len(),
                    "dispatch complete"
                );
                Ok(outcome)
            }
            Err(AlertError::Timeout { outcome, pending }) => {
                tracing::error!(
                    succeeded = outcome.succeeded,
                    failed = outcome.failed.len(),
                    pending,
                    "deadline elapsed during dispatch"
                );
                Err(AlertError::Timeout { outcome, pending })
            }
            Err(e) => Err(e),
        }
    }
}
