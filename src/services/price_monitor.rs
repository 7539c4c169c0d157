use std::time::Duration;

use tokio::time;

use crate::{error::AlertError, models::PriceUpdateEvent, AppState};

pub fn spawn_price_monitor(state: AppState) {
    let secs = state.settings.price_poll_secs;
    if secs == 0 {
        tracing::info!("price monitor disabled (PRICE_POLL_SECS=0)");
        return;
    }

    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(secs));

        loop {
            interval.tick().await;

            if let Err(e) = run_tick(&state).await {
                tracing::error!(error = %e, "price monitor tick failed");
            }
        }
    });
}

/// Fetches prices, saves them, and fires the alert pipeline per quantity.
pub async fn run_tick(state: &AppState) -> Result<(), AlertError> {
    let prices = state
        .price_feed
        .prices(&state.settings.tracked_quantities)
        .await?;

    for (quantity_id, price) in prices {
        let name = quantity_id.to_uppercase();
        let before = state
            .quantities
            .upsert_value(&quantity_id, &name, price)
            .await?;

        tracing::info!("Price of {} = {:.2} USD", quantity_id, price);
        if !state.settings.send_notifications {
            continue;
        }

        let mut event = PriceUpdateEvent::new(quantity_id, price);
        event.name = Some(name);
        event.previous_value = before.map(|b| b.value);

        // one quantity failing must not starve the others
        if let Err(e) = state.trigger.on_price_update(&event).await {
            tracing::error!(error = %e, quantity = %event.quantity_id, "alert invocation failed");
        }
    }

    Ok(())
}
