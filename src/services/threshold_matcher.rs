use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::AlertError;
use crate::models::DevicePreference;

use super::preference_store::PreferenceStore;

/// Finds the devices whose band a new value falls outside of.
///
/// Stateless: every call compares the current bounds against the new value,
/// so a value that stays out of band matches again on every update.
#[derive(Clone)]
pub struct ThresholdMatcher {
    store: Arc<dyn PreferenceStore>,
}

impl ThresholdMatcher {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Delivery tokens of every device with `min > value` or `max < value`.
    /// Records without a token are dropped; each token appears once.
    pub async fn match_devices(
        &self,
        quantity_id: &str,
        new_value: f64,
    ) -> Result<BTreeSet<String>, AlertError> {
        let (below, above) = tokio::try_join!(
            self.store.query_below_min(quantity_id, new_value),
            self.store.query_above_max(quantity_id, new_value),
        )?;

        Ok(collect_tokens(below.into_iter().chain(above)))
    }
}

fn collect_tokens(prefs: impl Iterator<Item = DevicePreference>) -> BTreeSet<String> {
    prefs.filter_map(|p| p.token).collect()
}
