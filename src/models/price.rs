use serde::{Deserialize, Serialize};

/// Stored value of a tracked quantity (one `prices` document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedQuantity {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,
    pub value: f64,

    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// One side of a "document updated" event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitySnapshot {
    #[serde(default)]
    pub name: Option<String>,
    pub value: f64,
}

/// Body delivered by the event substrate when a tracked quantity changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityUpdatedEvent {
    pub quantity_id: String,
    #[serde(default)]
    pub before: Option<QuantitySnapshot>,
    pub after: QuantitySnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdateEvent {
    pub quantity_id: String,
    pub name: Option<String>,
    pub new_value: f64,
    // observability only
    pub previous_value: Option<f64>,
    pub timestamp: i64,
}

impl PriceUpdateEvent {
    pub fn new(quantity_id: impl Into<String>, new_value: f64) -> Self {
        Self {
            quantity_id: quantity_id.into(),
            name: None,
            new_value,
            previous_value: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.quantity_id)
    }
}

impl From<QuantityUpdatedEvent> for PriceUpdateEvent {
    fn from(e: QuantityUpdatedEvent) -> Self {
        Self {
            quantity_id: e.quantity_id.trim().to_lowercase(),
            name: e.after.name,
            new_value: e.after.value,
            previous_value: e.before.map(|b| b.value),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}
