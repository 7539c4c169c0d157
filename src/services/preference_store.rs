use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::UpdateOptions;
use mongodb::Database;
use regex::Regex;
use tokio::sync::RwLock;

use crate::error::AlertError;
use crate::models::preference::{max_field, min_field, TOKEN_FIELD, UPDATED_AT_FIELD};
use crate::models::{Bound, DevicePreference, PreferenceWrite};

pub const PREFS_COLLECTION: &str = "prefs";

// Quantity ids become field-name prefixes, so no '.', '$' or '_'.
static QUANTITY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{0,31}$").expect("quantity id regex"));

/// Normalizes and checks a quantity id.
pub fn normalize_quantity_id(quantity_id: &str) -> Result<String, AlertError> {
    let q = quantity_id.trim().to_lowercase();
    if !QUANTITY_ID.is_match(&q) {
        return Err(AlertError::validation(format!(
            "invalid quantity id {quantity_id:?}"
        )));
    }
    Ok(q)
}

/// A write that passed validation. Only these fields get merged.
#[derive(Debug, Clone)]
pub struct ValidatedWrite {
    pub device_id: String,
    pub quantity_id: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub token: Option<String>,
}

pub fn validate_write(
    device_id: &str,
    quantity_id: &str,
    update: &PreferenceWrite,
) -> Result<ValidatedWrite, AlertError> {
    let device_id = device_id.trim();
    if device_id.is_empty() {
        return Err(AlertError::validation("device id is required"));
    }

    let quantity_id = normalize_quantity_id(quantity_id)?;

    for (name, v) in [("min", update.min), ("max", update.max)] {
        if v.is_some_and(|x| !x.is_finite()) {
            return Err(AlertError::validation(format!("{name} must be a finite number")));
        }
    }

    if let (Some(min), Some(max)) = (update.min, update.max) {
        if min >= max {
            return Err(AlertError::validation("max must be greater than min"));
        }
    }

    let token = match update.token.as_deref().map(str::trim) {
        Some("") => return Err(AlertError::validation("token must not be empty")),
        Some(t) => Some(t.to_string()),
        None => None,
    };

    Ok(ValidatedWrite {
        device_id: device_id.to_string(),
        quantity_id,
        min: update.min,
        max: update.max,
        token,
    })
}

/// Folds a write into the stored bound and checks `min < max` on the result.
pub fn merge_bound(existing: Option<&Bound>, w: &ValidatedWrite) -> Result<Bound, AlertError> {
    let mut bound = existing.copied().unwrap_or_default();
    if w.min.is_some() {
        bound.min = w.min;
    }
    if w.max.is_some() {
        bound.max = w.max;
    }

    if let (Some(min), Some(max)) = (bound.min, bound.max) {
        if min >= max {
            return Err(AlertError::validation("max must be greater than min"));
        }
    }
    Ok(bound)
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Validates and merges one quantity's bound (and the token) into the
    /// device record. Nothing is written when validation fails.
    async fn write(
        &self,
        device_id: &str,
        quantity_id: &str,
        update: &PreferenceWrite,
    ) -> Result<DevicePreference, AlertError>;

    async fn get(&self, device_id: &str) -> Result<Option<DevicePreference>, AlertError>;

    /// Records with `bounds[quantity_id].min > value`.
    async fn query_below_min(
        &self,
        quantity_id: &str,
        value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError>;

    /// Records with `bounds[quantity_id].max < value`.
    async fn query_above_max(
        &self,
        quantity_id: &str,
        value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError>;

    async fn ping(&self) -> Result<(), AlertError>;
}

// ---------------- MongoDB ----------------

#[derive(Clone)]
pub struct MongoPreferenceStore {
    db: Database,
}

impl MongoPreferenceStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn prefs(&self) -> mongodb::Collection<Document> {
        self.db.collection::<Document>(PREFS_COLLECTION)
    }

    async fn find_prefs(&self, filter: Document) -> Result<Vec<DevicePreference>, AlertError> {
        let mut cursor = self.prefs().find(filter, None).await?;

        let mut items = Vec::new();
        while let Some(res) = cursor.next().await {
            let d = res?;
            match DevicePreference::from_document(&d) {
                Some(p) => items.push(p),
                None => tracing::warn!("skipping prefs document with non-string _id"),
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl PreferenceStore for MongoPreferenceStore {
    async fn write(
        &self,
        device_id: &str,
        quantity_id: &str,
        update: &PreferenceWrite,
    ) -> Result<DevicePreference, AlertError> {
        let w = validate_write(device_id, quantity_id, update)?;

        let mut set = doc! { UPDATED_AT_FIELD: Utc::now().timestamp() };
        if let Some(min) = w.min {
            set.insert(min_field(&w.quantity_id), min);
        }
        if let Some(max) = w.max {
            set.insert(max_field(&w.quantity_id), max);
        }
        if let Some(token) = &w.token {
            set.insert(TOKEN_FIELD, token.as_str());
        }

        // A one-sided write only applies if the stored other side still
        // leaves min < max; the check and the write are one operation.
        let mut filter = doc! { "_id": &w.device_id };
        match (w.min, w.max) {
            (Some(min), None) => {
                filter.insert(max_field(&w.quantity_id), doc! { "$not": { "$lte": min } });
            }
            (None, Some(max)) => {
                filter.insert(min_field(&w.quantity_id), doc! { "$not": { "$gte": max } });
            }
            _ => {}
        }

        let res = self
            .prefs()
            .update_one(
                filter,
                doc! { "$set": set },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await;

        match res {
            // the record exists but its other side conflicts, so the upsert
            // tried to insert a second document with the same _id
            Err(e) if is_duplicate_key(&e) => {
                return Err(AlertError::validation("max must be greater than min"));
            }
            Err(e) => return Err(e.into()),
            Ok(_) => {}
        }

        self.get(&w.device_id).await?.ok_or_else(|| {
            AlertError::StoreUnavailable(format!("record {} missing after write", w.device_id))
        })
    }

    async fn get(&self, device_id: &str) -> Result<Option<DevicePreference>, AlertError> {
        let found = self
            .prefs()
            .find_one(doc! { "_id": device_id.trim() }, None)
            .await?;
        Ok(found.as_ref().and_then(DevicePreference::from_document))
    }

    async fn query_below_min(
        &self,
        quantity_id: &str,
        value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError> {
        self.find_prefs(doc! { min_field(quantity_id): { "$gt": value } })
            .await
    }

    async fn query_above_max(
        &self,
        quantity_id: &str,
        value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError> {
        self.find_prefs(doc! { max_field(quantity_id): { "$lt": value } })
            .await
    }

    async fn ping(&self) -> Result<(), AlertError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

// ---------------- In-memory ----------------

#[derive(Default)]
pub struct MemoryPreferenceStore {
    records: RwLock<HashMap<String, DevicePreference>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filter(&self, pred: impl Fn(&DevicePreference) -> bool) -> Vec<DevicePreference> {
        let records = self.records.read().await;
        let mut items: Vec<DevicePreference> =
            records.values().filter(|p| pred(p)).cloned().collect();
        items.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        items
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn write(
        &self,
        device_id: &str,
        quantity_id: &str,
        update: &PreferenceWrite,
    ) -> Result<DevicePreference, AlertError> {
        let w = validate_write(device_id, quantity_id, update)?;

        let mut records = self.records.write().await;
        let existing = records
            .get(&w.device_id)
            .and_then(|p| p.bound(&w.quantity_id));
        let bound = merge_bound(existing, &w)?;

        let pref = records
            .entry(w.device_id.clone())
            .or_insert_with(|| DevicePreference {
                device_id: w.device_id.clone(),
                ..Default::default()
            });

        pref.bounds.insert(w.quantity_id.clone(), bound);
        if w.token.is_some() {
            pref.token = w.token;
        }
        pref.updated_at = Some(Utc::now().timestamp());

        Ok(pref.clone())
    }

    async fn get(&self, device_id: &str) -> Result<Option<DevicePreference>, AlertError> {
        Ok(self.records.read().await.get(device_id.trim()).cloned())
    }

    async fn query_below_min(
        &self,
        quantity_id: &str,
        value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError> {
        Ok(self
            .filter(|p| p.bound(quantity_id).is_some_and(|b| b.below_min(value)))
            .await)
    }

    async fn query_above_max(
        &self,
        quantity_id: &str,
        value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError> {
        Ok(self
            .filter(|p| p.bound(quantity_id).is_some_and(|b| b.above_max(value)))
            .await)
    }

    async fn ping(&self) -> Result<(), AlertError> {
        Ok(())
    }
}
