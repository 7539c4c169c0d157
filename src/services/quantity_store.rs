use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use tokio::sync::RwLock;

use crate::error::AlertError;
use crate::models::TrackedQuantity;

pub const PRICES_COLLECTION: &str = "prices";

/// Latest values of tracked quantities, one record per quantity id.
#[async_trait]
pub trait QuantityStore: Send + Sync {
    /// Merges `name`/`value` into the record and returns what was there before.
    async fn upsert_value(
        &self,
        quantity_id: &str,
        name: &str,
        value: f64,
    ) -> Result<Option<TrackedQuantity>, AlertError>;

    async fn list(&self) -> Result<Vec<TrackedQuantity>, AlertError>;
}

#[derive(Clone)]
pub struct MongoQuantityStore {
    db: Database,
}

impl MongoQuantityStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuantityStore for MongoQuantityStore {
    async fn upsert_value(
        &self,
        quantity_id: &str,
        name: &str,
        value: f64,
    ) -> Result<Option<TrackedQuantity>, AlertError> {
        let prices = self.db.collection::<TrackedQuantity>(PRICES_COLLECTION);
        let opts = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build();

        let before = prices
            .find_one_and_update(
                doc! { "_id": quantity_id },
                doc! { "$set": { "name": name, "value": value, "updated_at": Utc::now().timestamp() } },
                opts,
            )
            .await?;

        Ok(before)
    }

    async fn list(&self) -> Result<Vec<TrackedQuantity>, AlertError> {
        let prices = self.db.collection::<TrackedQuantity>(PRICES_COLLECTION);
        let find_opts = FindOptions::builder().sort(doc! { "_id": 1 }).build();

        let mut cursor = prices.find(doc! {}, find_opts).await?;

        let mut items = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?);
        }
        Ok(items)
    }
}

#[derive(Default)]
pub struct MemoryQuantityStore {
    records: RwLock<BTreeMap<String, TrackedQuantity>>,
}

impl MemoryQuantityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuantityStore for MemoryQuantityStore {
    async fn upsert_value(
        &self,
        quantity_id: &str,
        name: &str,
        value: f64,
    ) -> Result<Option<TrackedQuantity>, AlertError> {
        let next = TrackedQuantity {
            id: quantity_id.to_string(),
            name: name.to_string(),
            value,
            updated_at: Some(Utc::now().timestamp()),
        };
        Ok(self
            .records
            .write()
            .await
            .insert(quantity_id.to_string(), next))
    }

    async fn list(&self) -> Result<Vec<TrackedQuantity>, AlertError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
