use mongodb::{bson::doc, Database, IndexModel};

use crate::error::AlertError;
use crate::models::preference::{max_field, min_field};

use super::preference_store::{normalize_quantity_id, PREFS_COLLECTION};

/// One ascending index per bound field, so both threshold queries stay
/// index scans.
pub async fn ensure_indexes(db: &Database, tracked: &[String]) -> Result<(), AlertError> {
    let col = db.collection::<mongodb::bson::Document>(PREFS_COLLECTION);

    for q in tracked {
        let q = normalize_quantity_id(q)?;

        for field in [min_field(&q), max_field(&q)] {
            let model = IndexModel::builder().keys(doc! { field: 1 }).build();
            col.create_index(model, None).await?;
        }
    }

    Ok(())
}
