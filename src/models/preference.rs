use std::collections::BTreeMap;

use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

pub const TOKEN_FIELD: &str = "token";
pub const UPDATED_AT_FIELD: &str = "updated_at";

const MIN_SUFFIX: &str = "_min";
const MAX_SUFFIX: &str = "_max";

pub fn min_field(quantity_id: &str) -> String {
    format!("{quantity_id}{MIN_SUFFIX}")
}

pub fn max_field(quantity_id: &str) -> String {
    format!("{quantity_id}{MAX_SUFFIX}")
}

/// Threshold pair for one tracked quantity. Either side may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bound {
    pub fn below_min(&self, value: f64) -> bool {
        self.min.is_some_and(|m| m > value)
    }

    pub fn above_max(&self, value: f64) -> bool {
        self.max.is_some_and(|m| m < value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevicePreference {
    pub device_id: String,
    pub bounds: BTreeMap<String, Bound>,
    pub token: Option<String>,
    pub updated_at: Option<i64>,
}

/// Fields a device sends for one quantity. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceWrite {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub token: Option<String>,
}

fn as_number(v: &Bson) -> Option<f64> {
    match v {
        Bson::Double(f) => Some(*f),
        Bson::Int32(i) => Some(*i as f64),
        Bson::Int64(i) => Some(*i as f64),
        _ => None,
    }
}

impl DevicePreference {
    pub fn bound(&self, quantity_id: &str) -> Option<&Bound> {
        self.bounds.get(quantity_id)
    }

    /// Decodes a flat `prefs` document (`<q>_min`, `<q>_max`, `token`).
    /// Returns `None` when `_id` is not a string.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let device_id = doc.get_str("_id").ok()?.to_string();
        let mut pref = DevicePreference {
            device_id,
            ..Default::default()
        };

        for (key, value) in doc {
            match key.as_str() {
                "_id" => {}
                TOKEN_FIELD => pref.token = value.as_str().map(str::to_string),
                UPDATED_AT_FIELD => {
                    pref.updated_at = match value {
                        Bson::Int64(t) => Some(*t),
                        Bson::Int32(t) => Some(*t as i64),
                        _ => None,
                    }
                }
                _ => {
                    let Some(n) = as_number(value) else { continue };
                    if let Some(q) = key.strip_suffix(MIN_SUFFIX) {
                        pref.bounds.entry(q.to_string()).or_default().min = Some(n);
                    } else if let Some(q) = key.strip_suffix(MAX_SUFFIX) {
                        pref.bounds.entry(q.to_string()).or_default().max = Some(n);
                    }
                }
            }
        }

        Some(pref)
    }
}
