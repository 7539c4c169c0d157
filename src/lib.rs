//! Library entrypoint for cryptoalert.
//!
//! Device threshold preferences, the per-event matching query, and the
//! bounded push fan-out. The binary wires these to MongoDB, an HTTP
//! surface and the price poller; integration tests under `tests/` use the
//! in-memory backends instead.

pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod controllers;
pub mod routes;

use std::sync::Arc;

use services::{
    alert_trigger::AlertTrigger, preference_store::PreferenceStore, price_feed::PriceFeed,
    quantity_store::QuantityStore,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub prefs: Arc<dyn PreferenceStore>,
    pub quantities: Arc<dyn QuantityStore>,
    pub trigger: AlertTrigger,
    pub price_feed: PriceFeed,
}
