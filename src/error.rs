//! Error types for the alert pipeline.
//!
//! Store failures are fatal to an invocation, delivery failures are
//! per-token and only ever show up inside a `DispatchOutcome`.

use thiserror::Error;

use crate::models::DispatchOutcome;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("invalid preference: {0}")]
    Validation(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("delivery to {token} failed: {reason}")]
    Delivery { token: String, reason: String },

    #[error("invocation deadline elapsed ({pending} send(s) outstanding)")]
    Timeout {
        outcome: DispatchOutcome,
        pending: usize,
    },

    #[error("invocation deadline elapsed before devices were matched")]
    MatchTimeout,

    #[error("price feed: {0}")]
    PriceFeed(String),
}

impl AlertError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<mongodb::error::Error> for AlertError {
    fn from(e: mongodb::error::Error) -> Self {
        Self::StoreUnavailable(e.to_string())
    }
}
