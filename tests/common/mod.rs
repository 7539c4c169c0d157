#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cryptoalert::error::AlertError;
use cryptoalert::models::{DevicePreference, PreferenceWrite, PushMessage};
use cryptoalert::services::preference_store::PreferenceStore;
use cryptoalert::services::push::PushSender;

/// Push sender that records what it was asked to send.
#[derive(Default)]
pub struct ScriptedSender {
    pub failing: HashSet<String>,
    pub slow: HashSet<String>,
    pub delay: Duration,
    pub sent: Mutex<Vec<PushMessage>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedSender {
    pub fn failing(tokens: &[&str]) -> Self {
        Self {
            failing: tokens.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn sent_tokens(&self) -> Vec<String> {
        let mut v: Vec<String> = self.sent.lock().unwrap().iter().map(|m| m.token.clone()).collect();
        v.sort();
        v
    }
}

#[async_trait]
impl PushSender for ScriptedSender {
    async fn send(&self, msg: &PushMessage) -> Result<String, AlertError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.slow.contains(&msg.token) {
            tokio::time::sleep(Duration::from_secs(10)).await;
        } else if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(msg.clone());

        if self.failing.contains(&msg.token) {
            return Err(AlertError::Delivery {
                token: msg.token.clone(),
                reason: "unregistered".to_string(),
            });
        }
        Ok(format!("projects/test/messages/{}", msg.token))
    }
}

/// Store whose reads always fail.
pub struct DownStore;

#[async_trait]
impl PreferenceStore for DownStore {
    async fn write(
        &self,
        _device_id: &str,
        _quantity_id: &str,
        _update: &PreferenceWrite,
    ) -> Result<DevicePreference, AlertError> {
        Err(AlertError::StoreUnavailable("connection refused".into()))
    }

    async fn get(&self, _device_id: &str) -> Result<Option<DevicePreference>, AlertError> {
        Err(AlertError::StoreUnavailable("connection refused".into()))
    }

    async fn query_below_min(
        &self,
        _quantity_id: &str,
        _value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError> {
        Err(AlertError::StoreUnavailable("connection refused".into()))
    }

    async fn query_above_max(
        &self,
        _quantity_id: &str,
        _value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError> {
        Ok(vec![])
    }

    async fn ping(&self) -> Result<(), AlertError> {
        Err(AlertError::StoreUnavailable("connection refused".into()))
    }
}

/// Store whose threshold queries take longer than any test deadline.
pub struct SlowStore;

#[async_trait]
impl PreferenceStore for SlowStore {
    async fn write(
        &self,
        _device_id: &str,
        _quantity_id: &str,
        _update: &PreferenceWrite,
    ) -> Result<DevicePreference, AlertError> {
        Err(AlertError::StoreUnavailable("read only".into()))
    }

    async fn get(&self, _device_id: &str) -> Result<Option<DevicePreference>, AlertError> {
        Ok(None)
    }

    async fn query_below_min(
        &self,
        _quantity_id: &str,
        _value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(vec![])
    }

    async fn query_above_max(
        &self,
        _quantity_id: &str,
        _value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(vec![])
    }

    async fn ping(&self) -> Result<(), AlertError> {
        Ok(())
    }
}

/// Store that returns the same record from both threshold queries, as can
/// happen when a bound changes between the two reads.
pub struct RacyStore {
    pub pref: DevicePreference,
}

#[async_trait]
impl PreferenceStore for RacyStore {
    async fn write(
        &self,
        _device_id: &str,
        _quantity_id: &str,
        _update: &PreferenceWrite,
    ) -> Result<DevicePreference, AlertError> {
        Ok(self.pref.clone())
    }

    async fn get(&self, _device_id: &str) -> Result<Option<DevicePreference>, AlertError> {
        Ok(Some(self.pref.clone()))
    }

    async fn query_below_min(
        &self,
        _quantity_id: &str,
        _value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError> {
        Ok(vec![self.pref.clone()])
    }

    async fn query_above_max(
        &self,
        _quantity_id: &str,
        _value: f64,
    ) -> Result<Vec<DevicePreference>, AlertError> {
        Ok(vec![self.pref.clone()])
    }

    async fn ping(&self) -> Result<(), AlertError> {
        Ok(())
    }
}

pub fn bounds(min: Option<f64>, max: Option<f64>, token: &str) -> PreferenceWrite {
    PreferenceWrite {
        min,
        max,
        token: Some(token.to_string()),
    }
}

pub fn tokens(n: usize) -> std::collections::BTreeSet<String> {
    (0..n).map(|i| format!("token{i:02}")).collect()
}

