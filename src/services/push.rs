use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::AlertError;
use crate::models::PushMessage;

/// Delivers one notification to one device.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Returns the provider's message id.
    async fn send(&self, msg: &PushMessage) -> Result<String, AlertError>;
}

/// FCM v1 style HTTP sender.
#[derive(Clone)]
pub struct FcmClient {
    http: Client,
    endpoint: String,
    auth_token: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    name: String,
}

impl FcmClient {
    pub fn new(endpoint: String, auth_token: String) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            auth_token,
        }
    }

    fn has_key(&self) -> bool {
        !self.auth_token.trim().is_empty()
    }
}

#[async_trait]
impl PushSender for FcmClient {
    async fn send(&self, msg: &PushMessage) -> Result<String, AlertError> {
        let fail = |reason: String| AlertError::Delivery {
            token: msg.token.clone(),
            reason,
        };

        if !self.has_key() {
            return Err(fail("PUSH_AUTH_TOKEN is missing in .env".to_string()));
        }

        let res = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.auth_token)
            .json(&json!({ "message": msg }))
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(fail(format!("push send failed: {status} {body}")));
        }

        let sent = res
            .json::<SendResponse>()
            .await
            .map_err(|e| fail(e.to_string()))?;
        Ok(sent.name)
    }
}
