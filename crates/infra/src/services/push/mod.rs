mod auth_provider;
mod fcm;
mod inmemory;

pub use auth_provider::{GoogleServiceAccountAuthProvider, IAccessTokenProvider, ServiceAccountKey};
pub use fcm::FcmPushGateway;
pub use inmemory::InMemoryPushGateway;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    /// Device token of the receiver
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct PushReceipt {
    /// Raw response of the push provider, e.g. the created message name
    pub provider_response: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PushError {
    #[error("Unable to acquire access token for push provider. Error message: `{0}`")]
    AuthAcquisitionFailed(String),
    /// Network errors, timeouts, 5xx and expired credentials. Worth retrying.
    #[error("Push provider is temporarily unavailable. Error message: `{0}`")]
    Transient(String),
    /// Invalid device token or malformed request. Retrying will not help.
    #[error("Push provider rejected the message. Error message: `{0}`")]
    Permanent(String),
}

impl PushError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Permanent(_))
    }
}

/// Delivers push notifications to a single device
#[async_trait::async_trait]
pub trait IPushGateway: Send + Sync {
    async fn send(&self, message: &PushMessage) -> Result<PushReceipt, PushError>;
}
