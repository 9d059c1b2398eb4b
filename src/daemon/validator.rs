//! Push notification payload and its validation against the registry.

use super::errors::ValidationError;
use super::repo_config::{Registry, RepoCfg};
use serde::Deserialize;
use serde_json::Value;

/// The part of a push notification we read. Everything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PushNotification {
    pub repository: Option<PushRepository>,
    /// Only read for logging, so any shape is accepted.
    pub pusher: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PushRepository {
    pub url: Option<String>,
}

impl PushNotification {
    pub fn repository_url(&self) -> Option<&str> {
        self.repository.as_ref()?.url.as_deref()
    }

    pub fn pusher_name(&self) -> Option<String> {
        match self.pusher.as_ref()?.get("name")? {
            Value::Null => None,
            Value::String(name) => Some(name.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Checks the payload names a repository and that the repository is configured.
/// The pusher is only used for logging and is not checked.
pub fn validate<'a>(
    payload: &PushNotification,
    registry: &'a Registry,
) -> Result<&'a RepoCfg, ValidationError> {
    let url = payload
        .repository_url()
        .ok_or(ValidationError::MalformedPayload)?;

    registry
        .get(url)
        .ok_or_else(|| ValidationError::UnconfiguredRepository { url: url.to_string() })
}
