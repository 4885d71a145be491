use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::models::{DeviceId, Rule, StatusResponse};

const FORBIDDEN: u16 = 403;

/// Outcome of one backend call, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// `true` for 2xx answers
    pub ok: bool,
    /// HTTP status, absent when the request never completed
    pub status_code: Option<u16>,
    /// Reason phrase, or the transport failure message
    pub status_text: String,
    /// Raw response body
    pub body: String,
    /// When the outcome was observed
    pub timestamp: OffsetDateTime,
}

impl ApiResponse {
    pub fn completed(status_code: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            ok: (200..300).contains(&status_code),
            status_code: Some(status_code),
            status_text: status_text.into(),
            body: body.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            status_code: None,
            status_text: message.into(),
            body: String::new(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Maps the envelope onto the error taxonomy; 403 wins over everything else.
    pub fn check(&self) -> Result<(), ApiError> {
        match self.status_code {
            Some(FORBIDDEN) => Err(ApiError::Unauthenticated),
            _ if self.ok => Ok(()),
            None => Err(ApiError::Transport(self.status_text.clone())),
            Some(status_code) => Err(ApiError::Rejected {
                status_code,
                status_text: self.status_text.clone(),
                body: self.body.clone(),
            }),
        }
    }
}

/// Result of `fetch_state`: the envelope plus the decoded payload when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEnvelope {
    pub response: ApiResponse,
    pub state: Option<StatusResponse>,
}

impl StateEnvelope {
    pub fn failed(response: ApiResponse) -> Self {
        Self {
            response,
            state: None,
        }
    }

    pub fn into_result(self) -> Result<(ApiResponse, StatusResponse), ApiError> {
        self.response.check()?;
        match self.state {
            Some(state) => Ok((self.response, state)),
            None => Err(ApiError::Transport(format!(
                "missing status payload: {}",
                self.response.status_text
            ))),
        }
    }
}

/// Backend seam consumed by the panel. Implementations report every failure
/// through the envelope instead of an error value.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Devices, their status and the rule list
    async fn fetch_state(&self) -> StateEnvelope;

    /// Switch devices on or off
    async fn push_device_state(&self, state: &BTreeMap<DeviceId, bool>) -> ApiResponse;

    /// Replace the whole rule list
    async fn push_rules(&self, rules: &[Rule]) -> ApiResponse;
}

#[async_trait]
impl<T: Gateway + ?Sized> Gateway for Arc<T> {
    async fn fetch_state(&self) -> StateEnvelope {
        (**self).fetch_state().await
    }

    async fn push_device_state(&self, state: &BTreeMap<DeviceId, bool>) -> ApiResponse {
        (**self).push_device_state(state).await
    }

    async fn push_rules(&self, rules: &[Rule]) -> ApiResponse {
        (**self).push_rules(rules).await
    }
}
