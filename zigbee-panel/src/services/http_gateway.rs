use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use zigbee_api::models::{DeviceId, Rule, SetRulesRequest, SetStateRequest, StatusResponse};
use zigbee_api::{ApiResponse, Gateway, StateEnvelope};

use crate::configs::Api;
use crate::errors::StartupError;

/// Talks to the zigbee backend over HTTP.
pub struct HttpGateway {
    client: Client,
    status_url: String,
    set_state_url: String,
    set_rules_url: String,
}

impl HttpGateway {
    pub fn new(api: &Api) -> Result<Self, StartupError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &api.auth_cookie {
            let value = HeaderValue::from_str(&format!("{}={}", cookie.name, cookie.value))
                .map_err(|e| StartupError::Header(e.to_string()))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            status_url: api.endpoint("status.json"),
            set_state_url: api.endpoint("setState"),
            set_rules_url: api.endpoint("setRules"),
        })
    }

    async fn complete(response: Response) -> ApiResponse {
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();

        match response.text().await {
            Ok(body) => ApiResponse::completed(status.as_u16(), status_text, body),
            Err(e) => ApiResponse::transport_failure(format!("failed to read response body: {e}")),
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_state(&self) -> StateEnvelope {
        tracing::debug!("GET {}", self.status_url);

        let response = match self.client.get(&self.status_url).send().await {
            Ok(response) => Self::complete(response).await,
            Err(e) => {
                tracing::error!("Failed to fetch status: {}", e);
                return StateEnvelope::failed(ApiResponse::transport_failure(e.to_string()));
            }
        };

        if !response.ok {
            tracing::warn!("status request answered {:?} {}", response.status_code, response.status_text);
            return StateEnvelope::failed(response);
        }

        match serde_json::from_str::<StatusResponse>(&response.body) {
            Ok(state) => StateEnvelope {
                response,
                state: Some(state),
            },
            Err(e) => {
                tracing::error!("Failed to decode status payload: {}", e);
                StateEnvelope::failed(ApiResponse {
                    ok: false,
                    status_text: format!("malformed payload: {e}"),
                    ..response
                })
            }
        }
    }

    async fn push_device_state(&self, state: &BTreeMap<DeviceId, bool>) -> ApiResponse {
        tracing::debug!("POST {} ({} devices)", self.set_state_url, state.len());

        let request = SetStateRequest { state: state.clone() };
        match self.client.post(&self.set_state_url).json(&request).send().await {
            Ok(response) => Self::complete(response).await,
            Err(e) => {
                tracing::error!("Failed to push device state: {}", e);
                ApiResponse::transport_failure(e.to_string())
            }
        }
    }

    async fn push_rules(&self, rules: &[Rule]) -> ApiResponse {
        tracing::debug!("POST {} ({} rules)", self.set_rules_url, rules.len());

        let request = SetRulesRequest { rules: rules.to_vec() };
        match self.client.post(&self.set_rules_url).json(&request).send().await {
            Ok(response) => Self::complete(response).await,
            Err(e) => {
                tracing::error!("Failed to push rules: {}", e);
                ApiResponse::transport_failure(e.to_string())
            }
        }
    }
}
