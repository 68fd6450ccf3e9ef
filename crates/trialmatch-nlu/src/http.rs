//! HTTP adapter for a hosted NLU model server.
//!
//! Speaks the model server's JSON contract: POST `{ text, context }`,
//! receive `{ intent, slots }`. Everything the server sends is filtered
//! through the fixed slot enumeration before it can reach a session.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use trialmatch_core::{Intent, SlotKey, SlotValues};

use crate::gateway::{NluError, NluGateway, NluOutcome};

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    text: &'a str,
    context: &'a SlotValues,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    intent: Option<String>,
    #[serde(default)]
    slots: HashMap<String, Option<String>>,
}

/// NLU gateway backed by an HTTP model server.
pub struct HttpNluGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNluGateway {
    /// Create a gateway for the given extract endpoint with a bounded
    /// request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NluGateway for HttpNluGateway {
    async fn extract(
        &self,
        text: &str,
        context: &SlotValues,
    ) -> Result<NluOutcome, NluError> {
        let request = ExtractRequest { text, context };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NluError::Timeout
                } else {
                    NluError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NluError::Status(status.as_u16()));
        }

        let body: ExtractResponse = response
            .json()
            .await
            .map_err(|e| NluError::Decode(e.to_string()))?;

        Ok(outcome_from_wire(body))
    }
}

/// Convert a raw wire response into a sanitized [`NluOutcome`].
///
/// Unknown slot names, null values, and empty strings are dropped here so
/// nothing downstream has to reason about them.
fn outcome_from_wire(body: ExtractResponse) -> NluOutcome {
    let intent = body
        .intent
        .as_deref()
        .map(Intent::parse)
        .unwrap_or_default();

    let mut slots = SlotValues::new();
    for (name, value) in body.slots {
        let Some(key) = SlotKey::parse(&name) else {
            tracing::debug!(slot = %name, "Ignoring unknown slot from model server");
            continue;
        };
        match value {
            Some(v) if !v.trim().is_empty() => {
                slots.insert(key, v.trim().to_string());
            }
            _ => {}
        }
    }

    NluOutcome { intent, slots }
}
