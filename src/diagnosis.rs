use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct DiagnoseRequest {
    message: String,
}

#[derive(Deserialize)]
struct DiagnoseResponse {
    response: String,
}

/// HTTP client for the diagnosis service.
///
/// The service is an opaque endpoint: one POST in, one text recommendation
/// out. Callers treat every failure mode (connect error, non-2xx, bad JSON)
/// the same way, so everything is folded into a single `Result<String>`.
#[derive(Clone)]
pub struct DiagnoseClient {
    client: Client,
    base_url: String,
}

impl DiagnoseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn diagnose(&self, message: &str) -> Result<String> {
        let url = format!("{}/api/diagnose", self.base_url);

        let request = DiagnoseRequest {
            message: message.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "diagnosis request failed with status: {}",
                response.status()
            ));
        }

        let body: DiagnoseResponse = response.json().await?;
        Ok(body.response)
    }
}
