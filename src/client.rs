// src/client.rs
//! HTTP client for the relay server - health probe and document conversion

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::document::AnnotatedDocument;

const HEALTH_ENDPOINT: &str = "/health";
const CONVERT_ENDPOINT: &str = "/convert";

const DEFAULT_TIMEOUT_SECS: u64 = 400;

#[derive(Debug, Deserialize)]
struct HealthPayload {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
}

pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Liveness probe. True only for an HTTP success whose body reports
    /// `status == "ok"`; every network or parse failure reads as unhealthy.
    pub async fn check_health(&self) -> bool {
        let url = format!("{}{}", self.base_url, HEALTH_ENDPOINT);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Health check error: {}", e);
                return false;
            }
        };

        if !response.status().is_success() {
            warn!("Health check failed with status: {}", response.status());
            return false;
        }

        match response.json::<HealthPayload>().await {
            Ok(payload) => payload.status == "ok",
            Err(e) => {
                warn!("Health check returned unparseable body: {}", e);
                false
            }
        }
    }

    /// Submit the annotated document plus job metadata as a multipart request,
    /// returning the converted PDF bytes.
    pub async fn convert(
        &self,
        document: &AnnotatedDocument,
        username: &str,
        company: &str,
        job_role: &str,
    ) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, CONVERT_ENDPOINT);

        let form = Form::new()
            .part(
                "file",
                Part::bytes(document.content.clone().into_bytes())
                    .file_name(document.name.clone())
                    .mime_str(document.media_type)
                    .context("Failed to create multipart")?,
            )
            .text("username", username.to_string())
            .text("company", company.to_string())
            .text("jobRole", job_role.to_string());

        info!("Calling conversion service: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/pdf, application/json")
            .multipart(form)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Conversion service error response: {}", error_text);

            match serde_json::from_str::<ErrorPayload>(&error_text) {
                Ok(payload) => anyhow::bail!("{}", payload.error),
                Err(_) => anyhow::bail!("Server Error ({})", status.as_u16()),
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.contains("application/pdf") {
            anyhow::bail!("Invalid response format from server");
        }

        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        if body.is_empty() {
            anyhow::bail!("Received empty PDF file");
        }

        Ok(body.to_vec())
    }
}
