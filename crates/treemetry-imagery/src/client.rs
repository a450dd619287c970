use std::fs;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::warn;

use crate::wire::{BatchComputeRequest, BatchComputeResponse, DEFAULT_SCALE_M};
use crate::{BatchResults, ImageryClient, ImageryConfig, ImageryError, Point, TimeWindow};

const RETRY_BASE_DELAY_MS: u64 = 500;

/// Operator-provisioned credentials artifact. Only the bearer token is read;
/// refresh is out of scope for this client.
#[derive(Debug, Deserialize)]
struct Credentials {
    token: String,
}

/// HTTP client for the Earth Engine batch compute endpoint.
///
/// All service configuration is taken at construction; nothing is read from
/// the environment mid-pipeline.
#[derive(Debug)]
pub struct EarthEngineClient {
    http: reqwest::Client,
    endpoint: String,
    project: String,
    token: String,
    max_attempts: u32,
}

impl EarthEngineClient {
    pub fn new(config: ImageryConfig) -> Result<Self, ImageryError> {
        if config.project.is_empty() {
            return Err(ImageryError::Configuration(
                "imagery project id cannot be empty".into(),
            ));
        }
        if config.max_attempts == 0 {
            return Err(ImageryError::Configuration(
                "max_attempts must be at least 1".into(),
            ));
        }

        let raw = fs::read_to_string(&config.credentials_path).map_err(|err| {
            ImageryError::Configuration(format!(
                "failed to read credentials at {}: {err}",
                config.credentials_path.display()
            ))
        })?;
        let credentials: Credentials = serde_json::from_str(&raw).map_err(|err| {
            ImageryError::Configuration(format!(
                "failed to parse credentials at {}: {err}",
                config.credentials_path.display()
            ))
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| {
                ImageryError::Configuration(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project: config.project,
            token: credentials.token,
            max_attempts: config.max_attempts,
        })
    }

    fn compute_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/treeMetrics:batchCompute",
            self.endpoint, self.project
        )
    }

    /// One request/response round trip for a whole batch. Errors here apply
    /// to every point in the batch.
    async fn compute_once(
        &self,
        points: &[Point],
        window: TimeWindow,
    ) -> Result<BatchComputeResponse, ImageryError> {
        let request = BatchComputeRequest {
            points,
            window,
            scale_m: DEFAULT_SCALE_M,
        };

        let response = self
            .http
            .post(self.compute_url())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|err| ImageryError::ServiceUnavailable {
                status: None,
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let summary: String = body.chars().take(200).collect();
            return Err(ImageryError::ServiceUnavailable {
                status: Some(status.as_u16()),
                message: format!("{status}: {summary}"),
            });
        }

        let parsed: BatchComputeResponse = response
            .json()
            .await
            .map_err(|err| ImageryError::Response(err.to_string()))?;

        if parsed.results.len() != points.len() {
            return Err(ImageryError::Response(format!(
                "expected {} result slots, got {}",
                points.len(),
                parsed.results.len()
            )));
        }

        Ok(parsed)
    }

    async fn compute_with_retry(
        &self,
        points: &[Point],
        window: TimeWindow,
    ) -> Result<BatchComputeResponse, ImageryError> {
        let mut attempt = 1;
        loop {
            match self.compute_once(points, window).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_transient() && !auth_failed(&err) && attempt < self.max_attempts => {
                    let delay = Duration::from_millis(RETRY_BASE_DELAY_MS << (attempt - 1));
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "imagery batch failed, retrying: {err}"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Credentials do not heal between attempts, so 401/403 is not worth a retry
/// even though it surfaces as a service-unavailable error.
fn auth_failed(err: &ImageryError) -> bool {
    match err {
        ImageryError::ServiceUnavailable {
            status: Some(code), ..
        } => {
            *code == StatusCode::UNAUTHORIZED.as_u16() || *code == StatusCode::FORBIDDEN.as_u16()
        }
        _ => false,
    }
}


#[async_trait]
impl ImageryClient for EarthEngineClient {
    async fn fetch_batch(&self, points: &[Point], window: TimeWindow) -> BatchResults {
        if points.is_empty() {
            return Vec::new();
        }

        match self.compute_with_retry(points, window).await {
            Ok(response) => response
                .results
                .into_iter()
                .zip(points.iter())
                .map(|(outcome, point)| outcome.into_result(*point, window))
                .collect(),
            Err(err) => points.iter().map(|_| Err(err.clone())).collect(),
        }
    }
}
