//! Boundary crate for the hosted geospatial imagery service that computes
//! canopy metrics for GPS points. Everything network-shaped lives here; the
//! rest of the pipeline only sees [`ImageryClient`].

mod client;
mod wire;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::EarthEngineClient;

/// Default location of the operator-provisioned credentials file. The token
/// inside is obtained out-of-band; this crate only reads it.
pub const DEFAULT_CREDENTIALS_PATH: &str = ".config/treemetry/credentials.json";

const DEFAULT_ENDPOINT: &str = "https://earthengine.googleapis.com";

#[derive(Debug, Clone)]
pub struct ImageryConfig {
    /// Cloud project the imagery requests are billed against.
    pub project: String,
    pub endpoint: String,
    pub credentials_path: PathBuf,
    /// Attempts per batch for transient failures, including the first.
    pub max_attempts: u32,
    pub request_timeout_secs: u64,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            max_attempts: 3,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ImageryError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("imagery service unavailable: {message}")]
    ServiceUnavailable {
        /// HTTP status of the failed request, when one was received at all.
        status: Option<u16>,
        message: String,
    },

    #[error("no suitable imagery for ({latitude}, {longitude}) in window ending {window_end}")]
    NoImagery {
        latitude: f64,
        longitude: f64,
        window_end: NaiveDate,
    },

    #[error("malformed service response: {0}")]
    Response(String),
}

impl ImageryError {
    /// Transient errors are worth another attempt; everything else is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, ImageryError::ServiceUnavailable { .. })
    }
}

/// A bare point on the globe, as the service sees it. The pipeline's richer
/// coordinate records are projected down to this at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

/// Imagery search window. The service picks the most recent usable scene
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    pub fn ending_at(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - chrono::Duration::days(days),
            end,
        }
    }
}

/// Raw per-point metrics as returned by the service, before any derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawImageryMetrics {
    /// Fraction of ground area covered by crown, in [0, 1].
    pub canopy_cover_fraction: f64,
    /// Crown top height above ground, meters.
    pub canopy_height_m: f64,
    /// Acquisition date of the scene the metrics came from.
    pub imagery_date: NaiveDate,
}

/// One result slot per input point, same order and length as the request.
pub type BatchResults = Vec<Result<RawImageryMetrics, ImageryError>>;

#[async_trait]
pub trait ImageryClient: Send + Sync {
    /// Fetch raw metrics for a batch of points within `window`.
    ///
    /// The returned vector has exactly one entry per input point, in input
    /// order. Per-point failures (no imagery, exhausted retries) occupy
    /// their slot rather than failing the batch.
    async fn fetch_batch(&self, points: &[Point], window: TimeWindow) -> BatchResults;
}
