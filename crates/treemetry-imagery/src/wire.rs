//! JSON shapes exchanged with the imagery service's batch compute endpoint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{ImageryError, Point, RawImageryMetrics, TimeWindow};

/// Pixel scale the canopy reducers run at, meters. Matches the Sentinel-2
/// resolution the canopy products are published at.
pub(crate) const DEFAULT_SCALE_M: u32 = 10;

#[derive(Debug, Serialize)]
pub(crate) struct BatchComputeRequest<'a> {
    pub points: &'a [Point],
    pub window: TimeWindow,
    pub scale_m: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchComputeResponse {
    pub results: Vec<PointOutcome>,
}

/// One slot of the service response. A populated slot carries the three raw
/// metrics; a no-data slot carries only a reason string.
#[derive(Debug, Deserialize)]
pub(crate) struct PointOutcome {
    #[serde(default)]
    pub canopy_cover_fraction: Option<f64>,
    #[serde(default)]
    pub canopy_height_m: Option<f64>,
    #[serde(default)]
    pub imagery_date: Option<NaiveDate>,
    #[serde(default)]
    pub no_imagery_reason: Option<String>,
}

impl PointOutcome {
    pub(crate) fn into_result(
        self,
        point: Point,
        window: TimeWindow,
    ) -> Result<RawImageryMetrics, ImageryError> {
        if self.no_imagery_reason.is_some() {
            return Err(ImageryError::NoImagery {
                latitude: point.latitude,
                longitude: point.longitude,
                window_end: window.end,
            });
        }

        match (
            self.canopy_cover_fraction,
            self.canopy_height_m,
            self.imagery_date,
        ) {
            (Some(cover), Some(height), Some(imagery_date)) => {
                if !(0.0..=1.0).contains(&cover) {
                    return Err(ImageryError::Response(format!(
                        "canopy_cover_fraction {cover} outside [0, 1]"
                    )));
                }
                if height < 0.0 {
                    return Err(ImageryError::Response(format!(
                        "negative canopy_height_m {height}"
                    )));
                }
                Ok(RawImageryMetrics {
                    canopy_cover_fraction: cover,
                    canopy_height_m: height,
                    imagery_date,
                })
            }
            _ => Err(ImageryError::Response(
                "result slot missing metric fields and no_imagery_reason".to_string(),
            )),
        }
    }
}
