use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use treemetry_imagery::{Point, RawImageryMetrics};

use crate::error::{PipelineError, Result};

/// One input row: a tree location, plus whatever identifier the operator
/// keeps for it. Immutable once read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoordinateRecord {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub tree_id: Option<String>,
}

impl CoordinateRecord {
    pub fn point(&self) -> Point {
        Point {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Run-level inputs shared by every record in a run.
#[derive(Debug, Clone)]
pub struct RunParameters {
    pub plantation_date: NaiveDate,
    pub initial_height_m: f64,
    pub project_developer: String,
    pub species: String,
}

impl RunParameters {
    pub fn validate(&self) -> Result<()> {
        if self.initial_height_m < 0.0 {
            return Err(PipelineError::InvalidParameter(format!(
                "initial height must be non-negative, got {}",
                self.initial_height_m
            )));
        }
        Ok(())
    }
}

/// Metrics derived from one tree's raw imagery metrics plus the run
/// parameters. Pure function of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedTreeMetrics {
    pub age_days: i64,
    pub growth_rate_m_day: f64,
    pub dbh_cm: f64,
    pub co2_sequestration_kg: f64,
    pub estimated_value_usd: f64,
}

/// One output row. Imagery and derived columns are optional so a tree with
/// no usable imagery still gets a row, with those cells left empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub tree_id: Option<String>,
    pub species: String,
    pub plantation_date: NaiveDate,
    pub canopy_cover_fraction: Option<f64>,
    pub canopy_height_m: Option<f64>,
    pub imagery_date: Option<NaiveDate>,
    pub age_days: Option<i64>,
    pub growth_rate_m_day: Option<f64>,
    pub dbh_cm: Option<f64>,
    pub co2_sequestration_kg: Option<f64>,
    pub estimated_value_usd: Option<f64>,
    /// Harvest schedule follows from the plantation date alone, so these are
    /// populated even when imagery is missing.
    pub first_harvest_date: NaiveDate,
    pub second_harvest_date: NaiveDate,
    pub project_developer: String,
    pub update_date: NaiveDate,
}

impl OutputRecord {
    pub fn enriched(
        coordinate: &CoordinateRecord,
        params: &RunParameters,
        raw: &RawImageryMetrics,
        derived: &DerivedTreeMetrics,
        update_date: NaiveDate,
    ) -> Self {
        let (first_harvest_date, second_harvest_date) =
            crate::estimator::harvest_dates(params.plantation_date);
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            tree_id: coordinate.tree_id.clone(),
            species: params.species.clone(),
            plantation_date: params.plantation_date,
            canopy_cover_fraction: Some(raw.canopy_cover_fraction),
            canopy_height_m: Some(raw.canopy_height_m),
            imagery_date: Some(raw.imagery_date),
            age_days: Some(derived.age_days),
            growth_rate_m_day: Some(derived.growth_rate_m_day),
            dbh_cm: Some(derived.dbh_cm),
            co2_sequestration_kg: Some(derived.co2_sequestration_kg),
            estimated_value_usd: Some(derived.estimated_value_usd),
            first_harvest_date,
            second_harvest_date,
            project_developer: params.project_developer.clone(),
            update_date,
        }
    }

    /// Row for a tree the service had nothing for: coordinate and run
    /// metadata populated, every imagery-dependent cell empty.
    pub fn null_filled(
        coordinate: &CoordinateRecord,
        params: &RunParameters,
        update_date: NaiveDate,
    ) -> Self {
        let (first_harvest_date, second_harvest_date) =
            crate::estimator::harvest_dates(params.plantation_date);
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            tree_id: coordinate.tree_id.clone(),
            species: params.species.clone(),
            plantation_date: params.plantation_date,
            canopy_cover_fraction: None,
            canopy_height_m: None,
            imagery_date: None,
            age_days: None,
            growth_rate_m_day: None,
            dbh_cm: None,
            co2_sequestration_kg: None,
            estimated_value_usd: None,
            first_harvest_date,
            second_harvest_date,
            project_developer: params.project_developer.clone(),
            update_date,
        }
    }
}
