//! Derived-metric formulas. Deterministic and side-effect free.

use chrono::{Datelike, NaiveDate};
use treemetry_imagery::RawImageryMetrics;

use crate::error::{PipelineError, Result};
use crate::types::{DerivedTreeMetrics, RunParameters};

const DAYS_PER_YEAR: f64 = 365.25;
/// DBH proxy for fast-growing plantation species, cm of diameter per year.
const DBH_CM_PER_YEAR: f64 = 1.5;
/// Sequestration proxy, kg of CO₂ per tree per year of age.
const CO2_KG_PER_YEAR: f64 = 1.75;
/// Stem value curve: starts at the initial value, appreciates linearly,
/// saturates at the max.
const TREE_VALUE_INITIAL_USD: f64 = 100.0;
const TREE_VALUE_MAX_USD: f64 = 500.0;
const TREE_VALUE_APPRECIATION_USD_PER_YEAR: f64 = 35.0;
/// Paulownia rotation: first coppice harvest, then a second rotation of the
/// same length.
const FIRST_HARVEST_YEARS: i32 = 12;
const SECOND_HARVEST_YEARS: i32 = 24;

pub fn derive_metrics(
    raw: &RawImageryMetrics,
    params: &RunParameters,
) -> Result<DerivedTreeMetrics> {
    if params.initial_height_m < 0.0 {
        return Err(PipelineError::InvalidParameter(format!(
            "initial height must be non-negative, got {}",
            params.initial_height_m
        )));
    }
    if params.plantation_date > raw.imagery_date {
        return Err(PipelineError::InvalidParameter(format!(
            "plantation date {} is after imagery date {}",
            params.plantation_date, raw.imagery_date
        )));
    }

    let age_days = (raw.imagery_date - params.plantation_date).num_days();
    let growth_rate_m_day = if age_days == 0 {
        0.0
    } else {
        (raw.canopy_height_m - params.initial_height_m) / age_days as f64
    };

    let age_years = age_days as f64 / DAYS_PER_YEAR;

    Ok(DerivedTreeMetrics {
        age_days,
        growth_rate_m_day,
        dbh_cm: age_years * DBH_CM_PER_YEAR,
        co2_sequestration_kg: age_years * CO2_KG_PER_YEAR,
        estimated_value_usd: estimate_tree_value(age_years),
    })
}

/// Scheduled harvest dates for a tree, from its plantation date alone.
pub fn harvest_dates(plantation_date: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        add_years(plantation_date, FIRST_HARVEST_YEARS),
        add_years(plantation_date, SECOND_HARVEST_YEARS),
    )
}

fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    // Leap-day plantings land on Feb 28 when the target year is common.
    date.with_year(year)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 2, 28).expect("Feb 28 always exists"))
}

fn estimate_tree_value(age_years: f64) -> f64 {
    (TREE_VALUE_INITIAL_USD + age_years * TREE_VALUE_APPRECIATION_USD_PER_YEAR)
        .clamp(TREE_VALUE_INITIAL_USD, TREE_VALUE_MAX_USD)
}
