//! The single linear pass: read coordinates, enrich them batch by batch
//! against the imagery service, derive metrics, append output rows.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, warn};
use treemetry_imagery::{ImageryClient, ImageryError, TimeWindow};

use crate::error::{PipelineError, Result};
use crate::estimator::derive_metrics;
use crate::reader::read_coordinates;
use crate::types::{OutputRecord, RunParameters};
use crate::writer::OutputWriter;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Coordinates per imagery request. Throughput knob only; the output is
    /// identical whatever the grouping.
    pub batch_size: usize,
    /// Length of the imagery search window, in days.
    pub window_days: i64,
    /// End of the imagery search window, stamped on every row as
    /// `update_date`.
    pub reference_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub enriched: usize,
    pub no_imagery: usize,
    pub failed: usize,
}

/// Runs the whole pipeline. Imagery problems are isolated to their record
/// (the row is written null-filled and counted); input, parameter, and
/// write problems abort the run.
pub async fn run(
    client: &dyn ImageryClient,
    params: &RunParameters,
    input: &Path,
    output: &Path,
    options: &RunOptions,
) -> Result<RunSummary> {
    if options.batch_size == 0 {
        return Err(PipelineError::InvalidParameter(
            "batch size must be at least 1".into(),
        ));
    }
    params.validate()?;

    let records = read_coordinates(input)?;
    info!(total = records.len(), input = %input.display(), "loaded coordinate records");

    let window = TimeWindow::ending_at(options.reference_date, options.window_days);
    let mut writer = OutputWriter::create(output)?;
    let mut summary = RunSummary {
        total: records.len(),
        ..RunSummary::default()
    };

    for (batch_index, batch) in records.chunks(options.batch_size).enumerate() {
        let points: Vec<_> = batch.iter().map(|record| record.point()).collect();
        let mut results = client.fetch_batch(&points, window).await;
        if results.len() != batch.len() {
            // A misbehaving client must not cost us the 1:1 row mapping.
            warn!(
                expected = batch.len(),
                got = results.len(),
                "imagery client returned the wrong number of result slots"
            );
            results.truncate(batch.len());
            while results.len() < batch.len() {
                results.push(Err(ImageryError::Response(
                    "imagery client returned no result slot for this point".to_string(),
                )));
            }
        }

        for (record, result) in batch.iter().zip(results) {
            let row = match result {
                Ok(raw) => {
                    let derived = derive_metrics(&raw, params)?;
                    summary.enriched += 1;
                    OutputRecord::enriched(record, params, &raw, &derived, options.reference_date)
                }
                Err(err @ ImageryError::NoImagery { .. }) => {
                    info!("{err}; writing null-filled row");
                    summary.no_imagery += 1;
                    OutputRecord::null_filled(record, params, options.reference_date)
                }
                Err(err) => {
                    warn!(
                        latitude = record.latitude,
                        longitude = record.longitude,
                        "imagery lookup failed: {err}; writing null-filled row"
                    );
                    summary.failed += 1;
                    OutputRecord::null_filled(record, params, options.reference_date)
                }
            };
            writer.append(&row)?;
        }

        writer.flush()?;
        info!(
            batch = batch_index + 1,
            records = batch.len(),
            "processed batch"
        );
    }

    writer.flush()?;
    Ok(summary)
}
