pub mod error;
pub mod estimator;
pub mod pipeline;
pub mod reader;
pub mod types;
pub mod writer;

pub use error::{PipelineError, Result};
pub use pipeline::{run, RunOptions, RunSummary};
pub use types::{CoordinateRecord, DerivedTreeMetrics, OutputRecord, RunParameters};
