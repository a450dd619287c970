use std::path::PathBuf;

use thiserror::Error;
use treemetry_imagery::ImageryError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input format error: {0}")]
    InputFormat(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("failed to write output to {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("imagery service error: {0}")]
    Imagery(#[from] ImageryError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
