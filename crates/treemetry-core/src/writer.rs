//! Append-as-you-go CSV output. The header goes out when the file is
//! created and rows are flushed batch by batch, so an interrupted run
//! leaves a valid prefix of the output behind.

use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::types::OutputRecord;

pub struct OutputWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl OutputWriter {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| PipelineError::Write {
                    path: path.to_path_buf(),
                    message: format!("failed to create parent directory: {err}"),
                })?;
            }
        }

        let writer = csv::Writer::from_path(path).map_err(|err| PipelineError::Write {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }

    pub fn append(&mut self, record: &OutputRecord) -> Result<()> {
        self.writer
            .serialize(record)
            .map_err(|err| self.write_error(err))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|err| self.write_error(err))
    }

    fn write_error(&self, err: impl std::fmt::Display) -> PipelineError {
        PipelineError::Write {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}
