use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage an error originated in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Filter,
    Sort,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Filter => "filter",
            Stage::Sort => "sort",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// Top-level error type for report generation
#[derive(Error, Debug)]
pub enum ReportError {
    /// Index file is missing or cannot be opened
    #[error("load: index file not found or unreadable '{}': {source}", .path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Index file exists but is not valid Parquet
    #[error("load: failed to decode index file '{}': {source}", .path.display())]
    InvalidInput {
        path: PathBuf,
        #[source]
        source: ParquetError,
    },

    /// A required column is absent or has an unusable type
    #[error("load: schema error for column '{column}': {reason}")]
    SchemaError { column: String, reason: String },

    /// Arrow kernel failure while transforming the table
    #[error("{stage}: {source}")]
    Compute {
        stage: Stage,
        #[source]
        source: ArrowError,
    },

    /// Report destination could not be written
    #[error("write: failed to write report '{}': {source}", .path.display())]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Index column header collides with a column of the report
    #[error("write: index label '{label}' is already a column name")]
    IndexLabelConflict { label: String },

    /// JSON summary could not be written
    #[error("write: failed to write summary '{}': {source}", .path.display())]
    Summary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    /// Stage of the pipeline this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            ReportError::InputNotFound { .. }
            | ReportError::InvalidInput { .. }
            | ReportError::SchemaError { .. } => Stage::Load,
            ReportError::Compute { stage, .. } => *stage,
            ReportError::IndexLabelConflict { .. }
            | ReportError::OutputWriteError { .. }
            | ReportError::Summary { .. } => Stage::Write,
        }
    }

    pub(crate) fn schema(column: &str, reason: impl Into<String>) -> Self {
        ReportError::SchemaError {
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn compute(stage: Stage) -> impl FnOnce(ArrowError) -> Self {
        move |source| ReportError::Compute { stage, source }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
