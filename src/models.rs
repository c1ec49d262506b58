use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column holding the file extension (no leading dot)
pub const EXTENSION_COLUMN: &str = "extension";

/// Column holding the file size in bytes
pub const SIZE_COLUMN: &str = "size";

/// Default location of the index produced by the indexer
pub const DEFAULT_INDEX_PATH: &str = "results/index.parquet";

/// Default location of the CSV report
pub const DEFAULT_OUTPUT_PATH: &str = "results/big_pt_files.csv";

/// Extension the report selects by default
pub const DEFAULT_EXTENSION: &str = "pt";

/// Configuration options for a report run
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Parquet index to read
    pub index_path: PathBuf,

    /// CSV file to (over)write
    pub output_path: PathBuf,

    /// Extension to keep, compared exactly and case-sensitively
    pub extension: String,

    /// Keep only the first N rows after sorting (None = all)
    pub limit: Option<usize>,

    /// Header of the leading positional-index column
    pub index_label: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            extension: DEFAULT_EXTENSION.to_string(),
            limit: None,
            index_label: String::new(),
        }
    }
}

impl ReportOptions {
    /// Default options reading `index_path` and writing `output_path`
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(index_path: P, output_path: Q) -> Self {
        Self {
            index_path: index_path.as_ref().to_path_buf(),
            output_path: output_path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }
}

/// Statistics about a completed report run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    /// Index file that was read
    pub index_path: String,

    /// Report file that was written
    pub output_path: String,

    /// Extension the rows were filtered on
    pub extension: String,

    /// Rows in the index
    pub rows_read: u64,

    /// Rows whose extension matched
    pub rows_matched: u64,

    /// Rows written to the report (differs from matched only with a limit)
    pub rows_written: u64,

    /// Sum of `size` over written rows, nulls ignored
    pub total_size: u64,

    /// Largest `size` in the report, if any row has one
    pub largest_size: Option<u64>,

    /// Wall-clock duration of the run in seconds
    pub duration_secs: f64,
}

impl ReportSummary {
    /// Share of index rows that matched the extension, in percent
    pub fn match_percentage(&self) -> f64 {
        crate::utils::percentage(self.rows_matched, self.rows_read)
    }

    /// Write the summary as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let to_err = |source: std::io::Error| ReportError::Summary {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_string_pretty(self)
            .map_err(std::io::Error::from)
            .map_err(to_err)?;

        let mut file = File::create(path).map_err(to_err)?;
        file.write_all(json.as_bytes()).map_err(to_err)?;

        Ok(())
    }
}
