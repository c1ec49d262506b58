pub mod error;
pub mod filter;
pub mod models;
pub mod reader;
pub mod report;
pub mod sort;
pub mod utils;
pub mod writer;

pub use error::{ReportError, Stage};
pub use models::{ReportOptions, ReportSummary};
pub use report::{generate_big_file_report, ReportGenerator};
pub use writer::write_csv_report;
