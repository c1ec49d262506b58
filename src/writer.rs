use crate::error::{ReportError, Result, Stage};
use crate::utils;
use arrow::array::{ArrayRef, UInt64Array};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Prepend a `0..n` positional column named `label` to `table`.
///
/// `label` must not already name a column of `table`.
pub fn with_row_index(table: &RecordBatch, label: &str) -> Result<RecordBatch> {
    let schema = table.schema();

    if schema.field_with_name(label).is_ok() {
        return Err(ReportError::IndexLabelConflict {
            label: label.to_string(),
        });
    }

    let mut fields = Vec::with_capacity(schema.fields().len() + 1);
    fields.push(Field::new(label, DataType::UInt64, false));
    for i in 0..schema.fields().len() {
        fields.push(schema.field(i).clone());
    }

    let positions: UInt64Array = (0..table.num_rows() as u64).map(Some).collect();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(table.num_columns() + 1);
    columns.push(Arc::new(positions));
    columns.extend(table.columns().iter().cloned());

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .map_err(ReportError::compute(Stage::Write))
}

/// Write `table` as CSV to `output_path`, preceded by a positional index column.
///
/// The report is rendered in memory, written to a sibling temporary file and
/// renamed over `output_path`, so an existing report is only replaced once the
/// new one is complete. Returns the number of data rows written.
pub fn write_csv_report<P: AsRef<Path>>(
    table: &RecordBatch,
    output_path: P,
    index_label: &str,
) -> Result<u64> {
    let output_path = output_path.as_ref();
    let indexed = with_row_index(table, index_label)?;

    let mut buffer = Vec::new();
    {
        let mut writer = WriterBuilder::new().has_headers(true).build(&mut buffer);
        // Header is emitted on the first write, even for an empty batch
        writer
            .write(&indexed)
            .map_err(ReportError::compute(Stage::Write))?;
    }
    debug!("Rendered {} bytes of CSV", buffer.len());

    let io_err = |source: std::io::Error| ReportError::OutputWriteError {
        path: output_path.to_path_buf(),
        source,
    };

    utils::ensure_output_dir(output_path).map_err(io_err)?;

    let tmp_path = temp_path_for(output_path);
    if let Err(source) = fs::write(&tmp_path, &buffer) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(source));
    }
    if let Err(source) = fs::rename(&tmp_path, output_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(source));
    }

    let rows = indexed.num_rows() as u64;
    info!("Report written to {}: {} rows", output_path.display(), rows);

    Ok(rows)
}

/// `dir/report.csv` -> `dir/.report.csv.tmp`
fn temp_path_for(output_path: &Path) -> PathBuf {
    let name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    output_path.with_file_name(format!(".{}.tmp", name))
}
