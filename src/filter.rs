use crate::error::{ReportError, Result, Stage};
use crate::models::EXTENSION_COLUMN;
use arrow::array::{Array, ArrayRef, StringArray};
use arrow::compute::kernels::comparison::eq_utf8_scalar;
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use tracing::debug;

/// Keep only rows where `extension` equals `extension` (case-sensitive).
///
/// Null extensions never match. The returned table has the same schema
/// as the input.
pub fn filter_by_extension(table: &RecordBatch, extension: &str) -> Result<RecordBatch> {
    let column = table
        .column_by_name(EXTENSION_COLUMN)
        .ok_or_else(|| ReportError::schema(EXTENSION_COLUMN, "required column is missing"))?;

    let values = as_utf8(column)?;
    let strings = values
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ReportError::schema(EXTENSION_COLUMN, "expected a string column"))?;

    // Null comparisons give a null mask slot, which the filter drops
    let mask = eq_utf8_scalar(strings, extension).map_err(ReportError::compute(Stage::Filter))?;

    let filtered = filter_record_batch(table, &mask).map_err(ReportError::compute(Stage::Filter))?;

    debug!(
        "Filtered on extension '{}': {} of {} rows kept",
        extension,
        filtered.num_rows(),
        table.num_rows()
    );

    Ok(filtered)
}

/// LargeUtf8 and dictionary-encoded strings are cast down to plain Utf8
fn as_utf8(column: &ArrayRef) -> Result<ArrayRef> {
    if column.data_type() == &DataType::Utf8 {
        return Ok(column.clone());
    }
    cast(column, &DataType::Utf8).map_err(ReportError::compute(Stage::Filter))
}
