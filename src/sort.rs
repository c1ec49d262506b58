use crate::error::{ReportError, Result, Stage};
use crate::models::SIZE_COLUMN;
use crate::reader::{is_signed_integer, is_unsigned_integer};
use arrow::array::{Array, ArrayRef, Int64Array, UInt32Array, UInt64Array};
use arrow::compute::{cast, take};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Sort rows by `size`, largest first, optionally keeping only the first `limit`.
///
/// The sort is stable: rows with equal sizes keep their input order.
/// Null sizes go after every non-null size.
pub fn sort_by_size_desc(table: &RecordBatch, limit: Option<usize>) -> Result<RecordBatch> {
    let keys = size_keys(table)?;

    let mut order: Vec<u32> = (0..keys.len() as u32).collect();
    order.sort_by(|&a, &b| compare_desc_nulls_last(keys[a as usize], keys[b as usize]));

    if let Some(limit) = limit {
        if limit < order.len() {
            debug!("Truncating {} sorted rows to {}", order.len(), limit);
            order.truncate(limit);
        }
    }

    let indices = UInt32Array::from(order);
    let columns = table
        .columns()
        .iter()
        .map(|column| take(column.as_ref(), &indices, None))
        .collect::<std::result::Result<Vec<ArrayRef>, _>>()
        .map_err(ReportError::compute(Stage::Sort))?;

    let sorted =
        RecordBatch::try_new(table.schema(), columns).map_err(ReportError::compute(Stage::Sort))?;

    info!("Sorted {} rows by {} descending", sorted.num_rows(), SIZE_COLUMN);

    Ok(sorted)
}

/// Widen every integer size into i128 so u64 and i64 values compare correctly
fn size_keys(table: &RecordBatch) -> Result<Vec<Option<i128>>> {
    let column = table
        .column_by_name(SIZE_COLUMN)
        .ok_or_else(|| ReportError::schema(SIZE_COLUMN, "required column is missing"))?;

    let data_type = column.data_type();

    if is_unsigned_integer(data_type) {
        let widened = cast(column, &DataType::UInt64).map_err(ReportError::compute(Stage::Sort))?;
        let values = widened
            .as_any()
            .downcast_ref::<UInt64Array>()
            .ok_or_else(|| ReportError::schema(SIZE_COLUMN, "expected an integer column"))?;
        Ok(values.iter().map(|v| v.map(i128::from)).collect())
    } else if is_signed_integer(data_type) {
        let widened = cast(column, &DataType::Int64).map_err(ReportError::compute(Stage::Sort))?;
        let values = widened
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| ReportError::schema(SIZE_COLUMN, "expected an integer column"))?;
        Ok(values.iter().map(|v| v.map(i128::from)).collect())
    } else {
        Err(ReportError::schema(
            SIZE_COLUMN,
            format!("expected an integer column, found {}", data_type),
        ))
    }
}

fn compare_desc_nulls_last(a: Option<i128>, b: Option<i128>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
