use crate::error::{ReportError, Result, Stage};
use crate::filter::filter_by_extension;
use crate::models::{EXTENSION_COLUMN, SIZE_COLUMN};
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use std::fs::File;
use std::io::{Error, ErrorKind};
use std::path::Path;
use tracing::{debug, info};

/// Rows decoded per batch before filtering
const READ_BATCH_SIZE: usize = 100_000;

/// Rows of an index that matched the extension filter
#[derive(Debug)]
pub struct LoadedIndex {
    /// Matching rows in index order, with the index's full schema
    pub table: RecordBatch,

    /// Rows decoded from the index before filtering
    pub rows_read: u64,
}

/// Read the index at `path`, keeping only rows whose extension equals `extension`.
///
/// Each decoded batch is filtered before anything is concatenated, so only
/// matching rows are held together in the final table.
pub fn load_matching<P: AsRef<Path>>(path: P, extension: &str) -> Result<LoadedIndex> {
    read_matching(path.as_ref(), extension, READ_BATCH_SIZE)
}

fn read_matching(path: &Path, extension: &str, batch_size: usize) -> Result<LoadedIndex> {
    let file = open_index(path)?;

    let invalid = |source: ParquetError| ReportError::InvalidInput {
        path: path.to_path_buf(),
        source,
    };

    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(invalid)?;
    let schema = builder.schema().clone();

    // Fail on a bad schema before decoding any data
    validate_schema(&schema)?;

    let reader = builder
        .with_batch_size(batch_size)
        .build()
        .map_err(invalid)?;

    let mut rows_read = 0u64;
    let mut batches = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| invalid(e.into()))?;
        rows_read += batch.num_rows() as u64;

        let matched = filter_by_extension(&batch, extension)?;
        debug!("Read batch of {} rows, {} matched", batch.num_rows(), matched.num_rows());
        if matched.num_rows() > 0 {
            batches.push(matched);
        }
    }

    let table = concat_batches(&schema, &batches).map_err(ReportError::compute(Stage::Load))?;

    info!(
        "Loaded {} rows from {}, {} with extension '{}'",
        rows_read,
        path.display(),
        table.num_rows(),
        extension
    );

    Ok(LoadedIndex { table, rows_read })
}

/// Open the index, treating anything but a readable regular file as not found
fn open_index(path: &Path) -> Result<File> {
    let not_found = |source: Error| ReportError::InputNotFound {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(not_found)?;
    let metadata = file.metadata().map_err(not_found)?;
    if !metadata.is_file() {
        return Err(not_found(Error::new(ErrorKind::InvalidInput, "not a regular file")));
    }

    Ok(file)
}

/// Check that the required columns exist and have usable types
pub fn validate_schema(schema: &Schema) -> Result<()> {
    let extension = schema
        .field_with_name(EXTENSION_COLUMN)
        .map_err(|_| ReportError::schema(EXTENSION_COLUMN, "required column is missing"))?;

    if !is_string_type(extension.data_type()) {
        return Err(ReportError::schema(
            EXTENSION_COLUMN,
            format!("expected a string column, found {}", extension.data_type()),
        ));
    }

    let size = schema
        .field_with_name(SIZE_COLUMN)
        .map_err(|_| ReportError::schema(SIZE_COLUMN, "required column is missing"))?;

    if !is_integer_type(size.data_type()) {
        return Err(ReportError::schema(
            SIZE_COLUMN,
            format!("expected an integer column, found {}", size.data_type()),
        ));
    }

    Ok(())
}

/// Utf8, LargeUtf8, or a dictionary of either
pub(crate) fn is_string_type(data_type: &DataType) -> bool {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 => true,
        DataType::Dictionary(_, values) => is_string_type(values),
        _ => false,
    }
}

pub(crate) fn is_integer_type(data_type: &DataType) -> bool {
    is_signed_integer(data_type) || is_unsigned_integer(data_type)
}

pub(crate) fn is_signed_integer(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
    )
}

pub(crate) fn is_unsigned_integer(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
    )
}
