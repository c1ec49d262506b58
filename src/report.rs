use crate::error::Result;
use crate::models::{ReportOptions, ReportSummary, SIZE_COLUMN};
use crate::reader::load_matching;
use crate::sort::sort_by_size_desc;
use crate::writer::write_csv_report;
use arrow::array::{Array, UInt64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Runs the load -> filter -> sort -> write pipeline for one report
pub struct ReportGenerator {
    options: ReportOptions,
}

impl ReportGenerator {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Generate the report and return statistics about it
    pub fn run(&self) -> Result<ReportSummary> {
        let options = &self.options;
        let start = Instant::now();

        info!(
            "Starting report: {} -> {}",
            options.index_path.display(),
            options.output_path.display()
        );

        // Filtering happens per decoded batch inside the load
        let loaded = load_matching(&options.index_path, &options.extension)?;
        let matched = loaded.table;
        let sorted = sort_by_size_desc(&matched, options.limit)?;
        let rows_written = write_csv_report(&sorted, &options.output_path, &options.index_label)?;

        if matched.num_rows() == 0 {
            warn!(
                "No rows with extension '{}' in {}",
                options.extension,
                options.index_path.display()
            );
        }

        let (total_size, largest_size) = size_totals(&sorted);

        let summary = ReportSummary {
            index_path: options.index_path.to_string_lossy().to_string(),
            output_path: options.output_path.to_string_lossy().to_string(),
            extension: options.extension.clone(),
            rows_read: loaded.rows_read,
            rows_matched: matched.num_rows() as u64,
            rows_written,
            total_size,
            largest_size,
            duration_secs: start.elapsed().as_secs_f64(),
        };

        info!(
            "Report complete: {} of {} rows written in {:.3}s",
            summary.rows_written, summary.rows_read, summary.duration_secs
        );

        Ok(summary)
    }
}

/// Write the report of `.pt` files in `index_path` to `output_path`, largest first
pub fn generate_big_file_report<P: AsRef<Path>, Q: AsRef<Path>>(
    index_path: P,
    output_path: Q,
) -> Result<()> {
    ReportGenerator::new(ReportOptions::new(index_path, output_path)).run()?;
    Ok(())
}

/// Sum and maximum of the size column; negative sizes are ignored
fn size_totals(sorted: &RecordBatch) -> (u64, Option<u64>) {
    let Some(column) = sorted.column_by_name(SIZE_COLUMN) else {
        return (0, None);
    };

    // Non-fitting values (negatives) become nulls in a safe cast
    let Ok(sizes) = cast(column, &DataType::UInt64) else {
        return (0, None);
    };
    let Some(sizes) = sizes.as_any().downcast_ref::<UInt64Array>() else {
        return (0, None);
    };

    let total = sizes.iter().flatten().fold(0u64, |acc, s| acc.saturating_add(s));
    // Already sorted descending with nulls last
    let largest = sizes.iter().next().flatten();

    (total, largest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn sized(sizes: ArrayRef) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "size",
            sizes.data_type().clone(),
            true,
        )]));
        RecordBatch::try_new(schema, vec![sizes]).unwrap()
    }

    #[test]
    fn test_size_totals() {
        let batch = sized(Arc::new(UInt64Array::from(vec![Some(200), Some(50), None])));
        assert_eq!(size_totals(&batch), (250, Some(200)));
    }

    #[test]
    fn test_size_totals_empty_and_negative() {
        let empty = sized(Arc::new(UInt64Array::from(Vec::<u64>::new())));
        assert_eq!(size_totals(&empty), (0, None));

        let signed = sized(Arc::new(Int64Array::from(vec![30, -1])));
        assert_eq!(size_totals(&signed), (30, Some(30)));
    }

    #[test]
    fn test_size_totals_without_size_column() {
        let schema = Arc::new(Schema::new(vec![Field::new("path", DataType::Utf8, false)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["/a"])) as ArrayRef],
        )
        .unwrap();
        assert_eq!(size_totals(&batch), (0, None));
    }
}
