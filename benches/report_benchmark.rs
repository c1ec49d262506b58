use arrow::array::{ArrayRef, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use index_report::filter::filter_by_extension;
use index_report::sort::sort_by_size_desc;
use index_report::{ReportGenerator, ReportOptions};
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const EXTENSIONS: &[&str] = &["pt", "txt", "bin", "json", "csv"];

/// Build an index table where every fifth row is a `.pt` file
fn create_index_table(num_rows: usize) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("path", DataType::Utf8, false),
        Field::new("size", DataType::UInt64, false),
        Field::new("extension", DataType::Utf8, false),
    ]));

    let paths: StringArray = (0..num_rows)
        .map(|i| Some(format!("/data/dir_{}/file_{:08}.{}", i % 97, i, EXTENSIONS[i % 5])))
        .collect();
    // Cheap pseudo-random sizes so the sort has work to do
    let sizes: UInt64Array = (0..num_rows as u64)
        .map(|i| Some(i.wrapping_mul(2_654_435_761) % 10_000_000))
        .collect();
    let extensions: StringArray = (0..num_rows).map(|i| Some(EXTENSIONS[i % 5])).collect();

    let columns: Vec<ArrayRef> = vec![Arc::new(paths), Arc::new(sizes), Arc::new(extensions)];
    RecordBatch::try_new(schema, columns).unwrap()
}

fn write_index(path: &Path, batch: &RecordBatch) {
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
}

fn bench_filter_and_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_and_sort");

    for num_rows in [10_000, 100_000, 1_000_000] {
        let table = create_index_table(num_rows);
        group.throughput(Throughput::Elements(num_rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_rows), &table, |b, table| {
            b.iter(|| {
                let matched = filter_by_extension(black_box(table), "pt").unwrap();
                sort_by_size_desc(&matched, None).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_full_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_report");
    group.sample_size(20);

    for num_rows in [10_000, 100_000] {
        let temp_dir = TempDir::new().unwrap();
        let index = temp_dir.path().join("index.parquet");
        let output = temp_dir.path().join("report.csv");
        write_index(&index, &create_index_table(num_rows));

        let generator = ReportGenerator::new(ReportOptions::new(&index, &output));

        group.throughput(Throughput::Elements(num_rows as u64));
        group.bench_function(BenchmarkId::from_parameter(num_rows), |b| {
            b.iter(|| generator.run().unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter_and_sort, bench_full_report);
criterion_main!(benches);
