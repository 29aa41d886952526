//! Table storage (Arrow → CSV / Parquet)
//!
//! Every report table is a single Arrow [`RecordBatch`] whose schema fixes the
//! column order. Storage is write-once: each run rewrites its output files
//! from scratch.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tracing::debug;

use crate::{Error, Result};

/// UTF-8 byte-order mark, for spreadsheet tools that need it to detect UTF-8
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write `batch` as CSV with a header row.
///
/// A batch with zero rows produces a header-only file.
///
/// # Errors
/// Returns error if the file cannot be created or written
pub fn write_csv<P: AsRef<Path>>(path: P, batch: &RecordBatch, bom: bool) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        Error::StorageError(format!("Failed to create {}: {e}", path.display()))
    })?;
    let mut out = BufWriter::new(file);
    if bom {
        out.write_all(UTF8_BOM)?;
    }

    let mut writer = WriterBuilder::new().with_header(true).build(out);
    writer.write(batch)?;
    writer.into_inner().flush()?;

    debug!(path = %path.display(), rows = batch.num_rows(), "wrote csv table");
    Ok(())
}

/// Write `batch` as a single-row-group Parquet file.
///
/// # Errors
/// Returns error if the file cannot be created or encoded
pub fn write_parquet<P: AsRef<Path>>(path: P, batch: &RecordBatch) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        Error::StorageError(format!("Failed to create {}: {e}", path.display()))
    })?;

    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;

    debug!(path = %path.display(), rows = batch.num_rows(), "wrote parquet table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::sync::Arc;

    fn load_parquet(path: &Path) -> Vec<RecordBatch> {
        ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap())
            .unwrap()
            .build()
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap()
    }

    fn batch(rows: usize) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("dataset", DataType::Utf8, false),
            Field::new("value", DataType::Float64, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from_iter_values((0..rows).map(|i| format!("ds{i}")))),
                Arc::new(Float64Array::from_iter_values((0..rows).map(|i| i as f64 * 0.5))),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_csv_header_only_for_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&path, &batch(0), false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "dataset,value\n");
    }

    #[test]
    fn test_csv_rows_and_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        write_csv(&path, &batch(2), true).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("ds1,0.5"));
    }

    #[test]
    fn test_parquet_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.parquet");
        write_parquet(&path, &batch(5)).unwrap();

        let batches = load_parquet(&path);
        let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        assert_eq!(rows, 5);
        assert_eq!(batches[0].schema().field(0).name(), "dataset");
    }
}
