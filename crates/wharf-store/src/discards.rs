//! # Discards Sink Writer
//!
//! Serializes discard records into the destination's load format (CSV lines,
//! or newline-delimited JSON for BigQuery) through a zstd-compressed file
//! stream. The schema engines only produce the records; this writer is the
//! in-repo default sink for them.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use wharf_schema::{DiscardRecord, LoadFormat};

use crate::Result;

const COMPRESSION_LEVEL: i32 = 1;

/// Compressed line-oriented writer for discard records.
pub struct DiscardsWriter {
    encoder: zstd::Encoder<'static, File>,
    format: LoadFormat,
    records: usize,
}

impl DiscardsWriter {
    /// Creates the discards file for one load, choosing the line format from
    /// the destination type.
    pub fn create(path: impl AsRef<Path>, destination_type: &str) -> Result<Self> {
        let file = File::create(path)?;
        let encoder = zstd::Encoder::new(file, COMPRESSION_LEVEL)?;
        Ok(Self {
            encoder,
            format: LoadFormat::for_destination(destination_type),
            records: 0,
        })
    }

    pub fn write_record(&mut self, record: &DiscardRecord) -> Result<()> {
        let line = match self.format {
            LoadFormat::Json => serde_json::to_string(record)?,
            LoadFormat::Csv => csv_line(record),
        };
        self.encoder.write_all(line.as_bytes())?;
        self.encoder.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records
    }

    /// Finishes the zstd frame and flushes the file.
    pub fn finish(self) -> Result<()> {
        let mut file = self.encoder.finish()?;
        file.flush()?;
        Ok(())
    }
}

/// CSV line in the discards load order: column_name, column_value,
/// received_at, row_id, table_name, uuid_ts[, loaded_at].
fn csv_line(record: &DiscardRecord) -> String {
    let mut fields = vec![
        record.column_name.as_str(),
        record.column_value.as_str(),
        record.received_at.as_str(),
        record.row_id.as_str(),
        record.table_name.as_str(),
    ];
    if let Some(uuid_ts) = record.uuid_ts.as_deref() {
        fields.push(uuid_ts);
    }
    if let Some(loaded_at) = record.loaded_at.as_deref() {
        fields.push(loaded_at);
    }

    fields
        .into_iter()
        .map(csv_field)
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
