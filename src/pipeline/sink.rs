//! CSV report output.

use crate::core::errors::ScanResult;
use crate::domain::{CSV_HEADER, QualityRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends quality records to a CSV stream.
///
/// The header is written when the sink is created. Each row is formatted in
/// full before it reaches the writer, so an aborted run never leaves a
/// partial line behind.
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: W,
    rows: usize,
}

impl CsvSink<BufWriter<File>> {
    /// Creates (or truncates) the report file at `path` and writes the header.
    pub fn create(path: &Path) -> ScanResult<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps `writer` and writes the header.
    pub fn new(mut writer: W) -> ScanResult<Self> {
        writeln!(writer, "{}", CSV_HEADER.join(","))?;
        Ok(Self { writer, rows: 0 })
    }

    /// Appends one record.
    pub fn write(&mut self, record: &QualityRecord) -> ScanResult<()> {
        let mut line = record.csv_row();
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flushes the stream and returns the underlying writer.
    pub fn finish(mut self) -> ScanResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
