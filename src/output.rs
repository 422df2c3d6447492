//! Buffered text output for search results.
//!
//! Uses itoa for coordinate formatting to avoid per-record allocation when
//! printing large batch results.

use crate::bed::GeneError;
use crate::interval::{keys, GeneRecord};
use std::io::{BufWriter, Write};

/// Buffer size for result writers (1MB).
const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Text writer for overlap results.
pub struct ResultWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
        }
    }

    /// Write a human-readable listing for one query.
    ///
    /// ```text
    /// Query interval: [200, 600]
    /// Found 3 overlapping gene(s)
    ///   BRCA1 [100, 300]  Chr17  Protein Coding  DNA repair  Breast cancer
    /// ```
    pub fn write_listing(
        &mut self,
        query_start: i64,
        query_end: i64,
        results: &[&GeneRecord],
    ) -> Result<(), GeneError> {
        self.write_bytes(b"Query interval: [")?;
        self.write_int(query_start)?;
        self.write_bytes(b", ")?;
        self.write_int(query_end)?;
        self.write_bytes(b"]\n")?;

        if results.is_empty() {
            self.write_bytes(b"No overlapping genes found.\n")?;
            return Ok(());
        }

        self.write_bytes(b"Found ")?;
        self.write_int(results.len())?;
        self.write_bytes(b" overlapping gene(s)\n")?;

        for record in results {
            self.write_bytes(b"  ")?;
            self.write_bytes(record.label.as_bytes())?;
            self.write_bytes(b" [")?;
            self.write_int(record.start)?;
            self.write_bytes(b", ")?;
            self.write_int(record.end)?;
            self.write_bytes(b"]")?;
            for key in [keys::CHROMOSOME, keys::TYPE, keys::FUNCTION, keys::DISEASE] {
                if let Some(value) = record.attr(key) {
                    self.write_bytes(b"  ")?;
                    self.write_bytes(value.as_bytes())?;
                }
            }
            self.write_bytes(b"\n")?;
        }
        Ok(())
    }

    /// Write one batch row: `query_start  query_end  name  start  end`.
    pub fn write_batch_row(
        &mut self,
        query_start: i64,
        query_end: i64,
        record: &GeneRecord,
    ) -> Result<(), GeneError> {
        self.write_int(query_start)?;
        self.write_bytes(b"\t")?;
        self.write_int(query_end)?;
        self.write_bytes(b"\t")?;
        self.write_bytes(record.label.as_bytes())?;
        self.write_bytes(b"\t")?;
        self.write_int(record.start)?;
        self.write_bytes(b"\t")?;
        self.write_int(record.end)?;
        self.write_bytes(b"\n")
    }

    /// Write one count row: `query_start  query_end  count`.
    pub fn write_count_row(
        &mut self,
        query_start: i64,
        query_end: i64,
        count: usize,
    ) -> Result<(), GeneError> {
        self.write_int(query_start)?;
        self.write_bytes(b"\t")?;
        self.write_int(query_end)?;
        self.write_bytes(b"\t")?;
        self.write_int(count)?;
        self.write_bytes(b"\n")
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), GeneError> {
        self.writer.write_all(bytes).map_err(GeneError::Io)
    }

    /// Write an integer using itoa.
    #[inline]
    pub fn write_int<I: itoa::Integer>(&mut self, n: I) -> Result<(), GeneError> {
        self.writer
            .write_all(self.itoa_buf.format(n).as_bytes())
            .map_err(GeneError::Io)
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> Result<(), GeneError> {
        self.writer.flush().map_err(GeneError::Io)
    }
}
