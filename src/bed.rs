//! Streaming gene file parser.
//!
//! Tab-delimited, BED-like layout:
//!
//! ```text
//! chrom  start  end  name  [type  function  disease  applications  extra...]
//! ```
//!
//! Coordinates are closed and signed. Blank lines, `#` comments and
//! `track`/`browser` header lines are skipped. A chromosome of `.` means
//! none was given.

use crate::config::is_inverted_allowed;
use crate::interval::{keys, GeneRecord};
use crate::request::RequestError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading gene or query files.
#[derive(Error, Debug)]
pub enum GeneError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid gene file: {0}")]
    InvalidFormat(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Tree and linear scan disagree: tree returned {tree} match(es), scan returned {scan}")]
    Mismatch { tree: usize, scan: usize },

    #[error(transparent)]
    Request(#[from] RequestError),
}

pub type Result<T> = std::result::Result<T, GeneError>;

/// Placeholder written for, and read back as, a missing chromosome.
const NO_CHROMOSOME: &str = ".";

/// Optional columns after the name, in file order.
const OPTIONAL_COLUMNS: [&str; 4] = [keys::TYPE, keys::FUNCTION, keys::DISEASE, keys::APPLICATIONS];

/// A streaming gene file reader.
pub struct GeneReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: String,
}

impl GeneReader<File> {
    /// Open a gene file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> GeneReader<R> {
    /// Create a reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: String::with_capacity(256),
        }
    }

    /// Read the next record, or `None` at end of input.
    pub fn read_record(&mut self) -> Result<Option<GeneRecord>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if is_skippable(line) {
                continue;
            }

            return self.parse_line(line).map(Some);
        }
    }

    fn parse_line(&self, line: &str) -> Result<GeneRecord> {
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() < 4 {
            return Err(self.error(format!(
                "Expected at least 4 fields (chrom, start, end, name), got {}",
                fields.len()
            )));
        }

        let start = self.parse_position(fields[1], "start")?;
        let end = self.parse_position(fields[2], "end")?;

        if start > end && !is_inverted_allowed() {
            return Err(self.error(format!("Start ({}) > end ({})", start, end)));
        }

        let name = fields[3].trim();
        if name.is_empty() {
            return Err(self.error("Empty gene name".to_string()));
        }

        let mut record = GeneRecord::new(start, end, name);
        if !fields[0].is_empty() && fields[0] != NO_CHROMOSOME {
            record.metadata.insert(keys::CHROMOSOME.to_string(), fields[0].to_string());
        }

        for (key, value) in OPTIONAL_COLUMNS.iter().zip(fields.iter().skip(4)) {
            if !value.is_empty() {
                record.metadata.insert(key.to_string(), value.to_string());
            }
        }
        for (i, value) in fields.iter().skip(4 + OPTIONAL_COLUMNS.len()).enumerate() {
            record
                .metadata
                .insert(format!("extra{}", i + 1), value.to_string());
        }

        Ok(record)
    }

    fn parse_position(&self, s: &str, field_name: &str) -> Result<i64> {
        s.trim().parse().map_err(|_| self.error(format!("Invalid {} position: '{}'", field_name, s)))
    }

    fn error(&self, message: String) -> GeneError {
        GeneError::Parse {
            line: self.line_number,
            message,
        }
    }

    /// Get an iterator over all records.
    pub fn records(self) -> GeneRecordIter<R> {
        GeneRecordIter { reader: self }
    }
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("track")
        || trimmed.starts_with("browser")
}

/// Iterator over gene records.
pub struct GeneRecordIter<R: Read> {
    reader: GeneReader<R>,
}

impl<R: Read> Iterator for GeneRecordIter<R> {
    type Item = Result<GeneRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

/// Read all gene records from a file.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<GeneRecord>> {
    GeneReader::from_path(path)?.records().collect()
}

/// Parse gene records from a string (useful for testing).
pub fn parse_records(content: &str) -> Result<Vec<GeneRecord>> {
    GeneReader::new(content.as_bytes()).records().collect()
}

/// Read a query file: one `start<TAB>end` pair per line.
///
/// Queries are not validated here; inverted pairs are kept and match nothing.
pub fn read_queries<P: AsRef<Path>>(path: P) -> Result<Vec<(i64, i64)>> {
    let reader = BufReader::new(File::open(path)?);
    parse_queries(reader)
}

/// Parse query pairs from any buffered source.
pub fn parse_queries<B: BufRead>(reader: B) -> Result<Vec<(i64, i64)>> {
    let mut queries = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) {
            continue;
        }
        let mut fields = line.split('\t').map(str::trim);
        let (Some(start), Some(end)) = (fields.next(), fields.next()) else {
            return Err(GeneError::Parse {
                line: line_num + 1,
                message: "Query lines require two columns: start and end".to_string(),
            });
        };
        let parse = |s: &str| {
            s.parse::<i64>().map_err(|_| GeneError::Parse {
                line: line_num + 1,
                message: format!("Invalid query position: '{}'", s),
            })
        };
        queries.push((parse(start)?, parse(end)?));
    }

    Ok(queries)
}

/// Write records in gene file layout.
///
/// Metadata beyond the well-known columns is written in `extraN` order;
/// other keys are dropped. A field containing a tab or line break cannot be
/// represented and fails with `InvalidInput` before anything of that record
/// is written.
pub fn write_records<'a, W, I>(writer: &mut W, records: I) -> io::Result<()>
where
    W: io::Write,
    I: IntoIterator<Item = &'a GeneRecord>,
{
    for record in records {
        check_writable(record)?;
        write!(
            writer,
            "{}\t{}\t{}\t{}",
            record.chromosome().unwrap_or(NO_CHROMOSOME),
            record.start,
            record.end,
            record.label
        )?;

        let extras: Vec<&str> = (1..)
            .map_while(|i| record.attr(&format!("extra{}", i)))
            .collect();
        let optional: Vec<&str> = OPTIONAL_COLUMNS
            .iter()
            .map(|key| record.attr(key).unwrap_or(""))
            .collect();
        // Trailing empty optional columns are omitted unless extras follow.
        let keep = if extras.is_empty() {
            optional.iter().rposition(|v| !v.is_empty()).map_or(0, |i| i + 1)
        } else {
            optional.len()
        };

        for value in optional.iter().take(keep).chain(extras.iter()) {
            write!(writer, "\t{}", value)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn check_writable(record: &GeneRecord) -> io::Result<()> {
    let unwritable = |s: &str| s.contains(['\t', '\n', '\r']);
    let label = record.label.as_str();
    // Names are trimmed on read
    let bad_label = label.is_empty() || label.trim() != label || unwritable(label);
    let bad_chrom = record
        .chromosome()
        .is_some_and(|c| c.is_empty() || c == NO_CHROMOSOME || unwritable(c));

    if bad_label || bad_chrom || record.metadata.values().any(|v| unwritable(v.as_str())) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has a field that cannot be written as a gene file column", record),
        ));
    }
    Ok(())
}
