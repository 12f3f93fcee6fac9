//! Streaming reader for the tab-separated dumps.
//!
//! The dumps carry a header row, never quote fields, and spell null as `\N`.
//! Rows are handed out one at a time through [`TsvReader`]'s iterator so a
//! dataset is never held in parsed form; typed coercion happens per column
//! through the accessors on [`TsvRow`].
//!
//! Field counts are not enforced by the reader. A row whose width differs from
//! the header is still handed out, flagged through [`TsvRow::is_complete`], so
//! one bad line in a multi-million row dump costs that row and not the run.

use crate::config::NULL_SENTINEL;
use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::str::FromStr;

/// A named column resolved to its position in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Resolves a column of a dataset's fixed schema. A missing column means the
    /// upstream layout changed, which is fatal for the run.
    pub fn column(&self, name: &'static str) -> Result<Column> {
        match self.names.iter().position(|n| n == name) {
            Some(index) => Ok(Column { name, index }),
            None => bail!(
                "Missing column '{}' (header has: {})",
                name,
                self.names.join(", ")
            ),
        }
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    #[cfg(test)]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

pub struct TsvReader<R: Read> {
    reader: csv::Reader<R>,
    header: Header,
}

impl<R: Read> TsvReader<R> {
    pub fn new(source: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let names = reader
            .headers()
            .context("Failed to read header row")?
            .iter()
            .map(|name| name.trim().to_string())
            .collect();

        Ok(Self {
            reader,
            header: Header { names },
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
}

impl<'a> TsvReader<&'a [u8]> {
    pub fn from_text(text: &'a str) -> Result<Self> {
        Self::new(text.as_bytes())
    }
}

impl<R: Read> Iterator for TsvReader<R> {
    type Item = Result<TsvRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                let complete = record.len() == self.header.width();
                Some(Ok(TsvRow {
                    record,
                    line,
                    complete,
                }))
            }
            Ok(false) => None,
            Err(e) => Some(Err(anyhow::Error::new(e).context("Malformed row"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TsvRow {
    record: StringRecord,
    line: u64,
    complete: bool,
}

impl TsvRow {
    /// 1-based line number in the source text.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Whether the row has exactly as many fields as the header.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Raw field, with the null sentinel mapped to `None`.
    pub fn field(&self, column: Column) -> Option<&str> {
        match self.record.get(column.index) {
            Some(NULL_SENTINEL) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Numeric field. Null and values that don't parse as `T` are both `None`;
    /// callers decide whether that skips the row or just leaves a gap.
    pub fn number<T: FromStr>(&self, column: Column) -> Option<T> {
        self.field(column).and_then(|value| value.trim().parse().ok())
    }

    /// `0`/`1` columns such as `isAdult`. Only `1` is true.
    pub fn flag(&self, column: Column) -> bool {
        matches!(self.field(column).map(str::trim), Some("1"))
    }
}
