use crate::error::{ProcessingError, Result};
use crate::models::{IrradiationRow, IrradiationTable};
use crate::settings::ConverterConfig;
use crate::utils::constants::{
    DEFAULT_SKIP_ROWS, DEFAULT_VALUE_COLUMN, DEFAULT_YEAR_COLUMN,
};
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Reads the year and value columns of a HelioClim CSV export.
///
/// The first `skip_rows` physical lines are dropped unconditionally. After
/// that, blank lines and lines starting with the comment marker are ignored
/// and every remaining line must carry numeric values in both columns.
pub struct HelioClimReader {
    skip_rows: usize,
    delimiter: u8,
    comment: Option<u8>,
    year_column: usize,
    value_column: usize,
}

impl HelioClimReader {
    pub fn new() -> Self {
        Self {
            skip_rows: DEFAULT_SKIP_ROWS,
            delimiter: b';',
            comment: Some(b'#'),
            year_column: DEFAULT_YEAR_COLUMN,
            value_column: DEFAULT_VALUE_COLUMN,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Result<Self> {
        Ok(Self {
            skip_rows: config.skip_rows,
            delimiter: config.delimiter_byte()?,
            comment: config.comment_byte()?,
            year_column: config.year_column,
            value_column: config.value_column,
        })
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_columns(mut self, year_column: usize, value_column: usize) -> Self {
        self.year_column = year_column;
        self.value_column = value_column;
        self
    }

    /// Load an export from disk
    pub fn read_table(&self, path: &Path) -> Result<IrradiationTable> {
        let bytes = fs::read(path).map_err(|source| ProcessingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = decode(&bytes, path);
        let table = self.parse_str(path, &content)?;

        debug!("Loaded {} rows from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse export content; `source` is only used for error locations.
    pub fn parse_str(&self, source: &Path, content: &str) -> Result<IrradiationTable> {
        let body = match self.body_offset(content) {
            Some(offset) => &content[offset..],
            None => {
                warn!(
                    "{} has no more than {} lines; no data rows",
                    source.display(),
                    self.skip_rows
                );
                ""
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .comment(self.comment)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;

            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            let line = self.skip_rows as u64 + record.position().map_or(0, |p| p.line());
            let year = parse_field(&record, self.year_column, source, line)?;
            let value = parse_field(&record, self.value_column, source, line)?;

            rows.push(IrradiationRow::new(year, value));
        }

        Ok(IrradiationTable::new(source.to_path_buf(), rows))
    }

    /// Byte offset of the first line after the skipped block
    fn body_offset(&self, content: &str) -> Option<usize> {
        if self.skip_rows == 0 {
            return Some(0);
        }

        content
            .match_indices('\n')
            .nth(self.skip_rows - 1)
            .map(|(index, _)| index + 1)
    }
}

impl Default for HelioClimReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_field(record: &csv::StringRecord, column: usize, source: &Path, line: u64) -> Result<f64> {
    let field = record.get(column).ok_or_else(|| ProcessingError::Parse {
        path: source.to_path_buf(),
        line,
        column,
        value: String::new(),
    })?;

    field.parse::<f64>().map_err(|_| ProcessingError::Parse {
        path: source.to_path_buf(),
        line,
        column,
        value: field.to_string(),
    })
}

/// Exports are normally UTF-8, but older downloads carry Latin-1 metadata.
fn decode<'a>(bytes: &'a [u8], path: &Path) -> Cow<'a, str> {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text;
    }

    debug!("{} is not valid UTF-8, decoding as Windows-1252", path.display());
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text
}
