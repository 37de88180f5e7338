//! Row streaming engines and reader selection.

pub mod column;
pub mod csv;
pub mod dates;
pub mod detect;
pub mod metadata;
pub mod xlsx;
pub mod xml;

pub use csv::{CsvReader, CsvRows};
pub use xlsx::{XlsxReader, XlsxRows};

use crate::constants::{CSV_EXTENSION, TSV_EXTENSION, XLSX_EXTENSIONS};
use crate::errors::{AppError, AppResult};
use crate::models::{Dialect, Row};
use std::path::Path;
use tracing::debug;

/// Contract shared by both container families.
///
/// `load` prepares lookup state once; `read` returns a lazy, pull-driven row
/// sequence for the inclusive window `[start, end]` (`end = None` is unbounded).
/// The sequence owns its file handles and releases them when exhausted or dropped.
pub trait TabularReader {
    type Rows<'a>: Iterator<Item = AppResult<(usize, Row)>>
    where
        Self: 'a;

    fn load(&mut self) -> AppResult<()>;

    fn read(&mut self, start: usize, end: Option<usize>) -> AppResult<Self::Rows<'_>>;
}

/// Rejects a row window before any resource is opened.
pub fn validate_window(start: usize, end: Option<usize>) -> AppResult<()> {
    if start < 1 {
        return Err(AppError::InvalidArgument(
            "start must be greater than 0".into(),
        ));
    }
    if let Some(end) = end {
        if end < start {
            return Err(AppError::InvalidArgument(format!(
                "end ({end}) must not be less than start ({start})"
            )));
        }
    }
    Ok(())
}

/// A reader for one file, spreadsheet or delimited text.
#[derive(Debug)]
pub enum Reader {
    Xlsx(XlsxReader),
    Csv(CsvReader),
}

impl Reader {
    pub fn as_xlsx(&self) -> Option<&XlsxReader> {
        match self {
            Self::Xlsx(reader) => Some(reader),
            Self::Csv(_) => None,
        }
    }

    pub fn as_xlsx_mut(&mut self) -> Option<&mut XlsxReader> {
        match self {
            Self::Xlsx(reader) => Some(reader),
            Self::Csv(_) => None,
        }
    }

    pub fn as_csv_mut(&mut self) -> Option<&mut CsvReader> {
        match self {
            Self::Csv(reader) => Some(reader),
            Self::Xlsx(_) => None,
        }
    }
}

/// Row sequence of either engine.
pub enum Rows<'a> {
    Xlsx(XlsxRows<'a>),
    Csv(CsvRows),
}

impl Iterator for Rows<'_> {
    type Item = AppResult<(usize, Row)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Xlsx(rows) => rows.next(),
            Self::Csv(rows) => rows.next(),
        }
    }
}

impl TabularReader for Reader {
    type Rows<'a> = Rows<'a> where Self: 'a;

    fn load(&mut self) -> AppResult<()> {
        match self {
            Self::Xlsx(reader) => reader.load(),
            Self::Csv(reader) => reader.load(),
        }
    }

    fn read(&mut self, start: usize, end: Option<usize>) -> AppResult<Self::Rows<'_>> {
        match self {
            Self::Xlsx(reader) => reader.read(start, end).map(Rows::Xlsx),
            Self::Csv(reader) => reader.read(start, end).map(Rows::Csv),
        }
    }
}

/// Chooses an engine from the file extension (case-sensitive).
///
/// `xlsx`, `xlsm`, `xltx` and `xltm` open the spreadsheet engine, `tsv` the text
/// engine with a tab delimiter, `csv` the text engine with a delimiter detected
/// from the first line. Anything else is an unsupported format.
pub fn create_reader(path: impl AsRef<Path>) -> AppResult<Reader> {
    let path = path.as_ref();
    let name = path.to_string_lossy();
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .ok_or_else(|| AppError::UnsupportedFormat(name.to_string()))?;

    let reader = match extension {
        ext if XLSX_EXTENSIONS.contains(&ext) => Reader::Xlsx(XlsxReader::new(path)),
        TSV_EXTENSION => Reader::Csv(CsvReader::with_dialect(path, Dialect::with_delimiter('\t'))),
        CSV_EXTENSION => Reader::Csv(CsvReader::with_dialect(path, detect::detect_dialect(path)?)),
        other => return Err(AppError::UnsupportedFormat(other.to_string())),
    };

    debug!(file = %path.display(), extension, "Reader selected");
    Ok(reader)
}
