use super::column::ColumnLabels;
use super::{validate_window, TabularReader};
use crate::errors::{AppError, AppResult};
use crate::models::{CellValue, Dialect, Row};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Row streaming over delimiter-separated text (CSV, TSV, semicolon files).
///
/// Values are never type-inferred: every field is yielded as `CellValue::Text`.
#[derive(Debug, Clone)]
pub struct CsvReader {
    path: PathBuf,
    dialect: Dialect,
}

impl CsvReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_dialect(path, Dialect::default())
    }

    pub fn with_dialect(path: impl Into<PathBuf>, dialect: Dialect) -> Self {
        Self {
            path: path.into(),
            dialect,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn set_delimiter(&mut self, delimiter: char) {
        self.dialect.delimiter = delimiter;
    }

    pub fn set_enclosure(&mut self, enclosure: char) {
        self.dialect.enclosure = enclosure;
    }

    /// `None` disables escaping inside enclosures.
    pub fn set_escape(&mut self, escape: Option<char>) {
        self.dialect.escape = escape;
    }
}

impl TabularReader for CsvReader {
    type Rows<'a> = CsvRows where Self: 'a;

    /// Checks the file exists and can be opened. No parsing happens here.
    fn load(&mut self) -> AppResult<()> {
        open_readable(&self.path)?;
        debug!(file = %self.path.display(), delimiter = ?self.dialect.delimiter, "Text file ready");
        Ok(())
    }

    /// Streams records `start..=end`, counting physical lines to reach `start`.
    fn read(&mut self, start: usize, end: Option<usize>) -> AppResult<Self::Rows<'_>> {
        validate_window(start, end)?;

        let mut source = BufReader::new(open_readable(&self.path)?);
        let mut skipped = Vec::new();
        for _ in 1..start {
            skipped.clear();
            if source.read_until(b'\n', &mut skipped)? == 0 {
                break;
            }
        }

        debug!(file = %self.path.display(), start, end = ?end, "Reading text rows");
        Ok(CsvRows {
            source: Some(source),
            dialect: self.dialect,
            labels: ColumnLabels::new(),
            next_index: start,
            end,
        })
    }
}

/// Lazy row sequence of a text file. The file handle is released on exhaustion,
/// on error or when the iterator is dropped.
pub struct CsvRows {
    source: Option<BufReader<File>>,
    dialect: Dialect,
    labels: ColumnLabels,
    next_index: usize,
    end: Option<usize>,
}

impl Iterator for CsvRows {
    type Item = AppResult<(usize, Row)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.end.is_some_and(|end| self.next_index > end) {
            self.source = None;
            return None;
        }

        let source = self.source.as_mut()?;
        match read_record(source, &self.dialect) {
            Ok(Some(fields)) => {
                let mut row = Row::with_capacity(fields.len());
                for (idx, value) in fields.into_iter().enumerate() {
                    row.insert(self.labels.label(idx), CellValue::Text(value));
                }
                let index = self.next_index;
                self.next_index += 1;
                Some(Ok((index, row)))
            }
            Ok(None) => {
                self.source = None;
                None
            }
            Err(e) => {
                self.source = None;
                Some(Err(e))
            }
        }
    }
}

/// Opens `path` for reading, distinguishing a missing file from an unreadable one.
pub(crate) fn open_readable(path: &Path) -> AppResult<File> {
    if !path.exists() {
        return Err(AppError::ReaderError(format!(
            "File {} doesn't exist.",
            path.display()
        )));
    }
    File::open(path).map_err(|e| {
        AppError::ReaderError(format!("File {} isn't readable: {e}", path.display()))
    })
}

/// Tokenizes the next record into raw fields.
///
/// A field starting with the enclosure may contain delimiters and line breaks;
/// a doubled enclosure inside it is one literal enclosure, and the escape
/// character keeps itself and the following character literally. Text after a
/// closing enclosure is appended to the field. A blank line is a record with
/// no fields. Returns `None` at end of stream.
pub fn read_record<R: BufRead>(source: &mut R, dialect: &Dialect) -> AppResult<Option<Vec<String>>> {
    let mut line = String::new();
    if !next_line(source, &mut line)? {
        return Ok(None);
    }

    let mut chars: Vec<char> = line.chars().collect();
    if is_line_end(&chars, 0) {
        return Ok(Some(Vec::new()));
    }

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut at_field_start = true;
    let mut i = 0;

    loop {
        if i >= chars.len() || is_line_end(&chars, i) {
            fields.push(field);
            break;
        }

        let c = chars[i];
        if c == dialect.delimiter {
            fields.push(std::mem::take(&mut field));
            at_field_start = true;
            i += 1;
            continue;
        }

        if at_field_start && c == dialect.enclosure {
            i += 1;
            loop {
                if i >= chars.len() {
                    line.clear();
                    if !next_line(source, &mut line)? {
                        // Unterminated enclosure at end of stream
                        break;
                    }
                    chars = line.chars().collect();
                    i = 0;
                    continue;
                }

                let c = chars[i];
                if dialect.escape == Some(c) && c != dialect.enclosure && i + 1 < chars.len() {
                    field.push(c);
                    field.push(chars[i + 1]);
                    i += 2;
                } else if c == dialect.enclosure {
                    if chars.get(i + 1) == Some(&dialect.enclosure) {
                        field.push(c);
                        i += 2;
                    } else {
                        i += 1;
                        break;
                    }
                } else {
                    field.push(c);
                    i += 1;
                }
            }
            at_field_start = false;
            continue;
        }

        field.push(c);
        at_field_start = false;
        i += 1;
    }

    Ok(Some(fields))
}

fn next_line<R: BufRead>(source: &mut R, line: &mut String) -> AppResult<bool> {
    let mut bytes = Vec::new();
    if source.read_until(b'\n', &mut bytes)? == 0 {
        return Ok(false);
    }
    line.push_str(&String::from_utf8_lossy(&bytes));
    Ok(true)
}

fn is_line_end(chars: &[char], i: usize) -> bool {
    match chars.get(i) {
        Some('\n') => true,
        Some('\r') => matches!(chars.get(i + 1), None | Some('\n')),
        _ => false,
    }
}
