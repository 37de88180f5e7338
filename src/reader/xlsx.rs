use super::column::{column_index, column_label, column_of_reference};
use super::dates::serial_to_timestamp;
use super::metadata::{self, resolve_part_path};
use super::xml::{NodeKind, XmlCursor};
use super::{validate_window, TabularReader};
use crate::constants::{SHARED_STRINGS_PART, STYLES_PART, WORKBOOK_PART, WORKBOOK_RELS_PART};
use crate::errors::{AppError, AppResult};
use crate::models::{CellType, CellValue, FormatEntry, Row, Worksheet};
use std::collections::HashMap;
use std::fs::File;
use flate2::read::DeflateDecoder;
use std::io::{BufReader, Read, Seek, SeekFrom, Take};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::{CompressionMethod, ZipArchive};

/// Row streaming over one worksheet of a zip-archived XML workbook.
///
/// [`TabularReader::load`] reads the workbook, shared-strings and styles parts
/// once; every [`TabularReader::read`] then streams the selected worksheet part.
#[derive(Debug)]
pub struct XlsxReader {
    path: PathBuf,
    date1904: bool,
    shared: Vec<String>,
    formats: Vec<FormatEntry>,
    worksheets: Vec<Worksheet>,
    /// Archive path of each worksheet part, parallel to `worksheets`
    parts: Vec<String>,
    selected: Option<usize>,
}

impl XlsxReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            date1904: false,
            shared: Vec::new(),
            formats: Vec::new(),
            worksheets: Vec::new(),
            parts: Vec::new(),
            selected: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether date serials count from 1904 instead of 1900.
    pub fn is_date1904(&self) -> bool {
        self.date1904
    }

    pub fn shared_strings(&self) -> &[String] {
        &self.shared
    }

    pub fn formats(&self) -> &[FormatEntry] {
        &self.formats
    }

    /// Worksheets in workbook order.
    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    /// The worksheet `read` will stream, selecting the first one if none was chosen.
    pub fn selected_worksheet(&mut self) -> AppResult<&Worksheet> {
        let index = self.ensure_selected()?;
        Ok(&self.worksheets[index])
    }

    /// Selects by position in workbook order (0-based).
    pub fn select_sheet_by_index(&mut self, index: usize) -> AppResult<()> {
        if index >= self.worksheets.len() {
            return Err(AppError::NotFound(format!("Worksheet index: {index} not found.")));
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn select_sheet_by_id(&mut self, id: u32) -> AppResult<()> {
        let index = self
            .worksheets
            .iter()
            .position(|sheet| sheet.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Worksheet id: {id} not found.")))?;
        self.selected = Some(index);
        Ok(())
    }

    pub fn select_sheet_by_name(&mut self, name: &str) -> AppResult<()> {
        let index = self
            .worksheets
            .iter()
            .position(|sheet| sheet.name == name)
            .ok_or_else(|| AppError::NotFound(format!("Worksheet name: {name} not found.")))?;
        self.selected = Some(index);
        Ok(())
    }

    fn ensure_selected(&mut self) -> AppResult<usize> {
        match self.selected {
            Some(index) => Ok(index),
            None => {
                self.select_sheet_by_index(0)?;
                Ok(0)
            }
        }
    }

    fn open_archive(&self) -> AppResult<ZipArchive<File>> {
        let file = File::open(&self.path).map_err(|e| {
            AppError::ReaderError(format!("Can't open file {}: {e}", self.path.display()))
        })?;
        Ok(ZipArchive::new(file)?)
    }

    /// Opens a worksheet part as a stream that inflates on demand.
    ///
    /// The archive index is only used to locate the entry's data; the stream
    /// itself reads the file from that offset, so it outlives the archive.
    fn open_part_stream(&self, part: &str) -> AppResult<PartStream> {
        let (data_start, compressed_size, compression) = {
            let mut archive = self.open_archive()?;
            let entry = open_part(&mut archive, part)?
                .ok_or_else(|| AppError::ReaderError(format!("Can't open part {part}.")))?;
            (entry.data_start(), entry.compressed_size(), entry.compression())
        };

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(data_start))?;
        let raw = file.take(compressed_size);

        debug!(
            part,
            compressed_bytes = compressed_size,
            method = ?compression,
            "Worksheet part opened"
        );
        match compression {
            CompressionMethod::Stored => Ok(PartStream::Stored(raw)),
            CompressionMethod::Deflated => Ok(PartStream::Deflated(DeflateDecoder::new(raw))),
            other => Err(AppError::ReaderError(format!(
                "Unsupported compression {other:?} for part {part}"
            ))),
        }
    }
}

/// Bytes of one archive entry, decompressed as they are pulled.
enum PartStream {
    Stored(Take<File>),
    Deflated(DeflateDecoder<Take<File>>),
}

impl Read for PartStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            PartStream::Stored(inner) => inner.read(buf),
            PartStream::Deflated(inner) => inner.read(buf),
        }
    }
}

impl TabularReader for XlsxReader {
    type Rows<'a> = XlsxRows<'a> where Self: 'a;

    fn load(&mut self) -> AppResult<()> {
        let mut archive = self.open_archive()?;

        let workbook = open_part(&mut archive, WORKBOOK_PART)?.ok_or_else(|| {
            AppError::ReaderError(format!(
                "File {} does not contain {WORKBOOK_PART}",
                self.path.display()
            ))
        })?;
        let info = metadata::load_workbook(BufReader::new(workbook))?;

        let relationships = match open_part(&mut archive, WORKBOOK_RELS_PART)? {
            Some(rels) => metadata::load_relationships(BufReader::new(rels))?,
            None => HashMap::new(),
        };

        let shared = match open_part(&mut archive, SHARED_STRINGS_PART)? {
            Some(part) => metadata::load_shared_strings(BufReader::new(part))?,
            None => Vec::new(),
        };

        let formats = match open_part(&mut archive, STYLES_PART)? {
            Some(part) => metadata::load_formats(BufReader::new(part))?,
            None => Vec::new(),
        };

        let mut worksheets = Vec::with_capacity(info.sheets.len());
        let mut parts = Vec::with_capacity(info.sheets.len());
        for entry in info.sheets {
            let part = match entry.rel_id.as_ref().and_then(|id| relationships.get(id)) {
                Some(target) => resolve_part_path(target),
                None => {
                    let fallback = format!("xl/worksheets/sheet{}.xml", entry.worksheet.id);
                    warn!(
                        sheet = %entry.worksheet.name,
                        part = %fallback,
                        "No relationship for worksheet, using conventional part name"
                    );
                    fallback
                }
            };
            parts.push(part);
            worksheets.push(entry.worksheet);
        }

        self.date1904 = info.date1904;
        self.shared = shared;
        self.formats = formats;
        self.worksheets = worksheets;
        self.parts = parts;
        self.selected = None;

        info!(
            file = %self.path.display(),
            worksheets = self.worksheets.len(),
            shared_strings = self.shared.len(),
            formats = self.formats.len(),
            date1904 = self.date1904,
            "Workbook loaded"
        );
        Ok(())
    }

    /// Streams rows of the selected worksheet whose declared index is in `[start, end]`.
    ///
    /// Fails with `NotFound` when no worksheet exists or the worksheet has no row.
    fn read(&mut self, start: usize, end: Option<usize>) -> AppResult<Self::Rows<'_>> {
        validate_window(start, end)?;

        let index = self.ensure_selected()?;
        let part = self.parts[index].clone();
        let stream = self.open_part_stream(&part)?;

        let mut cursor = XmlCursor::new(BufReader::new(stream));
        if !cursor.find("row")? {
            return Err(AppError::NotFound(format!("Can't find any row in {part}")));
        }

        debug!(
            sheet = %self.worksheets[index].name,
            start,
            end = ?end,
            "Reading worksheet rows"
        );
        Ok(XlsxRows {
            cells: CellContext {
                shared: &self.shared,
                formats: &self.formats,
                date1904: self.date1904,
            },
            cursor: Some(cursor),
            on_row: true,
            last_index: 0,
            start,
            end,
        })
    }
}

/// Lookup tables a cell needs for coercion.
#[derive(Debug, Clone, Copy)]
struct CellContext<'a> {
    shared: &'a [String],
    formats: &'a [FormatEntry],
    date1904: bool,
}

impl CellContext<'_> {
    /// Type from the `t` attribute, else from the date classification of the `s` style.
    fn resolve_type(&self, explicit: Option<&str>, style: Option<&str>) -> CellType {
        if let Some(t) = explicit {
            return CellType::from_attribute(t);
        }
        style
            .and_then(|s| s.trim().parse::<usize>().ok())
            .and_then(|s| self.formats.get(s))
            .and_then(|format| format.kind)
            .unwrap_or(CellType::General)
    }
}

/// Lazy row sequence of one worksheet.
///
/// The worksheet part is inflated only as far as rows are pulled, and is
/// closed once the window is passed, the rows
/// run out, an error occurs, or the iterator is dropped.
pub struct XlsxRows<'a> {
    cells: CellContext<'a>,
    cursor: Option<XmlCursor<BufReader<PartStream>>>,
    /// Cursor already sits on the next `<row>` start
    on_row: bool,
    last_index: usize,
    start: usize,
    end: Option<usize>,
}

impl XlsxRows<'_> {
    fn next_row(&mut self) -> AppResult<Option<(usize, Row)>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };

        loop {
            if !self.on_row && !cursor.find("row")? {
                return Ok(None);
            }
            self.on_row = false;

            let index = match cursor.attribute("r") {
                Some(r) => r.trim().parse::<usize>().map_err(|_| {
                    AppError::ParseError(format!("Invalid row index attribute r=\"{r}\""))
                })?,
                None => self.last_index + 1,
            };
            self.last_index = index;

            if index < self.start {
                continue;
            }
            if self.end.is_some_and(|end| index > end) {
                return Ok(None);
            }

            let row = read_row(cursor, &self.cells)?;
            return Ok(Some((index, row)));
        }
    }
}

impl Iterator for XlsxRows<'_> {
    type Item = AppResult<(usize, Row)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.cursor = None;
                None
            }
            Err(e) => {
                self.cursor = None;
                Some(Err(e))
            }
        }
    }
}

/// Reads the cells of the `<row>` the cursor sits on, leaving it on `</row>`.
fn read_row<R: std::io::BufRead>(cursor: &mut XmlCursor<R>, cells: &CellContext<'_>) -> AppResult<Row> {
    if cursor.is_empty_element() {
        return Ok(Row::new());
    }

    let mut row = Row::new();
    let mut next_column = 0usize;

    while let Some(kind) = cursor.advance()? {
        if kind == NodeKind::EndElement && cursor.name() == "row" {
            break;
        }
        if !cursor.is_element("c") {
            continue;
        }

        let label = match cursor.attribute("r") {
            Some(reference) => column_of_reference(reference).to_string(),
            None => column_label(next_column),
        };
        next_column = column_index(&label).map_or(next_column + 1, |i| i + 1);

        let cell_type = cells.resolve_type(cursor.attribute("t"), cursor.attribute("s"));
        let raw = if cursor.is_empty_element() {
            None
        } else {
            read_cell_text(cursor, cell_type)?
        };

        row.insert(label, coerce(raw.as_deref(), cell_type, cells)?);
    }

    Ok(row)
}

/// Text of the cell's value child, scoped to the current `<c>` element.
///
/// Inline strings concatenate every `<t>` under `<is>`; other cells read `<v>`.
/// A cell with a formula but no cached value yields `None`.
fn read_cell_text<R: std::io::BufRead>(
    cursor: &mut XmlCursor<R>,
    cell_type: CellType,
) -> AppResult<Option<String>> {
    let target = if cell_type == CellType::InlineString {
        "t"
    } else {
        "v"
    };
    let mut value: Option<String> = None;

    while let Some(kind) = cursor.advance()? {
        match kind {
            NodeKind::EndElement if cursor.name() == "c" => break,
            NodeKind::Element if cursor.name() == "rPh" => {
                cursor.read_value()?;
            }
            NodeKind::Element if cursor.name() == target => {
                if let Some(text) = cursor.read_value()? {
                    value.get_or_insert_with(String::new).push_str(&text);
                }
            }
            _ => {}
        }
    }

    Ok(value)
}

/// Turns a cell's raw text into a typed value.
fn coerce(raw: Option<&str>, cell_type: CellType, cells: &CellContext<'_>) -> AppResult<CellValue> {
    let Some(raw) = raw else {
        return Ok(CellValue::Empty);
    };

    let value = match cell_type {
        CellType::InlineString => CellValue::Text(raw.to_string()),
        CellType::SharedString => {
            let text = raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| cells.shared.get(idx))
                .ok_or_else(|| {
                    AppError::ParseError(format!("Shared string index {raw} out of range"))
                })?;
            CellValue::Text(text.clone())
        }
        CellType::Date => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|serial| serial_to_timestamp(serial, cells.date1904))
            .map(CellValue::Timestamp)
            .unwrap_or_else(|| CellValue::Text(raw.to_string())),
        CellType::Boolean => CellValue::Boolean(!(raw.is_empty() || raw == "0")),
        CellType::General => coerce_number(raw),
    };
    Ok(value)
}

/// Numeric text without a decimal point becomes `Integer` when its value is
/// whole and fits `i64` (so `1E5` is an integer); other numeric text becomes
/// `Float` and anything else stays text.
pub fn coerce_number(raw: &str) -> CellValue {
    if !is_numeric(raw) {
        return CellValue::Text(raw.to_string());
    }

    let trimmed = raw.trim();
    let integral = !trimmed.contains('.');
    if integral {
        if let Ok(int) = trimmed.parse::<i64>() {
            return CellValue::Integer(int);
        }
    }
    match trimmed.parse::<f64>() {
        Ok(float) if integral && fits_i64(float) => CellValue::Integer(float as i64),
        Ok(float) => CellValue::Float(float),
        Err(_) => CellValue::Text(raw.to_string()),
    }
}

fn fits_i64(value: f64) -> bool {
    value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64
}

/// Optional sign, digits with an optional fraction, optional exponent; surrounding
/// whitespace allowed.
fn is_numeric(text: &str) -> bool {
    let bytes = text.trim().as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }

    if digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

/// Opens an archive entry, mapping a missing entry to `None`.
fn open_part<'a, R: Read + Seek>(
    archive: &'a mut ZipArchive<R>,
    name: &str,
) -> AppResult<Option<ZipFile<'a>>> {
    match archive.by_name(name) {
        Ok(entry) => Ok(Some(entry)),
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
