//! One-shot loaders for the small workbook parts: workbook, relationships,
//! shared strings and styles.

use super::xml::{NodeKind, XmlCursor};
use crate::constants::{BUILTIN_NUMBER_FORMATS, DATE_TIME_TOKENS};
use crate::errors::{AppError, AppResult};
use crate::models::{CellType, FormatEntry, Worksheet};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;
use std::sync::OnceLock;
use tracing::debug;

/// Either an escaped character pair or a bracketed directive such as `[Red]` or `[$-409]`.
const BRACKET_DIRECTIVE_PATTERN: &str = r"\\.|\[(?:\\.|[^\]\\\n])+\]";

/// Compiled once, shared by every styles load.
static BRACKET_DIRECTIVE: OnceLock<Regex> = OnceLock::new();

/// Worksheet declaration as found in the workbook part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub worksheet: Worksheet,
    /// Relationship id pointing at the worksheet part
    pub rel_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct WorkbookInfo {
    pub date1904: bool,
    pub sheets: Vec<SheetEntry>,
}

/// Reads the date system flag and the worksheet declarations, in file order.
pub fn load_workbook<R: BufRead>(source: R) -> AppResult<WorkbookInfo> {
    let mut cursor = XmlCursor::new(source);
    let mut info = WorkbookInfo::default();

    while let Some(kind) = cursor.advance()? {
        if kind != NodeKind::Element {
            continue;
        }

        if cursor.name() == "date1904" {
            let value = cursor.read_value()?.unwrap_or_default();
            info.date1904 = is_truthy(value.trim());
        } else if cursor.name() == "workbookPr" {
            if let Some(value) = cursor.attribute("date1904") {
                info.date1904 = is_truthy(value.trim());
            }
        } else if cursor.name() == "sheet" {
            let name = cursor.attribute("name").unwrap_or_default().to_string();
            let id = cursor
                .attribute("sheetId")
                .and_then(|id| id.trim().parse::<u32>().ok())
                .ok_or_else(|| {
                    AppError::ParseError(format!("Worksheet '{name}' has no valid sheetId"))
                })?;
            let rel_id = cursor
                .attribute("r:id")
                .or_else(|| local_attribute(&cursor, "id"))
                .map(str::to_string);

            info.sheets.push(SheetEntry {
                worksheet: Worksheet { id, name },
                rel_id,
            });
        }
    }

    debug!(
        sheets = info.sheets.len(),
        date1904 = info.date1904,
        "Workbook part loaded"
    );
    Ok(info)
}

/// Reads the workbook relationships part: relationship id -> target.
pub fn load_relationships<R: BufRead>(source: R) -> AppResult<HashMap<String, String>> {
    let mut cursor = XmlCursor::new(source);
    let mut targets = HashMap::new();

    while cursor.find("Relationship")? {
        if let (Some(id), Some(target)) = (cursor.attribute("Id"), cursor.attribute("Target")) {
            targets.insert(id.to_string(), target.to_string());
        }
    }

    Ok(targets)
}

/// Archive path of a relationship target relative to the `xl/` folder.
pub fn resolve_part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

/// Reads the shared string table: one entry per `<si>`, rich-text runs concatenated.
pub fn load_shared_strings<R: BufRead>(source: R) -> AppResult<Vec<String>> {
    let mut cursor = XmlCursor::new(source);
    let mut strings = Vec::new();
    let mut current: Option<String> = None;

    while let Some(kind) = cursor.advance()? {
        match kind {
            NodeKind::Element if cursor.name() == "si" => {
                if cursor.is_empty_element() {
                    strings.push(String::new());
                } else {
                    current = Some(String::new());
                }
            }
            NodeKind::Element if cursor.name() == "rPh" => {
                // Phonetic hints are not part of the visible text
                cursor.read_value()?;
            }
            NodeKind::Element if cursor.name() == "t" => {
                let text = cursor.read_value()?;
                if let (Some(item), Some(text)) = (current.as_mut(), text) {
                    item.push_str(&text);
                }
            }
            NodeKind::EndElement if cursor.name() == "si" => {
                strings.push(current.take().unwrap_or_default());
            }
            _ => {}
        }
    }

    debug!(count = strings.len(), "Shared strings loaded");
    Ok(strings)
}

/// Builds the cell-format table from the styles part.
///
/// Built-in number formats are seeded first, `<numFmt>` declarations add or
/// override codes, then each `<xf>` inside `<cellXfs>` becomes one entry in
/// file order, so the entry index is the `s` attribute of a cell.
pub fn load_formats<R: BufRead>(source: R) -> AppResult<Vec<FormatEntry>> {
    let mut cursor = XmlCursor::new(source);
    let mut codes: HashMap<u32, String> = BUILTIN_NUMBER_FORMATS
        .iter()
        .map(|(id, code)| (*id, (*code).to_string()))
        .collect();
    let mut formats = Vec::new();
    let mut in_cell_xfs = false;

    while let Some(kind) = cursor.advance()? {
        if cursor.name() == "cellXfs" {
            match kind {
                NodeKind::Element => in_cell_xfs = !cursor.is_empty_element(),
                NodeKind::EndElement => in_cell_xfs = false,
                NodeKind::Text => {}
            }
            continue;
        }

        if kind != NodeKind::Element {
            continue;
        }

        if cursor.name() == "numFmt" {
            let id = cursor
                .attribute("numFmtId")
                .and_then(|id| id.trim().parse::<u32>().ok());
            if let (Some(id), Some(code)) = (id, cursor.attribute("formatCode")) {
                codes.insert(id, code.to_string());
            }
        } else if cursor.name() == "xf" && in_cell_xfs {
            let id = cursor
                .attribute("numFmtId")
                .and_then(|id| id.trim().parse::<u32>().ok());
            let style = id.and_then(|id| codes.get(&id)).cloned();
            let kind = match (id, style.as_deref()) {
                (Some(id), Some(code)) if id != 0 && is_date_format(code) => Some(CellType::Date),
                _ => None,
            };
            formats.push(FormatEntry { style, kind });
        }
    }

    debug!(
        count = formats.len(),
        custom = codes.len().saturating_sub(BUILTIN_NUMBER_FORMATS.len()),
        "Cell formats loaded"
    );
    Ok(formats)
}

/// Whether a number-format code renders a date or a time.
pub fn is_date_format(code: &str) -> bool {
    let cleaned = strip_bracket_directives(code);
    DATE_TIME_TOKENS.iter().any(|token| cleaned.contains(*token))
}

/// Removes bracketed locale, color and elapsed-time directives that are not escaped.
pub fn strip_bracket_directives(code: &str) -> Cow<'_, str> {
    let regex = BRACKET_DIRECTIVE.get_or_init(|| {
        Regex::new(BRACKET_DIRECTIVE_PATTERN).expect("BRACKET_DIRECTIVE_PATTERN is a valid regex pattern")
    });
    regex.replace_all(code, |caps: &Captures| {
        let matched = &caps[0];
        if matched.starts_with('\\') {
            matched.to_string()
        } else {
            String::new()
        }
    })
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value == "true"
}

/// Attribute looked up by local name, ignoring its namespace prefix.
fn local_attribute<'c, R: BufRead>(cursor: &'c XmlCursor<R>, local: &str) -> Option<&'c str> {
    let suffix = format!(":{local}");
    cursor.attribute_matching(|key| key.ends_with(&suffix))
}
