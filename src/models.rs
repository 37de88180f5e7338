use crate::constants::{DEFAULT_DELIMITER, DEFAULT_ENCLOSURE, DEFAULT_ESCAPE};
use indexmap::IndexMap;
use serde::Serialize;

/// Scalar value of one cell after type coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Calendar timestamp rendered as `YYYY-MM-DD HH:MM:SS` (UTC)
    Timestamp(String),
    Empty,
}

impl CellValue {
    /// Returns the textual payload for `Text` and `Timestamp` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Timestamp(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One record: column label -> value, in the order columns were encountered.
///
/// Only columns physically present in the record are keys; nothing is synthesized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: IndexMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: IndexMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, label: impl Into<String>, value: CellValue) {
        self.cells.insert(label.into(), value);
    }

    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.cells.get(label)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy of the row without `Empty` values and empty strings.
    pub fn non_blank(&self) -> Row {
        let cells = self
            .cells
            .iter()
            .filter(|(_, v)| match v {
                CellValue::Empty => false,
                CellValue::Text(s) => !s.is_empty(),
                _ => true,
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Row { cells }
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Row {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Worksheet declared by a workbook, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worksheet {
    pub id: u32,
    pub name: String,
}

/// How a cell's raw text must be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    InlineString,
    SharedString,
    Date,
    Boolean,
    /// Numbers, formula strings, errors: numeric text is coerced, the rest kept as text
    General,
}

impl CellType {
    /// Maps the `t` attribute of a `<c>` element.
    pub fn from_attribute(value: &str) -> Self {
        match value {
            "inlineStr" => Self::InlineString,
            "s" => Self::SharedString,
            "d" => Self::Date,
            "b" => Self::Boolean,
            _ => Self::General,
        }
    }
}

/// One `<xf>` entry of the cell-format list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatEntry {
    /// Resolved number-format code, if the id was known
    pub style: Option<String>,
    /// `Some(CellType::Date)` when the format code renders a date or time
    pub kind: Option<CellType>,
}

/// Delimiter, enclosure and escape characters of a text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: char,
    pub enclosure: char,
    /// `None` disables escaping inside enclosures
    pub escape: Option<char>,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            enclosure: DEFAULT_ENCLOSURE,
            escape: Some(DEFAULT_ESCAPE),
        }
    }
}

impl Dialect {
    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }
}
