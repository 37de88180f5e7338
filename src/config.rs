use crate::errors::{AppError, AppResult};
use crate::reader::{validate_window, Reader};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which worksheet of a spreadsheet file to stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Name(String),
    Id(u32),
    /// 0-based position in workbook order
    Index(usize),
}

/// A read job loaded from a TOML file.
///
/// Only `file` is required. Unknown keys are rejected so typos are not
/// silently ignored.
///
/// ```toml
/// file = "data/report.xlsx"
/// start = 3
/// end = 10
/// sheet_name = "Summary"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReaderConfig {
    /// Spreadsheet or delimited text file to read
    pub file: PathBuf,
    /// First row to yield, 1-based
    #[serde(default = "default_start")]
    pub start: usize,
    /// Last row to yield; unbounded when absent
    #[serde(default)]
    pub end: Option<usize>,

    // Spreadsheet files
    #[serde(default)]
    pub sheet_name: Option<String>,
    #[serde(default)]
    pub sheet_id: Option<u32>,
    #[serde(default)]
    pub sheet_index: Option<usize>,

    // Delimited text files
    /// Overrides the detected delimiter
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub enclosure: Option<String>,
    /// An empty string disables escaping
    #[serde(default)]
    pub escape: Option<String>,
}

impl ReaderConfig {
    /// A config reading every row of `file` with detected settings.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            start: default_start(),
            end: None,
            sheet_name: None,
            sheet_id: None,
            sheet_index: None,
            delimiter: None,
            enclosure: None,
            escape: None,
        }
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the TOML is malformed, `file` is missing,
    /// unknown keys are present, or [`ReaderConfig::validate`] fails.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ReaderConfig = toml::from_str(&contents)?;

        config.validate()?;
        debug!(config = %path.display(), file = %config.file.display(), "Config loaded");
        Ok(config)
    }

    /// Checks the row window, the sheet selector and the dialect characters.
    pub fn validate(&self) -> AppResult<()> {
        validate_window(self.start, self.end)?;

        let selectors = [
            self.sheet_name.is_some(),
            self.sheet_id.is_some(),
            self.sheet_index.is_some(),
        ];
        if selectors.iter().filter(|set| **set).count() > 1 {
            return Err(AppError::InvalidArgument(
                "Only one of sheet_name, sheet_id and sheet_index may be set".into(),
            ));
        }

        if let Some(delimiter) = &self.delimiter {
            single_char("delimiter", delimiter)?;
        }
        if let Some(enclosure) = &self.enclosure {
            single_char("enclosure", enclosure)?;
        }
        if let Some(escape) = self.escape.as_deref().filter(|e| !e.is_empty()) {
            single_char("escape", escape)?;
        }
        Ok(())
    }

    pub fn sheet_selector(&self) -> Option<SheetSelector> {
        if let Some(name) = &self.sheet_name {
            Some(SheetSelector::Name(name.clone()))
        } else if let Some(id) = self.sheet_id {
            Some(SheetSelector::Id(id))
        } else {
            self.sheet_index.map(SheetSelector::Index)
        }
    }

    /// Applies the sheet selector or the dialect overrides to a loaded reader.
    ///
    /// Settings that do not apply to the reader's file kind are ignored.
    pub fn apply(&self, reader: &mut Reader) -> AppResult<()> {
        match reader {
            Reader::Xlsx(xlsx) => match self.sheet_selector() {
                Some(SheetSelector::Name(name)) => xlsx.select_sheet_by_name(&name),
                Some(SheetSelector::Id(id)) => xlsx.select_sheet_by_id(id),
                Some(SheetSelector::Index(index)) => xlsx.select_sheet_by_index(index),
                None => Ok(()),
            },
            Reader::Csv(csv) => {
                if let Some(delimiter) = &self.delimiter {
                    csv.set_delimiter(single_char("delimiter", delimiter)?);
                }
                if let Some(enclosure) = &self.enclosure {
                    csv.set_enclosure(single_char("enclosure", enclosure)?);
                }
                if let Some(escape) = &self.escape {
                    let escape = match escape.as_str() {
                        "" => None,
                        other => Some(single_char("escape", other)?),
                    };
                    csv.set_escape(escape);
                }
                Ok(())
            }
        }
    }
}

fn default_start() -> usize {
    1
}

fn single_char(field: &str, value: &str) -> AppResult<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(AppError::InvalidArgument(format!(
            "{field} must be a single character, got {value:?}"
        ))),
    }
}
