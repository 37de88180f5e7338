use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// File extension is not one of the supported container families
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// File, archive or part is missing, unreadable or structurally unusable
    #[error("Reader error: {0}")]
    ReaderError(String),
    /// Requested worksheet does not exist
    #[error("Not found: {0}")]
    NotFound(String),
    /// Caller supplied an invalid argument (row window, dialect, config)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// XML content could not be parsed or referenced missing data
    #[error("Parse error: {0}")]
    ParseError(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(String),
}

impl AppError {
    /// Whether the error belongs to the reader family (input could not be read).
    ///
    /// Argument and format errors are raised before any I/O and are not part of it.
    pub fn is_reader_error(&self) -> bool {
        matches!(
            self,
            AppError::ReaderError(_)
                | AppError::NotFound(_)
                | AppError::ParseError(_)
                | AppError::IoError(_)
        )
    }
}

// Conversion implementations for common errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(err: quick_xml::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for AppError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        AppError::ParseError(format!("Invalid XML attribute: {err}"))
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::ReaderError(format!("Invalid archive: {err}"))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::InvalidArgument(format!("Failed to parse config: {err}"))
    }
}

// Custom type alias for Results in this crate
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn test_unsupported_format_display() {
        let err = AppError::UnsupportedFormat("xls".to_string());
        assert!(err.to_string().contains("Unsupported file format"));
        assert!(err.to_string().contains("xls"));
    }

    #[test]
    fn test_reader_error_display() {
        let err = AppError::ReaderError("Can't find any row".to_string());
        assert!(err.to_string().contains("Reader error"));
        assert!(err.to_string().contains("Can't find any row"));
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = AppError::InvalidArgument("start must be greater than 0".to_string());
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_reader_family_membership() {
        assert!(AppError::NotFound("sheet".into()).is_reader_error());
        assert!(AppError::IoError("disk".into()).is_reader_error());
        assert!(AppError::ParseError("xml".into()).is_reader_error());
        assert!(!AppError::InvalidArgument("start".into()).is_reader_error());
        assert!(!AppError::UnsupportedFormat("doc".into()).is_reader_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::IoError(msg) if msg.contains("missing.csv")));
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: AppError = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, AppError::ReaderError(msg) if msg.starts_with("Invalid archive")));
    }

    #[test]
    fn test_toml_error_conversion() {
        let parse = toml::from_str::<crate::config::ReaderConfig>("file = ").unwrap_err();
        let err: AppError = parse.into();
        assert!(matches!(err, AppError::InvalidArgument(msg) if msg.starts_with("Failed to parse config")));
    }

    #[test]
    fn test_app_error_implements_error_trait() {
        use std::error::Error;
        let err: Box<dyn Error> = Box::new(AppError::ReaderError("test".to_string()));
        assert!(!err.to_string().is_empty());
    }
}
