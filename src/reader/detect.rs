use super::csv::open_readable;
use crate::constants::{DEFAULT_DELIMITER, DEFAULT_ENCLOSURE, DEFAULT_ESCAPE};
use crate::errors::AppResult;
use crate::models::Dialect;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Picks the dialect of a `.csv` file by looking at its first physical line only.
///
/// Fails with a reader error if the file is missing or unreadable.
pub fn detect_dialect(path: &Path) -> AppResult<Dialect> {
    let mut source = BufReader::new(open_readable(path)?);
    let mut first_line = Vec::new();
    source.read_until(b'\n', &mut first_line)?;

    let delimiter = detect_delimiter(&String::from_utf8_lossy(&first_line));
    debug!(file = %path.display(), delimiter = ?delimiter, "Delimiter detected");
    Ok(Dialect::with_delimiter(delimiter))
}

/// Returns `,` or `;`, whichever unescaped delimiter outside an enclosure comes first.
///
/// Enclosed sections are skipped up to their unescaped closing quote so quoted
/// delimiters never decide. Falls back to `,` when neither is found.
pub fn detect_delimiter(line: &str) -> char {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let escaped = i > 0 && chars[i - 1] == DEFAULT_ESCAPE;
        match chars[i] {
            ',' if !escaped => return ',',
            ';' if !escaped => return ';',
            c if c == DEFAULT_ENCLOSURE && !escaped => {
                i += 1;
                while i < chars.len()
                    && !(chars[i] == DEFAULT_ENCLOSURE && chars[i - 1] != DEFAULT_ESCAPE)
                {
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    DEFAULT_DELIMITER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn comma_before_quoted_semicolon() {
        assert_eq!(detect_delimiter("a,b,\"c;d\",e\n"), ',');
    }

    #[test]
    fn semicolon_before_quoted_comma() {
        assert_eq!(detect_delimiter("a;b;\"c,d\";e\n"), ';');
    }

    #[test]
    fn quoted_only_line_falls_back_to_comma() {
        assert_eq!(detect_delimiter("\"a,b;c\"\n"), ',');
        assert_eq!(detect_delimiter(""), ',');
    }

    #[test]
    fn first_unquoted_delimiter_wins() {
        assert_eq!(detect_delimiter("\"x,y\";z,w"), ';');
    }

    #[test]
    fn escaped_delimiters_are_ignored() {
        assert_eq!(detect_delimiter("a\\,b;c"), ';');
        assert_eq!(detect_delimiter("\"a\\\",b\";c"), ';');
    }

    #[test]
    fn detects_from_file_first_line_only() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, ";ghi;\"x\"\na,b,c\n").unwrap();
        assert_eq!(detect_dialect(tmp.path()).unwrap().delimiter, ';');
    }

    #[test]
    fn missing_file_is_a_reader_error() {
        let err = detect_dialect(Path::new("/no/such/file.csv")).unwrap_err();
        assert!(matches!(err, AppError::ReaderError(_)));
    }
}
