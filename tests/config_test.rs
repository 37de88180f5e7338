//! Tests for TOML-described read jobs

#[path = "common/mod.rs"]
mod common;

use common::*;
use std::fs;
use tempfile::TempDir;
use xl_reader::cli::read_rows;
use xl_reader::config::ReaderConfig;
use xl_reader::errors::AppError;

#[test]
fn test_config_drives_xlsx_read() {
    let temp_dir = TempDir::new().unwrap();
    let book = create_excel_fixture(temp_dir.path());
    let config_path = temp_dir.path().join("job.toml");

    let config_content = format!(
        r#"
file = {:?}
start = 4
end = 6
sheet_name = "Feuil1"
"#,
        book.display().to_string()
    );
    fs::write(&config_path, config_content).unwrap();

    let config = ReaderConfig::from_toml_file(&config_path).unwrap();
    let mut out = Vec::new();
    assert_eq!(read_rows(&config, &mut out).unwrap(), 3);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        r#"{"row":4,"cells":{"B":123,"C":"2020-12-01 00:00:00"}}"#
    );
    assert_eq!(lines[1], r#"{"row":5,"cells":{}}"#);
    assert_eq!(
        lines[2],
        r#"{"row":6,"cells":{"B":"ghi","C":123.456,"E":"test"}}"#
    );
}

#[test]
fn test_config_overrides_detected_delimiter() {
    let temp_dir = TempDir::new().unwrap();
    let data = create_text_file(temp_dir.path(), "pipes.csv", "a|b,c\n");

    let mut config = ReaderConfig::new(&data);
    let mut out = Vec::new();
    read_rows(&config, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "{\"row\":1,\"cells\":{\"A\":\"a|b\",\"B\":\"c\"}}\n"
    );

    config.delimiter = Some("|".into());
    let mut out = Vec::new();
    read_rows(&config, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "{\"row\":1,\"cells\":{\"A\":\"a\",\"B\":\"b,c\"}}\n"
    );
}

#[test]
fn test_unknown_sheet_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = ReaderConfig::new(create_excel_fixture(temp_dir.path()));
    config.sheet_name = Some("Feuil2".into());

    let mut out = Vec::new();
    assert!(matches!(
        read_rows(&config, &mut out),
        Err(AppError::NotFound(_))
    ));
    assert!(out.is_empty());
}

#[test]
fn test_malformed_toml_is_invalid_argument() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "file = ").unwrap();

    assert!(matches!(
        ReaderConfig::from_toml_file(&config_path),
        Err(AppError::InvalidArgument(_))
    ));
}
