use crate::config::ReaderConfig;
use crate::errors::{AppError, AppResult};
use crate::models::Row;
use crate::reader::{create_reader, Reader, TabularReader};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// One output line of `read`.
#[derive(Debug, Serialize)]
struct RowRecord<'a> {
    row: usize,
    cells: &'a Row,
}

/// Parses command-line arguments and runs the chosen subcommand.
///
/// - `read`: stream rows of a file as JSON lines
/// - `sheets`: list the worksheets of a spreadsheet file
/// - `toml`: run a `read` described by a TOML configuration file
///
/// Row output goes to stdout; logs go to stderr.
pub fn cli() -> AppResult<()> {
    let cmd = command();
    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match matches.subcommand() {
        Some(("read", sub)) => {
            let config = config_from_matches(sub);
            config.validate()?;
            read_rows(&config, &mut out)?;
        }
        Some(("sheets", sub)) => {
            let file = sub
                .get_one::<PathBuf>("file")
                .expect("file is required");
            list_sheets(file, &mut out)?;
        }
        Some(("toml", sub)) => {
            let config_path = sub
                .get_one::<PathBuf>("config")
                .expect("config is required");
            let config = ReaderConfig::from_toml_file(config_path)?;
            read_rows(&config, &mut out)?;
        }
        _ => {
            cmd_for_help
                .print_help()
                .map_err(|e| AppError::IoError(format!("Failed to print help: {e}")))?;
        }
    }

    out.flush()?;
    Ok(())
}

fn command() -> Command<'static> {
    Command::new("xl-reader")
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .subcommand(
            Command::new("read")
                .about("Stream rows of an xlsx/csv/tsv file as JSON lines")
                .after_help("Example:\n  xl-reader read report.xlsx -s 2 -e 10 --sheet Summary")
                .arg(
                    Arg::new("file")
                        .help("Spreadsheet (xlsx, xlsm, xltx, xltm) or text (csv, tsv) file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("start")
                        .short('s')
                        .long("start")
                        .help("First row to print (1-based)")
                        .default_value("1")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("end")
                        .short('e')
                        .long("end")
                        .help("Last row to print")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("sheet")
                        .long("sheet")
                        .help("Worksheet name (spreadsheet files; defaults to the first sheet)")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("sheets")
                .about("List the worksheets of a spreadsheet file")
                .arg(
                    Arg::new("file")
                        .help("Spreadsheet file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run a read described by a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn config_from_matches(sub: &ArgMatches) -> ReaderConfig {
    let file = sub
        .get_one::<PathBuf>("file")
        .expect("file is required");
    let mut config = ReaderConfig::new(file);
    config.start = *sub.get_one::<usize>("start").expect("start has default_value");
    config.end = sub.get_one::<usize>("end").copied();
    config.sheet_name = sub.get_one::<String>("sheet").cloned();
    config
}

/// Streams the configured window to `out`, one JSON object per row.
///
/// Returns the number of rows written.
pub fn read_rows<W: Write>(config: &ReaderConfig, out: &mut W) -> AppResult<usize> {
    let mut reader = create_reader(&config.file)?;
    reader.load()?;
    config.apply(&mut reader)?;

    let mut written = 0;
    for row in reader.read(config.start, config.end)? {
        let (index, cells) = row?;
        write_json_line(
            out,
            &RowRecord {
                row: index,
                cells: &cells,
            },
        )?;
        written += 1;
    }

    info!(
        file = %config.file.display(),
        rows = written,
        "Rows written"
    );
    Ok(written)
}

/// Writes one JSON object per worksheet of a spreadsheet file.
pub fn list_sheets<W: Write>(file: &std::path::Path, out: &mut W) -> AppResult<()> {
    let mut reader = create_reader(file)?;
    reader.load()?;

    match &reader {
        Reader::Xlsx(xlsx) => {
            for sheet in xlsx.worksheets() {
                write_json_line(out, sheet)?;
            }
            Ok(())
        }
        Reader::Csv(_) => Err(AppError::InvalidArgument(format!(
            "{} is not a spreadsheet file",
            file.display()
        ))),
    }
}

fn write_json_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> AppResult<()> {
    serde_json::to_writer(&mut *out, value)
        .map_err(|e| AppError::IoError(format!("Failed to write JSON: {e}")))?;
    out.write_all(b"\n")?;
    Ok(())
}
