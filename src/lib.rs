//! xl-reader library
//!
//! Memory-bounded, pull-driven row streaming over XLSX workbooks and
//! delimiter-separated text files (CSV, TSV, semicolon files).
//!
//! ## Overview
//!
//! - [`reader`] - The two streaming engines, the shared [`reader::TabularReader`]
//!   contract and [`reader::create_reader`], which picks an engine by extension
//! - [`models`] - Rows, cell values, worksheet descriptors and text dialects
//! - [`config`] - TOML-described read jobs
//! - [`cli`] - Command-line interface printing rows as JSON lines
//! - [`errors`] - Error types used throughout the crate
//!
//! ## Example Usage
//!
//! ```no_run
//! use xl_reader::errors::AppResult;
//! use xl_reader::reader::{create_reader, TabularReader};
//!
//! # fn example() -> AppResult<()> {
//! let mut reader = create_reader("report.xlsx")?;
//! reader.load()?;
//! for row in reader.read(3, Some(10))? {
//!     let (index, cells) = row?;
//!     println!("{index}: {:?}", cells.get("B"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod reader;
