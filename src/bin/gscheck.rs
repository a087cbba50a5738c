//! `gscheck` — a development harness around the library.
//!
//! Reads a JSON-encoded AST fixture (the shape an embedding host would
//! otherwise hand to [`garterscript_check::validate`] directly in-process)
//! and reports accept/reject.
//! This binary is not the product the crate ships as a library; it exists
//! so the checker can be exercised from the command line during development.
use std::{error::Error, fs};

use clap::{Parser, ValueEnum};
use garterscript_check::{ast::Mod, new_global_scope, validate_bool};
use log::info;

/// Command-line configuration for `gscheck`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to a JSON file containing a serialized `Mod` AST value.
    #[arg(index = 1)]
    file: std::path::PathBuf,

    /// Specify the log level of the checker.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    verbosity: LogLevel,
}

/// Log level for `gscheck`, selecting the verbosity `simple_logger` is
/// initialized with at startup.
#[derive(ValueEnum, Clone, Default, Debug)]
enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,
    #[value(alias("1"))]
    Warn,
    #[value(alias("2"))]
    Info,
    #[value(alias("3"))]
    Debug,
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    simple_logger::init_with_level((&args.verbosity).into())?;

    let source = fs::read_to_string(&args.file)?;
    let ast: Mod = serde_json::from_str(&source)?;

    let filename = args.file.to_string_lossy().into_owned();
    let scope = new_global_scope();

    info!("checking {filename}");

    if validate_bool(&ast, &filename, &scope) {
        info!("{filename}: accepted");
        Ok(())
    } else {
        std::process::exit(1);
    }
}
