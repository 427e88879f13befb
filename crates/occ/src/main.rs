//! O Language Compiler Executable
//!
//! Thin CLI front end for [`libo`]: reads one or more `.o` source files
//! named on argv, runs each through [`libo::compile`], and prints any
//! diagnostics in the wire format `libo::diagnostics::Diagnostic`
//! produces. Exits with status 1 if any file had an error-severity
//! diagnostic.

use std::process::exit;

use clap::Parser;
use libo::file::SourceFile;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, LevelPadding, TermLogger, TerminalMode, ThreadLogMode};

/// `occ file1.o file2.o ...`
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Source files to compile.
    #[arg(required = true)]
    files: Vec<std::path::PathBuf>,

    /// Raise logging to debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Error };
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Error)
        .set_thread_mode(ThreadLogMode::Both)
        .set_level_padding(LevelPadding::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    CombinedLogger::init(vec![TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)]).unwrap();

    let mut had_errors = false;

    for path in &cli.files {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) => {
                eprintln!("error reading {}: {error}", path.display());
                had_errors = true;
                continue;
            }
        };

        let file = SourceFile::new(path.display().to_string(), content);
        let output = libo::compile(&file);

        for diagnostic in output.diagnostics.entries() {
            eprintln!("{diagnostic}");
        }

        if !output.succeeded() {
            had_errors = true;
        } else {
            log::debug!("{}: compiled cleanly", path.display());
        }
    }

    if had_errors {
        exit(1);
    }
}
