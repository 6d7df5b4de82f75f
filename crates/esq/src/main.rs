//! Command-line interface for the esq query compiler.

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use esq::CompileOptions;

#[derive(Parser)]
#[command(name = "esq")]
#[command(about = "Compile shorthand search requests into query documents")]
/// Top-level CLI options.
struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    command: Commands,
}

#[derive(Subcommand)]
/// Supported `esq` subcommands.
enum Commands {
    /// Compile a shorthand request into a query document
    Compile {
        /// Request file (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,

        /// Result size when the request doesn't specify one
        #[arg(long)]
        size: Option<u64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            file,
            compact,
            size,
        } => cmd_compile(file, compact, size),
    }
}

/// Implements the `esq compile` command.
fn cmd_compile(file: Option<PathBuf>, compact: bool, size: Option<u64>) -> ExitCode {
    let input = match read_input(file.as_deref()) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("error: failed to read request: {e}");
            return ExitCode::FAILURE;
        }
    };

    let request: serde_json::Value = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: invalid JSON: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut options = CompileOptions::default();
    if let Some(size) = size {
        // A caller-level size replaces both size defaults.
        options.default_size = size;
        options.aggregation_only_size = None;
    }

    let document = match esq::compile_with(&request, &options) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let rendered = if compact {
        serde_json::to_string(&document)
    } else {
        serde_json::to_string_pretty(&document)
    };
    match rendered {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize document: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Reads the request from a file, or stdin when no file was given.
fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}
