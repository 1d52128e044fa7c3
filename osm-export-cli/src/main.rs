//! Entry point for the `osm-export` command-line interface.
#![forbid(unsafe_code)]

use std::io;

use osm_export_cli::CliError;
use structured_logger::{Builder, json::new_writer};

fn main() {
    Builder::with_level("info")
        .with_target_writer("*", new_writer(io::stderr()))
        .init();

    match osm_export_cli::run() {
        Ok(()) => {}
        // Help and version requests are reported by clap with its own exit code.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("osm-export: {err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            std::process::exit(1);
        }
    }
}
