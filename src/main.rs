// CLI binary entry point for admeta
//
// Parses and displays the Dolby audio metadata (dbmd) chunk embedded in
// ADM WAV files: RIFF, RF64, and BW64 containers.

use clap::{Parser, Subcommand};
use std::process;

mod cli;

use cli::commands::{command_detect, command_info, command_read, expand_files};
use cli::output::{OutputFormat, OutputFormatter};

/// admeta - ADM WAV Dolby audio metadata tool
#[derive(Parser, Debug)]
#[command(name = "admeta")]
#[command(about = "Inspect Dolby audio metadata in ADM WAV files", long_about = None)]
#[command(version)]
struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode and display Dolby audio metadata from ADM WAV file(s)
    Read {
        /// WAV file path(s) or glob pattern(s)
        files: Vec<String>,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Detect the container variant (RIFF/RF64/BW64)
    Detect {
        /// WAV file path(s) or glob pattern(s)
        files: Vec<String>,
    },
    /// Show file and chunk information
    Info {
        /// WAV file path(s) or glob pattern(s)
        files: Vec<String>,

        /// Also decode the metadata chunk
        #[arg(short, long)]
        detailed: bool,
    },
}

fn main() {
    let config = Config::parse();
    let formatter = OutputFormatter::new(config.format, config.quiet);

    let errors = match &config.command {
        Commands::Read { files, output } => {
            let files = require_files(expand_files(files));
            match command_read(&files, output.as_deref(), &formatter) {
                Ok(errors) => errors,
                Err(e) => {
                    eprintln!("✗ {:#}", e);
                    process::exit(1);
                }
            }
        }
        Commands::Detect { files } => {
            let files = require_files(expand_files(files));
            command_detect(&files, &formatter)
        }
        Commands::Info { files, detailed } => {
            let files = require_files(expand_files(files));
            command_info(&files, *detailed, &formatter)
        }
    };

    if errors > 0 {
        process::exit(1);
    }
}

fn require_files(files: Vec<String>) -> Vec<String> {
    if files.is_empty() {
        eprintln!("Error: No files specified");
        process::exit(1);
    }
    files
}
