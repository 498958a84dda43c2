//! segeval - scoring dashboard CLI for continuous context recognition.
//!
//! Evaluates registered recognizers against labeled ground-truth files and
//! writes a combined frame/event score report.
//!
//! # Usage
//!
//! ```bash
//! # Score the replay recognizer against two ground-truth cases
//! segeval truth1.json truth2.json.gz --recognizers replay --outpath scores/2023-06-01.json
//!
//! # Keep a rotating history list for a dashboard
//! segeval truth.json --recognizers replay \
//!     --outpath scores/2023-06-01.json --history scores/list.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use segeval::{report, Harness, RecognizerRegistry, ScoreOptions};

/// Performance metric dashboard for continuous context recognition.
#[derive(Parser)]
#[command(name = "segeval")]
#[command(author, version, about = "Performance metric dashboard for continuous context recognition")]
struct Cli {
    /// Ground-truth files (JSON, optionally gzipped)
    #[arg(value_name = "TRUTH_FILE", required = true)]
    truths: Vec<PathBuf>,

    /// Comma-separated registry names of recognizers to evaluate
    #[arg(long, value_name = "RECOGNIZERS", value_delimiter = ',', required = true)]
    recognizers: Vec<String>,

    /// Where to write the scored report (stdout when omitted)
    #[arg(long, value_name = "OUTPUT_PATH")]
    outpath: Option<PathBuf>,

    /// History list file to update with the report's file name
    #[arg(long, value_name = "LIST_FILE")]
    history: Option<PathBuf>,

    /// Collapse zero-duration segments from coincident boundaries
    #[arg(long)]
    collapse_zero_segments: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> segeval::Result<()> {
    let registry = RecognizerRegistry::with_builtins();
    let harness = Harness::new(registry).with_options(ScoreOptions {
        collapse_zero_segments: cli.collapse_zero_segments,
    });

    let scored = harness.run(&cli.truths, &cli.recognizers)?;

    match &cli.outpath {
        Some(path) => {
            info!("writing scored results to {}...", path.display());
            report::write_report(&scored, path)?;
            if let Some(list_file) = &cli.history {
                report::update_history(list_file, path)?;
            }
        }
        None => println!("{}", serde_json::to_string_pretty(&scored)?),
    }
    Ok(())
}
