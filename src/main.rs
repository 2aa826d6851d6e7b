//! orcaprep command-line interface.
//!
//! Usage:
//!
//! ```bash
//! # Generate the submission script and submit it
//! orcaprep ZnHis4.in
//!
//! # Generate only, report the script path, skip qsub
//! orcaprep --dry-run ZnHis4.in
//! orcaprep -n ZnHis4.in
//! ```
//!
//! The dry-run flag must precede the descriptor argument. Exit codes:
//! 0 on success, 2 for usage errors and for a missing descriptor file
//! (both reported on stderr, with no script written), 1 when the queue
//! submission itself fails.

use orcaprep::config::JobConfig;
use orcaprep::help::{print_help, print_usage};
use orcaprep::parser::{self, ParseError};
use orcaprep::script;
use orcaprep::settings::SettingsManager;
use orcaprep::submit;
use std::env;
use std::path::Path;
use std::process;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stdout)
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("orcaprep");

    let mut dry_run = false;
    let mut positional: Vec<&String> = Vec::new();
    let mut rest = args.iter().skip(1);
    for arg in &mut rest {
        match arg.as_str() {
            "-n" | "--dry-run" => dry_run = true,
            "-h" | "--help" => {
                print_help(program);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Error: unknown option: {}", other);
                print_usage(program);
                process::exit(2);
            }
            _ => {
                positional.push(arg);
                break;
            }
        }
    }
    // Flags are only accepted before the descriptor
    positional.extend(rest);

    let descriptor_path = match positional.as_slice() {
        [path] => Path::new(path.as_str()),
        [] => {
            eprintln!("Error: missing descriptor argument");
            print_usage(program);
            process::exit(2);
        }
        _ => {
            eprintln!("Error: expected exactly one descriptor argument");
            print_usage(program);
            process::exit(2);
        }
    };

    match run(descriptor_path, dry_run) {
        Ok(()) => {}
        Err(AppError::Parse(e)) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Settings(#[from] orcaprep::settings::ConfigError),
    #[error("failed to write script: {0}")]
    Write(#[from] std::io::Error),
    #[error(transparent)]
    Submit(#[from] submit::SubmitError),
}

fn run(descriptor_path: &Path, dry_run: bool) -> Result<(), AppError> {
    let descriptor = parser::parse_descriptor(descriptor_path)?;
    let settings = SettingsManager::load()?;
    let config = JobConfig::new(&descriptor, settings.settings());

    println!(
        "Descriptor {}: {} process{}",
        descriptor_path.display(),
        config.nprocs,
        if config.nprocs == 1 { "" } else { "es" }
    );

    let script_path = script::write_script(&config)?;

    if dry_run {
        println!(
            "Dry run: generated {} (qsub skipped)",
            script_path.display()
        );
        return Ok(());
    }

    match submit::submit_script(&config, &script_path)? {
        Some(job_id) => println!("Submitted as job {}", job_id),
        None => println!("Submitted {}", script_path.display()),
    }
    Ok(())
}
