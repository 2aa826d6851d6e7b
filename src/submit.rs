//! Batch-queue submission.
//!
//! Submits a generated script with `qsub`, requesting that stdout and stderr
//! of the queued job be merged into the derived `.script.out` capture file.
//! qsub's own output is captured here and logged; the PBS job id is parsed
//! out of it and returned so the operator can track the job.
//!
//! Everything that happens after submission (missing solver, launcher
//! trouble, solver failure) is reported only through the run log written by
//! the script itself; the generator has no visibility into it.

use crate::config::JobConfig;
use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

lazy_static! {
    // "12345.pbsserver" or bare "12345"
    static ref JOB_ID_RE: Regex = Regex::new(r"^([0-9]+)(?:\.\S+)?").unwrap();
}

/// Errors that can occur during queue submission.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// qsub could not be spawned (not installed, not on PATH)
    #[error("failed to run qsub: {0}")]
    Io(#[from] std::io::Error),
    /// qsub ran but exited non-zero
    #[error("qsub failed with {code}: {stderr}")]
    QsubFailed {
        /// qsub exit code, or -1 when killed by a signal
        code: i32,
        /// captured qsub stderr
        stderr: String,
    },
}

/// Type alias for submission results
type Result<T> = std::result::Result<T, SubmitError>;

/// Submits the generated script to the batch queue.
///
/// Runs `qsub -j oe -o <script>.out <script>` from the job's run directory
/// and returns the parsed PBS job id when qsub reports one.
///
/// # Arguments
///
/// * `config` - Job context naming the script and run directory
/// * `script_path` - Path of the script written by the generator
pub fn submit_script(config: &JobConfig, script_path: &Path) -> Result<Option<String>> {
    let script_name = config.naming.script_name();
    let output = Command::new("qsub")
        .arg("-j")
        .arg("oe")
        .arg("-o")
        .arg(config.naming.submit_output_name())
        .arg(&script_name)
        .current_dir(&config.run_dir)
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        warn!("qsub stderr: {}", stderr.trim());
    }

    if !output.status.success() {
        return Err(SubmitError::QsubFailed {
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
        });
    }

    let job_id = parse_job_id(&stdout);
    match &job_id {
        Some(id) => info!("Submitted {} as job {}", script_path.display(), id),
        None => warn!(
            "Submitted {} but could not parse a job id from: {:?}",
            script_path.display(),
            stdout.trim()
        ),
    }
    Ok(job_id)
}

/// Parses the numeric PBS job id from qsub output.
///
/// qsub prints the id on its own line, either bare (`12345`) or qualified
/// with the server name (`12345.pbsserver`).
pub fn parse_job_id(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        JOB_ID_RE
            .captures(line)
            .map(|caps| caps[1].to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_qualified_job_id() {
        assert_eq!(
            parse_job_id("98231.pbs01.cluster.local\n"),
            Some("98231".to_string())
        );
    }

    #[test]
    fn parses_bare_job_id_after_blank_lines() {
        assert_eq!(parse_job_id("\n\n4521\n"), Some("4521".to_string()));
    }

    #[test]
    fn non_numeric_output_yields_none() {
        assert_eq!(parse_job_id("qsub: submission rejected\n"), None);
    }
}
