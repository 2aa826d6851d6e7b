//! Resolved per-job generation context.
//!
//! Everything the script generator and the submitter need is resolved once,
//! here, when the descriptor is parsed: derived file names, the parallelism
//! degree, and the site settings in force. The resulting [`JobConfig`] is
//! threaded explicitly through generation and submission instead of any stage
//! consulting ambient process state (current directory, environment) on its
//! own.

use crate::naming::FileNaming;
use crate::parser::Descriptor;
use crate::settings::Settings;
use std::path::{Path, PathBuf};

/// Immutable context for generating and submitting one job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Derived artifact names for this descriptor
    pub naming: FileNaming,
    /// Parallelism degree; sizes both `ppn` and the MPI process count
    pub nprocs: u32,
    /// Directory holding the descriptor; the script is written here and
    /// qsub is invoked from here
    pub run_dir: PathBuf,
    /// Batch queue name
    pub queue: String,
    /// Compiler suite module, loaded first
    pub compiler_module: String,
    /// MPI implementation module, loaded after the compiler
    pub mpi_module: String,
    /// Root under which the per-run scratch directory is created
    pub scratch_root: String,
    /// ORCA installation root; the solver binary is `{orca_root}/orca`
    pub orca_root: String,
}

impl JobConfig {
    /// Builds the job context from a parsed descriptor and site settings.
    ///
    /// The run directory is the descriptor's parent, falling back to `.` for
    /// a bare filename.
    pub fn new(descriptor: &Descriptor, settings: &Settings) -> Self {
        let run_dir = descriptor
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        Self {
            naming: FileNaming::new(&descriptor.path),
            nprocs: descriptor.nprocs,
            run_dir,
            queue: settings.queue.name.clone(),
            compiler_module: settings.modules.compiler.clone(),
            mpi_module: settings.modules.mpi.clone(),
            scratch_root: settings.paths.scratch_root.clone(),
            orca_root: settings.paths.orca_root.clone(),
        }
    }

    /// Path the generated script is written to.
    pub fn script_path(&self) -> PathBuf {
        self.run_dir.join(self.naming.script_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Descriptor;

    fn descriptor(path: &str, nprocs: u32) -> Descriptor {
        Descriptor {
            path: PathBuf::from(path),
            nprocs,
        }
    }

    #[test]
    fn run_dir_is_descriptor_parent() {
        let config = JobConfig::new(&descriptor("runs/ZnHis4.in", 8), &Settings::default());
        assert_eq!(config.run_dir, PathBuf::from("runs"));
        assert_eq!(
            config.script_path(),
            PathBuf::from("runs/generated-ZnHis4-orca.script")
        );
    }

    #[test]
    fn bare_filename_runs_in_current_dir() {
        let config = JobConfig::new(&descriptor("Plain.in", 1), &Settings::default());
        assert_eq!(config.run_dir, PathBuf::from("."));
    }
}
