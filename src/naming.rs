//! Basename-derived file naming for generated artifacts.
//!
//! All artifact names are derived deterministically from the descriptor's
//! basename and the fixed solver tag (`orca`), so regenerating for the same
//! descriptor overwrites the previous artifacts instead of duplicating them,
//! and multiple jobs can share a directory without colliding.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use orcaprep::naming::FileNaming;
//!
//! let naming = FileNaming::new(Path::new("runs/ZnHis4.in"));
//! assert_eq!(naming.script_name(), "generated-ZnHis4-orca.script");
//! assert_eq!(naming.log_name(), "ZnHis4-orca.log");
//! assert_eq!(naming.submit_output_name(), "generated-ZnHis4-orca.script.out");
//! ```

use std::path::Path;

/// Fixed tag naming the external solver in all derived file names.
pub const SOLVER_TAG: &str = "orca";

/// Manages file naming derived from the descriptor basename.
#[derive(Debug, Clone)]
pub struct FileNaming {
    basename: String,
}

impl FileNaming {
    /// Creates a new FileNaming instance from a descriptor path.
    ///
    /// Extracts the file stem (filename without extension) to use as the
    /// basename for all generated names.
    pub fn new(descriptor_path: &Path) -> Self {
        let basename = descriptor_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("orca_job")
            .to_string();

        Self { basename }
    }

    /// Returns the basename used for naming.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Returns the descriptor filename the generated script stages in.
    ///
    /// Format: `{basename}.in`
    pub fn input_name(&self) -> String {
        format!("{}.in", self.basename)
    }

    /// Returns the generated submission script name.
    ///
    /// Format: `generated-{basename}-orca.script`
    pub fn script_name(&self) -> String {
        format!("generated-{}-{}.script", self.basename, SOLVER_TAG)
    }

    /// Returns the qsub output-capture file name.
    ///
    /// Format: `generated-{basename}-orca.script.out`
    pub fn submit_output_name(&self) -> String {
        format!("{}.out", self.script_name())
    }

    /// Returns the run log file name, created under the working directory.
    ///
    /// Format: `{basename}-orca.log`
    pub fn log_name(&self) -> String {
        format!("{}-{}.log", self.basename, SOLVER_TAG)
    }

    /// Returns the PBS job name.
    pub fn job_name(&self) -> &str {
        &self.basename
    }

    /// Returns the scratch-directory mktemp template.
    ///
    /// The basename is embedded so an operator can tell concurrent scratch
    /// directories apart; the `XXXXXX` suffix keeps creation race-free.
    pub fn scratch_template(&self, scratch_root: &str) -> String {
        format!("{}/{}.XXXXXX", scratch_root, self.basename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_derived_from_stem() {
        let naming = FileNaming::new(Path::new("some/dir/ZnHis4.in"));
        assert_eq!(naming.basename(), "ZnHis4");
        assert_eq!(naming.input_name(), "ZnHis4.in");
        assert_eq!(naming.script_name(), "generated-ZnHis4-orca.script");
        assert_eq!(naming.submit_output_name(), "generated-ZnHis4-orca.script.out");
        assert_eq!(naming.log_name(), "ZnHis4-orca.log");
        assert_eq!(naming.job_name(), "ZnHis4");
    }

    #[test]
    fn scratch_template_embeds_basename() {
        let naming = FileNaming::new(Path::new("Test.in"));
        assert_eq!(naming.scratch_template("/scratch"), "/scratch/Test.XXXXXX");
    }

    #[test]
    fn naming_is_deterministic() {
        let a = FileNaming::new(Path::new("Plain.in"));
        let b = FileNaming::new(Path::new("./Plain.in"));
        assert_eq!(a.script_name(), b.script_name());
    }
}
