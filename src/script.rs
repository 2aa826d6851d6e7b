//! Submission-script generation.
//!
//! [`render_script`] is pure text synthesis from a [`JobConfig`]; the only
//! side effect in this module is [`write_script`] writing the result next to
//! the descriptor with execute permissions. The emitted script is fully
//! self-contained: it captures module names and installation paths textually
//! at generation time and re-resolves scheduler-provided environment
//! variables (with fallbacks) at execution time, so it can run much later on
//! a different host.
//!
//! The script body implements the scratch-workspace lifecycle: stage-in,
//! solver execution, stage-out, and scratch removal on every exit path. A
//! single `cleanup` routine is installed as an `EXIT` trap; the `TERM` trap
//! (external termination by the scheduler) only logs and exits, and the
//! `EXIT` trap then performs the one and only removal.

use crate::config::JobConfig;
use log::info;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Auxiliary state files staged into the scratch directory when present:
/// ORCA checkpoint (`.gbw`) and FEFF/CORVUS potential (`.pot`) files.
pub const STAGE_IN_AUX_EXTENSIONS: [&str; 2] = ["gbw", "pot"];

/// Extensions excluded from stage-out: the staged input itself and
/// solver temporaries. Hard-coded closed set.
pub const STAGE_OUT_EXCLUDE_EXTENSIONS: [&str; 2] = ["in", "tmp"];

/// Renders the complete PBS submission script for one job.
pub fn render_script(config: &JobConfig) -> String {
    let mut script = String::new();
    push_directives(&mut script, config);
    push_toolchain(&mut script, config);
    push_context(&mut script, config);
    push_scratch_lifecycle(&mut script, config);
    push_stage_in(&mut script, config);
    push_solver_resolution(&mut script);
    push_launcher_shim(&mut script);
    push_diagnostics(&mut script, config);
    push_execution(&mut script, config);
    push_stage_out(&mut script);
    script
}

/// Writes the rendered script into the run directory with mode 0755.
///
/// An existing script of the same derived name is overwritten; generation is
/// always from scratch, never incremental.
pub fn write_script(config: &JobConfig) -> io::Result<PathBuf> {
    let path = config.script_path();
    let mut content = render_script(config);
    if !content.ends_with('\n') {
        content.push('\n');
    }
    fs::write(&path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }

    info!("Generated submission script: {}", path.display());
    Ok(path)
}

/// PBS resource directives: one node, ppn = parallelism degree, job name,
/// queue, and environment forwarding.
fn push_directives(script: &mut String, config: &JobConfig) {
    script.push_str("#!/bin/bash\n");
    script.push_str(&format!("#PBS -l nodes=1:ppn={}\n", config.nprocs));
    script.push_str(&format!("#PBS -N {}\n", config.naming.job_name()));
    script.push_str(&format!("#PBS -q {}\n", config.queue));
    script.push_str("#PBS -V\n");
    script.push('\n');
}

fn push_toolchain(script: &mut String, config: &JobConfig) {
    script.push_str("if [ -f /etc/profile.d/modules.sh ]; then\n");
    script.push_str("    . /etc/profile.d/modules.sh\n");
    script.push_str("fi\n");
    script.push_str("module purge\n");
    // Compiler before its matching MPI build
    script.push_str(&format!("module load {}\n", config.compiler_module));
    script.push_str(&format!("module load {}\n", config.mpi_module));
    script.push('\n');
}

/// Working directory, submit host, and search path with fallbacks for runs
/// outside the scheduler.
fn push_context(script: &mut String, config: &JobConfig) {
    script.push_str("WORKDIR=\"${PBS_O_WORKDIR:-$(pwd)}\"\n");
    script.push_str("SUBMIT_HOST=\"${PBS_O_HOST:-$(hostname)}\"\n");
    script.push_str("export PATH=\"${PBS_O_PATH:-$PATH}\"\n");
    script.push('\n');
    script.push_str(&format!(
        "LOGFILE=\"$WORKDIR/{}\"\n",
        config.naming.log_name()
    ));
    script.push_str(": > \"$LOGFILE\"\n");
    script.push_str(&format!(
        "echo \"job {} submitted from $SUBMIT_HOST\" >> \"$LOGFILE\"\n",
        config.naming.job_name()
    ));
    script.push('\n');
    script.push_str(&format!("export ORCA_ROOT=\"{}\"\n", config.orca_root));
    script.push_str("export UCX_LOG_LEVEL=error\n");
    script.push('\n');
}

fn push_scratch_lifecycle(script: &mut String, config: &JobConfig) {
    script.push_str(&format!(
        "SCRATCH=$(mktemp -d \"{}\") || exit 1\n",
        config.naming.scratch_template(&config.scratch_root)
    ));
    script.push('\n');
    script.push_str("cleanup() {\n");
    script.push_str("    rm -rf \"$SCRATCH\"\n");
    script.push_str("}\n");
    script.push_str("on_term() {\n");
    script.push_str(
        "    echo \"received TERM from scheduler, releasing $SCRATCH\" >> \"$LOGFILE\"\n",
    );
    script.push_str("    exit 143\n");
    script.push_str("}\n");
    script.push_str("trap on_term TERM\n");
    script.push_str("trap cleanup EXIT\n");
    script.push('\n');
}

fn push_stage_in(script: &mut String, config: &JobConfig) {
    script.push_str(&format!(
        "cp \"$WORKDIR/{}\" \"$SCRATCH/\"\n",
        config.naming.input_name()
    ));
    let globs = STAGE_IN_AUX_EXTENSIONS
        .iter()
        .map(|ext| format!("\"$WORKDIR\"/*.{}", ext))
        .collect::<Vec<_>>()
        .join(" ");
    script.push_str(&format!("for f in {}; do\n", globs));
    // -e guards against the unexpanded glob when no file matches
    script.push_str("    [ -e \"$f\" ] && cp \"$f\" \"$SCRATCH/\"\n");
    script.push_str("done\n");
    script.push('\n');
}

fn push_solver_resolution(script: &mut String) {
    script.push_str("ORCA_EXE=\"$ORCA_ROOT/orca\"\n");
    script.push_str("if [ ! -x \"$ORCA_EXE\" ]; then\n");
    script.push_str(
        "    echo \"orca binary missing or not executable: $ORCA_EXE\" >> \"$LOGFILE\"\n",
    );
    script.push_str("    exit 1\n");
    script.push_str("fi\n");
    script.push('\n');
}

/// ORCA shells out to `mpirun`; some MPI builds only install `mpiexec`.
/// When only the fallback exists, alias it under a private shim directory
/// prepended to the search path.
fn push_launcher_shim(script: &mut String) {
    script.push_str("if ! command -v mpirun > /dev/null 2>&1; then\n");
    script.push_str("    MPIEXEC=$(command -v mpiexec)\n");
    script.push_str("    if [ -z \"$MPIEXEC\" ]; then\n");
    script.push_str(
        "        echo \"no MPI launcher (mpirun or mpiexec) on PATH\" >> \"$LOGFILE\"\n",
    );
    script.push_str("        exit 1\n");
    script.push_str("    fi\n");
    script.push_str("    SHIM_DIR=\"$SCRATCH/.mpi-shim\"\n");
    script.push_str("    mkdir -p \"$SHIM_DIR\"\n");
    script.push_str("    ln -s \"$MPIEXEC\" \"$SHIM_DIR/mpirun\"\n");
    script.push_str("    export PATH=\"$SHIM_DIR:$PATH\"\n");
    script.push_str(
        "    echo \"mpirun not found, aliased $MPIEXEC as $SHIM_DIR/mpirun\" >> \"$LOGFILE\"\n",
    );
    script.push_str("fi\n");
    script.push('\n');
}

fn push_diagnostics(script: &mut String, config: &JobConfig) {
    script.push_str("module list >> \"$LOGFILE\" 2>&1\n");
    script.push_str(&format!(
        "module show {} >> \"$LOGFILE\" 2>&1\n",
        config.mpi_module
    ));
    script.push_str("echo \"PATH=$PATH\" >> \"$LOGFILE\"\n");
    script.push_str("echo \"mpirun:  $(command -v mpirun)\" >> \"$LOGFILE\"\n");
    script.push_str("echo \"mpiexec: $(command -v mpiexec)\" >> \"$LOGFILE\"\n");
    script.push('\n');
}

fn push_execution(script: &mut String, config: &JobConfig) {
    script.push_str("cd \"$SCRATCH\" || exit 1\n");
    // ORCA requires its full path for parallel runs
    script.push_str(&format!(
        "\"$ORCA_EXE\" \"{}\" >> \"$LOGFILE\" 2>&1\n",
        config.naming.input_name()
    ));
    script.push('\n');
}

/// Copy everything the solver produced back, excluding the staged input and
/// temporaries by extension. Scratch removal itself happens in the EXIT trap.
fn push_stage_out(script: &mut String) {
    let excludes = STAGE_OUT_EXCLUDE_EXTENSIONS
        .iter()
        .map(|ext| format!("*.{}", ext))
        .collect::<Vec<_>>()
        .join("|");
    script.push_str("for f in \"$SCRATCH\"/*; do\n");
    // -e guards against the unexpanded glob when the scratch dir is empty
    script.push_str("    [ -e \"$f\" ] || continue\n");
    script.push_str("    case \"$f\" in\n");
    script.push_str(&format!("        {}) continue ;;\n", excludes));
    script.push_str("    esac\n");
    script.push_str("    cp -p \"$f\" \"$WORKDIR/\"\n");
    script.push_str("done\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Descriptor;
    use crate::settings::Settings;
    use std::path::PathBuf;

    fn config(name: &str, nprocs: u32) -> JobConfig {
        let descriptor = Descriptor {
            path: PathBuf::from(name),
            nprocs,
        };
        JobConfig::new(&descriptor, &Settings::default())
    }

    #[test]
    fn directives_request_single_node_with_ppn() {
        let script = render_script(&config("ZnHis4.in", 8));
        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("#PBS -l nodes=1:ppn=8\n"));
        assert!(script.contains("#PBS -N ZnHis4\n"));
        assert!(script.contains("#PBS -q workq\n"));
        assert!(script.contains("#PBS -V\n"));
    }

    #[test]
    fn context_resolution_has_fallbacks() {
        let script = render_script(&config("Test.in", 4));
        assert!(script.contains("WORKDIR=\"${PBS_O_WORKDIR:-$(pwd)}\""));
        assert!(script.contains("SUBMIT_HOST=\"${PBS_O_HOST:-$(hostname)}\""));
        assert!(script.contains("export PATH=\"${PBS_O_PATH:-$PATH}\""));
    }

    #[test]
    fn log_is_truncated_per_run() {
        let script = render_script(&config("Test.in", 1));
        assert!(script.contains("LOGFILE=\"$WORKDIR/Test-orca.log\""));
        assert!(script.contains(": > \"$LOGFILE\""));
    }

    #[test]
    fn scratch_is_unique_and_released_on_every_exit() {
        let script = render_script(&config("ZnHis4.in", 8));
        assert!(script.contains("mktemp -d \"/scratch/ZnHis4.XXXXXX\""));
        assert!(script.contains("trap cleanup EXIT"));
        assert!(script.contains("trap on_term TERM"));
        // Exactly one removal site, inside the single cleanup routine
        assert_eq!(script.matches("rm -rf \"$SCRATCH\"").count(), 1);
    }

    #[test]
    fn stage_in_copies_descriptor_and_aux_files() {
        let script = render_script(&config("ZnHis4.in", 8));
        assert!(script.contains("cp \"$WORKDIR/ZnHis4.in\" \"$SCRATCH/\""));
        assert!(script.contains("\"$WORKDIR\"/*.gbw \"$WORKDIR\"/*.pot"));
    }

    #[test]
    fn stage_out_excludes_input_and_temporaries() {
        let script = render_script(&config("ZnHis4.in", 8));
        assert!(script.contains("*.in|*.tmp) continue ;;"));
    }

    #[test]
    fn stage_out_skips_unexpanded_glob() {
        // An empty scratch dir leaves the glob literal; the loop must not
        // hand it to cp
        let script = render_script(&config("ZnHis4.in", 8));
        let stage_out = script.find("for f in \"$SCRATCH\"/*").unwrap();
        let guard = script[stage_out..]
            .find("[ -e \"$f\" ] || continue")
            .unwrap();
        let copy = script[stage_out..].find("cp -p \"$f\"").unwrap();
        assert!(guard < copy);
    }

    #[test]
    fn solver_is_checked_before_execution() {
        let script = render_script(&config("Test.in", 2));
        assert!(script.contains("export ORCA_ROOT=\"/opt/orca/5.0.4\""));
        let check = script.find("if [ ! -x \"$ORCA_EXE\" ]").unwrap();
        let run = script.find("\"$ORCA_EXE\" \"Test.in\"").unwrap();
        assert!(check < run);
    }

    #[test]
    fn launcher_shim_prefers_mpirun() {
        let script = render_script(&config("Test.in", 2));
        assert!(script.contains("if ! command -v mpirun"));
        assert!(script.contains("ln -s \"$MPIEXEC\" \"$SHIM_DIR/mpirun\""));
        assert!(script.contains("export PATH=\"$SHIM_DIR:$PATH\""));
    }

    #[test]
    fn generated_script_is_self_contained() {
        // Module names and paths are captured textually, never the
        // generator's environment
        let script = render_script(&config("Test.in", 2));
        assert!(script.contains("module load intel/2021.2\n"));
        assert!(script.contains("module load openmpi/4.1.1-intel\n"));
        assert!(!script.contains(&std::env::current_dir().unwrap().display().to_string()));
    }

    #[test]
    fn default_parallelism_is_one() {
        let script = render_script(&config("Plain.in", 1));
        assert!(script.contains("#PBS -l nodes=1:ppn=1\n"));
    }
}
