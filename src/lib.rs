#![deny(missing_docs)]

//! orcaprep - ORCA batch-queue job preparation
//!
//! orcaprep reads an ORCA input file (the *job descriptor*), extracts the
//! requested degree of parallelism, generates a self-contained PBS submission
//! script, and submits it to the batch queue with `qsub`.
//!
//! # Overview
//!
//! ORCA parallelism can be requested in two notations inside the input file:
//!
//! ```text
//! ! B3LYP def2-TZVP PAL8
//! ```
//!
//! or as a block:
//!
//! ```text
//! %pal
//!   nprocs 8
//! end
//! ```
//!
//! orcaprep recognizes both (first match wins, inline notation takes priority)
//! and defaults to a single process when neither is present. The extracted
//! count sizes both the PBS resource request (`nodes=1:ppn=N`) and the MPI
//! process count; all processes are placed on one node.
//!
//! # Generated script
//!
//! The submission script is regenerated fresh on every invocation and is fully
//! self-contained: module loads, working-directory and host resolution with
//! fallbacks, a per-run log file, a uniquely named scratch directory, stage-in
//! of the descriptor plus checkpoint (`.gbw`) and potential (`.pot`) files,
//! solver and MPI-launcher resolution, the solver run itself, stage-out of
//! produced files, and scratch removal on every exit path (including external
//! termination by the scheduler).
//!
//! # Quick Start
//!
//! ```bash
//! # Generate and submit
//! orcaprep ZnHis4.in
//!
//! # Generate only, report the script path, skip qsub
//! orcaprep --dry-run ZnHis4.in
//! ```
//!
//! # Configuration
//!
//! Site-specific values (queue name, toolchain modules, scratch root, ORCA
//! installation root) are read from an INI overlay searched at
//! `./orcaprep.cfg`, `~/.config/orcaprep/orcaprep.cfg`, and
//! `/etc/orcaprep/orcaprep.cfg`, falling back to built-in defaults. See
//! [`settings`](settings/index.html).
//!
//! # Modules
//!
//! - [`parser`](parser/index.html) - Descriptor validation and parallelism extraction
//! - [`naming`](naming/index.html) - Basename-derived artifact names
//! - [`settings`](settings/index.html) - Site configuration overlay
//! - [`config`](config/index.html) - Resolved per-job generation context
//! - [`script`](script/index.html) - Submission-script synthesis
//! - [`submit`](submit/index.html) - Queue submission via qsub
//! - [`help`](help/index.html) - Usage text

/// Resolved per-job generation context
pub mod config;
/// Built-in usage and help text
pub mod help;
/// Basename-derived file naming
pub mod naming;
/// Job descriptor parsing
pub mod parser;
/// Submission-script generation
pub mod script;
/// Site configuration management
pub mod settings;
/// Batch-queue submission
pub mod submit;

pub use config::JobConfig;
pub use naming::FileNaming;
