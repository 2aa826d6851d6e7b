//! Site configuration management for orcaprep.
//!
//! Cluster-specific values (queue name, toolchain modules, scratch root, ORCA
//! installation root) vary between sites but not between jobs, so they live in
//! an INI overlay rather than on the command line. Configuration is loaded
//! with hierarchical precedence:
//!
//! 1. Local configuration (`./orcaprep.cfg`)
//! 2. User configuration (`~/.config/orcaprep/orcaprep.cfg`)
//! 3. System configuration (`/etc/orcaprep/orcaprep.cfg`)
//! 4. Built-in defaults
//!
//! # Configuration File Format
//!
//! ```ini
//! [queue]
//! name = workq
//!
//! [modules]
//! compiler = intel/2021.2
//! mpi = openmpi/4.1.1-intel
//!
//! [paths]
//! scratch_root = /scratch
//! orca_root = /opt/orca/5.0.4
//! ```
//!
//! The built-in defaults reproduce the values hard-coded in the historical
//! qsub template, so a site with no configuration file behaves identically.
//!
//! # Usage
//!
//! ```no_run
//! use orcaprep::settings::SettingsManager;
//!
//! let settings = SettingsManager::load()?;
//! println!("queue: {}", settings.settings().queue.name);
//! # Ok::<(), orcaprep::settings::ConfigError>(())
//! ```

use configparser::ini::Ini;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error when reading configuration files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// INI parsing error
    #[error("INI parsing error: {0}")]
    IniParse(String),
}

/// Main configuration structure containing all site settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Batch queue settings
    pub queue: QueueSettings,
    /// Toolchain module settings
    pub modules: ModuleSettings,
    /// Installation and scratch path settings
    pub paths: PathSettings,
}

/// Batch queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Queue name passed as `#PBS -q` (default: "workq")
    pub name: String,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            name: "workq".to_string(),
        }
    }
}

/// Toolchain modules loaded by the generated script, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSettings {
    /// Compiler suite module (default: "intel/2021.2")
    pub compiler: String,
    /// MPI implementation module matched to the compiler
    /// (default: "openmpi/4.1.1-intel")
    pub mpi: String,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            compiler: "intel/2021.2".to_string(),
            mpi: "openmpi/4.1.1-intel".to_string(),
        }
    }
}

/// Installation and scratch path settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root under which per-run scratch directories are created
    /// (default: "/scratch")
    pub scratch_root: String,
    /// ORCA installation root; the solver binary is `{orca_root}/orca`
    /// (default: "/opt/orca/5.0.4")
    pub orca_root: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            scratch_root: "/scratch".to_string(),
            orca_root: "/opt/orca/5.0.4".to_string(),
        }
    }
}

/// Configuration manager that loads and exposes site settings.
pub struct SettingsManager {
    settings: Settings,
    config_source: String,
}

impl SettingsManager {
    /// Loads configuration from available configuration files.
    ///
    /// Files are applied lowest-precedence first (system, then user, then
    /// local), each overriding the keys it provides; anything never set keeps
    /// its built-in default. A file that fails to parse is skipped with a
    /// warning rather than aborting generation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Settings::default();
        let mut config_source = "built-in defaults".to_string();

        for path in Self::config_paths().iter().rev() {
            if !path.exists() {
                continue;
            }
            match Self::apply_file(&mut settings, path) {
                Ok(()) => {
                    config_source = path.display().to_string();
                    debug!("Loaded configuration from: {}", path.display());
                }
                Err(e) => {
                    warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        debug!("Configuration source: {}", config_source);
        Ok(Self {
            settings,
            config_source,
        })
    }

    /// Returns settings built purely from defaults, ignoring any files.
    pub fn defaults() -> Self {
        Self {
            settings: Settings::default(),
            config_source: "built-in defaults".to_string(),
        }
    }

    /// Returns the source of the highest-precedence loaded configuration.
    pub fn config_source(&self) -> &str {
        &self.config_source
    }

    /// Gets a reference to the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Candidate configuration paths, highest precedence first.
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("orcaprep.cfg")];
        if let Ok(home) = std::env::var("HOME") {
            paths.push(
                Path::new(&home)
                    .join(".config")
                    .join("orcaprep")
                    .join("orcaprep.cfg"),
            );
        }
        paths.push(PathBuf::from("/etc/orcaprep/orcaprep.cfg"));
        paths
    }

    /// Applies one INI file on top of the current settings.
    ///
    /// A file that vanishes or turns unreadable between the existence check
    /// and the read surfaces as `ConfigError::Io`.
    fn apply_file(settings: &mut Settings, path: &Path) -> Result<(), ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut ini = Ini::new();
        ini.read(content).map_err(ConfigError::IniParse)?;

        if let Some(name) = ini.get("queue", "name") {
            settings.queue.name = name;
        }
        if let Some(compiler) = ini.get("modules", "compiler") {
            settings.modules.compiler = compiler;
        }
        if let Some(mpi) = ini.get("modules", "mpi") {
            settings.modules.mpi = mpi;
        }
        if let Some(scratch_root) = ini.get("paths", "scratch_root") {
            settings.paths.scratch_root = scratch_root;
        }
        if let Some(orca_root) = ini.get("paths", "orca_root") {
            settings.paths.orca_root = orca_root;
        }
        Ok(())
    }
}
