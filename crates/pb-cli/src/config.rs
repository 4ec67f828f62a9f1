//! Configuration-time defaults: an optional `.parabatch.toml` layer
//! (cwd, then the XDG config directory) supplying values CLI flags
//! override, plus environment/CPU-derived fallbacks.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("source path does not exist: {0}")]
    MissingSource(PathBuf),

    #[error("no usable shell found ($SHELL, bash, and sh were all unresolvable)")]
    NoShell,

    #[error("shell {0} does not exist")]
    UnresolvableShell(PathBuf),
}

/// Defaults a `.parabatch.toml` file may supply; any field left unset
/// falls back to the hardcoded default. CLI flags always win over both.
#[derive(Debug, Default, Deserialize)]
pub struct FileDefaults {
    pub processes: Option<usize>,
    pub retries: Option<u32>,
    pub shell: Option<PathBuf>,
    pub recreate: Option<bool>,
}

impl FileDefaults {
    /// Load `.parabatch.toml` from the current directory, falling back to
    /// `$XDG_CONFIG_HOME/parabatch/config.toml`. Absence of either file is
    /// not an error; only a present-but-unparseable file is.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = Self::cwd_candidate() {
            if path.is_file() {
                return Self::read(&path);
            }
        }
        if let Some(path) = Self::xdg_candidate() {
            if path.is_file() {
                return Self::read(&path);
            }
        }
        Ok(FileDefaults::default())
    }

    fn cwd_candidate() -> Option<PathBuf> {
        std::env::current_dir().ok().map(|d| d.join(".parabatch.toml"))
    }

    fn xdg_candidate() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "parabatch").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Default destination: `source` with trailing slashes stripped, plus
/// `-results`.
pub fn default_destination(source: &Path) -> PathBuf {
    let trimmed = source.to_string_lossy();
    let trimmed = trimmed.trim_end_matches('/');
    PathBuf::from(format!("{trimmed}-results"))
}

/// Resolve the shell to exec: `$SHELL`, else `bash`, else `sh` on `PATH`.
pub fn default_shell() -> Result<PathBuf, ConfigError> {
    if let Ok(from_env) = std::env::var("SHELL") {
        if !from_env.is_empty() {
            return Ok(PathBuf::from(from_env));
        }
    }
    which::which("bash").or_else(|_| which::which("sh")).map_err(|_| ConfigError::NoShell)
}

/// Validate a user- or config-supplied shell path actually resolves to an
/// executable, whether given as a bare name (searched on `PATH`) or an
/// absolute/relative path.
pub fn resolve_shell(shell: PathBuf) -> Result<PathBuf, ConfigError> {
    which::which(&shell).map_err(|_| ConfigError::UnresolvableShell(shell))
}

/// `max(1, cpu_count - 1)`, the default concurrency.
pub fn default_processes() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).saturating_sub(1).max(1)
}
