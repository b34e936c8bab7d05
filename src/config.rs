//! Runtime configuration, resolved once at startup and passed down explicitly.
//!
//! Values come from a `.env` file overlaid by the process environment; the
//! process environment always wins. Reading the file never mutates the
//! environment of the running process.

use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DATA_DIR: &str = "DATA_DIR";
pub const IMPORT_MANIFEST: &str = "IMPORT_MANIFEST";
pub const DOTENV_PATH: &str = "DOTENV_PATH";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set (from .env or process environment)")]
    MissingDatabaseUrl,

    #[error("failed to read env file {path:?}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    /// Directory holding the source `.dat` files.
    pub data_dir: PathBuf,
    /// Optional YAML list of file specs replacing the built-in five.
    pub manifest: Option<PathBuf>,
}

impl Config {
    /// Resolve from the real process environment plus the first `.env` found.
    pub fn from_env() -> Result<Self, ConfigError> {
        let process = process_vars();
        let file = load_env_file(&process)?;
        Self::resolve(&file, &process)
    }

    /// Merge `file` values under `process` values.
    pub fn resolve(
        file: &HashMap<String, String>,
        process: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| {
            process
                .get(key)
                .or_else(|| file.get(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = lookup(DATABASE_URL).ok_or(ConfigError::MissingDatabaseUrl)?;
        let data_dir = lookup(DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let manifest = lookup(IMPORT_MANIFEST).map(PathBuf::from);

        Ok(Config {
            database_url,
            data_dir,
            manifest,
        })
    }
}

fn process_vars() -> HashMap<String, String> {
    env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Candidate `.env` locations, most specific first:
/// `DOTENV_PATH`, then next to the data directory's parent, then the working directory.
pub fn env_file_candidates(process: &HashMap<String, String>) -> Vec<PathBuf> {
    if let Some(explicit) = explicit_env_file(process) {
        return vec![explicit];
    }
    let data_dir = process
        .get(DATA_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    vec![data_dir.join("..").join(".env"), PathBuf::from(".env")]
}

fn explicit_env_file(process: &HashMap<String, String>) -> Option<PathBuf> {
    process
        .get(DOTENV_PATH)
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

/// Read the `.env` file that applies to `process`.
///
/// A `DOTENV_PATH` that cannot be read is an error; otherwise a missing
/// file just means the process environment stands alone.
pub fn load_env_file(
    process: &HashMap<String, String>,
) -> Result<HashMap<String, String>, ConfigError> {
    if let Some(explicit) = explicit_env_file(process) {
        return read_env_file(&explicit);
    }
    match env_file_candidates(process).into_iter().find(|p| p.is_file()) {
        Some(path) => read_env_file(&path),
        None => {
            warn!(".env file not found, using process environment only");
            Ok(HashMap::new())
        }
    }
}

/// Parse a `.env` file into a map without touching the process environment.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let to_err = |source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };
    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(to_err)? {
        let (k, v) = item.map_err(to_err)?;
        vars.insert(k, v);
    }
    debug!(path = %path.display(), keys = vars.len(), "loaded env file");
    Ok(vars)
}
