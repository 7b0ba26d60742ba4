//! Runtime configuration resolved from CLI flags and environment

use std::path::PathBuf;

use directories::BaseDirs;

use crate::services::boundaries::BoundarySource;
use crate::types::{OlistError, Result};

/// Name of the per-user state directory under $HOME
const STATE_DIR: &str = ".olistdash";

/// Where to read data from and where to keep caches and logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the Olist CSV files
    pub data_dir: PathBuf,
    pub boundaries: BoundarySource,
    /// Skip the boundary document entirely
    pub map_enabled: bool,
    /// Cache and log directory (~/.olistdash)
    pub state_dir: PathBuf,
}

impl AppConfig {
    /// Build a config with the default state directory under $HOME
    pub fn new(data_dir: PathBuf, boundaries: Option<&str>, map_enabled: bool) -> Result<Self> {
        Ok(Self::with_state_dir(
            data_dir,
            boundaries,
            map_enabled,
            default_state_dir()?,
        ))
    }

    /// Config for the query subcommands: no map, and no home directory required
    pub fn for_queries(data_dir: PathBuf, boundaries: Option<&str>) -> Self {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self::with_state_dir(data_dir, boundaries, false, state_dir_or_temp(home))
    }

    pub fn with_state_dir(
        data_dir: PathBuf,
        boundaries: Option<&str>,
        map_enabled: bool,
        state_dir: PathBuf,
    ) -> Self {
        Self {
            data_dir,
            boundaries: boundaries.map(BoundarySource::parse).unwrap_or_default(),
            map_enabled,
            state_dir,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("olistdash.log")
    }
}

/// ~/.olistdash
fn default_state_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| OlistError::Config("Cannot determine home directory".into()))?;
    Ok(base_dirs.home_dir().join(STATE_DIR))
}

/// State directory under `home`, or under the system temp dir without one
fn state_dir_or_temp(home: Option<PathBuf>) -> PathBuf {
    home.unwrap_or_else(std::env::temp_dir).join(STATE_DIR)
}
