//! Viewer configuration, read from an optional JSON file.

use crate::charts::PlotLayout;
use crate::data::ColumnLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "scatterplot.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// CSV loaded at startup.
    pub data_path: PathBuf,
    pub column_layout: ColumnLayout,
    /// Year shown before the user picks one.
    pub default_year: String,
    pub layout: PlotLayout,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("assets/population.csv"),
            column_layout: ColumnLayout::Positional,
            default_year: "1960".to_string(),
            layout: PlotLayout::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Defaults when the file is absent; a broken file is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded viewer config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), "Ignoring config: {}", e);
                Self::default()
            }
        }
    }
}
