//! User configuration from `exile.toml`.
//!
//! Every field is optional. A missing file yields the defaults silently; an
//! unreadable or malformed file yields the defaults with a warning, so a typo
//! in the config never blocks progress tracking.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use exile_data::{CharacterClass, RequiredGem};
use exile_route::ParseOptions;

pub const CONFIG_FILE: &str = "exile.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExileConfig {
    pub league: Option<String>,
    pub class: Option<CharacterClass>,
    /// Path of Building code carried into exports.
    pub pob_code: Option<String>,
    pub voidstone_order: Vec<usize>,
    pub defines: BTreeSet<String>,
    /// Build gems in acquisition order.
    pub gems: Vec<RequiredGem>,
    pub data_dir: Option<PathBuf>,
    pub route_dir: Option<PathBuf>,
    pub voidstone_dir: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
}

impl Default for ExileConfig {
    fn default() -> Self {
        Self {
            league: None,
            class: None,
            pob_code: None,
            voidstone_order: (0..exile_route::VOIDSTONE_COUNT).collect(),
            defines: BTreeSet::new(),
            gems: Vec::new(),
            data_dir: None,
            route_dir: None,
            voidstone_dir: None,
            store_path: None,
        }
    }
}

impl ExileConfig {
    /// Parse options for the act route.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            class: self.class,
            required_gems: self.gems.clone(),
            defines: self.defines.clone(),
        }
    }
}

/// Parse config text.
///
/// # Errors
/// Fails on invalid TOML or unknown field values.
pub fn parse_config(text: &str) -> Result<ExileConfig> {
    toml::from_str(text).context("error parsing exile config TOML")
}

/// Load the config at `path`, falling back to defaults.
pub fn load_config(path: &Path) -> ExileConfig {
    if !path.exists() {
        info!("no config at '{}', using defaults", path.display());
        return ExileConfig::default();
    }
    match fs::read_to_string(path)
        .with_context(|| format!("reading '{}'", path.display()))
        .and_then(|text| parse_config(&text))
    {
        Ok(config) => {
            info!("config loaded from '{}'", path.display());
            config
        },
        Err(e) => {
            warn!("failed to load config from '{}': {e:#}; using defaults", path.display());
            ExileConfig::default()
        },
    }
}
