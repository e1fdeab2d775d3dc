//! Reference data on disk.
//!
//! A data directory holds `areas.json`, `quests.json` and `gems.json`, each a
//! JSON object keyed by id, plus an optional `gem_remaps.json` with
//! `awakened` and `vaal` alias tables.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;

use exile_data::{Id, ReferenceData};

pub const AREAS_FILE: &str = "areas.json";
pub const QUESTS_FILE: &str = "quests.json";
pub const GEMS_FILE: &str = "gems.json";
pub const GEM_REMAPS_FILE: &str = "gem_remaps.json";

#[derive(Debug, thiserror::Error)]
pub enum ReferenceLoadError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct GemRemaps {
    #[serde(default)]
    awakened: BTreeMap<Id, Id>,
    #[serde(default)]
    vaal: BTreeMap<Id, Id>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReferenceLoadError> {
    let text = fs::read_to_string(path).map_err(|source| ReferenceLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ReferenceLoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every reference table from `dir`.
///
/// # Errors
/// Fails if a required file is missing or any present file is malformed.
pub fn load_reference_dir(dir: &Path) -> Result<ReferenceData, ReferenceLoadError> {
    let remaps_path = dir.join(GEM_REMAPS_FILE);
    let remaps: GemRemaps = if remaps_path.is_file() {
        read_json(&remaps_path)?
    } else {
        GemRemaps::default()
    };
    Ok(ReferenceData {
        areas: read_json(&dir.join(AREAS_FILE))?,
        quests: read_json(&dir.join(QUESTS_FILE))?,
        gems: read_json(&dir.join(GEMS_FILE))?,
        awakened_gem_lookup: remaps.awakened,
        vaal_gem_lookup: remaps.vaal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn loads_tables_and_optional_remaps() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            AREAS_FILE,
            r#"{"1_1_town": {"id": "1_1_town", "name": "Lioneye's Watch", "act": 1, "is_town_area": true, "has_waypoint": true}}"#,
        );
        write(dir.path(), QUESTS_FILE, "{}");
        write(dir.path(), GEMS_FILE, r#"{"arc": {"id": "arc", "name": "Arc"}}"#);
        let data = load_reference_dir(dir.path()).unwrap();
        assert!(data.areas["1_1_town"].is_town_area);
        assert_eq!(data.gems["arc"].required_level, 0);
        assert!(data.vaal_gem_lookup.is_empty());

        write(dir.path(), GEM_REMAPS_FILE, r#"{"vaal": {"vaal_arc": "arc"}}"#);
        let data = load_reference_dir(dir.path()).unwrap();
        assert_eq!(data.canonical_gem_id("vaal_arc"), "arc");
    }

    #[test]
    fn missing_table_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_reference_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains(AREAS_FILE), "{err}");
    }
}
