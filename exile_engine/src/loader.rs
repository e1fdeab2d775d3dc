//! Loading reference data, route sources and checklists from disk.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use log::info;

use exile_data::ReferenceData;
use exile_route::{RouteFile, load_reference_dir, read_route_files};

use crate::atlas::AtlasGuide;
use crate::challenge::ChallengeData;
use crate::config::ExileConfig;

pub const CHALLENGES_FILE: &str = "challenges.json";
pub const ATLAS_FILE: &str = "atlas_guide.json";

/// Data directory found next to the working directory or the executable.
static DEFAULT_DATA_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    let mut bases = vec![PathBuf::new()];
    if let Ok(exe) = env::current_exe()
        && let Some(dir) = exe.parent()
    {
        bases.push(dir.to_path_buf());
        bases.extend(dir.parent().map(Path::to_path_buf));
    }
    find_data_dir(&bases).unwrap_or_else(|| PathBuf::from("exile_engine/data"))
});

/// The first `exile_engine/data` or `data` directory under `bases` that holds
/// an areas table.
fn find_data_dir(bases: &[PathBuf]) -> Option<PathBuf> {
    bases
        .iter()
        .flat_map(|base| [base.join("exile_engine").join("data"), base.join("data")])
        .find(|candidate| candidate.join(exile_route::AREAS_FILE).is_file())
}

/// Directories the CLI reads from, after applying config overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub data_dir: PathBuf,
    pub route_dir: PathBuf,
    pub voidstone_dir: PathBuf,
}

impl DataLayout {
    pub fn from_config(config: &ExileConfig) -> Self {
        let data_dir = config.data_dir.clone().unwrap_or_else(|| DEFAULT_DATA_DIR.clone());
        let route_dir = config
            .route_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("routes").join("act"));
        let voidstone_dir = config
            .voidstone_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("routes").join("voidstone"));
        Self {
            data_dir,
            route_dir,
            voidstone_dir,
        }
    }
}

/// Load the reference tables from `dir` and reject them if they are
/// inconsistent.
///
/// # Errors
/// Errors bubble up from file IO, JSON parsing, or validation.
pub fn load_reference(dir: &Path) -> Result<ReferenceData> {
    let reference = load_reference_dir(dir).with_context(|| format!("while loading reference data from '{}'", dir.display()))?;
    validate_reference(&reference)?;
    info!("{} areas loaded", reference.areas.len());
    info!("{} quests loaded", reference.quests.len());
    info!("{} gems loaded", reference.gems.len());
    Ok(reference)
}

/// Validate the reference tables and return a single aggregated error.
fn validate_reference(reference: &ReferenceData) -> Result<()> {
    let errors = exile_data::validate_reference_data(reference);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("reference data validation failed:\n{details}");
}

/// Read every `.txt` route file under `dir` in natural order.
///
/// # Errors
/// Fails when the directory cannot be read or holds no route files.
pub fn load_route_files(dir: &Path) -> Result<Vec<RouteFile>> {
    let files = read_route_files(&[dir.to_path_buf()]).with_context(|| format!("while reading routes from '{}'", dir.display()))?;
    info!("{} route file(s) read from '{}'", files.len(), dir.display());
    Ok(files)
}

/// Load `challenges.json` from `dir`. The file is optional.
///
/// # Errors
/// Fails when the file exists but cannot be read or parsed.
pub fn load_challenges(dir: &Path) -> Result<ChallengeData> {
    let path = dir.join(CHALLENGES_FILE);
    if !path.exists() {
        info!("no challenge table at '{}'", path.display());
        return Ok(ChallengeData::default());
    }
    let text = fs::read_to_string(&path).with_context(|| format!("reading '{}'", path.display()))?;
    let data: ChallengeData =
        serde_json::from_str(&text).with_context(|| format!("parsing challenges from '{}'", path.display()))?;
    info!("{} challenges loaded", data.challenges.len());
    Ok(data)
}

/// Load `atlas_guide.json` from `dir`. The file is optional.
///
/// # Errors
/// Fails when the file exists but cannot be read or parsed.
pub fn load_atlas_guide(dir: &Path) -> Result<AtlasGuide> {
    let path = dir.join(ATLAS_FILE);
    if !path.exists() {
        info!("no atlas guide at '{}'", path.display());
        return Ok(AtlasGuide::default());
    }
    let text = fs::read_to_string(&path).with_context(|| format!("reading '{}'", path.display()))?;
    let guide: AtlasGuide =
        serde_json::from_str(&text).with_context(|| format!("parsing atlas guide from '{}'", path.display()))?;
    info!("{} atlas phase(s) loaded", guide.phases.len());
    Ok(guide)
}
