//! Versioned boolean key-value store for completion toggles.
//!
//! Every toggle lives in a namespace with a schema version; the stored key is
//! `"<namespace>@v<version>/<key>"`. Bumping a namespace version orphans the
//! old keys, which are simply never read again. Only `true` values are kept,
//! so an absent key reads as `false`.
//!
//! Two implementations: [`MemoryToggleStore`] for tests and embedding, and
//! [`FileToggleStore`], which persists to a RON file and replaces it
//! atomically on every change.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// A named, versioned group of toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub name: &'static str,
    pub version: u32,
}

impl Namespace {
    /// Act route steps, keyed `"<section>,<step>"`.
    pub const ROUTE: Namespace = Namespace::new("route-progress", 1);
    /// Voidstone route steps, keyed `"<section>,<step>"`.
    pub const VOIDSTONE: Namespace = Namespace::new("voidstone-progress", 0);
    /// Acquired gems, keyed by gem id.
    pub const GEMS: Namespace = Namespace::new("gem-progress", 1);
    /// Completed challenges, keyed by challenge id.
    pub const CHALLENGES: Namespace = Namespace::new("challenge-progress", 0);
    /// Atlas guide steps, keyed by step id.
    pub const ATLAS: Namespace = Namespace::new("atlas-completion", 0);

    pub const fn new(name: &'static str, version: u32) -> Self {
        Self { name, version }
    }

    pub fn prefix(&self) -> String {
        format!("{}@v{}/", self.name, self.version)
    }

    pub fn key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix())
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        [Self::ROUTE, Self::VOIDSTONE, Self::GEMS, Self::CHALLENGES, Self::ATLAS]
            .into_iter()
            .find(|ns| ns.name == raw)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.name, self.version)
    }
}

/// Completion state service injected into progress and CLI code.
pub trait ToggleStore {
    fn get(&self, namespace: Namespace, key: &str) -> bool;

    /// # Errors
    /// Persistent stores fail when the change cannot be written.
    fn set(&mut self, namespace: Namespace, key: &str, value: bool) -> Result<()>;

    /// Keys currently `true` in `namespace`, without the namespace prefix.
    fn keys(&self, namespace: Namespace) -> Vec<String>;

    /// Remove every toggle in `namespace` in one step.
    ///
    /// # Errors
    /// Persistent stores fail when the change cannot be written; the
    /// namespace is then left untouched.
    fn clear_all(&mut self, namespace: Namespace) -> Result<()>;
}

fn keys_with_prefix(set: &BTreeSet<String>, namespace: Namespace) -> Vec<String> {
    let prefix = namespace.prefix();
    set.range(prefix.clone()..)
        .take_while(|k| k.starts_with(&prefix))
        .map(|k| k[prefix.len()..].to_string())
        .collect()
}

fn without_namespace(set: &BTreeSet<String>, namespace: Namespace) -> BTreeSet<String> {
    let prefix = namespace.prefix();
    set.iter().filter(|k| !k.starts_with(&prefix)).cloned().collect()
}

fn with_value(set: &BTreeSet<String>, full_key: String, value: bool) -> BTreeSet<String> {
    let mut next = set.clone();
    if value {
        next.insert(full_key);
    } else {
        next.remove(&full_key);
    }
    next
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryToggleStore {
    enabled: BTreeSet<String>,
}

impl MemoryToggleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ToggleStore for MemoryToggleStore {
    fn get(&self, namespace: Namespace, key: &str) -> bool {
        self.enabled.contains(&namespace.key(key))
    }

    fn set(&mut self, namespace: Namespace, key: &str, value: bool) -> Result<()> {
        self.enabled = with_value(&self.enabled, namespace.key(key), value);
        Ok(())
    }

    fn keys(&self, namespace: Namespace) -> Vec<String> {
        keys_with_prefix(&self.enabled, namespace)
    }

    fn clear_all(&mut self, namespace: Namespace) -> Result<()> {
        self.enabled = without_namespace(&self.enabled, namespace);
        Ok(())
    }
}

/// On-disk layout of the progress file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ToggleFile {
    /// Crate version that last wrote the file.
    #[serde(default)]
    written_by: String,
    #[serde(default)]
    enabled: BTreeSet<String>,
}

/// RON-backed store. The file is rewritten through a temporary file in the
/// same directory and renamed over the old one, so readers never see a
/// half-written file.
#[derive(Debug)]
pub struct FileToggleStore {
    path: PathBuf,
    enabled: BTreeSet<String>,
}

impl FileToggleStore {
    /// Open the store at `path`, starting empty when the file does not exist.
    ///
    /// # Errors
    /// Fails if an existing file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let enabled = if path.exists() {
            let text = fs::read_to_string(&path).with_context(|| format!("reading progress from '{}'", path.display()))?;
            let file: ToggleFile =
                ron::from_str(&text).with_context(|| format!("parsing progress RON from '{}'", path.display()))?;
            info!("{} toggle(s) loaded from '{}'", file.enabled.len(), path.display());
            file.enabled
        } else {
            debug!("no progress file at '{}', starting empty", path.display());
            BTreeSet::new()
        };
        Ok(Self { path, enabled })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `next` to disk and adopt it only once the rename succeeded.
    fn commit(&mut self, next: BTreeSet<String>) -> Result<()> {
        let file = ToggleFile {
            written_by: crate::EXILE_VERSION.to_string(),
            enabled: next,
        };
        let text = ron::ser::to_string_pretty(&file, ron::ser::PrettyConfig::default())
            .context("error converting progress to 'ron' format")?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).with_context(|| format!("creating '{}'", dir.display()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("creating temporary file in '{}'", dir.display()))?;
        tmp.write_all(text.as_bytes())
            .context("failed to write progress to temporary file")?;
        tmp.persist(&self.path)
            .with_context(|| format!("replacing '{}'", self.path.display()))?;
        self.enabled = file.enabled;
        Ok(())
    }
}

impl ToggleStore for FileToggleStore {
    fn get(&self, namespace: Namespace, key: &str) -> bool {
        self.enabled.contains(&namespace.key(key))
    }

    fn set(&mut self, namespace: Namespace, key: &str, value: bool) -> Result<()> {
        let next = with_value(&self.enabled, namespace.key(key), value);
        if next == self.enabled {
            return Ok(());
        }
        self.commit(next)
    }

    fn keys(&self, namespace: Namespace) -> Vec<String> {
        keys_with_prefix(&self.enabled, namespace)
    }

    fn clear_all(&mut self, namespace: Namespace) -> Result<()> {
        let next = without_namespace(&self.enabled, namespace);
        info!(
            "clearing {} toggle(s) in {namespace}",
            self.enabled.len() - next.len()
        );
        self.commit(next)
    }
}

/// Default location of the progress file under the user's data directory.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("exile-progression")
        .join("progress.ron")
}
