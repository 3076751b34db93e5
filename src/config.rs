use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DATA_FILE_NAME: &str = "apps.json";
pub const DATA_FILE_ENV: &str = "OXIDE_LAUNCHER_DATA";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Shortcut {
    /// Working directory for the launched process; empty means inherit.
    #[serde(default)]
    pub env_path: String,
    pub app_path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid shortcut data in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize shortcuts for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("shortcut name must not be empty")]
    EmptyName,

    #[error("application path must not be empty")]
    EmptyPath,

    #[error("shortcut '{0}' already exists")]
    Duplicate(String),

    #[error("shortcut '{0}' not found")]
    NotFound(String),
}

/// Shortcuts keyed by display name, persisted as one JSON object.
#[derive(Debug)]
pub struct ShortcutStore {
    path: PathBuf,
    shortcuts: BTreeMap<String, Shortcut>,
}

impl ShortcutStore {
    /// Loads the store, creating an empty data file if none exists yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            info!("No data file at {:?}, creating an empty one", path);
            let store = Self {
                path,
                shortcuts: BTreeMap::new(),
            };
            store.save()?;
            return Ok(store);
        }

        let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let shortcuts = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
        let store = Self { path, shortcuts };
        debug!("Loaded {} shortcuts from {:?}", store.len(), store.path);
        Ok(store)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let io_error = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(&self.shortcuts).map_err(|source| {
            StoreError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(io_error)
    }

    /// Registers a new shortcut and persists the store. Inputs are trimmed.
    pub fn add(&mut self, name: &str, env_path: &str, app_path: &str) -> Result<(), StoreError> {
        let name = name.trim();
        let app_path = app_path.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if app_path.is_empty() {
            return Err(StoreError::EmptyPath);
        }
        if self.shortcuts.contains_key(name) {
            return Err(StoreError::Duplicate(name.to_string()));
        }

        self.shortcuts.insert(
            name.to_string(),
            Shortcut {
                env_path: env_path.trim().to_string(),
                app_path: app_path.to_string(),
            },
        );
        self.save()
    }

    pub fn remove(&mut self, name: &str) -> Result<Shortcut, StoreError> {
        let removed = self
            .shortcuts
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        self.save()?;
        Ok(removed)
    }

    pub fn get(&self, name: &str) -> Option<&Shortcut> {
        self.shortcuts.get(name)
    }

    /// Names containing `text` case-insensitively, in ascending order.
    pub fn filter(&self, text: &str) -> Vec<(&str, &Shortcut)> {
        let needle = text.to_lowercase();
        self.shortcuts
            .iter()
            .filter(|(name, _)| name.to_lowercase().contains(&needle))
            .map(|(name, shortcut)| (name.as_str(), shortcut))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Picks the data file: explicit flag, then the environment override, then
/// `apps.json` beside the executable if one is there, else the working
/// directory.
pub fn find_data_file(explicit: Option<PathBuf>) -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()));
    pick_data_file(explicit, std::env::var_os(DATA_FILE_ENV), exe_dir)
}

fn pick_data_file(
    explicit: Option<PathBuf>,
    env_override: Option<OsString>,
    exe_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    if let Some(value) = env_override.filter(|v| !v.is_empty()) {
        return PathBuf::from(value);
    }
    if let Some(candidate) = exe_dir.map(|d| d.join(DATA_FILE_NAME)) {
        if candidate.exists() {
            debug!("Found data file at: {:?}", candidate);
            return candidate;
        }
    }
    PathBuf::from(DATA_FILE_NAME)
}
