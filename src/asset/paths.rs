use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    entries: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    key: String,
    path: String,
}

/// Named asset locations read from a JSON manifest.
///
/// Entries are resolved in file order relative to the manifest's directory.
/// A value whose first segment is an earlier key (`"Textures/wood.png"`) is
/// resolved under that key's path instead. Entries that do not exist on disk
/// are dropped with a warning.
#[derive(Debug, Default, Clone)]
pub struct AssetPaths {
    root: PathBuf,
    paths: HashMap<String, PathBuf>,
}

impl AssetPaths {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_manifest_str(&contents, root) {
                Ok(paths) => {
                    info!("Loaded {} asset paths from {:?}", paths.len(), path);
                    paths
                }
                Err(err) => {
                    warn!("Failed to parse asset manifest {:?} ({}).", path, err);
                    Self::empty()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to open asset manifest {:?} ({}). No asset paths available.",
                    path, err
                );
                Self::empty()
            }
        }
    }

    pub fn from_manifest_str(
        contents: &str,
        root: impl Into<PathBuf>,
    ) -> Result<Self, serde_json::Error> {
        let manifest: Manifest = serde_json::from_str(contents)?;
        let mut paths = Self {
            root: root.into(),
            paths: HashMap::with_capacity(manifest.entries.len()),
        };

        for entry in manifest.entries {
            let resolved = paths.resolve(&entry.path);
            if !resolved.exists() {
                warn!(
                    "Asset path '{}' resolves to {:?}, which does not exist. Skipping.",
                    entry.key, resolved
                );
                continue;
            }
            paths.paths.insert(entry.key, resolved);
        }

        Ok(paths)
    }

    fn resolve(&self, value: &str) -> PathBuf {
        if let Some((base, rest)) = value.split_once('/') {
            if let Some(base_path) = self.paths.get(base) {
                return base_path.join(rest);
            }
        }
        self.root.join(value)
    }

    /// Looks up a key, logging when it is unknown.
    pub fn get(&self, key: &str) -> Option<&Path> {
        let path = self.paths.get(key).map(PathBuf::as_path);
        if path.is_none() {
            warn!("No asset path registered for key '{}'.", key);
        }
        path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.paths.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
