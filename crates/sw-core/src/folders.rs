//! Folder discovery under a scripts root.
//!
//! A scripts root (e.g. `MyProject.Database/Scripts/Postgres`) holds one
//! optional `00_CreateDB` folder plus one folder per version, named by the
//! version number. Anything else is reported and left alone.

use crate::error::{CoreError, CoreResult};
use crate::ordering::{parse_digits, sort_by_key};
use crate::script::{list_scripts, ScriptRef};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Name of the bootstrap folder, compared case-insensitively
pub const BOOTSTRAP_FOLDER_NAME: &str = "00_createdb";

/// Classification of a folder under the scripts root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderKind {
    /// Creates the database itself; runs with elevated privileges
    Bootstrap,
    /// One migration step to the contained version
    Versioned(i32),
    /// Neither; never applied
    Ignored,
}

impl FolderKind {
    /// Classify a folder by its base name
    pub fn from_folder_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case(BOOTSTRAP_FOLDER_NAME) {
            return FolderKind::Bootstrap;
        }
        match parse_digits(name).and_then(|v| i32::try_from(v).ok()) {
            Some(version) => FolderKind::Versioned(version),
            None => FolderKind::Ignored,
        }
    }

    /// Version carried by a versioned folder
    pub fn version(&self) -> Option<i32> {
        match self {
            FolderKind::Versioned(v) => Some(*v),
            _ => None,
        }
    }
}

/// A folder of scripts, with its scripts already in execution order
#[derive(Debug, Clone)]
pub struct MigrationFolder {
    /// Classification
    pub kind: FolderKind,

    /// Absolute path
    pub path: PathBuf,

    /// Base name as found on disk
    pub name: String,

    /// Scripts in execution order
    pub scripts: Vec<ScriptRef>,
}

impl MigrationFolder {
    /// Load a folder and its scripts
    pub fn load(path: &Path, kind: FolderKind) -> CoreResult<Self> {
        Ok(Self {
            kind,
            path: path.to_path_buf(),
            name: folder_name(path),
            scripts: list_scripts(path)?,
        })
    }

    /// Version of a versioned folder
    pub fn version(&self) -> Option<i32> {
        self.kind.version()
    }
}

impl std::fmt::Display for MigrationFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Result of scanning a scripts root
#[derive(Debug, Clone, Default)]
pub struct DiscoveredFolders {
    /// The `00_CreateDB` folder, if any
    pub bootstrap: Option<MigrationFolder>,

    /// Versioned folders, ascending by version
    pub versioned: Vec<MigrationFolder>,

    /// Folders that will not be applied
    pub ignored: Vec<PathBuf>,
}

impl DiscoveredFolders {
    /// Write the folder listing to the log
    pub fn log_summary(&self) {
        log::info!("Folder for createDB:");
        if let Some(bootstrap) = &self.bootstrap {
            log::info!("  {}", bootstrap);
        }
        log::info!("Folders with scripts:");
        for folder in &self.versioned {
            log::info!("  {}", folder);
        }
    }
}

/// Scan `scripts_root` and partition its immediate subfolders.
///
/// Subfolders are visited in name order so the outcome does not depend on
/// filesystem enumeration order. A folder whose lowercased name was already
/// seen for this project is skipped, which also keeps only the first
/// bootstrap folder.
pub fn discover(project_name: &str, scripts_root: &Path) -> CoreResult<DiscoveredFolders> {
    if !scripts_root.is_dir() {
        return Err(CoreError::ScriptsFolderMissing {
            path: scripts_root.display().to_string(),
        });
    }

    let mut subfolders = Vec::new();
    let entries =
        std::fs::read_dir(scripts_root).map_err(|e| CoreError::io_with_path(scripts_root, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::io_with_path(scripts_root, e))?;
        let path = entry.path();
        if path.is_dir() {
            subfolders.push(path);
        }
    }
    subfolders.sort();

    let mut discovered = DiscoveredFolders::default();
    let mut seen: HashSet<String> = HashSet::new();

    for path in subfolders {
        let name = folder_name(&path);
        let key = format!("{}#{}", project_name, name).to_lowercase();

        match FolderKind::from_folder_name(&name) {
            FolderKind::Ignored => {
                log::warn!(
                    "Folder '{}' and its scripts will be ignored.",
                    path.display()
                );
                discovered.ignored.push(path);
            }
            kind => {
                if !seen.insert(key) {
                    log::debug!("Skipping duplicate folder '{}'", path.display());
                    continue;
                }
                let folder = MigrationFolder::load(&path, kind)?;
                if kind == FolderKind::Bootstrap {
                    discovered.bootstrap = Some(folder);
                } else {
                    discovered.versioned.push(folder);
                }
            }
        }
    }

    sort_by_key(
        &mut discovered.versioned,
        |f| f.version().and_then(|v| u64::try_from(v).ok()),
        |f| f.name.as_str(),
    );

    Ok(discovered)
}

fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "folders_test.rs"]
mod tests;
