//! Script classification: ordering keys, markers and connection tiers.
//!
//! Script files follow `<prefix>_<MARKER>_<name>.<ext>`. The numeric prefix
//! orders scripts inside a folder; the optional marker picks a connection
//! other than the folder's default.

use crate::error::{CoreError, CoreResult};
use crate::folders::FolderKind;
use crate::ordering::{numeric_prefix, sort_by_key};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extensions recognized as scripts; every other file is ignored.
pub const SCRIPT_EXTENSIONS: &[&str] = &["sql", "ddl", "txt"];

const SYSTEM_MARKER: &str = "SYS";
const MASTER_MARKER: &str = "MASTER";

/// Which configured connection a script runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionTier {
    /// User with DDL rights on the target database
    Ddl,
    /// Superuser on the target database
    Master,
    /// Superuser on the engine's always-present default database
    System,
}

impl std::fmt::Display for ConnectionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionTier::Ddl => write!(f, "DDL"),
            ConnectionTier::Master => write!(f, "master"),
            ConnectionTier::System => write!(f, "system"),
        }
    }
}

/// Marker token embedded in a script name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptMarker {
    /// `SYS`
    System,
    /// `MASTER`
    Master,
    /// No recognized marker
    None,
}

impl ScriptMarker {
    /// Extract the marker from a file name.
    ///
    /// The marker is the token between the first and second underscore.
    /// Names starting with `_`, names with fewer than two underscores and
    /// unknown tokens all yield [`ScriptMarker::None`].
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.starts_with('_') {
            return ScriptMarker::None;
        }
        let Some((_, rest)) = file_name.split_once('_') else {
            return ScriptMarker::None;
        };
        let Some((token, _)) = rest.split_once('_') else {
            return ScriptMarker::None;
        };
        match token {
            SYSTEM_MARKER => ScriptMarker::System,
            MASTER_MARKER => ScriptMarker::Master,
            _ => ScriptMarker::None,
        }
    }

    /// Resolve the connection tier for a script of this marker in a folder of `kind`.
    ///
    /// Bootstrap scripts default to the master connection and cannot ask
    /// for DDL; versioned scripts default to DDL.
    pub fn tier(self, kind: FolderKind) -> ConnectionTier {
        match (self, kind) {
            (ScriptMarker::System, _) => ConnectionTier::System,
            (_, FolderKind::Bootstrap) => ConnectionTier::Master,
            (ScriptMarker::Master, _) => ConnectionTier::Master,
            (ScriptMarker::None, _) => ConnectionTier::Ddl,
        }
    }
}

/// A discovered script file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef {
    /// Absolute path to the file
    pub path: PathBuf,

    /// Base file name
    pub file_name: String,

    /// Numeric prefix, `None` when the name has none
    pub order_key: Option<u64>,

    /// Marker embedded in the name
    pub marker: ScriptMarker,
}

impl ScriptRef {
    /// Classify a script path. Returns `None` for non-script files.
    ///
    /// A name that is not valid UTF-8 is classified on its lossy form; the
    /// script still runs from its real path.
    pub fn from_path(path: &Path) -> Option<Self> {
        if !is_script_file(path) {
            return None;
        }
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            path: path.to_path_buf(),
            order_key: numeric_prefix(&file_name),
            marker: ScriptMarker::from_file_name(&file_name),
            file_name,
        })
    }

    /// Connection tier this script needs inside a folder of `kind`
    pub fn tier(&self, kind: FolderKind) -> ConnectionTier {
        self.marker.tier(kind)
    }
}

impl std::fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Whether `path` carries one of the [`SCRIPT_EXTENSIONS`]
pub fn is_script_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SCRIPT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// List the scripts directly inside `folder`, in execution order.
pub fn list_scripts(folder: &Path) -> CoreResult<Vec<ScriptRef>> {
    let mut scripts = Vec::new();
    let entries = std::fs::read_dir(folder).map_err(|e| CoreError::io_with_path(folder, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::io_with_path(folder, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(script) = ScriptRef::from_path(&path) {
            scripts.push(script);
        }
    }
    sort_by_key(&mut scripts, |s| s.order_key, |s| s.file_name.as_str());
    Ok(scripts)
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
