//! Scripts-root lookup.
//!
//! Deployments ship migrations in a `<Project>.Database/Scripts/<Engine>`
//! folder somewhere above the installed binary. The lookup walks upward from
//! a start directory and takes the first `<Project>.Database` it meets.

use crate::config::DbKind;
use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

const DB_FOLDER_SUFFIX: &str = "Database";
const SCRIPTS_FOLDER_NAME: &str = "Scripts";

/// Number of directories inspected, the start directory included.
pub const MAX_SEARCH_LEVELS: usize = 6;

/// Find the scripts root starting from the running executable's directory.
pub fn find_scripts(project_name: &str, db_kind: DbKind) -> CoreResult<PathBuf> {
    let exe = std::env::current_exe()?;
    let start = exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    find_scripts_from(&start, project_name, db_kind)
}

/// Find the scripts root starting from `start`.
///
/// Returns `<dir>/<project>.Database/Scripts/<engine>` for the nearest
/// `dir` (at most [`MAX_SEARCH_LEVELS`] levels up) containing the project
/// folder.
pub fn find_scripts_from(start: &Path, project_name: &str, db_kind: DbKind) -> CoreResult<PathBuf> {
    let db_folder_name = format!("{}.{}", project_name, DB_FOLDER_SUFFIX);

    for dir in start.ancestors().take(MAX_SEARCH_LEVELS) {
        let candidate = dir.join(&db_folder_name);
        if !candidate.is_dir() {
            continue;
        }
        let scripts_root = candidate
            .join(SCRIPTS_FOLDER_NAME)
            .join(db_kind.folder_name());
        if !scripts_root.is_dir() {
            return Err(CoreError::ScriptsRootMissing {
                path: scripts_root.display().to_string(),
            });
        }
        log::debug!("Using scripts root {}", scripts_root.display());
        return Ok(scripts_root);
    }

    Err(CoreError::ScriptsRootNotFound {
        folder: db_folder_name,
        start: start.display().to_string(),
    })
}
