//! Locating legacy project files under a root path

use crate::errors::CliError;
use sdkify_logger as logger;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

const PROJECT_EXTENSION: &str = "csproj";

/// Build output and VCS folders never hold projects worth migrating
const SKIPPED_DIRS: &[&str] = &["bin", "obj", ".git", ".vs", "node_modules"];

/// Find `.csproj` files at `root`.
///
/// A file root is taken as-is. A directory root is searched one level deep,
/// or fully when `recurse` is set. Results are sorted by path.
pub fn discover_projects(root: &Path, recurse: bool) -> Result<Vec<PathBuf>, CliError> {
    if !root.exists() {
        return Err(CliError::RootNotFound(root.to_path_buf()));
    }

    if root.is_file() {
        if is_project_file(root) {
            return Ok(vec![root.to_path_buf()]);
        }
        return Err(CliError::NotAProject(root.to_path_buf()));
    }

    let max_depth = if recurse { usize::MAX } else { 1 };
    let mut projects = Vec::new();
    for entry in WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                logger::warn(&format!("Skipping unreadable entry: {}", e));
                continue;
            }
        };
        if entry.file_type().is_file() && is_project_file(entry.path()) {
            projects.push(entry.into_path());
        }
    }

    projects.sort();
    logger::debug(&format!(
        "Found {} project file(s) under {}",
        projects.len(),
        root.display()
    ));
    Ok(projects)
}

fn is_project_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PROJECT_EXTENSION))
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    let skipped = entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.iter().any(|s| name.eq_ignore_ascii_case(s)));
    if skipped {
        debug!(dir = %entry.path().display(), "Not descending into build or VCS folder");
    }
    skipped
}
