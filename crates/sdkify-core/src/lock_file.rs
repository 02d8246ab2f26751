//! `packages.config` translation

use crate::errors::MigrateError;
use crate::types::PackageReferenceEntry;
use crate::xml_tree::{self, XmlElement};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The lock file beside `project_path`, if one exists
pub fn locate_lock_file(project_path: &Path, file_name: &str) -> Option<PathBuf> {
    let candidate = project_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(file_name);
    candidate.is_file().then_some(candidate)
}

/// Every `<package>` entry carrying both `id` and `version`, in document order
pub fn lock_entries(root: &XmlElement, lock_path: &Path) -> Vec<PackageReferenceEntry> {
    root.descendants()
        .filter(|element| element.name() == "package")
        .filter_map(
            |element| match (element.attribute("id"), element.attribute("version")) {
                (Some(id), Some(version)) => Some(PackageReferenceEntry::new(id, version)),
                (id, _) => {
                    debug!(
                        lock_file = %lock_path.display(),
                        "Skipping package entry without id and version (id: {:?})", id
                    );
                    None
                }
            },
        )
        .collect()
}

/// Translate a lock file into package references.
///
/// No lock file means no translated entries. Test projects always get
/// `test_packages` appended, even when the lock file already pins the same ids.
pub fn translate_lock_file(
    lock_path: Option<&Path>,
    is_test_project: bool,
    test_packages: &[PackageReferenceEntry],
    max_bytes: u64,
) -> Result<Vec<PackageReferenceEntry>, MigrateError> {
    let mut entries = match lock_path {
        Some(path) => {
            let root = xml_tree::load(path, max_bytes)?;
            lock_entries(&root, path)
        }
        None => Vec::new(),
    };

    if is_test_project {
        entries.extend_from_slice(test_packages);
    }

    Ok(entries)
}
