//! `.nuspec` package metadata import

use crate::errors::MigrateError;
use crate::xml_tree::{self, XmlElement};
use serde::Serialize;
use std::path::Path;

pub const NUSPEC_NAMESPACE: &str = "http://schemas.microsoft.com/packaging/2011/08/nuspec.xsd";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    pub id: String,
    pub version: String,
    pub title: String,
    pub authors: String,
    pub description: String,
}

impl PackageMetadata {
    /// Read the five descriptive fields from a `.nuspec` file
    pub fn import(path: &Path, max_bytes: u64) -> Result<Self, MigrateError> {
        let root = xml_tree::load(path, max_bytes)?;
        Self::from_document(&root, path)
    }

    pub fn from_document(root: &XmlElement, path: &Path) -> Result<Self, MigrateError> {
        let field = |name: &str| -> Result<String, MigrateError> {
            root.find_first(NUSPEC_NAMESPACE, name)
                .map(|element| element.text().to_string())
                .ok_or_else(|| MigrateError::MissingField {
                    path: path.to_path_buf(),
                    field: name.to_string(),
                })
        };

        Ok(Self {
            id: field("id")?,
            version: field("version")?,
            title: field("title")?,
            authors: field("authors")?,
            description: field("description")?,
        })
    }
}
