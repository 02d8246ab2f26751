//! Queries over a legacy (MSBuild 2003 schema) project descriptor
//!
//! Every query is read-only and returns owned values; nothing here mutates
//! or rewrites the legacy tree.

use crate::errors::MigrateError;
use crate::types::{BuildHook, HookKind, ProjectReference};
use crate::xml_tree::{self, XmlElement};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// Output kind assumed when a project declares none
pub const DEFAULT_OUTPUT_KIND: &str = "Library";

/// Substrings of `<Reference Include=..>` values that mark a test project
const TEST_ASSEMBLY_MARKERS: [&str; 2] = [
    "Microsoft.VisualStudio.QualityTools.UnitTestFramework",
    "Microsoft.VisualStudio.TestTools",
];

#[derive(Debug, Clone)]
pub struct LegacyDescriptor {
    path: PathBuf,
    root: XmlElement,
}

impl LegacyDescriptor {
    /// Read and parse a legacy project file
    pub fn load(path: &Path, max_bytes: u64) -> Result<Self, MigrateError> {
        let root = xml_tree::load(path, max_bytes)?;
        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, MigrateError> {
        let root = xml_tree::parse_str(content, path)?;
        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the root `<Project>` already names an SDK
    pub fn is_sdk_style(&self) -> bool {
        self.root.name() == "Project" && self.root.attribute("Sdk").is_some()
    }

    /// Text of the first non-empty property with this name
    fn property(&self, name: &str) -> Option<&str> {
        self.root
            .find_all(MSBUILD_NAMESPACE, name)
            .map(|e| e.text().trim())
            .find(|text| !text.is_empty())
    }

    pub fn declared_output_kind(&self) -> Option<&str> {
        self.property("OutputType")
    }

    /// Declared `OutputType`, or `Library` when the project has none
    pub fn output_kind(&self) -> &str {
        self.declared_output_kind().unwrap_or(DEFAULT_OUTPUT_KIND)
    }

    /// Target framework moniker derived from `TargetFrameworkVersion`
    pub fn target_framework(&self) -> Option<String> {
        let version = self.property("TargetFrameworkVersion")?;
        let moniker = framework_moniker(version);
        if moniker.is_none() {
            debug!(
                project = %self.path.display(),
                "Unrecognised TargetFrameworkVersion '{}'", version
            );
        }
        moniker
    }

    /// Project references in document order; entries without `Include` are dropped
    pub fn project_references(&self) -> Vec<ProjectReference> {
        self.root
            .find_all(MSBUILD_NAMESPACE, "ProjectReference")
            .filter_map(|element| match element.attribute("Include") {
                Some(include) => Some(ProjectReference {
                    path: include.to_string(),
                }),
                None => {
                    debug!(
                        project = %self.path.display(),
                        "Skipping <ProjectReference> without Include attribute"
                    );
                    None
                }
            })
            .collect()
    }

    /// Whether any binary reference points at legacy test tooling.
    ///
    /// A `<Reference>` without `Include` makes the answer unknowable and is
    /// reported as an error rather than skipped.
    pub fn is_test_project(&self) -> Result<bool, MigrateError> {
        let mut is_test = false;
        for reference in self.root.find_all(MSBUILD_NAMESPACE, "Reference") {
            let include =
                reference
                    .attribute("Include")
                    .ok_or_else(|| MigrateError::MissingAttribute {
                        path: self.path.clone(),
                        element: "Reference".to_string(),
                        attribute: "Include".to_string(),
                    })?;
            if TEST_ASSEMBLY_MARKERS
                .iter()
                .any(|marker| include.contains(marker))
            {
                is_test = true;
            }
        }
        Ok(is_test)
    }

    /// The hook declared by the legacy `BeforeBuild`/`AfterBuild` target, falling
    /// back to the `PreBuildEvent`/`PostBuildEvent` property.
    pub fn build_hook(&self, kind: HookKind) -> Option<BuildHook> {
        let from_target = self
            .root
            .find_all(MSBUILD_NAMESPACE, "Target")
            .find(|target| target.attribute("Name") == Some(kind.legacy_target()))
            .and_then(|target| {
                target
                    .find_all(MSBUILD_NAMESPACE, "Exec")
                    .filter_map(|exec| exec.attribute("Command"))
                    .find(|command| !command.trim().is_empty())
            });

        let command = from_target.or_else(|| self.property(kind.legacy_property()))?;
        Some(BuildHook {
            kind,
            command: command.to_string(),
        })
    }
}

/// `v4.7.2` -> `net472`
fn framework_moniker(version: &str) -> Option<String> {
    let digits = version.trim().strip_prefix(['v', 'V'])?;
    let parts: Vec<&str> = digits.split('.').collect();
    if parts
        .iter()
        .any(|part| part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    Some(format!("net{}", parts.concat()))
}
