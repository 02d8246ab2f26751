use serde::Serialize;

/// Inter-project dependency taken from a `<ProjectReference Include=..>` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReference {
    pub path: String,
}

/// An `(id, version)` pair destined for the `<PackageReference>` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReferenceEntry {
    pub id: String,
    pub version: String,
}

impl PackageReferenceEntry {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HookKind {
    PreBuild,
    PostBuild,
}

impl HookKind {
    /// Target name the hook is declared under in a legacy project
    pub fn legacy_target(self) -> &'static str {
        match self {
            HookKind::PreBuild => "BeforeBuild",
            HookKind::PostBuild => "AfterBuild",
        }
    }

    /// Property carrying the same hook in the legacy build-events notation
    pub fn legacy_property(self) -> &'static str {
        match self {
            HookKind::PreBuild => "PreBuildEvent",
            HookKind::PostBuild => "PostBuildEvent",
        }
    }

    /// Target name in the new descriptor
    pub fn target_name(self) -> &'static str {
        match self {
            HookKind::PreBuild => "PreBuild",
            HookKind::PostBuild => "PostBuild",
        }
    }

    /// Ordering attribute and anchor target for the new `<Target>`
    pub fn anchor(self) -> (&'static str, &'static str) {
        match self {
            HookKind::PreBuild => ("BeforeTargets", "PreBuildEvent"),
            HookKind::PostBuild => ("AfterTargets", "PostBuildEvent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildHook {
    pub kind: HookKind,
    pub command: String,
}
