//! sdkify translation engine
//!
//! Turns a legacy MSBuild 2003 `.csproj` (plus its adjacent `packages.config`
//! and an optional `.nuspec`) into a minimal SDK-style project descriptor.
//!
//! Extraction and emission are separate: the legacy inputs are read into
//! immutable values ([`MigrationPlan`]), and a single pure function
//! ([`emit`]) renders the new descriptor from them. Persisting the result is
//! left to the [`writer`] module and driven by the [`orchestrator`].

pub mod emitter;
pub mod errors;
pub mod legacy;
pub mod lock_file;
pub mod metadata;
pub mod orchestrator;
pub mod types;
pub mod writer;
pub mod xml_tree;

pub use emitter::{emit, MigrationPlan};
pub use errors::MigrateError;
pub use legacy::{LegacyDescriptor, DEFAULT_OUTPUT_KIND, MSBUILD_NAMESPACE};
pub use metadata::{PackageMetadata, NUSPEC_NAMESPACE};
pub use orchestrator::{
    migrate_batch, migrate_project, plan_migration, BatchReport, MigrateOptions,
    MigrationOutcome, OutcomeStatus, ProjectResult,
};
pub use types::{BuildHook, HookKind, PackageReferenceEntry, ProjectReference};
pub use writer::WriteMode;

// Re-export config so callers can build options without a direct dependency
pub use sdkify_config::{Config, TestPackage};
