//! Per-project migration pipeline and batch driver

use crate::emitter::{emit, MigrationPlan};
use crate::errors::MigrateError;
use crate::legacy::LegacyDescriptor;
use crate::lock_file::{locate_lock_file, translate_lock_file};
use crate::metadata::PackageMetadata;
use crate::types::{HookKind, PackageReferenceEntry};
use crate::writer::{commit, WriteMode};
use rayon::prelude::*;
use sdkify_config::Config;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

/// Settings threaded through every stage of a migration run
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    pub config: Config,
    pub write_mode: WriteMode,
    pub generate_package_on_build: bool,
    /// `.nuspec` whose metadata is embedded into every migrated project
    pub metadata_path: Option<PathBuf>,
    /// Worker threads for a batch; 0 or 1 processes projects sequentially
    pub jobs: usize,
}

impl MigrateOptions {
    fn test_packages(&self) -> Vec<PackageReferenceEntry> {
        self.config
            .test_packages
            .iter()
            .map(|p| PackageReferenceEntry::new(&p.id, &p.version))
            .collect()
    }

    fn metadata_path(&self) -> Option<&Path> {
        self.metadata_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Written,
    Previewed,
    /// The descriptor is already SDK-style and was left alone
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationOutcome {
    pub project: PathBuf,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<MigrationPlan>,
    /// Emitted text, kept only for previews
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
}

/// Gather every translated fragment for one project. Reads the lock file and
/// metadata file but writes nothing.
pub fn plan_migration(
    descriptor: &LegacyDescriptor,
    options: &MigrateOptions,
) -> Result<MigrationPlan, MigrateError> {
    let config = &options.config;

    let output_kind = descriptor.output_kind().to_string();
    let target_framework = descriptor
        .target_framework()
        .unwrap_or_else(|| config.default_target_framework.clone());
    let project_references = descriptor.project_references();

    let lock_path = locate_lock_file(descriptor.path(), &config.lock_file_name);
    match &lock_path {
        Some(path) => debug!("Using lock file {}", path.display()),
        None => debug!("No {} beside project", config.lock_file_name),
    }

    let is_test_project = descriptor.is_test_project()?;
    let package_references = translate_lock_file(
        lock_path.as_deref(),
        is_test_project,
        &options.test_packages(),
        config.max_input_bytes,
    )?;

    let pre_build = descriptor.build_hook(HookKind::PreBuild);
    let post_build = descriptor.build_hook(HookKind::PostBuild);

    let metadata = match options.metadata_path() {
        Some(path) => Some(PackageMetadata::import(path, config.max_input_bytes)?),
        None => None,
    };

    Ok(MigrationPlan {
        target_framework,
        output_kind,
        is_test_project,
        generate_package_on_build: options.generate_package_on_build,
        metadata,
        project_references,
        package_references,
        pre_build,
        post_build,
    })
}

/// Migrate one legacy descriptor. The file is only replaced after the new
/// text has been fully assembled, and never in preview mode.
pub fn migrate_project(
    path: &Path,
    options: &MigrateOptions,
) -> Result<MigrationOutcome, MigrateError> {
    let span = info_span!("migrate", project = %path.display());
    let _guard = span.enter();
    let start_time = Instant::now();

    let descriptor = LegacyDescriptor::load(path, options.config.max_input_bytes)?;
    if descriptor.is_sdk_style() {
        info!("Project is already SDK-style, skipping");
        return Ok(MigrationOutcome {
            project: path.to_path_buf(),
            status: OutcomeStatus::Skipped,
            plan: None,
            descriptor: None,
        });
    }

    let plan = plan_migration(&descriptor, options)?;
    let text = emit(&plan);

    let (status, descriptor) = match options.write_mode {
        WriteMode::Persist => {
            commit(path, &text)?;
            (OutcomeStatus::Written, None)
        }
        WriteMode::Preview => (OutcomeStatus::Previewed, Some(text)),
    };

    info!(
        "Migrated in {:.2}ms ({} project refs, {} package refs)",
        start_time.elapsed().as_secs_f64() * 1000.0,
        plan.project_references.len(),
        plan.package_references.len()
    );

    Ok(MigrationOutcome {
        project: path.to_path_buf(),
        status,
        plan: Some(plan),
        descriptor,
    })
}

#[derive(Debug)]
pub struct ProjectResult {
    pub project: PathBuf,
    pub result: Result<MigrationOutcome, MigrateError>,
}

#[derive(Serialize)]
struct ErrorReport {
    kind: &'static str,
    message: String,
}

impl Serialize for ProjectResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProjectResult", 3)?;
        state.serialize_field("project", &self.project)?;
        match &self.result {
            Ok(outcome) => {
                state.serialize_field("outcome", outcome)?;
                state.serialize_field("error", &None::<ErrorReport>)?;
            }
            Err(err) => {
                state.serialize_field("outcome", &None::<MigrationOutcome>)?;
                state.serialize_field(
                    "error",
                    &ErrorReport {
                        kind: err.kind(),
                        message: err.to_string(),
                    },
                )?;
            }
        }
        state.end()
    }
}

/// Results for a batch, in the order the paths were supplied
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub projects: Vec<ProjectResult>,
}

impl BatchReport {
    pub fn migrated(&self) -> usize {
        self.count(|outcome| outcome.status != OutcomeStatus::Skipped)
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| outcome.status == OutcomeStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.projects.iter().filter(|p| p.result.is_err()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, predicate: impl Fn(&MigrationOutcome) -> bool) -> usize {
        self.projects
            .iter()
            .filter(|p| p.result.as_ref().is_ok_and(&predicate))
            .count()
    }
}

/// Migrate every project independently. A failing project is recorded in the
/// report and never stops the others.
pub fn migrate_batch(paths: &[PathBuf], options: &MigrateOptions) -> BatchReport {
    let run = |path: &PathBuf| ProjectResult {
        project: path.clone(),
        result: migrate_project(path, options),
    };

    let projects: Vec<ProjectResult> = if options.jobs > 1 && paths.len() > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
        {
            Ok(pool) => pool.install(|| paths.par_iter().map(&run).collect()),
            Err(e) => {
                warn!("Failed to start worker pool ({}), running sequentially", e);
                paths.iter().map(&run).collect()
            }
        }
    } else {
        paths.iter().map(&run).collect()
    };

    for project in &projects {
        if let Err(err) = &project.result {
            debug!(project = %project.project.display(), "Migration failed: {}", err);
        }
    }

    BatchReport { projects }
}
