use crate::discovery::discover_projects;
use crate::errors::CliError;
use crate::GlobalOpts;
use clap::Parser;
use colored::Colorize;
use sdkify_config::Config;
use sdkify_core::{migrate_batch, BatchReport, MigrateOptions, OutcomeStatus, WriteMode};
use sdkify_logger as logger;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug, Clone)]
pub struct MigrateArgs {
    /// Project file, or directory to search for .csproj files
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Search subdirectories of ROOT as well
    #[arg(short, long)]
    pub recurse: bool,

    /// Show the new descriptors without writing them
    #[arg(long = "what-if", visible_alias = "dry-run")]
    pub what_if: bool,

    /// Emit <GeneratePackageOnBuild>true</GeneratePackageOnBuild>
    #[arg(long)]
    pub generate_package_on_build: bool,

    /// .nuspec file whose id/version/title/authors/description are embedded
    #[arg(long, value_name = "PATH")]
    pub nuspec: Option<PathBuf>,

    /// Number of projects to migrate in parallel
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Print the batch report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl MigrateArgs {
    fn options(&self, config: Config) -> MigrateOptions {
        MigrateOptions {
            config,
            write_mode: WriteMode::from_dry_run(self.what_if),
            generate_package_on_build: self.generate_package_on_build,
            metadata_path: self
                .nuspec
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
            jobs: self.jobs,
        }
    }
}

/// Discover and migrate every project under `args.root`
pub fn handle_migrate(args: &MigrateArgs, opts: &GlobalOpts) -> Result<BatchReport, CliError> {
    let start_time = Instant::now();

    let config = Config::load(opts.config.as_deref())?;
    logger::debug(&format!("Using configuration: {:?}", config));

    logger::step(&format!("Discovering projects in {}", args.root.display()));
    let projects = discover_projects(&args.root, args.recurse)?;
    if projects.is_empty() {
        logger::warn(&format!(
            "No .csproj files found in {}{}",
            args.root.display(),
            if args.recurse { "" } else { " (use -r to search subdirectories)" }
        ));
        if args.json {
            println!("{}", serde_json::to_string_pretty(&BatchReport::default())?);
        }
        return Ok(BatchReport::default());
    }

    let options = args.options(config);
    logger::info(&format!(
        "Migrating {} project(s){}",
        projects.len(),
        if args.what_if { " (what-if)" } else { "" }
    ));
    logger::spinner_start(&format!("Migrating {} project(s)...", projects.len()));
    let report = migrate_batch(&projects, &options);
    logger::spinner_stop();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_results(&report);
    }

    let summary = format!(
        "{} migrated, {} skipped, {} failed in {:.2}s",
        report.migrated(),
        report.skipped(),
        report.failed(),
        start_time.elapsed().as_secs_f64()
    );
    if report.has_failures() {
        logger::warn(&summary);
    } else {
        logger::success(&summary);
    }

    Ok(report)
}

fn print_results(report: &BatchReport) {
    for project in &report.projects {
        let path = project.project.display();
        match &project.result {
            Ok(outcome) => match outcome.status {
                OutcomeStatus::Written => logger::success(&format!("Migrated {}", path)),
                OutcomeStatus::Skipped => {
                    logger::warn(&format!("{} is already SDK-style, skipped", path));
                }
                OutcomeStatus::Previewed => {
                    println!("{} {}", "What if: would rewrite".cyan().bold(), path);
                    if let Some(text) = &outcome.descriptor {
                        println!("{}", text);
                    }
                }
            },
            Err(err) => logger::error(&format!("{}: {}", path, err)),
        }
    }
}
