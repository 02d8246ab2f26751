use clap::Parser;
use sdkify::{
    commands::migrate::{self, MigrateArgs},
    GlobalOpts,
};
use sdkify_logger as logger;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdkify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Migrate legacy .csproj files to SDK-style projects",
    long_about = "sdkify rewrites legacy MSBuild project files (with packages.config) into minimal SDK-style descriptors."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(flatten)]
    migrate: MigrateArgs,
}

/// Route `tracing` events from the library crates to stderr
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SDKIFY_LOG")
        .unwrap_or_else(|_| EnvFilter::new(logger::verbosity_to_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let report = migrate::handle_migrate(&cli.migrate, &cli.global)?;
    Ok(!report.has_failures())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), None) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            if cli.global.verbosity_level() > 0 {
                logger::show_log_path();
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            logger::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
