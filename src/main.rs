use anyhow::{Context, Result};
use canvas_installer::cli::output::{banner, format_failure, format_interrupted, style, CROSS};
use canvas_installer::cli::{Cli, ConsoleReporter, InteractiveCollector};
use canvas_installer::preflight::{self, PrivilegeStatus};
use canvas_installer::{
    canvas_pipeline, logging, InstallerError, InstallerSettings, JsonFileStateStore, Orchestrator,
    ShellCommandRunner,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // No options; this only handles --help and --version.
    Cli::from_args();

    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n{}{}", CROSS, style(format!("Installation failed: {:#}", e)).red());
            1
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let settings = InstallerSettings::from_env();

    // Before logging: the log file may not be creatable without root.
    if let Err(e) = preflight::check_privileges(&PrivilegeStatus::current(), settings.skip_root_check) {
        preflight::print_error_and_exit(&e);
    }

    let log_path = logging::init_logging(&settings.log_dir)?;
    info!("Canvas installer {} starting", env!("CARGO_PKG_VERSION"));

    println!("{}\n", banner());

    let pipeline = canvas_pipeline().context("Failed to build installation pipeline")?;
    let orchestrator = Orchestrator::new(
        pipeline,
        JsonFileStateStore::new(&settings.state_file),
        Arc::new(ShellCommandRunner::new()),
    )
    .with_default_timeout(settings.default_timeout);

    let reporter = ConsoleReporter::new(&log_path);
    let collector = InteractiveCollector::new();

    // Dropping the pipeline future kills any running child command; the
    // state file only ever holds the last completed step.
    let result = tokio::select! {
        result = orchestrator.run_pipeline(&collector, &reporter) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Installation interrupted by user");
            println!("{}", format_interrupted());
            return Ok(1);
        }
    };

    match result {
        Ok(outcome) => {
            if let Some(message) = format_failure(&outcome, &log_path) {
                println!("{}", message);
            }
            Ok(outcome.exit_code())
        }
        Err(InstallerError::ConfigCollectionAborted) => {
            warn!("Configuration collection aborted by user");
            println!("{}", format_interrupted());
            Ok(1)
        }
        Err(e) => {
            error!("Installation failed: {}", e);
            eprintln!("\n{}{}", CROSS, style(format!("Installation failed: {}", e)).red());
            Ok(e.exit_code())
        }
    }
}
