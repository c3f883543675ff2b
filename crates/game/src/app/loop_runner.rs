use std::process::ExitCode;

use engine::run_app;
use tracing::{error, info};

use super::bootstrap::{AppWiring, BootstrapError};

pub(crate) fn run(app: Result<AppWiring, BootstrapError>) -> ExitCode {
    let AppWiring {
        config,
        assets,
        mut scenes,
        mut input,
    } = match app {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    let summary = run_app(&config, assets, &mut scenes, &mut input);
    info!(
        ticks = summary.ticks,
        launches = summary.launches,
        resets = summary.resets,
        end = ?summary.end,
        "run_finished"
    );
    ExitCode::SUCCESS
}
