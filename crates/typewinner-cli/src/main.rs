mod app;
mod cli;
mod console;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::sync::Arc;
use typewinner_browser::{ChromeDriver, find_chrome};
use typewinner_core::{
    ChallengeSolver, ConfigHandle, CredentialStore, SessionCoordinator, Typist, paths,
};
use typewinner_vision::GroqVision;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log to file only; stdout belongs to the interactive console.
    let log_dir = paths::ensure_logs_dir()?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "typewinner.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    if find_chrome().is_none() {
        anyhow::bail!(
            "Google Chrome could not be found on this system; install it and try again"
        );
    }

    let config = ConfigHandle::default();
    let typist = Arc::new(Typist::new(config.clone()));

    let credentials = CredentialStore::from_app_dir()?;
    let solver = Arc::new(match credentials.load() {
        Some(key) => {
            ChallengeSolver::with_recognizer(typist.clone(), Arc::new(GroqVision::new(key)))
        }
        None => ChallengeSolver::new(typist.clone()),
    });

    let driver = Arc::new(ChromeDriver::discover()?);
    let (coordinator, ended) = SessionCoordinator::new(driver, typist, solver.clone());

    app::App::new(config, credentials, solver, coordinator, ended)
        .run()
        .await
}
