use std::process::ExitCode;

use clap::Parser;
use client::{ApiClient, FileTokenStore, Session};

mod cli;
mod commands;
mod error;
mod settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let settings = match settings::load(&cli.overrides) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},client={level},engine={level}",
            level = settings.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    let session = Session::new(FileTokenStore::new(&settings.session_file));
    let api = match ApiClient::builder()
        .base_url(&settings.base_url)
        .session(session)
        .build()
    {
        Ok(api) => api,
        Err(err) => {
            tracing::error!("failed to initialize api client: {err}");
            return ExitCode::FAILURE;
        }
    };

    match commands::run(&api, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_session_expired() => {
            eprintln!("session expired, please log in");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
