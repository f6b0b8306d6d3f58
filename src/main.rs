//! `qt-ts-ls`: language server by default, batch commands otherwise.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use qt_ts_language_server::Backend;
use qt_ts_language_server::cli::{
    self,
    Cli,
    Command,
};
use tower_lsp::{
    LspService,
    Server,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref());

    match cli.command {
        None | Some(Command::Serve) => {
            serve().await;
            ExitCode::SUCCESS
        }
        Some(command) => run_batch(command, cli.config.as_deref()),
    }
}

async fn serve() {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting language server");

    let (stdin, stdout) = (tokio::io::stdin(), tokio::io::stdout());
    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}

fn run_batch(command: Command, config: Option<&Path>) -> ExitCode {
    let result = std::env::current_dir()
        .map_err(cli::CliError::Output)
        .and_then(|current_dir| cli::load_settings(config, &current_dir))
        .and_then(|settings| cli::run(command, &settings, &mut std::io::stdout().lock()));

    match result {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(error) => {
            tracing::error!(%error, "Command failed");
            let _ = writeln!(std::io::stderr(), "error: {error}");
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr, or to `log_file`; stdout carries the protocol.
fn init_logging(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some(path) = log_file
        && let Some(file_name) = path.file_name()
    {
        let directory =
            path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let appender = tracing_appender::rolling::never(directory, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        return Some(guard);
    }

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    None
}
