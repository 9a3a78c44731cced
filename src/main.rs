#![forbid(unsafe_code)]

//! `pipe-relay` binary.
//!
//! Parses arguments, starts stderr logging, builds a single-threaded tokio
//! runtime, connects to the pipe, and runs the relay over the process's
//! standard streams until input ends, the pipe fails, or a shutdown signal
//! arrives.

use std::io::Write;
use std::process::ExitCode;

use tokio::io::BufReader;
use tracing::{error, info, info_span, Instrument};
use tracing_subscriber::{fmt, EnvFilter};

use pipe_relay::cli::{self, Invocation, LogFormat};
use pipe_relay::{channel, errors, AppError, Relay, RelayConfig, Result};

fn main() -> ExitCode {
    let cli = match cli::parse_args(std::env::args_os()) {
        Ok(Invocation::Relay(cli)) => cli,
        Ok(Invocation::Informational(text)) => {
            let _ = write!(std::io::stdout().lock(), "{text}");
            return ExitCode::SUCCESS;
        }
        Err(err) => return report(&err),
    };

    if let Err(err) = init_tracing(cli.log_format) {
        eprintln!("failed to init tracing: {err}");
    }

    let config = RelayConfig::from_cli(&cli);
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn run(config: &RelayConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;

    let result = runtime.block_on(serve(config));

    // A stdin read may still be parked on a blocking thread after a signal.
    runtime.shutdown_background();
    result
}

async fn serve(config: &RelayConfig) -> Result<()> {
    let span = info_span!("relay", pipe = %config.pipe_name, wait = %config.wait);
    async move {
        let channel = channel::connect(&config.pipe_name).await?;
        let relay = Relay::new(
            channel,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            config.wait,
        );

        tokio::select! {
            summary = relay.run() => {
                info!(stop = %summary.stop, "relay stopped");
            }
            () = shutdown_signal() => {
                info!("shutdown signal received, closing pipe");
            }
        }
        Ok(())
    }
    .instrument(span)
    .await
}

/// Print `err` as the process diagnostic and map it to an exit code.
fn report(err: &AppError) -> ExitCode {
    if err.exit_code() != 0 {
        error!(%err, "relay setup failed");
    }
    errors::write_diagnostic(std::io::stdout().lock(), err);
    ExitCode::from(err.exit_code())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(%err, "ctrl-c signal handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    () = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}

fn init_tracing(
    log_format: LogFormat,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber.try_init(),
        LogFormat::Json => subscriber.json().try_init(),
    }
}
