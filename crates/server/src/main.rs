//! Accepts connections over TCP or a Unix socket and hands them to a
//! `pool-http` worker pool.
//!
//! `SIGALRM` and `SIGHUP` reload the pool, `SIGINT` and `SIGTERM` stop the
//! server.

mod cli;
mod echo;
mod error;
mod listener;

use std::process::ExitCode;

use clap::Parser;
use pool_http::pool::{Dispatcher, DispatcherHandle};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;
use crate::echo::Echo;
use crate::error::ServerError;
use crate::listener::Listener;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    match serve(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(cause = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve(cli: Cli) -> Result<(), ServerError> {
    let listener = Listener::bind(&cli.listen).await?;
    let (handle, dispatcher) = Dispatcher::start(cli.pool_config(), Echo);

    accept_loop(&listener, &handle).await?;

    drop(handle);
    if let Err(e) = dispatcher.await {
        warn!(cause = %e, "dispatcher task failed");
    }
    Ok(())
}

async fn accept_loop(listener: &Listener, handle: &DispatcherHandle) -> Result<(), ServerError> {
    let mut alarm = signal(SignalKind::alarm()).map_err(ServerError::Signal)?;
    let mut hangup = signal(SignalKind::hangup()).map_err(ServerError::Signal)?;
    let mut interrupt = signal(SignalKind::interrupt()).map_err(ServerError::Signal)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(ServerError::Signal)?;

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((io, addr)) => handle.accept_boxed(io, addr)?,
                Err(e) => warn!(cause = %e, "failed to accept"),
            },
            _ = alarm.recv() => {
                info!("SIGALRM received, reload worker pool");
                handle.reload()?;
            }
            _ = hangup.recv() => {
                info!("SIGHUP received, reload worker pool");
                handle.reload()?;
            }
            _ = interrupt.recv() => {
                info!("SIGINT received, shutting down");
                return Ok(());
            }
            _ = terminate.recv() => {
                info!("SIGTERM received, shutting down");
                return Ok(());
            }
        }
    }
}
