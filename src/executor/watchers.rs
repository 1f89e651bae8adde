//! Keypress and termination listeners
//!
//! Both only produce messages for the probe loop and never touch the
//! statistics themselves.

use crate::logging::Logger;
use std::io::{self, BufRead};
use tokio::sync::{mpsc, oneshot};

/// Forward stdin lines from a dedicated thread.
///
/// The channel holds one line; lines arriving while it is full are
/// dropped so typing can never stall the probe loop.
pub fn spawn_keypress_watcher(logger: Logger) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(1);

    let thread_logger = logger.clone();
    let spawned = std::thread::Builder::new()
        .name("keypress-watcher".to_string())
        .spawn(move || forward_lines(io::stdin().lock(), &tx, &thread_logger));

    if let Err(e) = spawned {
        report_spawn_failure(&logger, &e);
    }

    rx
}

fn report_spawn_failure(logger: &Logger, error: &io::Error) {
    logger
        .warn("Failed to start keypress watcher")
        .field("error", error.to_string())
        .log();
}

fn forward_lines<R: BufRead>(mut reader: R, tx: &mpsc::Sender<String>, logger: &Logger) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => {
                logger.debug("Stdin closed, keypress watcher stopping").log();
                return;
            }
            Ok(_) => match tx.try_send(line.clone()) {
                Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => {}
                Err(mpsc::error::TrySendError::Closed(_)) => return,
            },
            Err(e) => {
                logger
                    .debug("Failed to read stdin")
                    .field("error", e.to_string())
                    .log();
                return;
            }
        }
    }
}

/// Resolve the returned receiver once Ctrl-C (or SIGTERM on unix) arrives.
///
/// If no signal handler can be installed the receiver simply never fires.
pub fn spawn_shutdown_watcher(logger: Logger) -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let received = wait_for_signal(&logger).await;
        relay_shutdown(received, tx, &logger).await;
    });

    rx
}

async fn relay_shutdown(received: bool, tx: oneshot::Sender<()>, logger: &Logger) {
    if received {
        logger.debug("Termination signal received").log();
        let _ = tx.send(());
    } else {
        // A dropped sender would read as a closed channel, hold it forever
        let _tx = tx;
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal(logger: &Logger) -> bool {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => tokio::select! {
            result = tokio::signal::ctrl_c() => handle_ctrl_c(result, logger),
            _ = terminate.recv() => true,
        },
        Err(e) => {
            logger
                .warn("Failed to install SIGTERM handler")
                .field("error", e.to_string())
                .log();
            handle_ctrl_c(tokio::signal::ctrl_c().await, logger)
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal(logger: &Logger) -> bool {
    handle_ctrl_c(tokio::signal::ctrl_c().await, logger)
}

fn handle_ctrl_c(result: io::Result<()>, logger: &Logger) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            logger
                .warn("Failed to listen for Ctrl-C")
                .field("error", e.to_string())
                .log();
            false
        }
    }
}
