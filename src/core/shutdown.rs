//! # Cross-platform OS signal handling.
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT`. **Other platforms:** Ctrl-C.

/// Waits for a termination signal.
///
/// Returns `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Like [`wait_for_shutdown_signal`], but never completes if the handlers
/// cannot be installed: the device then runs until its tasks exit.
pub async fn os_shutdown() {
    if let Err(e) = wait_for_shutdown_signal().await {
        tracing::error!(error = %e, "signal handlers unavailable");
        std::future::pending::<()>().await;
    }
}
