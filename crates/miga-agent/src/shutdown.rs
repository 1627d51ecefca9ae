// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process shutdown signal wiring.
//!
//! The webhook server and the dispatcher both watch one
//! [`CancellationToken`]; cancelling it stops accepting connections and
//! lets in-flight turns finish.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Spawns a background task that cancels the returned token on SIGINT or,
/// on unix, SIGTERM.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        let signal_name = wait_for_shutdown_signal().await;
        info!(signal = signal_name, "shutdown signal received");
        trigger.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "ctrl-c"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_starts_uncancelled() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        // Cancel manually so the background task does not outlive the test.
        token.cancel();
    }

    #[tokio::test]
    async fn child_tokens_observe_cancellation() {
        let token = install_signal_handler();
        let child = token.child_token();
        token.cancel();
        child.cancelled().await;
        assert!(child.is_cancelled());
    }
}
