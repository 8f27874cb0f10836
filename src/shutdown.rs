//! Graceful shutdown coordination using cancellation tokens.
//!
//! One controller is created in `main` and handed to whatever needs to stop
//! on Ctrl+C. Today that is the HTTP server's drain.

use tokio_util::sync::CancellationToken;

/// Controller for coordinating graceful shutdown across tasks.
#[derive(Clone, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger shutdown, notifying all waiting tasks.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once shutdown is triggered.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Spawn a task that triggers shutdown on Ctrl+C.
    pub fn listen_for_ctrl_c(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                log::info!("Received Ctrl+C, initiating graceful shutdown...");
                controller.trigger();
            }
        });
    }
}
