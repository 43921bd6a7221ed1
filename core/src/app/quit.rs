//! Quit requests from outside the windows
//!
//! Ctrl+C is delivered on a listener thread and turned into a
//! [`TestEvent::Quit`](super::events::TestEvent::Quit) before the next tick,
//! so the program still tears down and reports its frame rate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "quit requested" flag
#[derive(Debug, Clone, Default)]
pub struct QuitFlag(Arc<AtomicBool>);

impl QuitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear the flag, returning whether a quit was requested.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    /// Request a quit on the first Ctrl+C.
    ///
    /// Failing to listen is logged; the program then runs without it.
    pub fn listen_for_ctrl_c(&self) {
        let flag = self.clone();
        let spawned = std::thread::Builder::new()
            .name("ctrl-c".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        tracing::warn!("Ctrl+C handling unavailable: {}", e);
                        return;
                    }
                };

                runtime.block_on(async {
                    match tokio::signal::ctrl_c().await {
                        Ok(()) => {
                            tracing::debug!("Ctrl+C received, requesting quit");
                            flag.request();
                        }
                        Err(e) => tracing::warn!("Failed to listen for Ctrl+C: {}", e),
                    }
                });
            });

        if let Err(e) = spawned {
            tracing::warn!("Failed to start Ctrl+C listener: {}", e);
        }
    }
}
