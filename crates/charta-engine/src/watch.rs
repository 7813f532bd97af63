//! Mutation-driven incremental rescans.

use std::rc::Rc;
use std::time::Duration;

use charta_dom::Page;
use charta_platforms::PlatformDescriptor;

use crate::engine::TransformEngine;

/// Default coalescing interval, one display frame.
const DEFAULT_FRAME: Duration = Duration::from_millis(16);

/// Watches a page for appended content and re-runs the detect/transform
/// sweep incrementally.
///
/// Chat UIs stream content in bursts; rescans are coalesced to at most one
/// per frame interval. Each discovered candidate is dispatched as its own
/// local task, so a render that never resolves leaves only its candidate
/// unprocessed and never stalls the loop. There is no unsubscription path:
/// the loop runs until the owning task is dropped with the page.
#[derive(Debug, Clone)]
pub struct Watcher {
    frame: Duration,
}

impl Default for Watcher {
    fn default() -> Self {
        Self {
            frame: DEFAULT_FRAME,
        }
    }
}

impl Watcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-default coalescing interval.
    #[must_use]
    pub fn with_frame(frame: Duration) -> Self {
        Self { frame }
    }

    /// Run the observation loop forever.
    ///
    /// Must run inside a `tokio::task::LocalSet`.
    pub async fn run(
        &self,
        page: Page,
        descriptor: &'static PlatformDescriptor,
        engine: Rc<TransformEngine>,
    ) {
        loop {
            page.rescan_requested().await;
            // Coalesce the burst: mutations landing during this frame fold
            // into the sweep below instead of scheduling their own.
            tokio::time::sleep(self.frame).await;
            page.begin_rescan();

            let dispatched = engine.dispatch_sweep(&page, descriptor);
            if dispatched > 0 {
                tracing::debug!(candidates = dispatched, "Rescan dispatched");
            }
        }
    }
}
