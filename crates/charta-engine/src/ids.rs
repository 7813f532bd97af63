//! Render-id minting.

use std::cell::Cell;

/// Mints unique render ids for delegated render calls.
///
/// Ids seed the external renderer and scope failure cleanup, so no two
/// in-flight renders may share one. The counter is process-wide state with
/// a trivial lifecycle: starts at zero, increments monotonically, never
/// resets. It is held explicitly (rather than as an ambient global) so
/// tests can observe it.
///
/// Minting is synchronous; callers mint before their first suspension
/// point, which is all the atomicity the single-threaded model needs.
#[derive(Debug, Default)]
pub struct RenderIds {
    next: Cell<u64>,
}

impl RenderIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next unique render id.
    #[must_use]
    pub fn mint(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("charta-render-{n}")
    }
}
