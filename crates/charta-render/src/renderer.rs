//! The renderer collaborator contract.

use async_trait::async_trait;

/// Opaque rendering failure.
///
/// Carries the raw diagnostic string the backing renderer produced. These
/// strings are not meant for end users; run them through
/// [`crate::diagnostics::format_failure`] before display.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{diagnostic}")]
pub struct RenderError {
    /// Raw, human-unfriendly diagnostic from the renderer.
    pub diagnostic: String,
}

impl RenderError {
    #[must_use]
    pub fn new(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
        }
    }
}

/// Renders diagram source text into markup.
///
/// `id` is unique per render call. Implementations may use it to key any
/// intermediate state; misbehaving renderers are known to leave elements
/// keyed by `id` behind in the document on failure, which the engine cleans
/// up defensively.
///
/// The future is not required to be `Send`: the pipeline runs on a
/// single-threaded cooperative runtime.
#[async_trait(?Send)]
pub trait DiagramRenderer {
    /// Render `source` into markup (an SVG fragment, typically).
    ///
    /// May suspend indefinitely; no timeout is imposed at this boundary.
    async fn render(&self, id: &str, source: &str) -> Result<String, RenderError>;
}
