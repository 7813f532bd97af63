//! Live-page document model for Charta.
//!
//! Wraps a parsed HTML document behind [`Page`], the shared handle the rest
//! of the pipeline operates on. A `Page` provides:
//!
//! - snapshot CSS-selector queries in document order ([`Page::select`])
//! - content appends that model a streaming chat UI ([`Page::append_html`])
//! - a rescan-scheduling handle for the observation loop: mutations set a
//!   scheduled flag and wake at most one pending waiter, so bursts collapse
//!   into a single rescan ([`Page::notify_mutated`] / [`Page::rescan_requested`])
//!
//! Node-level helpers (attributes, visibility, ancestor walks, fragment
//! construction) live in [`node`].
//!
//! # Example
//!
//! ```
//! use charta_dom::Page;
//!
//! let page = Page::parse("<main><pre><code>graph TD; A-->B;</code></pre></main>");
//! let blocks = page.select("pre code").unwrap();
//! assert_eq!(blocks.len(), 1);
//! ```

pub mod node;

use std::cell::Cell;
use std::rc::Rc;

use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;
use tokio::sync::Notify;

/// Errors from document queries and mutations.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("no element matches selector: {0}")]
    MissingTarget(String),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] std::io::Error),
}

/// A live HTML page.
///
/// Cheap to clone; clones share the same document tree and mutation handle.
/// The type is single-threaded by construction (the underlying tree is
/// reference-counted, not synchronized), matching the cooperative scheduling
/// model of the pipeline.
#[derive(Clone)]
pub struct Page {
    inner: Rc<PageInner>,
}

struct PageInner {
    document: NodeRef,
    /// Rescan already scheduled; further mutations collapse into it.
    scheduled: Cell<bool>,
    mutations: Notify,
}

impl Page {
    /// Parse an HTML document.
    ///
    /// The parser is lenient: fragments without `<html>`/`<body>` wrappers
    /// are completed into a full document, the way a browser would.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            inner: Rc::new(PageInner {
                document: kuchiki::parse_html().one(html),
                scheduled: Cell::new(false),
                mutations: Notify::new(),
            }),
        }
    }

    /// The document root node.
    #[must_use]
    pub fn document(&self) -> &NodeRef {
        &self.inner.document
    }

    /// Snapshot query: all elements matching `css`, in document order.
    ///
    /// Re-queries the live tree on every call; results are never cached.
    pub fn select(&self, css: &str) -> Result<Vec<NodeRef>, DomError> {
        let matches = self
            .inner
            .document
            .select(css)
            .map_err(|()| DomError::InvalidSelector(css.to_owned()))?;
        Ok(matches.map(|m| m.as_node().clone()).collect())
    }

    /// First element matching `css`, if any.
    pub fn select_first(&self, css: &str) -> Result<Option<NodeRef>, DomError> {
        Ok(self.select(css)?.into_iter().next())
    }

    /// Append an HTML fragment under the first element matching `target_css`
    /// and signal a mutation.
    ///
    /// Returns the number of top-level nodes appended.
    pub fn append_html(&self, target_css: &str, fragment: &str) -> Result<usize, DomError> {
        let target = self
            .select_first(target_css)?
            .ok_or_else(|| DomError::MissingTarget(target_css.to_owned()))?;

        let children = node::parse_fragment(fragment);
        let count = children.len();
        for child in children {
            target.append(child);
        }
        self.notify_mutated();
        Ok(count)
    }

    /// Signal that the document changed.
    ///
    /// If a rescan is already scheduled this is a no-op: redundant triggers
    /// before the rescan fires collapse into a single wake-up.
    pub fn notify_mutated(&self) {
        if !self.inner.scheduled.replace(true) {
            self.inner.mutations.notify_one();
        }
    }

    /// Wait until a rescan has been requested.
    pub async fn rescan_requested(&self) {
        self.inner.mutations.notified().await;
    }

    /// Clear the scheduled flag before running a rescan.
    ///
    /// Mutations arriving after this point schedule the next rescan; the
    /// current sweep will observe their DOM effects anyway.
    pub fn begin_rescan(&self) {
        self.inner.scheduled.set(false);
    }

    /// Serialize the whole document back to HTML.
    pub fn serialize(&self) -> Result<String, DomError> {
        let mut out = Vec::new();
        self.inner.document.serialize(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
