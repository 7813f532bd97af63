//! Per-candidate transformation orchestration.

use std::rc::Rc;
use std::time::Duration;

use charta_dom::{DomError, Page, node};
use charta_platforms::{PlatformDescriptor, Strategy};
use charta_render::{DiagramRenderer, diagnostics};
use kuchiki::{NodeRef, Selectors};

use crate::artifact::{self, RenderedArtifact};
use crate::cleanup::remove_render_pollution;
use crate::detect::{Candidate, PROCESSED_ATTR, find_unprocessed};
use crate::ids::RenderIds;
use crate::toggle::Toggle;

/// How long to wait before the second pollution-cleanup pass, so the
/// renderer's asynchronous side-effect injections have landed.
const LATE_CLEANUP_DELAY: Duration = Duration::from_millis(10);

/// Internal failures while transforming one candidate.
///
/// These never escape [`TransformEngine::process`]: the per-candidate
/// boundary logs them and reports "no artifact produced".
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0}")]
    Dom(#[from] DomError),

    #[error("invalid selector in descriptor: {0}")]
    Selector(String),

    #[error("candidate has no wrapper element to replace")]
    MissingWrapper,
}

/// Orchestrates source extraction, delegated rendering, error recovery, and
/// DOM replacement for discovered code blocks.
///
/// Candidates are processed independently: multiple renders may be in
/// flight at once, each scoped by its own render id, and the failure of one
/// never affects its siblings. No ordering is guaranteed across candidates.
pub struct TransformEngine {
    renderer: Rc<dyn DiagramRenderer>,
    ids: RenderIds,
}

impl TransformEngine {
    #[must_use]
    pub fn new(renderer: Rc<dyn DiagramRenderer>) -> Self {
        Self {
            renderer,
            ids: RenderIds::new(),
        }
    }

    /// Scan the page and process every discovered candidate, concurrently,
    /// returning the artifacts that were committed.
    ///
    /// Used for the initial sweep and by tests; the observation loop uses
    /// [`dispatch_sweep`](Self::dispatch_sweep) instead so a hung render
    /// cannot stall subsequent sweeps.
    pub async fn run_sweep(
        &self,
        page: &Page,
        descriptor: &PlatformDescriptor,
    ) -> Vec<RenderedArtifact> {
        let candidates = match find_unprocessed(page, descriptor) {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::warn!(error = %error, "Block scan failed");
                return Vec::new();
            }
        };

        let work = candidates
            .iter()
            .map(|candidate| self.process(page, candidate, descriptor));
        futures::future::join_all(work)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Scan the page and spawn one independent local task per candidate.
    ///
    /// Returns the number of candidates dispatched. Must run inside a
    /// `tokio::task::LocalSet`.
    pub fn dispatch_sweep(
        self: &Rc<Self>,
        page: &Page,
        descriptor: &'static PlatformDescriptor,
    ) -> usize {
        let candidates = match find_unprocessed(page, descriptor) {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::warn!(error = %error, "Block scan failed");
                return 0;
            }
        };

        let count = candidates.len();
        for candidate in candidates {
            let engine = Rc::clone(self);
            let page = page.clone();
            tokio::task::spawn_local(async move {
                engine.process(&page, &candidate, descriptor).await;
            });
        }
        count
    }

    /// Transform one candidate into a committed artifact.
    ///
    /// This is the per-candidate failure boundary: any internal error is
    /// logged and swallowed, so a bad block can never abort the batch or
    /// the observation loop.
    pub async fn process(
        &self,
        page: &Page,
        candidate: &Candidate,
        descriptor: &PlatformDescriptor,
    ) -> Option<RenderedArtifact> {
        match self.try_process(page, candidate, descriptor).await {
            Ok(result) => result,
            Err(error) => {
                tracing::warn!(error = %error, "Failed to transform code block");
                None
            }
        }
    }

    async fn try_process(
        &self,
        page: &Page,
        candidate: &Candidate,
        descriptor: &PlatformDescriptor,
    ) -> Result<Option<RenderedArtifact>, EngineError> {
        // Claim the candidate before the first suspension point so a sweep
        // overlapping an in-flight render cannot pick it up again.
        node::set_attr(&candidate.node, PROCESSED_ATTR, "");

        let Some(source) = extract_source(candidate, descriptor) else {
            tracing::debug!("Skipping code block with empty source");
            return Ok(None);
        };

        let artifact = artifact::build_shell(&source);

        let render_id = self.ids.mint();
        let failed = match self.renderer.render(&render_id, &source).await {
            Ok(markup) => {
                artifact::inject_markup(&artifact, &markup);
                false
            }
            Err(error) => {
                tracing::warn!(id = %render_id, error = %error, "Render failed");
                // The renderer may leave scratch elements behind, some of
                // them injected asynchronously after the failure surfaces:
                // clean up immediately, then again after yielding long
                // enough for those late injections to land.
                remove_render_pollution(page, &render_id);
                tokio::time::sleep(LATE_CLEANUP_DELAY).await;
                remove_render_pollution(page, &render_id);

                let formatted = diagnostics::format_failure(&error.diagnostic);
                artifact::inject_error(&artifact, &formatted);
                true
            }
        };

        commit(candidate, descriptor, &artifact, failed)?;
        page.notify_mutated();
        Ok(Some(artifact))
    }
}

/// Extract the source text for a candidate, or `None` when empty.
fn extract_source(candidate: &Candidate, descriptor: &PlatformDescriptor) -> Option<String> {
    let text = match &descriptor.strategy {
        Strategy::AdjacentLabel { code_selector, .. } => {
            let code = candidate.node.select_first(code_selector).ok()?;
            node::trimmed_text(code.as_node())
        }
        Strategy::StructuralMarker { .. } | Strategy::ContentHeuristic { .. } => {
            node::trimmed_text(&candidate.node)
        }
    };
    (!text.is_empty()).then_some(text)
}

/// Make the transformation visible in the live document.
///
/// Everything before this operates on detached nodes; this is the single
/// mutation the page sees per candidate.
fn commit(
    candidate: &Candidate,
    descriptor: &PlatformDescriptor,
    artifact: &RenderedArtifact,
    failed: bool,
) -> Result<(), EngineError> {
    match &descriptor.strategy {
        Strategy::StructuralMarker {
            container_selector, ..
        }
        | Strategy::ContentHeuristic {
            container_selector, ..
        } => {
            let wrapper = resolve_wrapper(&candidate.node, container_selector)?;
            Toggle::attach(artifact, failed);
            wrapper.insert_before(artifact.container.clone());
            wrapper.detach();
        }
        Strategy::AdjacentLabel {
            code_selector,
            preview_selector,
            ..
        } => {
            // The host page keeps its own code chrome: the diagram becomes
            // an initially-hidden sibling of the code display, and the
            // host's preview control drives visibility between the two.
            let code = candidate
                .node
                .select_first(code_selector)
                .ok()
                .ok_or(EngineError::MissingWrapper)?;
            let pre = Selectors::compile("pre")
                .map_err(|()| EngineError::Selector("pre".to_owned()))
                .map(|s| node::closest(code.as_node(), &s))?
                .ok_or(EngineError::MissingWrapper)?;

            node::set_hidden(&artifact.container, true);
            pre.insert_after(artifact.container.clone());

            if let Ok(preview) = candidate.node.select_first(preview_selector) {
                Toggle::bind_host_control(
                    preview.as_node().clone(),
                    pre,
                    artifact.container.clone(),
                    failed,
                );
            } else {
                // No preview affordance on this block; apply the default
                // visibility directly.
                node::set_hidden(&pre, !failed);
                node::set_hidden(&artifact.container, failed);
            }
        }
    }
    Ok(())
}

/// The element replaced as a unit: the nearest container-matching ancestor,
/// falling back to the candidate's immediate parent.
fn resolve_wrapper(candidate: &NodeRef, container_selector: &str) -> Result<NodeRef, EngineError> {
    let selectors = Selectors::compile(container_selector)
        .map_err(|()| EngineError::Selector(container_selector.to_owned()))?;
    if let Some(wrapper) = node::closest(candidate, &selectors) {
        return Ok(wrapper);
    }
    candidate.parent().ok_or(EngineError::MissingWrapper)
}
