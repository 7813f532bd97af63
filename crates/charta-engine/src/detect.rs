//! Strategy-dispatched discovery of unprocessed diagram blocks.

use charta_dom::{DomError, Page, node};
use charta_platforms::{PlatformDescriptor, Strategy, looks_like_diagram};
use kuchiki::NodeRef;

use crate::DIAGRAM_LANGUAGE;

/// Idempotence marker.
///
/// Applied to every element the engine has taken ownership of; any element
/// carrying it (directly or via an ancestor) is invisible to later scans.
pub const PROCESSED_ATTR: &str = "data-charta-processed";

/// One code block found during a scan, not yet transformed.
///
/// For the structural-marker and content-heuristic strategies the node is
/// the code element itself; for the adjacent-label strategy it is the
/// code-block container that holds both label and code.
#[derive(Clone)]
pub struct Candidate {
    pub node: NodeRef,
}

/// Scan the page for qualifying, not-yet-handled blocks.
///
/// A fresh snapshot of the live document in document order; zero matches is
/// an empty vector, not an error. Nothing is cached between calls.
pub fn find_unprocessed(
    page: &Page,
    descriptor: &PlatformDescriptor,
) -> Result<Vec<Candidate>, DomError> {
    let candidates: Vec<NodeRef> = match &descriptor.strategy {
        Strategy::StructuralMarker { block_selector, .. } => page
            .select(block_selector)?
            .into_iter()
            .filter(unprocessed)
            .collect(),
        Strategy::ContentHeuristic { block_selector, .. } => page
            .select(block_selector)?
            .into_iter()
            .filter(unprocessed)
            .filter(|n| looks_like_diagram(&node::trimmed_text(n)))
            .collect(),
        Strategy::AdjacentLabel {
            container_selector,
            label_selector,
            ..
        } => page
            .select(container_selector)?
            .into_iter()
            .filter(unprocessed)
            .filter(|container| has_diagram_label(container, label_selector))
            .collect(),
    };

    Ok(candidates.into_iter().map(|node| Candidate { node }).collect())
}

fn unprocessed(node: &NodeRef) -> bool {
    !node::has_attr_on_self_or_ancestor(node, PROCESSED_ATTR)
}

/// Whether the container's label child names the diagram language.
fn has_diagram_label(container: &NodeRef, label_selector: &str) -> bool {
    let Ok(label) = container.select_first(label_selector) else {
        return false;
    };
    node::trimmed_text(label.as_node()).to_lowercase() == DIAGRAM_LANGUAGE
}
