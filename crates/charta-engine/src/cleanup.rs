//! Defensive removal of renderer side-effect DOM pollution.
//!
//! Failed renders are known to leave stray elements behind in the document,
//! keyed by the render id that was passed in. This module is a defensive
//! boundary around that collaborator defect, not a correctness guarantee
//! about the renderer's internals.

use charta_dom::{Page, node};

/// Marker character the renderer prefixes onto its scratch element ids.
const POLLUTION_PREFIX: char = 'd';

/// Attribute flagging the renderer's error placeholder elements.
const ERROR_ROLE_ATTR: &str = "aria-roledescription";

/// Remove every element the renderer may have left behind for `render_id`.
///
/// Targets three shapes: an element whose id equals the render id, one
/// whose id is the fixed marker character followed by the render id, and
/// any element flagged with the error role whose id starts with the render
/// id, wherever it sits in the tree.
///
/// Idempotent and total: zero matches is fine, repeated calls are fine,
/// and nothing here can fail.
pub fn remove_render_pollution(page: &Page, render_id: &str) {
    let by_id = format!("#{render_id}, #{POLLUTION_PREFIX}{render_id}");
    if let Ok(stray) = page.select(&by_id) {
        for element in stray {
            tracing::debug!(id = %render_id, "Removing renderer pollution");
            element.detach();
        }
    }

    let by_role = format!("[{ERROR_ROLE_ATTR}=\"error\"]");
    if let Ok(flagged) = page.select(&by_role) {
        for element in flagged {
            let id = node::attr(&element, "id").unwrap_or_default();
            if id.starts_with(render_id) {
                tracing::debug!(id = %render_id, "Removing renderer error placeholder");
                element.detach();
            }
        }
    }
}
