//! Two-state source/display toggle control.

use charta_dom::node;
use kuchiki::NodeRef;

use crate::artifact::RenderedArtifact;

/// Current view, mirrored into `data-charta-view` on the control.
const VIEW_ATTR: &str = "data-charta-view";

const LABEL_SHOW_SOURCE: &str = "Show source";
const LABEL_SHOW_DIAGRAM: &str = "Show diagram";

/// A click-driven flip between two mutually exclusive visibility states.
///
/// Owns no other behavior: one region is visible, the other hidden, and the
/// control's label/title track which flip comes next.
#[derive(Clone)]
pub struct Toggle {
    source: NodeRef,
    display: NodeRef,
    control: NodeRef,
    /// The control belongs to the host page; leave its content alone.
    host_owned: bool,
}

impl Toggle {
    /// Create a control button, append it to the artifact container, and
    /// apply the initial state.
    ///
    /// `show_source` starts the toggle on the source view, the
    /// auto-reveal-on-error default.
    pub fn attach(artifact: &RenderedArtifact, show_source: bool) -> Self {
        let control = node::parse_single_element(
            r#"<button type="button" class="charta-toggle"></button>"#,
        )
        .expect("toggle template is a single element");
        artifact.container.append(control.clone());

        let toggle = Self {
            source: artifact.source_region.clone(),
            display: artifact.display_region.clone(),
            control,
            host_owned: false,
        };
        toggle.apply(show_source);
        toggle
    }

    /// Bind the host page's own preview control to a source/display pair.
    ///
    /// Used by the adjacent-label strategy, where the host keeps its code
    /// chrome: only visibility and the control's state attribute are
    /// touched, never the host control's content.
    pub fn bind_host_control(
        control: NodeRef,
        source: NodeRef,
        display: NodeRef,
        show_source: bool,
    ) -> Self {
        let toggle = Self {
            source,
            display,
            control,
            host_owned: true,
        };
        toggle.apply(show_source);
        toggle
    }

    /// Flip to the other view.
    pub fn flip(&self) {
        self.apply(!self.showing_source());
    }

    /// Whether the source view is currently visible.
    #[must_use]
    pub fn showing_source(&self) -> bool {
        node::attr(&self.control, VIEW_ATTR).as_deref() == Some("source")
    }

    fn apply(&self, show_source: bool) {
        node::set_hidden(&self.source, !show_source);
        node::set_hidden(&self.display, show_source);

        let view = if show_source { "source" } else { "diagram" };
        node::set_attr(&self.control, VIEW_ATTR, view);

        let next_label = if show_source {
            LABEL_SHOW_DIAGRAM
        } else {
            LABEL_SHOW_SOURCE
        };
        node::set_attr(&self.control, "title", next_label);
        if !self.host_owned {
            // Collect first: detaching while iterating breaks the sibling walk.
            let children: Vec<NodeRef> = self.control.children().collect();
            for child in children {
                child.detach();
            }
            self.control.append(NodeRef::new_text(next_label));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::build_shell;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attach_defaults_to_display_view() {
        let artifact = build_shell("graph TD;");
        let toggle = Toggle::attach(&artifact, false);
        assert!(!toggle.showing_source());
        assert!(node::is_hidden(&artifact.source_region));
        assert!(!node::is_hidden(&artifact.display_region));
        assert_eq!(
            artifact
                .container
                .select_first("button.charta-toggle")
                .unwrap()
                .as_node()
                .text_contents(),
            LABEL_SHOW_SOURCE
        );
    }

    #[test]
    fn test_attach_error_state_reveals_source() {
        let artifact = build_shell("graph TD;");
        let toggle = Toggle::attach(&artifact, true);
        assert!(toggle.showing_source());
        assert!(!node::is_hidden(&artifact.source_region));
        assert!(node::is_hidden(&artifact.display_region));
    }

    #[test]
    fn test_flip_is_mutually_exclusive() {
        let artifact = build_shell("graph TD;");
        let toggle = Toggle::attach(&artifact, false);

        toggle.flip();
        assert!(toggle.showing_source());
        assert!(!node::is_hidden(&artifact.source_region));
        assert!(node::is_hidden(&artifact.display_region));

        toggle.flip();
        assert!(!toggle.showing_source());
        assert!(node::is_hidden(&artifact.source_region));
        assert!(!node::is_hidden(&artifact.display_region));
    }

    #[test]
    fn test_host_control_content_untouched() {
        let artifact = build_shell("graph TD;");
        let control = node::parse_single_element(r#"<div class="preview">Preview</div>"#).unwrap();
        let toggle = Toggle::bind_host_control(
            control.clone(),
            artifact.source_region.clone(),
            artifact.display_region.clone(),
            false,
        );
        assert_eq!(control.text_contents(), "Preview");
        toggle.flip();
        assert_eq!(control.text_contents(), "Preview");
        assert_eq!(node::attr(&control, VIEW_ATTR), Some("source".to_owned()));
    }
}
