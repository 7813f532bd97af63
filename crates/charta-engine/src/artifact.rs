//! Replacement artifact construction.

use charta_dom::node;
use charta_render::diagnostics::FormattedFailure;
use kuchiki::NodeRef;

use crate::SOURCE_MARKER_CLASS;
use crate::detect::PROCESSED_ATTR;

/// Marker set on the display region when it holds an error presentation
/// instead of rendered markup.
pub const ERROR_ATTR: &str = "data-charta-error";

/// The committed replacement structure for one diagram block.
///
/// Three regions: the hidden source region (the exact original text, under
/// a queryable language marker), the display region (rendered markup or an
/// error presentation), and the toggle control, attached later.
///
/// The source region's text is the compatibility contract with export
/// tooling: byte-for-byte the text extracted from the original block, never
/// re-trimmed, normalized, or re-escaped.
#[derive(Clone)]
pub struct RenderedArtifact {
    pub container: NodeRef,
    pub source_region: NodeRef,
    pub display_region: NodeRef,
}

/// Build a detached artifact shell around the extracted source text.
///
/// The container carries the processed marker so the artifact itself is
/// invisible to later scans; the source region starts hidden and the
/// display region starts empty.
#[must_use]
pub fn build_shell(source: &str) -> RenderedArtifact {
    let html = format!(
        r#"<div class="charta-diagram" {PROCESSED_ATTR}=""><div class="charta-source" hidden=""><pre><code class="{SOURCE_MARKER_CLASS}">{}</code></pre></div><div class="charta-display"></div></div>"#,
        node::escape_text(source),
    );
    let container = node::parse_single_element(&html).expect("shell template is a single element");
    let source_region = region(&container, "div.charta-source");
    let display_region = region(&container, "div.charta-display");

    RenderedArtifact {
        container,
        source_region,
        display_region,
    }
}

fn region(container: &NodeRef, css: &str) -> NodeRef {
    container
        .select_first(css)
        .expect("shell template contains the region")
        .as_node()
        .clone()
}

/// Inject rendered markup verbatim into the display region.
pub fn inject_markup(artifact: &RenderedArtifact, markup: &str) {
    for child in node::parse_fragment(markup) {
        artifact.display_region.append(child);
    }
}

/// Inject a structured error presentation and flag the error state.
pub fn inject_error(artifact: &RenderedArtifact, failure: &FormattedFailure) {
    let detail = failure.detail.as_deref().map_or(String::new(), |d| {
        format!(
            r#"<pre class="charta-error-detail">{}</pre>"#,
            node::escape_text(d)
        )
    });
    let html = format!(
        r#"<figure class="charta-error"><p class="charta-error-summary">{}</p>{detail}</figure>"#,
        node::escape_text(&failure.summary),
    );
    for child in node::parse_fragment(&html) {
        artifact.display_region.append(child);
    }
    node::set_attr(&artifact.display_region, ERROR_ATTR, "");
}

/// Whether the artifact's display region is in the error state.
#[must_use]
pub fn is_error(artifact: &RenderedArtifact) -> bool {
    node::has_attr(&artifact.display_region, ERROR_ATTR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shell_preserves_source_exactly() {
        let source = r#"graph TD; A["<weird & text>"] --> B;"#;
        let artifact = build_shell(source);
        let code = artifact
            .source_region
            .select_first("pre code")
            .unwrap()
            .as_node()
            .clone();
        assert_eq!(code.text_contents(), source);
        assert_eq!(
            node::attr(&code, "class"),
            Some(SOURCE_MARKER_CLASS.to_owned())
        );
    }

    #[test]
    fn test_shell_source_region_hidden() {
        let artifact = build_shell("graph TD;");
        assert!(node::is_hidden(&artifact.source_region));
        assert!(!node::is_hidden(&artifact.display_region));
    }

    #[test]
    fn test_shell_carries_processed_marker() {
        let artifact = build_shell("graph TD;");
        assert!(node::has_attr(&artifact.container, PROCESSED_ATTR));
    }

    #[test]
    fn test_inject_markup_verbatim() {
        let artifact = build_shell("graph TD;");
        inject_markup(&artifact, r#"<svg viewBox="0 0 10 10"><g></g></svg>"#);
        assert!(artifact.display_region.select_first("svg").is_ok());
        assert!(!is_error(&artifact));
    }

    #[test]
    fn test_inject_error_sets_marker_and_summary() {
        let artifact = build_shell("graph TD;");
        inject_error(
            &artifact,
            &FormattedFailure {
                summary: "Diagram has a syntax error".to_owned(),
                detail: Some("Parse error on line 1".to_owned()),
            },
        );
        assert!(is_error(&artifact));
        let summary = artifact
            .display_region
            .select_first(".charta-error-summary")
            .unwrap();
        assert_eq!(
            summary.as_node().text_contents(),
            "Diagram has a syntax error"
        );
        assert!(artifact
            .display_region
            .select_first(".charta-error-detail")
            .is_ok());
    }

    #[test]
    fn test_inject_error_without_detail() {
        let artifact = build_shell("graph TD;");
        inject_error(
            &artifact,
            &FormattedFailure {
                summary: "Diagram rendering failed".to_owned(),
                detail: None,
            },
        );
        assert!(artifact
            .display_region
            .select_first(".charta-error-detail")
            .is_err());
    }
}
