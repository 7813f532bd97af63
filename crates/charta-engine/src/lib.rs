//! Detection and transformation pipeline for diagram code blocks.
//!
//! One engine handles structurally different chat-platform DOMs through the
//! declarative per-platform configuration in `charta-platforms`:
//!
//! - [`find_unprocessed`] discovers qualifying, not-yet-handled code blocks
//!   (idempotent via the [`PROCESSED_ATTR`] marker)
//! - [`TransformEngine`] turns each candidate into a [`RenderedArtifact`]:
//!   hidden original source, rendered markup or an error presentation, and
//!   a [`Toggle`] between the two
//! - [`Watcher`] re-runs the pair incrementally as the page streams in new
//!   content, coalescing mutation bursts to frame granularity
//!
//! Failures are contained per candidate: a render error is recovered in
//! place (with defensive cleanup of renderer side effects), and an
//! unexpected internal error only costs that one block its transformation.
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use charta_dom::Page;
//! use charta_engine::TransformEngine;
//! use charta_platforms::identify;
//! use charta_render::KrokiRenderer;
//!
//! # async fn example() {
//! let page = Page::parse("<html><body>saved chat page</body></html>");
//! let Some(descriptor) = identify("chatgpt.com") else { return };
//! if descriptor.native_support {
//!     return; // the platform renders diagrams itself
//! }
//! let engine = TransformEngine::new(Rc::new(KrokiRenderer::new("https://kroki.io")));
//! let artifacts = engine.run_sweep(&page, descriptor).await;
//! # }
//! ```

mod artifact;
mod cleanup;
mod detect;
mod engine;
mod ids;
mod toggle;
mod watch;

pub use artifact::{ERROR_ATTR, RenderedArtifact, is_error};
pub use cleanup::remove_render_pollution;
pub use detect::{Candidate, PROCESSED_ATTR, find_unprocessed};
pub use engine::{EngineError, TransformEngine};
pub use ids::RenderIds;
pub use toggle::Toggle;
pub use watch::Watcher;

/// The diagram language this pipeline recognizes and tags.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// Class marker on the hidden source region's code element.
///
/// This literal is the interchange format downstream export tools query
/// for; it is identical across platforms and render outcomes.
pub const SOURCE_MARKER_CLASS: &str = "language-mermaid";


#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::rc::Rc;

    use charta_dom::{Page, node};
    use charta_platforms::{Platform, describe};
    use pretty_assertions::assert_eq;

    use super::testing::ScriptedRenderer;
    use super::*;

    fn engine_with(renderer: ScriptedRenderer) -> Rc<TransformEngine> {
        Rc::new(TransformEngine::new(Rc::new(renderer)))
    }

    async fn in_local_set<F: Future>(f: F) -> F::Output {
        tokio::task::LocalSet::new().run_until(f).await
    }

    #[tokio::test]
    async fn test_structural_marker_success_round_trip() {
        let page = Page::parse(
            r#"<main><pre><code class="language-mermaid">graph TD; A-->B;</code></pre></main>"#,
        );
        let renderer = ScriptedRenderer::new();
        renderer.push_markup(r#"<svg class="rendered"><g>nodes</g></svg>"#);
        let engine = engine_with(renderer);
        let descriptor = describe(Platform::ChatGpt);

        let artifacts = engine.run_sweep(&page, descriptor).await;
        assert_eq!(artifacts.len(), 1);

        // The original wrapper is gone; the artifact took its place.
        assert!(page.select("main > pre").unwrap().is_empty());

        // Hidden source region keeps the exact text under the marker class.
        let code = page
            .select_first("div.charta-source pre code.language-mermaid")
            .unwrap()
            .expect("hidden source region present");
        assert_eq!(code.text_contents(), "graph TD; A-->B;");
        assert!(node::is_hidden(&artifacts[0].source_region));

        // Display region holds the renderer's markup verbatim.
        assert!(page
            .select_first("div.charta-display svg.rendered")
            .unwrap()
            .is_some());
        assert!(!is_error(&artifacts[0]));
    }

    #[tokio::test]
    async fn test_empty_source_is_skipped_silently() {
        let page =
            Page::parse(r#"<main><pre><code class="language-mermaid">   </code></pre></main>"#);
        let engine = engine_with(ScriptedRenderer::new());
        let descriptor = describe(Platform::ChatGpt);

        let artifacts = engine.run_sweep(&page, descriptor).await;
        assert!(artifacts.is_empty());

        // The block stays in place but is claimed, so rescans ignore it.
        assert!(page.select_first("main pre code").unwrap().is_some());
        assert!(find_unprocessed(&page, descriptor).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_render_failure_shows_error_and_source() {
        in_local_set(async {
            let page = Page::parse(
                r#"<main><pre><code class="language-mermaid">graph TD; A-?>B;</code></pre></main>"#,
            );
            let renderer = ScriptedRenderer::new();
            renderer.push_failure("Parse error on line 1: unexpected '?'", false);
            let engine = engine_with(renderer);
            let descriptor = describe(Platform::ChatGpt);

            let artifacts = engine.run_sweep(&page, descriptor).await;
            assert_eq!(artifacts.len(), 1);
            assert!(is_error(&artifacts[0]));

            // Error presentation replaced the markup...
            let summary = page
                .select_first(".charta-error-summary")
                .unwrap()
                .expect("error summary present");
            assert_eq!(
                summary.text_contents(),
                "Diagram has a syntax error on line 1"
            );

            // ...and the auto-reveal-on-error default shows the source.
            assert!(!node::is_hidden(&artifacts[0].source_region));
            assert!(node::is_hidden(&artifacts[0].display_region));

            // The source survives byte-for-byte even on failure.
            let code = page
                .select_first("div.charta-source pre code.language-mermaid")
                .unwrap()
                .expect("hidden source region present");
            assert_eq!(code.text_contents(), "graph TD; A-?>B;");
        })
        .await;
    }

    #[tokio::test]
    async fn test_failure_cleanup_removes_sync_and_late_pollution() {
        in_local_set(async {
            let page = Page::parse(
                r#"<main><pre><code class="language-mermaid">graph TD; broken</code></pre></main>"#,
            );
            let renderer = ScriptedRenderer::new();
            renderer.pollute_into(&page);
            renderer.push_failure("Syntax error", true);
            let engine = engine_with(renderer);

            let artifacts = engine.run_sweep(&page, describe(Platform::ChatGpt)).await;
            assert_eq!(artifacts.len(), 1);

            // Both the synchronous scratch element and the late-injected
            // error placeholder are gone.
            assert!(page.select_first("#dcharta-render-0").unwrap().is_none());
            assert!(page
                .select_first(r#"[aria-roledescription="error"]"#)
                .unwrap()
                .is_none());
        })
        .await;
    }

    #[tokio::test]
    async fn test_one_failure_never_affects_siblings() {
        in_local_set(async {
            let page = Page::parse(
                r#"<main>
                    <pre><code class="language-mermaid">graph TD; one</code></pre>
                    <pre><code class="language-mermaid">graph TD; broken</code></pre>
                    <pre><code class="language-mermaid">graph TD; three</code></pre>
                </main>"#,
            );
            let renderer = ScriptedRenderer::new();
            renderer.push_markup("<svg>one</svg>");
            renderer.push_failure("Parse error on line 1", false);
            renderer.push_markup("<svg>three</svg>");
            let engine = engine_with(renderer);

            let artifacts = engine.run_sweep(&page, describe(Platform::ChatGpt)).await;
            assert_eq!(artifacts.len(), 3);

            let failed: Vec<bool> = artifacts.iter().map(is_error).collect();
            assert_eq!(failed.iter().filter(|f| **f).count(), 1);

            // Every block was committed: three artifacts, no leftover pre.
            assert_eq!(page.select("div.charta-diagram").unwrap().len(), 3);
            assert!(page.select("main > pre").unwrap().is_empty());
        })
        .await;
    }

    #[tokio::test]
    async fn test_render_ids_unique_across_batch() {
        let page = Page::parse(
            r#"<main>
                <pre><code class="language-mermaid">graph TD; a</code></pre>
                <pre><code class="language-mermaid">graph TD; b</code></pre>
            </main>"#,
        );
        let renderer = Rc::new(ScriptedRenderer::new());
        let engine = TransformEngine::new(Rc::clone(&renderer) as Rc<dyn charta_render::DiagramRenderer>);

        let artifacts = engine.run_sweep(&page, describe(Platform::ChatGpt)).await;
        assert_eq!(artifacts.len(), 2);

        let calls = renderer.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_ne!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn test_processed_artifact_invisible_to_rescan() {
        let page = Page::parse(
            r#"<main><pre><code class="language-mermaid">graph TD; A-->B;</code></pre></main>"#,
        );
        let engine = engine_with(ScriptedRenderer::new());
        let descriptor = describe(Platform::ChatGpt);

        let first = engine.run_sweep(&page, descriptor).await;
        assert_eq!(first.len(), 1);

        // The committed artifact contains a code element under the marker
        // class; the idempotence marker keeps it out of the next scan.
        let second = engine.run_sweep(&page, descriptor).await;
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_adjacent_label_preserves_host_chrome() {
        let page = Page::parse(
            r#"<main><div class="md-code-block">
                <div class="md-code-block-banner">
                    <div class="md-code-block-infostring">mermaid</div>
                    <div class="code-block-preview">Preview</div>
                </div>
                <pre><code>graph TD; A-->B;</code></pre>
            </div></main>"#,
        );
        let engine = engine_with(ScriptedRenderer::new());
        let descriptor = describe(Platform::DeepSeek);

        let artifacts = engine.run_sweep(&page, descriptor).await;
        assert_eq!(artifacts.len(), 1);

        // The host's own code display survives, hidden, with its chrome.
        let pre = page
            .select_first(".md-code-block pre")
            .unwrap()
            .expect("host code display kept");
        assert!(node::is_hidden(&pre));
        assert!(page
            .select_first(".md-code-block .code-block-preview")
            .unwrap()
            .is_some());

        // The diagram container sits right after it and is visible.
        assert!(!node::is_hidden(&artifacts[0].container));
        let container = page
            .select_first(".md-code-block div.charta-diagram")
            .unwrap()
            .expect("diagram container inserted in host block");
        assert_eq!(
            node::attr(&container, "class"),
            Some("charta-diagram".to_owned())
        );

        // The container itself is marked processed, so the block is
        // excluded from later scans.
        assert!(find_unprocessed(&page, descriptor).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adjacent_label_failure_keeps_code_visible() {
        in_local_set(async {
            let page = Page::parse(
                r#"<main><div class="md-code-block">
                    <div class="md-code-block-banner">
                        <div class="md-code-block-infostring">mermaid</div>
                        <div class="code-block-preview">Preview</div>
                    </div>
                    <pre><code>graph TD; broken</code></pre>
                </div></main>"#,
            );
            let renderer = ScriptedRenderer::new();
            renderer.push_failure("Syntax error", false);
            let engine = engine_with(renderer);

            let artifacts = engine.run_sweep(&page, describe(Platform::DeepSeek)).await;
            assert_eq!(artifacts.len(), 1);
            assert!(is_error(&artifacts[0]));

            let pre = page.select_first(".md-code-block pre").unwrap().unwrap();
            assert!(!node::is_hidden(&pre));
            assert!(node::is_hidden(&artifacts[0].container));
        })
        .await;
    }

    #[tokio::test]
    async fn test_watcher_picks_up_streamed_content() {
        in_local_set(async {
            let page = Page::parse(r"<main id=chat></main>");
            let engine = engine_with(ScriptedRenderer::new());
            let descriptor = describe(Platform::ChatGpt);

            let watcher = Watcher::with_frame(std::time::Duration::from_millis(2));
            let handle = tokio::task::spawn_local({
                let page = page.clone();
                let engine = Rc::clone(&engine);
                async move { watcher.run(page, descriptor, engine).await }
            });

            // Stream three fragments in a burst; only the diagram block
            // qualifies.
            page.append_html("#chat", "<p>assistant says:</p>").unwrap();
            page.append_html(
                "#chat",
                r#"<pre><code class="language-mermaid">graph TD; A-->B;</code></pre>"#,
            )
            .unwrap();
            page.append_html("#chat", "<p>done</p>").unwrap();

            // Give the watcher a few frames to coalesce and process.
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;

            assert!(page
                .select_first("div.charta-diagram")
                .unwrap()
                .is_some());
            assert!(page.select("#chat > pre").unwrap().is_empty());

            handle.abort();
        })
        .await;
    }
}
