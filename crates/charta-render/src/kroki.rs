//! Kroki-backed renderer.

use std::time::Duration;

use async_trait::async_trait;
use ureq::Agent;

use crate::renderer::{DiagramRenderer, RenderError};

/// Default HTTP timeout for render requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Renders mermaid source via a Kroki server.
///
/// Issues `POST {server}/mermaid/svg` with the diagram source as the body.
/// A non-success response's body is surfaced verbatim as the render
/// diagnostic, which is exactly the "human-unfriendly string" shape the
/// rest of the pipeline expects from a renderer.
///
/// The blocking HTTP call runs on the runtime's blocking pool so the
/// single-threaded pipeline keeps servicing other candidates while a render
/// is in flight.
pub struct KrokiRenderer {
    server_url: String,
    agent: Agent,
}

impl KrokiRenderer {
    /// Create a renderer against the given Kroki server URL.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_timeout(server_url, DEFAULT_TIMEOUT)
    }

    /// Create a renderer with an explicit HTTP timeout.
    #[must_use]
    pub fn with_timeout(server_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            server_url: server_url.into().trim_end_matches('/').to_owned(),
            agent,
        }
    }

    fn render_blocking(agent: &Agent, url: &str, source: &str) -> Result<String, RenderError> {
        let response = agent
            .post(url)
            .header("Content-Type", "text/plain")
            .send(source)
            .map_err(|e| RenderError::new(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();
        let body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read response body)".to_owned());

        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(RenderError::new(body))
        }
    }
}

#[async_trait(?Send)]
impl DiagramRenderer for KrokiRenderer {
    async fn render(&self, id: &str, source: &str) -> Result<String, RenderError> {
        let agent = self.agent.clone();
        let url = format!("{}/mermaid/svg", self.server_url);
        let source = source.to_owned();
        tracing::debug!(id = %id, url = %url, "Dispatching render");

        tokio::task::spawn_blocking(move || Self::render_blocking(&agent, &url, &source))
            .await
            .map_err(|e| RenderError::new(format!("render task failed: {e}")))?
    }
}
