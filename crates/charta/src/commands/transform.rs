//! `transform` command: run the detection/transformation pipeline over a
//! chat-transcript page.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use charta_config::{CliSettings, Config};
use charta_dom::{Page, node};
use charta_engine::{TransformEngine, is_error};
use charta_platforms::{PlatformDescriptor, identify};
use charta_render::KrokiRenderer;
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Transform diagram code blocks in a chat page into rendered diagrams.
///
/// Unsupported hosts and platforms with native diagram support write the
/// page through unchanged; render failures are presented inside the page
/// and never fail the command.
#[derive(Args)]
pub(crate) struct TransformArgs {
    /// Input page (HTML file, or '-' for stdin).
    pub(crate) page: PathBuf,

    /// Write the transformed page here instead of stdout.
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,

    /// Hostname used for platform identification (overrides config and
    /// page metadata).
    #[arg(long)]
    pub(crate) hostname: Option<String>,

    /// Kroki server URL used for rendering.
    #[arg(long, env = "CHARTA_KROKI_URL")]
    pub(crate) kroki_url: Option<String>,

    /// Render HTTP timeout in seconds.
    #[arg(long)]
    pub(crate) timeout_secs: Option<u64>,

    /// After the initial sweep, keep reading HTML fragments from stdin
    /// (one per line) and append them to the page body, transforming new
    /// diagram blocks as they arrive.
    #[arg(long)]
    pub(crate) follow: bool,

    /// Enable info-level logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl TransformArgs {
    pub(crate) async fn execute(self, out: &Output) -> Result<(), CliError> {
        if self.follow && self.page == Path::new("-") {
            return Err(CliError::Validation(
                "--follow reads fragments from stdin, so the page must be a file".to_owned(),
            ));
        }

        let settings = CliSettings {
            hostname: self.hostname.clone(),
            kroki_url: self.kroki_url.clone(),
            timeout_secs: self.timeout_secs,
            frame_millis: None,
        };
        let config = Config::discover(&std::env::current_dir()?, &settings)?;

        let html = self.read_page()?;
        let page = Page::parse(&html);

        let hostname = config
            .page
            .hostname
            .clone()
            .or_else(|| page_hostname(&page));
        let Some(hostname) = hostname else {
            out.warning("No hostname available (use --hostname); page left unchanged");
            return self.write_page(&page);
        };
        let Some(descriptor) = identify(&hostname) else {
            out.info(&format!(
                "No supported platform matches '{hostname}'; page left unchanged"
            ));
            return self.write_page(&page);
        };
        if descriptor.native_support {
            out.info(&format!(
                "{} renders diagrams natively; page left unchanged",
                descriptor.platform.as_str()
            ));
            return self.write_page(&page);
        }

        let renderer = KrokiRenderer::with_timeout(
            config.renderer.kroki_url.clone(),
            config.renderer.timeout(),
        );
        let engine = TransformEngine::new(Rc::new(renderer));

        let artifacts = engine.run_sweep(&page, descriptor).await;
        let mut total = artifacts.len();
        let mut failed = artifacts.iter().filter(|a| is_error(a)).count();

        if self.follow {
            let (more, more_failed) =
                follow_stream(&page, descriptor, &engine, config.watch.frame()).await;
            total += more;
            failed += more_failed;
        }

        if failed > 0 {
            out.warning(&format!(
                "Transformed {total} diagram block(s), {failed} with render errors"
            ));
        } else {
            out.success(&format!("Transformed {total} diagram block(s)"));
        }
        self.write_page(&page)
    }

    fn read_page(&self) -> Result<String, CliError> {
        if self.page == Path::new("-") {
            let mut html = String::new();
            std::io::stdin().read_to_string(&mut html)?;
            Ok(html)
        } else {
            Ok(std::fs::read_to_string(&self.page)?)
        }
    }

    fn write_page(&self, page: &Page) -> Result<(), CliError> {
        let html = page.serialize()?;
        match &self.output {
            Some(path) => std::fs::write(path, html)?,
            None => std::io::stdout().write_all(html.as_bytes())?,
        }
        Ok(())
    }
}

/// Append stdin fragments to the page body, sweeping once per burst.
///
/// Bursts are coalesced to the configured frame interval, the same policy
/// [`charta_engine::Watcher`] applies for embedding hosts; here each sweep
/// is awaited so the serialized output never contains half-finished
/// renders. Returns `(transformed, failed)` counts.
async fn follow_stream(
    page: &Page,
    descriptor: &PlatformDescriptor,
    engine: &TransformEngine,
    frame: std::time::Duration,
) -> (usize, usize) {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut total = 0;
    let mut failed = 0;
    while let Some(first) = rx.recv().await {
        let mut burst = vec![first];
        while let Ok(more) = rx.try_recv() {
            burst.push(more);
        }
        for fragment in &burst {
            if fragment.trim().is_empty() {
                continue;
            }
            if let Err(error) = page.append_html("body", fragment) {
                tracing::warn!(error = %error, "Failed to append fragment");
            }
        }
        tokio::time::sleep(frame).await;

        let artifacts = engine.run_sweep(page, descriptor).await;
        total += artifacts.len();
        failed += artifacts.iter().filter(|a| is_error(a)).count();
    }
    (total, failed)
}

/// Hostname recorded in the page itself, if any.
///
/// Saved chat pages usually carry their origin in an `og:url` meta tag or
/// a canonical link.
fn page_hostname(page: &Page) -> Option<String> {
    for selector in [r#"meta[property="og:url"]"#, r#"link[rel="canonical"]"#] {
        let Ok(Some(element)) = page.select_first(selector) else {
            continue;
        };
        let url = node::attr(&element, "content").or_else(|| node::attr(&element, "href"));
        if let Some(host) = url.as_deref().and_then(host_of) {
            return Some(host);
        }
    }
    None
}

/// Host portion of a URL, without scheme, userinfo, port, or path.
fn host_of(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = host.rsplit('@').next().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    (!host.is_empty()).then(|| host.to_owned())
}
