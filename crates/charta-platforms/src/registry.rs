//! Declarative per-platform detection configuration.

/// Supported chat platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    ChatGpt,
    Claude,
    DeepSeek,
    Grok,
    Gemini,
}

impl Platform {
    /// Stable lowercase name, used by the CLI listing.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Claude => "claude",
            Self::DeepSeek => "deepseek",
            Self::Grok => "grok",
            Self::Gemini => "gemini",
        }
    }
}

/// How diagram blocks are recognized on a platform.
///
/// Each variant carries only the selectors its detection algorithm needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// A class-like marker directly on the code element identifies it.
    StructuralMarker {
        /// Where candidate code elements live.
        block_selector: &'static str,
        /// The ancestor element replaced as a unit on commit.
        container_selector: &'static str,
    },
    /// No marker exists; the block's text content must be inspected.
    ContentHeuristic {
        block_selector: &'static str,
        container_selector: &'static str,
    },
    /// The language name lives in a sibling label element, and the page's
    /// own code chrome (fold/copy/preview controls) must be preserved.
    AdjacentLabel {
        /// The code-block container carrying both label and code.
        container_selector: &'static str,
        /// The label child holding the language name, relative to the container.
        label_selector: &'static str,
        /// The nested code element, relative to the container.
        code_selector: &'static str,
        /// The host page's own preview control, relative to the container.
        preview_selector: &'static str,
    },
}

impl Strategy {
    /// Stable strategy name, used by the CLI listing.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StructuralMarker { .. } => "structural-marker",
            Self::ContentHeuristic { .. } => "content-heuristic",
            Self::AdjacentLabel { .. } => "adjacent-label",
        }
    }
}

/// Immutable description of one platform's DOM shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub platform: Platform,
    /// Substring matched against the page hostname.
    pub hostname_match: &'static str,
    pub strategy: Strategy,
    /// The platform renders diagrams itself; skip all processing.
    pub native_support: bool,
}

/// The closed descriptor set, in match-priority order.
///
/// Hostname substrings are mutually exclusive by construction, so first
/// match wins without ambiguity.
static DESCRIPTORS: &[PlatformDescriptor] = &[
    PlatformDescriptor {
        platform: Platform::ChatGpt,
        hostname_match: "chatgpt.com",
        strategy: Strategy::StructuralMarker {
            block_selector: "pre code.language-mermaid",
            container_selector: "pre",
        },
        native_support: false,
    },
    PlatformDescriptor {
        platform: Platform::Claude,
        hostname_match: "claude.ai",
        strategy: Strategy::ContentHeuristic {
            block_selector: "pre code",
            container_selector: "pre",
        },
        native_support: false,
    },
    PlatformDescriptor {
        platform: Platform::DeepSeek,
        hostname_match: "chat.deepseek.com",
        strategy: Strategy::AdjacentLabel {
            container_selector: "div.md-code-block",
            label_selector: "div.md-code-block-infostring",
            code_selector: "pre code",
            preview_selector: "div.md-code-block-banner .code-block-preview",
        },
        native_support: false,
    },
    PlatformDescriptor {
        platform: Platform::Grok,
        hostname_match: "grok.com",
        strategy: Strategy::StructuralMarker {
            block_selector: "div.code-block code.language-mermaid",
            container_selector: "div.code-block",
        },
        native_support: false,
    },
    // Gemini renders mermaid blocks itself; the descriptor exists so the
    // host is recognized and deliberately left alone.
    PlatformDescriptor {
        platform: Platform::Gemini,
        hostname_match: "gemini.google.com",
        strategy: Strategy::ContentHeuristic {
            block_selector: "pre code",
            container_selector: "pre",
        },
        native_support: true,
    },
];

/// Find the descriptor for a page hostname.
///
/// Matching is substring containment; returns `None` for unsupported hosts,
/// in which case the whole pipeline stays inert.
#[must_use]
pub fn identify(hostname: &str) -> Option<&'static PlatformDescriptor> {
    DESCRIPTORS
        .iter()
        .find(|d| hostname.contains(d.hostname_match))
}

/// Full descriptor for a known platform.
#[must_use]
pub fn describe(platform: Platform) -> &'static PlatformDescriptor {
    DESCRIPTORS
        .iter()
        .find(|d| d.platform == platform)
        .expect("every platform has a descriptor")
}

/// All descriptors, for listings.
#[must_use]
pub fn all() -> &'static [PlatformDescriptor] {
    DESCRIPTORS
}
