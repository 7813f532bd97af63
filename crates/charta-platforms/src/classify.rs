//! First-token diagram heuristic.

/// Leading keywords that open a mermaid diagram.
///
/// Mirrors the diagram types mermaid registers detectors for; lowercase
/// because matching is case-insensitive.
static DIAGRAM_KEYWORDS: &[&str] = &[
    "graph",
    "flowchart",
    "sequencediagram",
    "classdiagram",
    "statediagram",
    "statediagram-v2",
    "erdiagram",
    "journey",
    "gantt",
    "pie",
    "quadrantchart",
    "requirementdiagram",
    "gitgraph",
    "mindmap",
    "timeline",
    "sankey-beta",
    "xychart-beta",
    "block-beta",
    "c4context",
];

/// Whether raw code-block text looks like a diagram description.
///
/// Trims, lowercases, and checks the first whitespace-delimited token
/// against a closed keyword set. This is a heuristic, not a parser: any
/// text starting with a known keyword is accepted, garbage included; the
/// downstream renderer is the arbiter of validity.
#[must_use]
pub fn looks_like_diagram(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    let Some(first_token) = lowered.split_whitespace().next() else {
        return false;
    };
    DIAGRAM_KEYWORDS.contains(&first_token)
}
