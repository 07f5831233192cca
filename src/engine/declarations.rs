//! Declaration scanning and intent summarization
//!
//! The whole source text is tested against a fixed set of data-structure
//! signatures; each hit yields one declaration under a canonical name
//! (`stack1`, `queue1`, ...). The same detection set feeds the intent
//! summary, a fixed clause per kind joined into one template sentence.
//!
//! There are no error conditions: a text matching no signature yields an
//! empty declaration set and the fallback sentence.

use super::action::StructureKind;
use regex::Regex;
use std::sync::LazyLock;

static STACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bstack\b|\.push\(|\.pop\(|push\(|pop\(").unwrap());

static LIST_NODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)listnode|node\s*\w*\s*=\s*new\s+listnode").unwrap());

static GRID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:grid|matrix|board)\b|new\s+int\s*\[\s*\]").unwrap());

static QUEUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)queue|offer\(|poll\(|add\(|remove\(").unwrap());

static MAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hashmap|map\b|\.put\(|new\s+HashMap\b").unwrap());

/// Tests every signature against the source and returns one declaration per
/// matched kind, canonical name first.
///
/// The design does not disambiguate multiple instances of the same kind:
/// all stacks in the text share `stack1`, and so on.
pub(crate) fn detect_structures(code: &str) -> Vec<(String, StructureKind)> {
    let checks: [(&LazyLock<Regex>, StructureKind); 5] = [
        (&STACK_RE, StructureKind::Stack),
        (&QUEUE_RE, StructureKind::Queue),
        (&LIST_NODE_RE, StructureKind::LinkedList),
        (&GRID_RE, StructureKind::Grid),
        (&MAP_RE, StructureKind::Map),
    ];

    let mut declarations = Vec::new();
    for (re, kind) in checks {
        if re.is_match(code) {
            // every detectable kind has a canonical name
            if let Some(name) = kind.canonical_name() {
                log::debug!("signature matched: {} -> {}", kind, name);
                declarations.push((name.to_string(), kind));
            }
        }
    }
    declarations
}

/// Human-readable display name used inside the intent sentence.
fn display_name(kind: StructureKind) -> &'static str {
    match kind {
        StructureKind::Stack => "stack",
        StructureKind::Queue => "queue",
        StructureKind::LinkedList => "linked list",
        StructureKind::Map => "map",
        StructureKind::Grid => "matrix/grid",
        StructureKind::Array => "array",
    }
}

/// Fixed likely-intent clause per kind.
fn intent_clause(kind: StructureKind) -> &'static str {
    match kind {
        StructureKind::Stack => "use a stack for LIFO operations (e.g., DFS/backtracking)",
        StructureKind::Queue => "use a queue for FIFO operations (e.g., BFS)",
        StructureKind::LinkedList => "manipulate linked list nodes (insert/remove/traverse)",
        StructureKind::Map => "use a map/hashmap to store key->value mappings",
        StructureKind::Grid => "operate on 2D grids (BFS/DP/matrix traversal)",
        StructureKind::Array => "store an ordered sequence of values",
    }
}

/// Sentence returned when no signature matched.
pub const NO_INTENT: &str = "No obvious data structure detected.";

/// Builds the natural-language intent summary for the detected kinds.
///
/// Enumeration order is fixed (stack, queue, linked list, map, grid), so
/// the sentence is deterministic for any detection set.
pub(crate) fn summarize_intent(detected: &[(String, StructureKind)]) -> String {
    const ORDER: [StructureKind; 5] = [
        StructureKind::Stack,
        StructureKind::Queue,
        StructureKind::LinkedList,
        StructureKind::Map,
        StructureKind::Grid,
    ];

    let present: Vec<StructureKind> = ORDER
        .into_iter()
        .filter(|kind| detected.iter().any(|(_, k)| k == kind))
        .collect();

    if present.is_empty() {
        return NO_INTENT.to_string();
    }

    let names: Vec<&str> = present.iter().map(|&k| display_name(k)).collect();
    let clauses: Vec<&str> = present.iter().map(|&k| intent_clause(k)).collect();

    format!(
        "Detected {} in the code. Likely intent: {}.",
        names.join(", "),
        clauses.join("; ")
    )
}
