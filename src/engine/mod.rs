//! Action-trace extraction engine
//!
//! Scans raw source text in a restricted imperative subset and produces,
//! without a real compiler front end:
//!
//! 1. a set of inferred data-structure declarations ([`declarations`]),
//! 2. a natural-language intent summary,
//! 3. an ordered sequence of semantic actions ([`action::Action`]) that a
//!    player can replay step by step.
//!
//! # Pipeline
//!
//! ```text
//! text → signatures → literal/variable tables → loop discovery
//!      → loop unrolling (for / while / for-each) → standalone call scan
//! ```
//!
//! Every pass is a single scan over the full text; the loop executor's
//! recursive unrolling is the only recursion. The engine is a pure function
//! of its input: no state survives between invocations, and constructs
//! outside the recognized pattern set are silently ignored rather than
//! rejected.

pub mod action;
pub mod eval;
pub mod literals;

mod body;
mod declarations;
mod loops;
mod scan;
mod text;

pub use action::{Action, StructureKind};
pub use declarations::NO_INTENT;
pub use eval::{evaluate, BindingContext, Evaluation};
pub use literals::{ArrayTable, VariableTable};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete result of one extraction pass: the sole contract handed to the
/// player/renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// Canonical structure name → detected kind. Seeded once by the
    /// declaration scanner and never mutated afterward.
    #[serde(rename = "dataStructures")]
    pub data_structures: BTreeMap<String, StructureKind>,
    /// Natural-language summary of the inferred data-structure usage.
    pub intent: String,
    /// Inferred semantic actions, in emission order.
    pub actions: Vec<Action>,
    /// The unmodified input text.
    pub raw: String,
}

/// Runs the full extraction pipeline over `code`.
///
/// Best-effort by design: nothing the text contains can make this fail.
/// A text with no recognized construct yields an empty declaration map, the
/// fixed fallback intent, and an empty action list.
pub fn parse_source(code: &str) -> TraceResult {
    let detected = declarations::detect_structures(code);
    let intent = declarations::summarize_intent(&detected);

    let mut extractor = Extractor::new(code);
    extractor.run();

    TraceResult {
        data_structures: detected.into_iter().collect(),
        intent,
        actions: extractor.into_actions(),
        raw: code.to_string(),
    }
}

/// Per-invocation extraction state.
///
/// Built inside [`parse_source`] and dropped with it; holding the lookup
/// tables and the growing action list here keeps the pass methods (spread
/// across [`loops`], [`body`], [`scan`]) free of parameter plumbing.
pub(crate) struct Extractor<'a> {
    code: &'a str,
    arrays: ArrayTable,
    variables: VariableTable,
    actions: Vec<Action>,
}

impl<'a> Extractor<'a> {
    pub(crate) fn new(code: &'a str) -> Self {
        Extractor {
            code,
            arrays: ArrayTable::scan(code),
            variables: VariableTable::scan(code),
            actions: Vec::new(),
        }
    }

    /// Runs the loop passes and the standalone call scan, in pipeline order.
    pub(crate) fn run(&mut self) {
        let discovered = self.discover_loops();
        let spans: Vec<(usize, usize)> = discovered.iter().map(|l| l.span).collect();
        log::debug!("discovered {} counting loop(s)", discovered.len());

        // Deeper loops are re-discovered locally during parent body
        // processing; only depth-zero loops start an unroll here.
        for discovered_loop in discovered.iter().filter(|l| l.depth == 0) {
            self.execute_loop(&discovered_loop.header, &BindingContext::new());
        }

        self.process_while_loops();
        self.process_foreach_loops();
        self.scan_standalone(&spans);
    }

    pub(crate) fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    pub(crate) fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let result = parse_source("");
        assert!(result.data_structures.is_empty());
        assert_eq!(result.intent, NO_INTENT);
        assert!(result.actions.is_empty());
        assert_eq!(result.raw, "");
    }

    #[test]
    fn test_raw_is_preserved() {
        let code = "int x = 1;\n// comment\n";
        assert_eq!(parse_source(code).raw, code);
    }

    #[test]
    fn test_wire_shape() {
        let result = parse_source("st.push(1);");
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["dataStructures"].is_object());
        assert_eq!(json["dataStructures"]["stack1"], "stack");
        assert!(json["actions"].is_array());
        assert!(json["intent"].is_string());
    }
}
