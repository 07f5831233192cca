//! Standalone call scanning
//!
//! After the loop processors run, the whole text is scanned once per
//! recognized call shape. A match whose offset falls inside any discovered
//! counting-loop span is dropped (the loop processors already emitted it)
//! and the survivors are appended in source order, merged with the
//! variable-declaration, array-literal, and array-write emissions.
//!
//! All shapes share the single span set computed during loop discovery, so
//! a call near a loop boundary is either inside (and owned by the loop
//! pass) or outside (and owned by this pass), never both.

use super::literals::{split_items, ARRAY_INIT_RE, VAR_DECL_RE};
use super::{
    action::{LIST_NAME, MAP_NAME, QUEUE_NAME, STACK_NAME},
    Action, Extractor,
};
use regex::Regex;
use std::sync::LazyLock;

pub(crate) static PUSH_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.push\(\s*([^)]+)\)").unwrap());

pub(crate) static POP_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.pop\(\s*\)").unwrap());

static ADD_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.add\(\s*([^)]+)\)").unwrap());

static OFFER_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.offer\(\s*([^)]+)\)").unwrap());

/// `poll()` and no-argument `remove()` both dequeue; `remove(key)` is a map
/// removal and matched separately.
static DEQUEUE_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.poll\(\s*\)|\.remove\(\s*\)").unwrap());

static NEW_NODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)new\s+ListNode\s*\(\s*([^)]+)\)").unwrap());

static PUT_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.put\(\s*([^,]+)\s*,\s*([^)]+)\)").unwrap());

static MAP_REMOVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.remove\(\s*([^)]+)\)").unwrap());

static MAP_GET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.get\(\s*([^)]+)\)").unwrap());

static ARRAY_SET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s*\[\s*(\d+)\s*\]\s*=\s*([^;\n]+)").unwrap());

impl Extractor<'_> {
    /// Emits actions for every recognized construct outside the discovered
    /// loop spans, in source order.
    pub(crate) fn scan_standalone(&mut self, loop_spans: &[(usize, usize)]) {
        let code = self.code;
        let outside = |offset: usize| {
            !loop_spans
                .iter()
                .any(|&(start, end)| offset > start && offset < end)
        };

        let mut pending: Vec<(usize, Action)> = Vec::new();

        for caps in PUSH_CALL_RE.captures_iter(code) {
            let offset = caps.get(0).expect("group 0 always present").start();
            if outside(offset) {
                pending.push((
                    offset,
                    Action::Push {
                        target: STACK_NAME.to_string(),
                        value: caps[1].trim().to_string(),
                    },
                ));
            }
        }

        for m in POP_CALL_RE.find_iter(code) {
            if outside(m.start()) {
                pending.push((
                    m.start(),
                    Action::Pop {
                        target: STACK_NAME.to_string(),
                    },
                ));
            }
        }

        for re in [&ADD_CALL_RE, &OFFER_CALL_RE] {
            for caps in re.captures_iter(code) {
                let offset = caps.get(0).expect("group 0 always present").start();
                if outside(offset) {
                    pending.push((
                        offset,
                        Action::Enqueue {
                            target: QUEUE_NAME.to_string(),
                            value: caps[1].trim().to_string(),
                        },
                    ));
                }
            }
        }

        for m in DEQUEUE_CALL_RE.find_iter(code) {
            if outside(m.start()) {
                pending.push((
                    m.start(),
                    Action::Dequeue {
                        target: QUEUE_NAME.to_string(),
                    },
                ));
            }
        }

        for caps in NEW_NODE_RE.captures_iter(code) {
            let offset = caps.get(0).expect("group 0 always present").start();
            if outside(offset) {
                pending.push((
                    offset,
                    Action::InsertNode {
                        target: LIST_NAME.to_string(),
                        value: caps[1].trim().to_string(),
                    },
                ));
            }
        }

        for caps in PUT_CALL_RE.captures_iter(code) {
            let offset = caps.get(0).expect("group 0 always present").start();
            if outside(offset) {
                pending.push((
                    offset,
                    Action::Put {
                        target: MAP_NAME.to_string(),
                        key: caps[1].trim().to_string(),
                        value: caps[2].trim().to_string(),
                    },
                ));
            }
        }

        for caps in MAP_REMOVE_RE.captures_iter(code) {
            let offset = caps.get(0).expect("group 0 always present").start();
            if outside(offset) {
                pending.push((
                    offset,
                    Action::MapRemove {
                        target: MAP_NAME.to_string(),
                        key: caps[1].trim().to_string(),
                    },
                ));
            }
        }

        for caps in MAP_GET_RE.captures_iter(code) {
            let offset = caps.get(0).expect("group 0 always present").start();
            if outside(offset) {
                pending.push((
                    offset,
                    Action::MapGet {
                        target: MAP_NAME.to_string(),
                        key: caps[1].trim().to_string(),
                    },
                ));
            }
        }

        // declaration shapes are emitted wherever they appear: one pass
        // built typed lookup state, this one builds the visible trace
        for caps in VAR_DECL_RE.captures_iter(code) {
            let offset = caps.get(0).expect("group 0 always present").start();
            pending.push((
                offset,
                Action::SetVar {
                    name: caps[1].trim().to_string(),
                    value: caps[2].trim().to_string(),
                },
            ));
        }

        for caps in ARRAY_INIT_RE.captures_iter(code) {
            let offset = caps.get(0).expect("group 0 always present").start();
            pending.push((
                offset,
                Action::CreateArray {
                    name: caps[1].trim().to_string(),
                    items: split_items(&caps[2]),
                },
            ));
        }

        for caps in ARRAY_SET_RE.captures_iter(code) {
            let offset = caps.get(0).expect("group 0 always present").start();
            if let Ok(index) = caps[2].parse::<usize>() {
                pending.push((
                    offset,
                    Action::ArraySet {
                        name: caps[1].trim().to_string(),
                        index,
                        value: caps[3].trim().to_string(),
                    },
                ));
            }
        }

        pending.sort_by_key(|&(offset, _)| offset);
        for (_, action) in pending {
            self.push_action(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standalone(code: &str) -> Vec<Action> {
        let mut ex = Extractor::new(code);
        let spans: Vec<(usize, usize)> = ex.discover_loops().iter().map(|l| l.span).collect();
        ex.scan_standalone(&spans);
        ex.into_actions()
    }

    #[test]
    fn test_stack_calls_in_source_order() {
        let actions = standalone("st.push(1); st.push(2); st.pop(); st.push(5);");
        assert_eq!(
            actions,
            vec![
                Action::Push {
                    target: STACK_NAME.to_string(),
                    value: "1".to_string(),
                },
                Action::Push {
                    target: STACK_NAME.to_string(),
                    value: "2".to_string(),
                },
                Action::Pop {
                    target: STACK_NAME.to_string(),
                },
                Action::Push {
                    target: STACK_NAME.to_string(),
                    value: "5".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_queue_calls() {
        let actions = standalone("q.add(3); q.offer(4); q.poll();");
        assert_eq!(
            actions,
            vec![
                Action::Enqueue {
                    target: QUEUE_NAME.to_string(),
                    value: "3".to_string(),
                },
                Action::Enqueue {
                    target: QUEUE_NAME.to_string(),
                    value: "4".to_string(),
                },
                Action::Dequeue {
                    target: QUEUE_NAME.to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_calls_inside_loops_are_excluded() {
        let code = "for (int i = 0; i < 2; i++) { st.push(i); }\nst.pop();";
        let actions = standalone(code);
        // the push belongs to the loop pass; only the trailing pop and the
        // loop-header declaration survive here
        assert!(actions
            .iter()
            .all(|a| !matches!(a, Action::Push { .. })));
        assert!(actions.iter().any(|a| matches!(a, Action::Pop { .. })));
    }

    #[test]
    fn test_map_calls() {
        let actions = standalone("m.put(k, 1); m.get(k); m.remove(k); q.remove();");
        assert_eq!(
            actions,
            vec![
                Action::Put {
                    target: MAP_NAME.to_string(),
                    key: "k".to_string(),
                    value: "1".to_string(),
                },
                Action::MapGet {
                    target: MAP_NAME.to_string(),
                    key: "k".to_string(),
                },
                Action::MapRemove {
                    target: MAP_NAME.to_string(),
                    key: "k".to_string(),
                },
                Action::Dequeue {
                    target: QUEUE_NAME.to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_node_construction() {
        let actions = standalone("ListNode head = new ListNode(7);");
        assert!(actions.contains(&Action::InsertNode {
            target: LIST_NAME.to_string(),
            value: "7".to_string(),
        }));
    }

    #[test]
    fn test_var_decl_keeps_raw_rhs() {
        let actions = standalone("int total = helper(n);");
        assert!(actions.contains(&Action::SetVar {
            name: "total".to_string(),
            value: "helper(n)".to_string(),
        }));
    }

    #[test]
    fn test_array_create_and_write() {
        let actions = standalone("int[] a = {1, 2};\na[0] = 9;");
        assert_eq!(
            actions,
            vec![
                Action::CreateArray {
                    name: "a".to_string(),
                    items: vec!["1".to_string(), "2".to_string()],
                },
                Action::ArraySet {
                    name: "a".to_string(),
                    index: 0,
                    value: "9".to_string(),
                },
            ]
        );
    }
}
