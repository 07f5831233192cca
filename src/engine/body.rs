//! Loop-body processing
//!
//! Given a loop body and the current iteration's bindings, substitutes
//! array accesses and bound variables into the text as literal values, then
//! detects a conditional guard, a return statement inside that guard, and
//! data-structure calls.
//!
//! Known limitation, preserved deliberately: only the first `if` guard in a
//! body is honored; additional independent guards in the same body are not
//! visited.

use super::eval::BindingContext;
use super::scan::{POP_CALL_RE, PUSH_CALL_RE};
use super::text::{braced_content, replace_word};
use super::{action::STACK_NAME, Action, Extractor};
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

static IF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"if\s*\(\s*([^)]+)\s*\)").unwrap());

static RETURN_ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"return\s+new\s+int\s*\[\s*\]\s*\{\s*([^}]+)\s*\}").unwrap());

static SIMPLE_RETURN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"return\s+([^;]+)").unwrap());

impl Extractor<'_> {
    /// Processes one loop body under the given iteration bindings.
    pub(crate) fn process_body(&mut self, body: &str, context: &BindingContext) {
        let processed = self.substitute_bindings(body, context);

        let guard = IF_RE.captures(&processed);
        if let Some(ref caps) = guard {
            let condition = caps[1].trim().to_string();
            self.push_action(Action::EvaluateCondition {
                condition,
                context: context.to_map(),
            });

            let if_start = caps.get(0).expect("group 0 always present").start();
            if let Some(rel) = processed[if_start..].find('{') {
                let if_body = braced_content(&processed, if_start + rel);
                self.process_guard_body(if_body, context);
            }
        }

        // a push outside any guard still counts, but only when no guard
        // claimed the body
        if guard.is_none() {
            if let Some(caps) = PUSH_CALL_RE.captures(&processed) {
                self.push_action(Action::Push {
                    target: STACK_NAME.to_string(),
                    value: caps[1].trim().to_string(),
                });
            }
        }

        if POP_CALL_RE.is_match(&processed) {
            self.push_action(Action::Pop {
                target: STACK_NAME.to_string(),
            });
        }
    }

    /// Scans the interior of a guard for a return or a push.
    ///
    /// An array-literal return takes priority over a bare return; both have
    /// the iteration bindings substituted into the returned value.
    fn process_guard_body(&mut self, if_body: &str, context: &BindingContext) {
        let array_return = RETURN_ARRAY_RE.captures(if_body);
        if let Some(ref caps) = array_return {
            let value = substitute_context(caps[1].trim(), context);
            self.push_action(Action::Return { value });
        } else if let Some(caps) = SIMPLE_RETURN_RE.captures(if_body) {
            let value = substitute_context(caps[1].trim(), context);
            self.push_action(Action::Return { value });
        }

        if let Some(caps) = PUSH_CALL_RE.captures(if_body) {
            self.push_action(Action::Push {
                target: STACK_NAME.to_string(),
                value: caps[1].trim().to_string(),
            });
        }
    }

    /// Rewrites `body` with every binding resolved to literal text.
    ///
    /// Order matters and matches the extraction contract: context-variable
    /// array accesses first, then literal-index accesses, then bound
    /// variables, then globally known variables. All replacements are
    /// whole-token so substrings of longer identifiers stay intact.
    fn substitute_bindings(&self, body: &str, context: &BindingContext) -> String {
        let mut processed = body.to_string();

        for (array, items) in self.arrays.iter() {
            for (variable, value) in context.iter() {
                let element = value
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| items.get(idx))
                    .map_or("0", String::as_str);
                let pattern = format!(r"\b{}\[{}\]", regex::escape(array), regex::escape(variable));
                if let Ok(re) = Regex::new(&pattern) {
                    processed = re.replace_all(&processed, NoExpand(element)).into_owned();
                }
            }

            // direct literal-index access, e.g. nums[0]
            let pattern = format!(r"\b{}\[(\d+)\]", regex::escape(array));
            if let Ok(re) = Regex::new(&pattern) {
                processed = re
                    .replace_all(&processed, |caps: &regex::Captures| {
                        caps[1]
                            .parse::<usize>()
                            .ok()
                            .and_then(|idx| items.get(idx))
                            .map_or_else(|| "0".to_string(), String::clone)
                    })
                    .into_owned();
            }
        }

        for (variable, value) in context.iter() {
            processed = replace_word(&processed, variable, value).into_owned();
        }
        for (variable, value) in self.variables.iter() {
            processed = replace_word(&processed, variable, &value.to_string()).into_owned();
        }

        processed
    }
}

/// Substitutes only the iteration bindings into a return value.
fn substitute_context(value: &str, context: &BindingContext) -> String {
    let mut out = value.to_string();
    for (variable, bound) in context.iter() {
        out = replace_word(&out, variable, bound).into_owned();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ctx(pairs: &[(&str, &str)]) -> BindingContext {
        let mut c = BindingContext::new();
        for (n, v) in pairs {
            c.bind(n, *v);
        }
        c
    }

    #[test]
    fn test_substitution_resolves_array_access() {
        let ex = Extractor::new("int[] nums = {2, 7, 11, 15};");
        let out = ex.substitute_bindings("nums[i] + nums[j]", &ctx(&[("i", "0"), ("j", "1")]));
        assert_eq!(out, "2 + 7");
    }

    #[test]
    fn test_substitution_out_of_range_is_zero() {
        let ex = Extractor::new("int[] nums = {2, 7};");
        let out = ex.substitute_bindings("nums[i]", &ctx(&[("i", "9")]));
        assert_eq!(out, "0");
    }

    #[test]
    fn test_substitution_literal_index() {
        let ex = Extractor::new("int[] nums = {2, 7};");
        let out = ex.substitute_bindings("nums[1] + nums[5]", &BindingContext::new());
        assert_eq!(out, "7 + 0");
    }

    #[test]
    fn test_substitution_global_variables() {
        let ex = Extractor::new("int target = 9;");
        let out = ex.substitute_bindings("x == target", &ctx(&[("x", "4")]));
        assert_eq!(out, "4 == 9");
    }

    #[test]
    fn test_condition_action_carries_context() {
        let mut ex = Extractor::new("int[] nums = {2, 7}; int target = 9;");
        ex.process_body(
            "if (nums[i] + nums[j] == target) { int unused = 0; }",
            &ctx(&[("i", "0"), ("j", "1")]),
        );

        let mut expected = BTreeMap::new();
        expected.insert("i".to_string(), "0".to_string());
        expected.insert("j".to_string(), "1".to_string());
        assert_eq!(
            ex.actions,
            vec![Action::EvaluateCondition {
                condition: "2 + 7 == 9".to_string(),
                context: expected,
            }]
        );
    }

    #[test]
    fn test_guarded_array_return_substitutes_indices() {
        let mut ex = Extractor::new("int[] nums = {2, 7}; int target = 9;");
        ex.process_body(
            "if (nums[i] + nums[j] == target) { return new int[]{i, j}; }",
            &ctx(&[("i", "0"), ("j", "1")]),
        );

        assert!(ex
            .actions
            .iter()
            .any(|a| matches!(a, Action::Return { value } if value == "0, 1")));
    }

    #[test]
    fn test_bare_return_when_no_array_literal() {
        let mut ex = Extractor::new("");
        ex.process_body("if (i == 2) { return i; }", &ctx(&[("i", "2")]));
        assert!(ex
            .actions
            .iter()
            .any(|a| matches!(a, Action::Return { value } if value == "2")));
    }

    #[test]
    fn test_unguarded_push_and_pop() {
        let mut ex = Extractor::new("");
        ex.process_body("st.push(i); st.pop();", &ctx(&[("i", "3")]));
        assert_eq!(
            ex.actions,
            vec![
                Action::Push {
                    target: STACK_NAME.to_string(),
                    value: "3".to_string(),
                },
                Action::Pop {
                    target: STACK_NAME.to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_only_first_guard_is_visited() {
        let mut ex = Extractor::new("");
        ex.process_body(
            "if (i == 0) { st.push(1); } if (i == 1) { st.push(2); }",
            &ctx(&[("i", "0")]),
        );

        let conditions = ex
            .actions
            .iter()
            .filter(|a| matches!(a, Action::EvaluateCondition { .. }))
            .count();
        assert_eq!(conditions, 1);
    }
}
