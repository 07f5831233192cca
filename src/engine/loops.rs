//! Loop discovery and unrolling
//!
//! Three loop forms are recognized:
//!
//! - bounded counting `for` loops, discovered globally, nesting-resolved,
//!   and unrolled recursively ([`Extractor::execute_loop`]);
//! - count-style `while` loops, bounded by a hard iteration cap;
//! - `for-each` over a previously extracted array literal.
//!
//! There is no syntax tree: a loop body is the balanced-brace span after
//! its header, and nesting depth is the count of other discovered loops
//! whose body span textually encloses this loop's header offset. During
//! unrolling, a nested loop is re-discovered locally in the body text on
//! every outer iteration. This is acceptable because bodies are small and
//! iteration counts are bounded by the source's own literal bounds.

use super::eval::{evaluate, BindingContext};
use super::text::{brace_span, braced_content};
use super::{Action, Extractor};
use regex::Regex;
use std::sync::LazyLock;

/// Counting-loop header: `for (int VAR = START; VAR < LIMIT; VAR++) {`.
///
/// The three variable slots are captured separately and compared in code,
/// since `regex` has no backreferences; a candidate whose slots disagree
/// is not a counting loop.
static FOR_LOOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"for\s*\(\s*(?:int\s+)?(\w+)\s*=\s*([^;]+);\s*(\w+)\s*(<=|<)\s*([^;]+);\s*(\w+)\+\+\s*\)\s*\{",
    )
    .unwrap()
});

static WHILE_LOOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"while\s*\(\s*(\w+)\s*(<=|<)\s*(\d+)\s*\)\s*\{").unwrap());

static FOR_EACH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"for\s*\(\s*(?:[\w<>\[\]]+\s+)?(\w+)\s*:\s*(\w+)\s*\)\s*\{").unwrap()
});

static LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+)\.length").unwrap());

/// Guarantees termination of the extraction pass when the source describes
/// an unbounded or malformed while loop. A safety valve, not an error.
pub(crate) const WHILE_ITERATION_CAP: usize = 1000;

/// Loop-bound comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparison {
    Lt,
    Le,
}

impl Comparison {
    fn parse(op: &str) -> Self {
        if op == "<=" {
            Comparison::Le
        } else {
            Comparison::Lt
        }
    }

    /// Exclusive iteration bound for the given evaluated limit. Saturates
    /// so an `i64::MAX` literal bound cannot overflow.
    fn exclusive_limit(self, limit: i64) -> i64 {
        match self {
            Comparison::Lt => limit,
            Comparison::Le => limit.saturating_add(1),
        }
    }
}

/// One counting loop as matched in some stretch of text: header fields plus
/// the balanced body text.
#[derive(Debug, Clone)]
pub(crate) struct LoopHeader {
    pub(crate) variable: String,
    pub(crate) start_expr: String,
    pub(crate) comparison: Comparison,
    pub(crate) limit_expr: String,
    pub(crate) body: String,
}

/// A loop found by the global discovery pass, with its position in the
/// source and its derived nesting depth.
#[derive(Debug, Clone)]
pub(crate) struct DiscoveredLoop {
    pub(crate) header: LoopHeader,
    /// Byte offset of the loop header in the source.
    pub(crate) offset: usize,
    /// Half-open byte range from the header start past the closing brace,
    /// used by the standalone scanner to exclude loop interiors.
    pub(crate) span: (usize, usize),
    /// Number of other discovered loops whose body encloses this header.
    pub(crate) depth: usize,
}

/// First counting-loop header in `text`, skipping candidates whose three
/// variable slots disagree.
fn first_loop_header(text: &str) -> Option<(usize, usize, LoopHeader)> {
    for caps in FOR_LOOP_RE.captures_iter(text) {
        let (var, cond_var, incr_var) = (&caps[1], &caps[3], &caps[6]);
        if var != cond_var || var != incr_var {
            continue;
        }
        let whole = caps.get(0).expect("group 0 always present");
        // the match ends at the opening brace
        let open_idx = whole.end() - 1;
        let header = LoopHeader {
            variable: var.to_string(),
            start_expr: caps[2].trim().to_string(),
            comparison: Comparison::parse(&caps[4]),
            limit_expr: caps[5].trim().to_string(),
            body: braced_content(text, open_idx).to_string(),
        };
        return Some((whole.start(), open_idx, header));
    }
    None
}

impl Extractor<'_> {
    /// Finds every counting loop in the source and resolves nesting depths.
    pub(crate) fn discover_loops(&self) -> Vec<DiscoveredLoop> {
        let mut loops = Vec::new();

        for caps in FOR_LOOP_RE.captures_iter(self.code) {
            let (var, cond_var, incr_var) = (&caps[1], &caps[3], &caps[6]);
            if var != cond_var || var != incr_var {
                continue;
            }
            let whole = caps.get(0).expect("group 0 always present");
            let open_idx = whole.end() - 1;
            let (body, span_end) = match brace_span(self.code, open_idx) {
                Some((start, close)) => (self.code[start..close].to_string(), close + 1),
                None => (String::new(), whole.end()),
            };

            loops.push(DiscoveredLoop {
                header: LoopHeader {
                    variable: var.to_string(),
                    start_expr: caps[2].trim().to_string(),
                    comparison: Comparison::parse(&caps[4]),
                    limit_expr: caps[5].trim().to_string(),
                    body,
                },
                offset: whole.start(),
                span: (whole.start(), span_end),
                depth: 0,
            });
        }

        // depth(L) = count of other loops whose body span contains L's header
        for i in 0..loops.len() {
            let mut depth = 0;
            for j in 0..loops.len() {
                if i == j {
                    continue;
                }
                let outer_end = loops[j].offset + loops[j].header.body.len();
                if loops[i].offset > loops[j].offset && loops[i].offset < outer_end {
                    depth += 1;
                }
            }
            loops[i].depth = depth;
        }

        loops
    }

    /// Recursively unrolls one counting loop under `parent` bindings.
    ///
    /// Per iteration: emit a `set_var` for the loop variable, then either
    /// recurse into the first nested loop found in the body or hand the
    /// body to the body processor.
    pub(crate) fn execute_loop(&mut self, header: &LoopHeader, parent: &BindingContext) {
        let start = evaluate(&header.start_expr, parent).or_zero();
        let limit = self.resolve_limit(&header.limit_expr, parent);
        let exclusive = header.comparison.exclusive_limit(limit);

        log::debug!(
            "unrolling loop {}: {}..{}",
            header.variable,
            start,
            exclusive
        );

        for i in start..exclusive {
            self.push_action(Action::SetVar {
                name: header.variable.clone(),
                value: i.to_string(),
            });

            let current = parent.child(&header.variable, i.to_string());

            // structural re-scan: nested-loop detection repeats on every
            // outer iteration rather than being cached
            match first_loop_header(&header.body) {
                Some((_, _, nested)) => self.execute_loop(&nested, &current),
                None => self.process_body(&header.body, &current),
            }
        }
    }

    /// Evaluates a loop-limit expression.
    ///
    /// An `array.length` reference resolves to the recorded literal length
    /// (zero for an unknown array); anything else is evaluated under the
    /// parent context merged with the global variable table.
    fn resolve_limit(&self, limit_expr: &str, parent: &BindingContext) -> i64 {
        if let Some(caps) = LENGTH_RE.captures(limit_expr) {
            return self.arrays.len_of(&caps[1]) as i64;
        }

        let mut merged = parent.clone();
        for (name, value) in self.variables.iter() {
            merged.bind(name, value.to_string());
        }
        evaluate(limit_expr, &merged).or_zero()
    }

    /// Unrolls every count-style `while` loop in the source.
    ///
    /// The loop variable's initial value is the last integer literal
    /// assigned to it before the loop header; the variable advances only
    /// when the body contains an explicit increment token for it, and the
    /// unroll is capped at [`WHILE_ITERATION_CAP`] iterations.
    pub(crate) fn process_while_loops(&mut self) {
        let code = self.code;
        for caps in WHILE_LOOP_RE.captures_iter(code) {
            let whole = caps.get(0).expect("group 0 always present");
            let variable = caps[1].to_string();
            let comparison = Comparison::parse(&caps[2]);
            let limit: i64 = match caps[3].parse() {
                Ok(n) => n,
                Err(_) => continue,
            };

            let body = braced_content(code, whole.end() - 1).to_string();
            let mut current = last_seed_value(&code[..whole.start()], &variable);
            let has_increment = body.contains(&format!("{}++", variable))
                || body.contains(&format!("++{}", variable));
            let exclusive = comparison.exclusive_limit(limit);

            let mut iterations = 0;
            while current < exclusive && iterations < WHILE_ITERATION_CAP {
                self.push_action(Action::SetVar {
                    name: variable.clone(),
                    value: current.to_string(),
                });

                let mut context = BindingContext::new();
                context.bind(&variable, current.to_string());
                self.process_body(&body, &context);

                if !has_increment {
                    break;
                }
                current += 1;
                iterations += 1;
            }
        }
    }

    /// Unrolls every `for (T elem : array)` loop over its recorded literal.
    ///
    /// Arrays with no recorded literal produce no iterations.
    pub(crate) fn process_foreach_loops(&mut self) {
        let code = self.code;
        for caps in FOR_EACH_RE.captures_iter(code) {
            let whole = caps.get(0).expect("group 0 always present");
            let element = caps[1].to_string();
            let array = &caps[2];

            let items: Vec<String> = match self.arrays.get(array) {
                Some(items) => items.to_vec(),
                None => continue,
            };
            let body = braced_content(code, whole.end() - 1).to_string();

            for item in items {
                self.push_action(Action::SetVar {
                    name: element.clone(),
                    value: item.clone(),
                });

                let mut context = BindingContext::new();
                context.bind(&element, item);
                self.process_body(&body, &context);
            }
        }
    }
}

/// Last integer literal assigned to `variable` in the text before a while
/// loop, or zero when none is found.
fn last_seed_value(preceding: &str, variable: &str) -> i64 {
    let pattern = format!(r"(?:int\s+)?{}\s*=\s*(\d+)", regex::escape(variable));
    let Ok(re) = Regex::new(&pattern) else {
        return 0;
    };
    re.captures_iter(preceding)
        .last()
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}
