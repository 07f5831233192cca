//! Ad hoc expression evaluation with variable substitution
//!
//! The engine never interprets general expressions. [`evaluate`] substitutes
//! every bound name into the expression as text, then accepts only a narrow
//! arithmetic character class (digits, `+ - * /`, parentheses, whitespace)
//! for numeric evaluation, falling back to a leading-integer parse and
//! finally to zero.
//!
//! Failure is silent by policy (best-effort extraction, never hard
//! failure) but observable: [`Evaluation::Unresolved`] lets tests
//! distinguish "genuinely zero" from "could not resolve".

use super::text::replace_word;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ARITH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\+\-\*/\(\)]+$").unwrap());

/// Iteration bindings in force while a loop body is processed.
///
/// Order is insertion order: parent bindings first, the innermost loop
/// variable last. Rebinding an existing name overwrites its value in place.
/// Values are kept as strings because they are substituted textually; the
/// for-each processor binds raw literal tokens, not numbers.
#[derive(Debug, Clone, Default)]
pub struct BindingContext {
    entries: Vec<(String, String)>,
}

impl BindingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, overwriting in place if already bound.
    pub fn bind(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
    }

    /// Clone of this context extended with one more binding.
    pub fn child(&self, name: &str, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.bind(name, value);
        next
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the bindings for embedding in an emitted action.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries.iter().cloned().collect()
    }
}

/// Outcome of [`evaluate`]: an exact value, or the zero fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Exact(i64),
    Unresolved,
}

impl Evaluation {
    /// The resolved value, degrading to zero when unresolved.
    pub fn or_zero(self) -> i64 {
        match self {
            Evaluation::Exact(n) => n,
            Evaluation::Unresolved => 0,
        }
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, Evaluation::Exact(_))
    }
}

/// Evaluates `expr` under `context`.
///
/// Bound names are substituted as whole words, then:
/// 1. if the result is pure arithmetic text, it is evaluated numerically;
/// 2. otherwise a leading integer (`parseInt` style) is accepted;
/// 3. otherwise the result is [`Evaluation::Unresolved`].
pub fn evaluate(expr: &str, context: &BindingContext) -> Evaluation {
    let mut processed = expr.to_string();
    for (name, value) in context.iter() {
        processed = replace_word(&processed, name, value).into_owned();
    }

    if ARITH_RE.is_match(&processed) {
        return match eval_arithmetic(&processed) {
            Some(n) => Evaluation::Exact(n),
            None => Evaluation::Unresolved,
        };
    }

    match leading_integer(&processed) {
        Some(n) => Evaluation::Exact(n),
        None => Evaluation::Unresolved,
    }
}

/// `parseInt`-style prefix parse: optional sign, then as many digits as
/// present. `"5x"` resolves to 5; `"x5"` does not resolve.
fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Precedence-correct evaluation of `+ - * / ( )` over 64-bit integers.
///
/// Division truncates toward zero; division by zero and trailing garbage
/// both yield `None`.
fn eval_arithmetic(text: &str) -> Option<i64> {
    let mut parser = ArithParser {
        bytes: text.as_bytes(),
        pos: 0,
    };
    let value = parser.expr()?;
    parser.skip_ws();
    if parser.pos == parser.bytes.len() {
        Some(value)
    } else {
        None
    }
}

struct ArithParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl ArithParser<'_> {
    fn expr(&mut self) -> Option<i64> {
        let mut acc = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    acc = acc.checked_add(self.term()?)?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    acc = acc.checked_sub(self.term()?)?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn term(&mut self) -> Option<i64> {
        let mut acc = self.factor()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    acc = acc.checked_mul(self.factor()?)?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0 {
                        return None;
                    }
                    acc = acc.checked_div(divisor)?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn factor(&mut self) -> Option<i64> {
        self.skip_ws();
        match self.peek()? {
            b'(' => {
                self.pos += 1;
                let value = self.expr()?;
                self.skip_ws();
                if self.peek() == Some(b')') {
                    self.pos += 1;
                    Some(value)
                } else {
                    None
                }
            }
            b'-' => {
                self.pos += 1;
                self.factor().and_then(i64::checked_neg)
            }
            b'+' => {
                self.pos += 1;
                self.factor()
            }
            b'0'..=b'9' => self.number(),
            _ => None,
        }
    }

    fn number(&mut self) -> Option<i64> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> BindingContext {
        let mut c = BindingContext::new();
        for (n, v) in pairs {
            c.bind(n, *v);
        }
        c
    }

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("1 + 2 * 3", &BindingContext::new()), Evaluation::Exact(7));
        assert_eq!(evaluate("(1 + 2) * 3", &BindingContext::new()), Evaluation::Exact(9));
        assert_eq!(evaluate("10 - 4 - 3", &BindingContext::new()), Evaluation::Exact(3));
    }

    #[test]
    fn test_substitution_before_arithmetic() {
        assert_eq!(evaluate("i + 1", &ctx(&[("i", "2")])), Evaluation::Exact(3));
    }

    #[test]
    fn test_word_boundary_substitution() {
        // `i` must not corrupt `index`
        let c = ctx(&[("i", "5"), ("index", "2")]);
        assert_eq!(evaluate("index + i", &c), Evaluation::Exact(7));
    }

    #[test]
    fn test_leading_integer_fallback() {
        assert_eq!(evaluate("5x", &BindingContext::new()), Evaluation::Exact(5));
        assert_eq!(evaluate("  42abc", &BindingContext::new()), Evaluation::Exact(42));
    }

    #[test]
    fn test_unresolved_degrades_to_zero() {
        let outcome = evaluate("foo.bar()", &BindingContext::new());
        assert_eq!(outcome, Evaluation::Unresolved);
        assert!(!outcome.is_resolved());
        assert_eq!(outcome.or_zero(), 0);
    }

    #[test]
    fn test_resolved_zero_is_distinguishable() {
        // a genuine zero resolves; an unresolvable expression does not,
        // even though both degrade to the same value
        let zero = evaluate("0", &BindingContext::new());
        let unresolved = evaluate("foo.bar()", &BindingContext::new());
        assert!(zero.is_resolved());
        assert!(!unresolved.is_resolved());
        assert_eq!(zero.or_zero(), unresolved.or_zero());
    }

    #[test]
    fn test_division_by_zero_is_unresolved() {
        assert_eq!(evaluate("5 / 0", &BindingContext::new()), Evaluation::Unresolved);
    }

    #[test]
    fn test_rebind_overwrites_in_place() {
        let mut c = ctx(&[("i", "1"), ("j", "2")]);
        c.bind("i", "9");
        let order: Vec<(&str, &str)> = c.iter().collect();
        assert_eq!(order, [("i", "9"), ("j", "2")]);
    }
}
