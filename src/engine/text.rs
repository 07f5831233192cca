//! Low-level text scanning helpers
//!
//! The engine never builds a syntax tree; loop and guard bodies are located
//! with a depth counter over brace characters, and variable substitution is
//! whole-word textual replacement. Both helpers live here.

use regex::{NoExpand, Regex};
use std::borrow::Cow;

/// Finds the inner span of the brace block opening at `open_idx`.
///
/// Scans forward from `open_idx`, incrementing on `{` and decrementing on
/// `}`; once a block has started and the depth returns to zero the span
/// between the opening brace and its balanced closing brace is returned as
/// `(inner_start, close_idx)` byte offsets (exclusive of both braces).
///
/// Returns `None` for an unbalanced region; callers treat that as an empty
/// body rather than an error.
pub(crate) fn brace_span(text: &str, open_idx: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut started = false;

    for (i, &b) in bytes.iter().enumerate().skip(open_idx) {
        match b {
            b'{' => {
                depth += 1;
                started = true;
            }
            b'}' => {
                depth -= 1;
                if started && depth == 0 {
                    return Some((open_idx + 1, i));
                }
            }
            _ => {}
        }
    }

    None
}

/// Inner text of the brace block opening at `open_idx`, or `""` when the
/// region is unbalanced.
pub(crate) fn braced_content(text: &str, open_idx: usize) -> &str {
    match brace_span(text, open_idx) {
        Some((start, end)) => &text[start..end],
        None => "",
    }
}

/// Replaces every whole-word occurrence of `word` in `haystack` with
/// `replacement`.
///
/// Word boundaries keep substrings of longer identifiers intact, so
/// substituting `i` does not corrupt `index`. A pattern that fails to
/// compile (cannot happen for escaped input) leaves the text unchanged.
pub(crate) fn replace_word<'a>(haystack: &'a str, word: &str, replacement: &str) -> Cow<'a, str> {
    let pattern = format!(r"\b{}\b", regex::escape(word));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(haystack, NoExpand(replacement)),
        Err(_) => Cow::Borrowed(haystack),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_span_simple() {
        let text = "for (...) { body }";
        let open = text.find('{').unwrap();
        let (start, end) = brace_span(text, open).unwrap();
        assert_eq!(&text[start..end], " body ");
    }

    #[test]
    fn test_brace_span_nested() {
        let text = "{ outer { inner } tail }";
        let (start, end) = brace_span(text, 0).unwrap();
        assert_eq!(&text[start..end], " outer { inner } tail ");

        let inner_open = text.find("{ inner").unwrap();
        let (s, e) = brace_span(text, inner_open).unwrap();
        assert_eq!(&text[s..e], " inner ");
    }

    #[test]
    fn test_brace_span_unbalanced() {
        assert!(brace_span("{ never closed", 0).is_none());
        assert_eq!(braced_content("{ never closed", 0), "");
    }

    #[test]
    fn test_replace_word_respects_boundaries() {
        let out = replace_word("i + index + i2 + i", "i", "0");
        assert_eq!(out, "0 + index + i2 + 0");
    }

    #[test]
    fn test_replace_word_array_access() {
        let out = replace_word("nums[i] + nums[j]", "i", "2");
        assert_eq!(out, "nums[2] + nums[j]");
    }
}
