//! Array-literal and scalar-variable extraction
//!
//! One pass over the source builds two lookup tables used later for
//! expression evaluation and substitution:
//!
//! - [`ArrayTable`]: array name → ordered literal tokens, from declarations
//!   like `int[] nums = {2, 7, 11, 15}`.
//! - [`VariableTable`]: variable name → integer value, from declarations
//!   like `int target = 9`. Only bare integer initializers qualify;
//!   anything else is skipped here (the standalone scanner still emits a
//!   `set_var` for it later, carrying the raw right-hand side).
//!
//! Both tables preserve declaration order, and a re-declaration overwrites
//! the value in place. Substitution passes iterate them in that order.

use regex::Regex;
use std::sync::LazyLock;

/// `int[] name = {1, 2, 3}` / `String[] name = new String[]{...}` etc.
pub(crate) static ARRAY_INIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:int|long|double|String|char|boolean)\s*\[\s*\]\s*(\w+)\s*=\s*(?:new\s+\w+\s*)?\{([^}]*)\}",
    )
    .unwrap()
});

/// `int name = <anything up to ; or newline>`.
pub(crate) static VAR_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:int|long|double|String|char|boolean)\s+(\w+)\s*=\s*([^;\n]+)").unwrap()
});

static BARE_INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)$").unwrap());

/// Splits an array-literal interior on commas, trimming and dropping blanks.
pub(crate) fn split_items(interior: &str) -> Vec<String> {
    interior
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Array name → ordered literal tokens, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ArrayTable {
    entries: Vec<(String, Vec<String>)>,
}

impl ArrayTable {
    /// Builds the table from one scan over the source.
    pub fn scan(code: &str) -> Self {
        let mut table = ArrayTable::default();
        for caps in ARRAY_INIT_RE.captures_iter(code) {
            let name = caps[1].trim().to_string();
            let items = split_items(&caps[2]);
            table.insert(name, items);
        }
        table
    }

    fn insert(&mut self, name: String, items: Vec<String>) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = items;
        } else {
            self.entries.push((name, items));
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, items)| items.as_slice())
    }

    /// Length of the named array, or 0 when unknown.
    pub fn len_of(&self, name: &str) -> usize {
        self.get(name).map_or(0, <[String]>::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(n, items)| (n.as_str(), items.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Variable name → resolved integer value, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    entries: Vec<(String, i64)>,
}

impl VariableTable {
    /// Builds the table from one scan over the source.
    ///
    /// Only declarations whose initializer is a bare integer literal are
    /// recorded; expressions and method calls are left for substitution to
    /// ignore.
    pub fn scan(code: &str) -> Self {
        let mut table = VariableTable::default();
        for caps in VAR_DECL_RE.captures_iter(code) {
            let name = caps[1].trim();
            let value = caps[2].trim();
            if BARE_INT_RE.is_match(value) {
                if let Ok(n) = value.parse::<i64>() {
                    table.insert(name.to_string(), n);
                }
            }
        }
        table
    }

    fn insert(&mut self, name: String, value: i64) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
