//! Trace replay
//!
//! Headless consumer of the engine's contract: one default container per
//! detected declaration, then one action applied per step. State is cloned
//! before every mutation, so each step yields an independently observable
//! snapshot; the full history is retained for stepping and reset.
//!
//! Replay is as forgiving as extraction: popping an empty stack or
//! dequeueing an empty queue is a no-op, and an action naming an unknown
//! container default-initializes it on first reference.

use crate::engine::{Action, StructureKind, TraceResult};
use regex::Regex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::LazyLock;

/// Only plain decimal tokens coerce to floats; exponent forms, `inf`, and
/// `NaN` stay verbatim strings.
static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").unwrap());

/// A literal token coerced for display and comparison.
///
/// Tokens stay strings throughout extraction; the player is the first place
/// they take on a type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl Value {
    /// Coerces a literal token: surrounding quotes stripped, integer parse,
    /// float parse, verbatim string otherwise.
    pub fn parse_token(token: &str) -> Value {
        let trimmed = token.trim();
        let chars: Vec<char> = trimmed.chars().collect();
        if chars.len() >= 2
            && matches!(chars[0], '\'' | '"')
            && matches!(chars[chars.len() - 1], '\'' | '"')
        {
            return Value::Str(trimmed[1..trimmed.len() - 1].to_string());
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Value::Int(n);
        }
        if FLOAT_RE.is_match(trimmed) {
            if let Ok(f) = trimmed.parse::<f64>() {
                return Value::Float(f);
            }
        }
        Value::Str(trimmed.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Null => write!(f, "null"),
        }
    }
}

/// Runtime state of one visualized container.
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    Stack { items: Vec<String> },
    Queue { items: Vec<String> },
    LinkedList { nodes: Vec<String> },
    Grid { rows: Vec<Vec<String>> },
    Array { items: Vec<String> },
    Map { entries: Vec<(Value, Value)> },
}

impl Container {
    /// Empty container of the given kind.
    pub fn empty(kind: StructureKind) -> Self {
        match kind {
            StructureKind::Stack => Container::Stack { items: Vec::new() },
            StructureKind::Queue => Container::Queue { items: Vec::new() },
            StructureKind::LinkedList => Container::LinkedList { nodes: Vec::new() },
            StructureKind::Grid => Container::Grid { rows: Vec::new() },
            StructureKind::Array => Container::Array { items: Vec::new() },
            StructureKind::Map => Container::Map {
                entries: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> StructureKind {
        match self {
            Container::Stack { .. } => StructureKind::Stack,
            Container::Queue { .. } => StructureKind::Queue,
            Container::LinkedList { .. } => StructureKind::LinkedList,
            Container::Grid { .. } => StructureKind::Grid,
            Container::Array { .. } => StructureKind::Array,
            Container::Map { .. } => StructureKind::Map,
        }
    }

    /// Linear item sequence, for the kinds that have one.
    fn items_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Container::Stack { items }
            | Container::Queue { items }
            | Container::Array { items } => Some(items),
            Container::LinkedList { nodes } => Some(nodes),
            Container::Grid { .. } | Container::Map { .. } => None,
        }
    }
}

/// One immutable snapshot of all container and variable state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerState {
    containers: Vec<(String, Container)>,
    vars: FxHashMap<String, Value>,
}

impl PlayerState {
    /// Initial state: one default container per detected declaration.
    pub fn initial(trace: &TraceResult) -> Self {
        let containers = trace
            .data_structures
            .iter()
            .map(|(name, &kind)| (name.clone(), Container::empty(kind)))
            .collect();
        PlayerState {
            containers,
            vars: FxHashMap::default(),
        }
    }

    pub fn container(&self, name: &str) -> Option<&Container> {
        self.containers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn containers(&self) -> impl Iterator<Item = (&str, &Container)> {
        self.containers.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// The named container, default-initialized with `kind` on first
    /// reference.
    fn ensure(&mut self, name: &str, kind: StructureKind) -> &mut Container {
        if let Some(idx) = self.containers.iter().position(|(n, _)| n == name) {
            return &mut self.containers[idx].1;
        }
        self.containers
            .push((name.to_string(), Container::empty(kind)));
        &mut self
            .containers
            .last_mut()
            .expect("container just pushed")
            .1
    }

    /// Applies one action to a clone of this state, returning the new
    /// snapshot. Actions are atomic: the receiver is never half-mutated.
    pub fn apply(&self, action: &Action) -> PlayerState {
        let mut next = self.clone();
        match action {
            Action::Push { target, value } => {
                if let Some(items) = next.ensure(target, StructureKind::Stack).items_mut() {
                    items.push(value.clone());
                }
            }
            Action::Pop { target } => {
                if let Some(items) = next.ensure(target, StructureKind::Stack).items_mut() {
                    items.pop();
                }
            }
            Action::Enqueue { target, value } => {
                if let Some(items) = next.ensure(target, StructureKind::Queue).items_mut() {
                    items.push(value.clone());
                }
            }
            Action::Dequeue { target } => {
                if let Some(items) = next.ensure(target, StructureKind::Queue).items_mut() {
                    if !items.is_empty() {
                        items.remove(0);
                    }
                }
            }
            Action::Put { target, key, value } => {
                if let Container::Map { entries } = next.ensure(target, StructureKind::Map) {
                    let key = Value::parse_token(key);
                    let value = Value::parse_token(value);
                    match entries
                        .iter_mut()
                        .find(|(k, _)| k.to_string() == key.to_string())
                    {
                        Some(entry) => entry.1 = value,
                        None => entries.push((key, value)),
                    }
                }
            }
            Action::MapRemove { target, key } => {
                if let Container::Map { entries } = next.ensure(target, StructureKind::Map) {
                    let key = Value::parse_token(key);
                    entries.retain(|(k, _)| k.to_string() != key.to_string());
                }
            }
            Action::MapGet { target, key } => {
                let key = Value::parse_token(key);
                let found = match next.ensure(target, StructureKind::Map) {
                    Container::Map { entries } => entries
                        .iter()
                        .find(|(k, _)| k.to_string() == key.to_string())
                        .map(|(_, v)| v.clone())
                        .unwrap_or(Value::Null),
                    _ => Value::Null,
                };
                next.vars.insert(format!("last_get_{}", target), found);
            }
            Action::SetVar { name, value } => {
                next.vars.insert(name.clone(), Value::parse_token(value));
            }
            Action::CreateArray { name, items } => {
                let array = Container::Array {
                    items: items.clone(),
                };
                match next.containers.iter_mut().find(|(n, _)| n == name) {
                    Some(entry) => entry.1 = array,
                    None => next.containers.push((name.clone(), array)),
                }
            }
            Action::ArraySet { name, index, value } => {
                if let Some(items) = next.ensure(name, StructureKind::Array).items_mut() {
                    if items.len() <= *index {
                        items.resize(*index + 1, "0".to_string());
                    }
                    items[*index] = value.clone();
                }
            }
            Action::InsertNode { target, value } => {
                if let Some(nodes) = next.ensure(target, StructureKind::LinkedList).items_mut() {
                    nodes.push(value.clone());
                }
            }
            // observational actions: a tick happens, state does not change
            Action::EvaluateCondition { .. } | Action::Return { .. } => {}
        }
        next
    }
}

/// Drives a trace forward one action per step, retaining every snapshot.
///
/// A new parse fully supersedes any prior sequence: build a fresh `Player`
/// from each `TraceResult` rather than feeding new actions into an old one.
#[derive(Debug, Clone)]
pub struct Player {
    actions: Vec<Action>,
    history: Vec<PlayerState>,
    position: usize,
}

impl Player {
    pub fn new(trace: &TraceResult) -> Self {
        Player {
            actions: trace.actions.clone(),
            history: vec![PlayerState::initial(trace)],
            position: 0,
        }
    }

    /// Applies the next action and returns the resulting snapshot, or
    /// `None` when the trace is exhausted.
    pub fn step(&mut self) -> Option<&PlayerState> {
        let action = self.actions.get(self.position)?;
        let next = self
            .history
            .last()
            .expect("history always holds the initial state")
            .apply(action);
        self.history.push(next);
        self.position += 1;
        self.history.last()
    }

    /// Snapshot after the most recently applied action.
    pub fn current(&self) -> &PlayerState {
        self.history
            .last()
            .expect("history always holds the initial state")
    }

    /// All snapshots so far, initial state first.
    pub fn history(&self) -> &[PlayerState] {
        &self.history
    }

    /// Number of actions applied so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.actions.len()
    }

    /// Discards every applied action, back to the initial state.
    pub fn reset(&mut self) {
        self.history.truncate(1);
        self.position = 0;
    }

    /// Applies every remaining action and returns the final snapshot.
    pub fn run_to_end(&mut self) -> &PlayerState {
        while self.step().is_some() {}
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::parse_source;

    #[test]
    fn test_parse_token() {
        assert_eq!(Value::parse_token("42"), Value::Int(42));
        assert_eq!(Value::parse_token("-3"), Value::Int(-3));
        assert_eq!(Value::parse_token("2.5"), Value::Float(2.5));
        assert_eq!(Value::parse_token("\"hi\""), Value::Str("hi".to_string()));
        assert_eq!(Value::parse_token("'a'"), Value::Str("a".to_string()));
        assert_eq!(Value::parse_token("foo"), Value::Str("foo".to_string()));
    }

    #[test]
    fn test_parse_token_float_shape_is_strict() {
        assert_eq!(Value::parse_token("-1.25"), Value::Float(-1.25));
        assert_eq!(Value::parse_token("1e5"), Value::Str("1e5".to_string()));
        assert_eq!(Value::parse_token("inf"), Value::Str("inf".to_string()));
        assert_eq!(Value::parse_token("NaN"), Value::Str("NaN".to_string()));
        assert_eq!(Value::parse_token(".5"), Value::Str(".5".to_string()));
    }

    #[test]
    fn test_stack_replay() {
        let trace = parse_source("st.push(1); st.push(2); st.pop(); st.push(5);");
        let mut player = Player::new(&trace);
        let final_state = player.run_to_end().clone();

        match final_state.container("stack1").unwrap() {
            Container::Stack { items } => {
                assert_eq!(items, &["1".to_string(), "5".into()]);
            }
            other => panic!("expected a stack, got {:?}", other),
        }
    }

    #[test]
    fn test_pop_empty_stack_is_noop() {
        let trace = parse_source("st.pop();");
        let mut player = Player::new(&trace);
        player.run_to_end();
        match player.current().container("stack1").unwrap() {
            Container::Stack { items } => assert!(items.is_empty()),
            other => panic!("expected a stack, got {:?}", other),
        }
    }

    #[test]
    fn test_queue_replay_is_fifo() {
        let trace = parse_source("q.add(3); q.offer(4); q.poll();");
        let mut player = Player::new(&trace);
        player.run_to_end();
        match player.current().container("queue1").unwrap() {
            Container::Queue { items } => assert_eq!(items, &["4".to_string()]),
            other => panic!("expected a queue, got {:?}", other),
        }
    }

    #[test]
    fn test_map_get_records_variable() {
        let trace = parse_source("seen.put(9, 1); seen.get(9);");
        let mut player = Player::new(&trace);
        player.run_to_end();
        assert_eq!(player.current().var("last_get_map1"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_snapshots_are_independent() {
        let trace = parse_source("st.push(1); st.push(2);");
        let mut player = Player::new(&trace);
        player.run_to_end();

        let history = player.history();
        assert_eq!(history.len(), 3);
        let depth_at = |state: &PlayerState| match state.container("stack1") {
            Some(Container::Stack { items }) => items.len(),
            _ => 0,
        };
        assert_eq!(depth_at(&history[0]), 0);
        assert_eq!(depth_at(&history[1]), 1);
        assert_eq!(depth_at(&history[2]), 2);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let trace = parse_source("st.push(1);");
        let mut player = Player::new(&trace);
        player.run_to_end();
        player.reset();
        assert_eq!(player.position(), 0);
        assert_eq!(player.current(), &player.history()[0]);
    }

    #[test]
    fn test_array_set_grows_with_filler() {
        let trace = parse_source("nums[2] = 7;");
        let mut player = Player::new(&trace);
        player.run_to_end();
        match player.current().container("nums").unwrap() {
            Container::Array { items } => {
                assert_eq!(items, &["0".to_string(), "0".into(), "7".into()]);
            }
            other => panic!("expected an array, got {:?}", other),
        }
    }
}
