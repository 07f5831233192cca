//! Action records emitted by the extraction engine
//!
//! This module defines [`Action`], the tagged union that makes up the trace,
//! and [`StructureKind`], the classification produced by the declaration
//! scanner. Both serialize to the wire shape the renderer consumes: actions
//! carry a `type` discriminator string (`push`, `set_var`, ...), kinds use
//! the renderer's dispatch names (`stack`, `linkedlist`, `matrix`, ...).
//!
//! Actions are immutable once appended; their order in the trace
//! approximates (but does not guarantee) temporal execution order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical name used for every detected stack.
///
/// The engine does not disambiguate multiple instances of the same kind:
/// one fixed name per kind covers all of them.
pub const STACK_NAME: &str = "stack1";
/// Canonical name used for every detected queue.
pub const QUEUE_NAME: &str = "queue1";
/// Canonical name used for every detected linked list.
pub const LIST_NAME: &str = "linkedList1";
/// Canonical name used for every detected grid/matrix.
pub const GRID_NAME: &str = "matrix1";
/// Canonical name used for every detected map.
pub const MAP_NAME: &str = "map1";

/// Kind of a detected (or action-created) data structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    #[serde(rename = "stack")]
    Stack,
    #[serde(rename = "queue")]
    Queue,
    #[serde(rename = "linkedlist")]
    LinkedList,
    #[serde(rename = "matrix")]
    Grid,
    #[serde(rename = "array")]
    Array,
    #[serde(rename = "map")]
    Map,
}

impl StructureKind {
    /// Wire name of this kind (the string the renderer dispatches on).
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureKind::Stack => "stack",
            StructureKind::Queue => "queue",
            StructureKind::LinkedList => "linkedlist",
            StructureKind::Grid => "matrix",
            StructureKind::Array => "array",
            StructureKind::Map => "map",
        }
    }

    /// Canonical structure name for this kind, where one exists.
    ///
    /// Arrays are the exception: they keep their declared name, so there is
    /// no canonical array name.
    pub fn canonical_name(&self) -> Option<&'static str> {
        match self {
            StructureKind::Stack => Some(STACK_NAME),
            StructureKind::Queue => Some(QUEUE_NAME),
            StructureKind::LinkedList => Some(LIST_NAME),
            StructureKind::Grid => Some(GRID_NAME),
            StructureKind::Map => Some(MAP_NAME),
            StructureKind::Array => None,
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discrete semantic operation inferred from the source text.
///
/// Values are carried as the literal tokens found in (or substituted into)
/// the source, not coerced; coercion is the player's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Push {
        target: String,
        value: String,
    },
    Pop {
        target: String,
    },
    Enqueue {
        target: String,
        value: String,
    },
    Dequeue {
        target: String,
    },
    Put {
        target: String,
        key: String,
        value: String,
    },
    MapRemove {
        target: String,
        key: String,
    },
    MapGet {
        target: String,
        key: String,
    },
    SetVar {
        name: String,
        value: String,
    },
    CreateArray {
        name: String,
        items: Vec<String>,
    },
    ArraySet {
        name: String,
        index: usize,
        value: String,
    },
    InsertNode {
        target: String,
        value: String,
    },
    /// A conditional guard was reached; `condition` is the guard text after
    /// variable substitution and `context` the iteration bindings in force.
    EvaluateCondition {
        condition: String,
        context: BTreeMap<String, String>,
    },
    Return {
        value: String,
    },
}

impl Action {
    /// The container this action operates on, when it names one directly.
    pub fn target(&self) -> Option<&str> {
        match self {
            Action::Push { target, .. }
            | Action::Pop { target }
            | Action::Enqueue { target, .. }
            | Action::Dequeue { target }
            | Action::Put { target, .. }
            | Action::MapRemove { target, .. }
            | Action::MapGet { target, .. }
            | Action::InsertNode { target, .. } => Some(target),
            Action::CreateArray { name, .. } | Action::ArraySet { name, .. } => Some(name),
            Action::SetVar { .. } | Action::EvaluateCondition { .. } | Action::Return { .. } => {
                None
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Push { target, value } => write!(f, "{}.push({})", target, value),
            Action::Pop { target } => write!(f, "{}.pop()", target),
            Action::Enqueue { target, value } => write!(f, "{}.enqueue({})", target, value),
            Action::Dequeue { target } => write!(f, "{}.dequeue()", target),
            Action::Put { target, key, value } => {
                write!(f, "{}.put({}, {})", target, key, value)
            }
            Action::MapRemove { target, key } => write!(f, "{}.remove({})", target, key),
            Action::MapGet { target, key } => write!(f, "{}.get({})", target, key),
            Action::SetVar { name, value } => write!(f, "{} = {}", name, value),
            Action::CreateArray { name, items } => {
                write!(f, "{} = [{}]", name, items.join(", "))
            }
            Action::ArraySet { name, index, value } => {
                write!(f, "{}[{}] = {}", name, index, value)
            }
            Action::InsertNode { target, value } => {
                write!(f, "{} += node({})", target, value)
            }
            Action::EvaluateCondition { condition, .. } => write!(f, "if ({})", condition),
            Action::Return { value } => write!(f, "return {}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_with_type_tag() {
        let action = Action::Push {
            target: STACK_NAME.to_string(),
            value: "5".to_string(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "push");
        assert_eq!(json["target"], "stack1");
        assert_eq!(json["value"], "5");
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(
            serde_json::to_value(StructureKind::LinkedList).unwrap(),
            "linkedlist"
        );
        assert_eq!(serde_json::to_value(StructureKind::Grid).unwrap(), "matrix");
    }

    #[test]
    fn test_target_names_the_container() {
        let push = Action::Push {
            target: STACK_NAME.to_string(),
            value: "1".to_string(),
        };
        assert_eq!(push.target(), Some(STACK_NAME));

        let create = Action::CreateArray {
            name: "nums".to_string(),
            items: vec!["1".to_string()],
        };
        assert_eq!(create.target(), Some("nums"));

        let set = Action::SetVar {
            name: "i".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(set.target(), None);
    }

    #[test]
    fn test_snake_case_discriminators() {
        let action = Action::EvaluateCondition {
            condition: "2 + 7 == 9".to_string(),
            context: BTreeMap::new(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "evaluate_condition");

        let action = Action::MapRemove {
            target: MAP_NAME.to_string(),
            key: "k".to_string(),
        };
        assert_eq!(serde_json::to_value(&action).unwrap()["type"], "map_remove");
    }
}
