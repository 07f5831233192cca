//! # Introduction
//!
//! algotrace infers what a snippet of imperative code is doing to its data
//! structures, without a real compiler front end, and turns it into a
//! replayable trace. Layered pattern matching over the raw text discovers
//! declarations, unrolls bounded loops, and emits one discrete action per
//! inferred operation (push, enqueue, map put, variable assignment, ...).
//!
//! ## Pipeline
//!
//! ```text
//! Source → Signature scan → Literal/variable tables → Loop unrolling
//!        → Standalone call scan → TraceResult → Player → Snapshots
//! ```
//!
//! 1. [`engine`]: the extraction engine; [`engine::parse_source`] is the
//!    sole entry point and a pure function of its input text.
//! 2. [`player`]: replays the produced actions one per step, cloning state
//!    before each mutation so every step yields an independent snapshot.
//!
//! ## Extraction philosophy
//!
//! Best-effort, never hard failure: unparseable expressions resolve to
//! zero, unmatched constructs are silently ignored, unbalanced braces yield
//! empty bodies, and a runaway while loop is cut off after a fixed number
//! of iterations. No input makes [`engine::parse_source`] return an error.

pub mod engine;
pub mod player;

pub use engine::{parse_source, Action, StructureKind, TraceResult};
pub use player::{Container, Player, PlayerState, Value};
