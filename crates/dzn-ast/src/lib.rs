//! AST model for the dzn analyzer.
//!
//! The tree is produced by the parser (not part of this workspace) through
//! the `add_*` constructors on [`NodeArena`]. Nodes are addressed by
//! [`NodeIndex`] handles into a per-file arena; cross-file consumers pair the
//! handle with a [`FileId`] to form a globally unique [`NodeId`].
//!
//! After parsing, [`linker::link_parents`] assigns every node's parent —
//! including nodes reachable only through error-recovery lists — in a
//! parallel parent array. Parents are write-once and purely navigational;
//! ownership stays with the arena.

pub mod arena;
pub mod linker;
pub mod node;
pub mod source_file;

pub use arena::{NodeArena, NodeIndex};
pub use node::{BinaryOp, EventDirection, Node, NodeKind, PortDirection, UnaryOp};
pub use source_file::{FileId, NodeId, SourceFile};
