//! Internal-inconsistency errors.
//!
//! Expected absences (unresolved name, unresolvable import, nonexistent
//! member) are plain `None` throughout the engine. `InternalError` is the
//! other class: a question the engine cannot answer for any well-formed
//! input, such as member access on a type that structurally has no members.
//! The rule driver converts it into one generic diagnostic and moves on.

use dzn_ast::NodeId;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InternalError {
    /// Node the inconsistency was observed at, when one is available.
    pub node: Option<NodeId>,
    pub message: String,
}

impl InternalError {
    pub fn new(node: Option<NodeId>, message: impl Into<String>) -> InternalError {
        InternalError {
            node,
            message: message.into(),
        }
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal error: {}", self.message)
    }
}

impl std::error::Error for InternalError {}
