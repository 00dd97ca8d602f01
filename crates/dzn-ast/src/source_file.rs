//! Parsed source units and cross-file node identity.

use crate::arena::{NodeArena, NodeIndex};
use crate::linker::link_parents;
use dzn_common::Diagnostic;
use serde::Serialize;

/// Index of a source file within a program's file set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(pub u32);

/// Globally unique node identity: arena handle plus owning file.
///
/// `NodeIndex` alone is only meaningful within one arena; every cache keyed
/// by node identity uses this pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    pub file: FileId,
    pub node: NodeIndex,
}

impl NodeId {
    pub fn new(file: FileId, node: NodeIndex) -> NodeId {
        NodeId { file, node }
    }
}

/// A parsed unit: file name (if any), raw text, optional root node, and the
/// diagnostics the parser produced. Owned by the program for the session.
pub struct SourceFile {
    pub file_name: Option<String>,
    pub text: String,
    pub root: Option<NodeIndex>,
    pub arena: NodeArena,
    pub parse_diagnostics: Vec<Diagnostic>,
}

impl SourceFile {
    pub fn new(file_name: Option<String>, text: impl Into<String>) -> SourceFile {
        SourceFile {
            file_name,
            text: text.into(),
            root: None,
            arena: NodeArena::new(),
            parse_diagnostics: Vec::new(),
        }
    }

    /// Install the parse result and run the parent-linking pass.
    pub fn set_root(&mut self, root: NodeIndex) {
        self.root = Some(root);
        link_parents(&mut self.arena, root);
    }

    /// File name, or a placeholder for anonymous units.
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("<anonymous>")
    }
}
