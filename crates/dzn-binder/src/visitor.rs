//! Scope-aware depth-first traversal.
//!
//! Pre-order: the callback runs before the node's children are visited, and
//! may prune the current subtree without suppressing siblings or ancestors.
//! Scope pushes and pops bracket the child walk of every scope-introducing
//! node, so the stack's lifetime matches the traversal's call stack even
//! when a subtree is skipped.

use crate::scope::ScopeStack;
use dzn_ast::{FileId, NodeId, NodeIndex, NodeKind, SourceFile};

/// Callback verdict for a visited node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisitAction {
    /// Continue into the node's children.
    Descend,
    /// Prune this subtree only.
    SkipSubtree,
}

/// Drive a depth-first walk from `node`, invoking `callback` at every node.
///
/// Ports, function/event/trigger formals and local variables register their
/// names into the current live scope as the walk passes them. Child
/// enumeration is the exhaustive `Node::for_each_child`, so error-recovery
/// nodes are visited too and a node kind can never be silently skipped.
pub fn visit<F>(
    source: &SourceFile,
    file: FileId,
    node: NodeIndex,
    scopes: &mut ScopeStack,
    callback: &mut F,
) where
    F: FnMut(NodeIndex, &ScopeStack) -> VisitAction,
{
    let Some(n) = source.arena.get(node) else {
        return;
    };
    if callback(node, scopes) == VisitAction::SkipSubtree {
        return;
    }

    register_declaration(source, file, node, scopes);

    let mut children = Vec::new();
    n.for_each_child(|c| children.push(c));

    if n.kind.is_scope_root() {
        scopes.push(NodeId::new(file, node));
        for child in children {
            visit(source, file, child, scopes, callback);
        }
        scopes.pop();
    } else {
        for child in children {
            visit(source, file, child, scopes, callback);
        }
    }
}

/// Enter pass-over declarations into the innermost live scope.
fn register_declaration(
    source: &SourceFile,
    file: FileId,
    node: NodeIndex,
    scopes: &mut ScopeStack,
) {
    let registers = matches!(
        source.arena.kind(node),
        Some(NodeKind::Port { .. } | NodeKind::Parameter { .. } | NodeKind::Variable { .. })
    );
    if !registers {
        return;
    }
    if let Some(name) = source.arena.declared_name(node)
        && let Some(scope) = scopes.current_mut()
    {
        scope
            .declared
            .insert(name.to_string(), NodeId::new(file, node));
    }
}
