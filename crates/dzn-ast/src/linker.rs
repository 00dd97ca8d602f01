//! Parent-linking pass.
//!
//! Runs once per file after parsing and assigns every node's parent,
//! including nodes reachable only through error-recovery lists. The binder's
//! scope search only ascends via these links, so the pass must run before
//! any lookup.

use crate::arena::{NodeArena, NodeIndex};
use tracing::trace;

/// Link every node reachable from `root` to its parent.
///
/// The input is assumed structurally well-formed even when it embeds
/// recovery nodes, so there is no error path. Child enumeration is the
/// exhaustive [`crate::node::Node::for_each_child`]; a new node kind that is
/// not enumerated there fails to compile rather than silently losing its
/// subtree's parents.
pub fn link_parents(arena: &mut NodeArena, root: NodeIndex) {
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        let Some(node) = arena.get(current) else {
            continue;
        };
        let mut children = Vec::new();
        node.for_each_child(|child| children.push(child));
        for child in children {
            arena.set_parent(child, current);
            stack.push(child);
        }
    }
    trace!(nodes = arena.len(), "parent linking complete");
}

/// Walk parent links from `idx` upward, yielding ancestors innermost-first.
pub fn ancestors(arena: &NodeArena, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
    std::iter::successors(arena.parent(idx), move |&p| arena.parent(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use dzn_common::Span;

    #[test]
    fn links_all_structural_children() {
        let mut arena = NodeArena::new();
        let s = Span::EMPTY;
        let name = arena.add_identifier("C", s);
        let stmts = arena.add_block(vec![], s);
        let behavior = arena.add_behavior(vec![stmts], s);
        let comp = arena.add_component(name, vec![], Some(behavior), None, s);
        let root = arena.add_file(vec![comp], s);
        link_parents(&mut arena, root);

        assert_eq!(arena.parent(comp), Some(root));
        assert_eq!(arena.parent(name), Some(comp));
        assert_eq!(arena.parent(behavior), Some(comp));
        assert_eq!(arena.parent(stmts), Some(behavior));
        assert_eq!(arena.parent(root), None);
    }

    #[test]
    fn links_extern_and_subrange_names() {
        let mut arena = NodeArena::new();
        let s = Span::EMPTY;
        let ext_name = arena.add_identifier("millis", s);
        let ext = arena.add_extern(ext_name, "int", s);
        let sub_name = arena.add_identifier("Small", s);
        let sub = arena.add_subrange(sub_name, 0, 9, s);
        let root = arena.add_file(vec![ext, sub], s);
        link_parents(&mut arena, root);

        assert_eq!(arena.parent(ext_name), Some(ext));
        assert_eq!(arena.parent(sub_name), Some(sub));
    }

    #[test]
    fn links_recovered_nodes() {
        let mut arena = NodeArena::new();
        let s = Span::EMPTY;
        let err = arena.add_error("garbage", s);
        let root = arena.add_file(vec![], s);
        arena.attach_recovered(root, err);
        link_parents(&mut arena, root);

        assert_eq!(arena.parent(err), Some(root));
    }

    #[test]
    fn ancestors_walk_is_innermost_first() {
        let mut arena = NodeArena::new();
        let s = Span::EMPTY;
        let id = arena.add_identifier("x", s);
        let stmt = arena.add_expr_statement(id, s);
        let block = arena.add_block(vec![stmt], s);
        let root = arena.add_file(vec![block], s);
        link_parents(&mut arena, root);

        let chain: Vec<_> = ancestors(&arena, id).collect();
        assert_eq!(chain, vec![stmt, block, root]);
        assert!(matches!(
            arena.kind(chain[2]),
            Some(NodeKind::File { .. })
        ));
    }
}
