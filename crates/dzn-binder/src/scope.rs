//! Runtime scopes for the traversal driver.
//!
//! These are the *live* scopes maintained while visiting: each pairs the
//! scope-root node with the names registered so far during the walk. They
//! are distinct from the binder's on-demand declaration tables — a rule can
//! ask "does the live scope declare x" mid-traversal without forcing a
//! fresh binding pass.

use dzn_ast::NodeId;
use indexmap::IndexMap;

/// One lexical scope: its root node and the declarations registered while
/// traversal passed over them.
#[derive(Clone, Debug)]
pub struct Scope {
    pub root: NodeId,
    pub declared: IndexMap<String, NodeId>,
}

impl Scope {
    pub fn new(root: NodeId) -> Scope {
        Scope {
            root,
            declared: IndexMap::new(),
        }
    }
}

/// Stack of live scopes, innermost last. Push/pop pairs mirror the call
/// stack of the traversal, including early subtree termination.
#[derive(Default, Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> ScopeStack {
        ScopeStack::default()
    }

    pub fn push(&mut self, root: NodeId) {
        self.scopes.push(Scope::new(root));
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    pub fn current(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }

    /// Scopes innermost-first.
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter().rev()
    }

    /// Innermost declaration of `name`, if any live scope registered it.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.iter().find_map(|s| s.declared.get(name).copied())
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
