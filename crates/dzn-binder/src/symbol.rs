//! Symbols: de-duplicated handles to "the node that declared this name".
//!
//! One `SymbolId` is interned per declaring node for the lifetime of the
//! owning session, so identity comparison of symbols is meaningful. Merged
//! namespaces are interned by their exact fragment set: the same set of
//! fragments always yields the same symbol, no matter which file's view
//! triggered the merge.

use dzn_ast::NodeId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Handle into a [`SymbolArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Names resolved without scope search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Void,
    Bool,
    True,
    False,
    Reply,
    Optional,
    Inevitable,
}

impl Builtin {
    pub const ALL: [Builtin; 7] = [
        Builtin::Void,
        Builtin::Bool,
        Builtin::True,
        Builtin::False,
        Builtin::Reply,
        Builtin::Optional,
        Builtin::Inevitable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Void => "void",
            Builtin::Bool => "bool",
            Builtin::True => "true",
            Builtin::False => "false",
            Builtin::Reply => "reply",
            Builtin::Optional => "optional",
            Builtin::Inevitable => "inevitable",
        }
    }

    pub fn lookup(name: &str) -> Option<Builtin> {
        Builtin::ALL.iter().copied().find(|b| b.name() == name)
    }
}

/// Where a symbol was declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolDecl {
    /// A single declaring node (port, variable, function, event, enum, ...).
    Node(NodeId),
    /// A merged namespace: every fragment contributing to the logical
    /// namespace, in encounter order. The fragments themselves are never
    /// mutated; this is the synthesized read-only view.
    Namespace(SmallVec<[NodeId; 2]>),
    /// A built-in pseudo-declaration.
    Builtin(Builtin),
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub decl: SymbolDecl,
}

impl Symbol {
    /// The primary declaring node, if the symbol has one.
    pub fn declaration(&self) -> Option<NodeId> {
        match &self.decl {
            SymbolDecl::Node(id) => Some(*id),
            SymbolDecl::Namespace(fragments) => fragments.first().copied(),
            SymbolDecl::Builtin(_) => None,
        }
    }

    pub fn namespace_fragments(&self) -> Option<&[NodeId]> {
        match &self.decl {
            SymbolDecl::Namespace(fragments) => Some(fragments),
            _ => None,
        }
    }
}

/// Interning arena for symbols.
pub struct SymbolArena {
    symbols: Vec<Symbol>,
    by_node: FxHashMap<NodeId, SymbolId>,
    by_fragments: FxHashMap<Vec<NodeId>, SymbolId>,
    builtins: [SymbolId; Builtin::ALL.len()],
}

impl SymbolArena {
    pub fn new() -> SymbolArena {
        let mut arena = SymbolArena {
            symbols: Vec::new(),
            by_node: FxHashMap::default(),
            by_fragments: FxHashMap::default(),
            builtins: [SymbolId(0); Builtin::ALL.len()],
        };
        for (i, b) in Builtin::ALL.into_iter().enumerate() {
            arena.builtins[i] = arena.push(Symbol {
                name: b.name().to_string(),
                decl: SymbolDecl::Builtin(b),
            });
        }
        arena
    }

    fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn builtin(&self, b: Builtin) -> SymbolId {
        self.builtins[Builtin::ALL.iter().position(|x| *x == b).unwrap_or(0)]
    }

    /// Builtin symbol for `name`, if `name` is one of the fixed builtins.
    pub fn lookup_builtin(&self, name: &str) -> Option<SymbolId> {
        Builtin::lookup(name).map(|b| self.builtin(b))
    }

    /// Intern the symbol for a declaring node. Repeated calls for the same
    /// node return the identical id.
    pub fn intern_node(&mut self, decl: NodeId, name: &str) -> SymbolId {
        if let Some(&id) = self.by_node.get(&decl) {
            return id;
        }
        let id = self.push(Symbol {
            name: name.to_string(),
            decl: SymbolDecl::Node(decl),
        });
        self.by_node.insert(decl, id);
        id
    }

    /// Intern the merged view of namespace fragments. The fragment list is
    /// the identity key, so transitively merged views converge on one id.
    pub fn intern_namespace(&mut self, name: &str, fragments: Vec<NodeId>) -> SymbolId {
        if let Some(&id) = self.by_fragments.get(&fragments) {
            return id;
        }
        let id = self.push(Symbol {
            name: name.to_string(),
            decl: SymbolDecl::Namespace(SmallVec::from_vec(fragments.clone())),
        });
        self.by_fragments.insert(fragments, id);
        id
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for SymbolArena {
    fn default() -> Self {
        SymbolArena::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dzn_ast::{FileId, NodeIndex};

    fn node(n: u32) -> NodeId {
        NodeId::new(FileId(0), NodeIndex(n))
    }

    #[test]
    fn node_symbols_are_interned() {
        let mut arena = SymbolArena::new();
        let a = arena.intern_node(node(1), "x");
        let b = arena.intern_node(node(1), "x");
        let c = arena.intern_node(node(2), "x");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn namespace_symbols_keyed_by_fragment_set() {
        let mut arena = SymbolArena::new();
        let a = arena.intern_namespace("NS", vec![node(1), node(2)]);
        let b = arena.intern_namespace("NS", vec![node(1), node(2)]);
        let c = arena.intern_namespace("NS", vec![node(1)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn builtin_lookup_covers_all_names() {
        let arena = SymbolArena::new();
        for b in Builtin::ALL {
            let id = arena.lookup_builtin(b.name()).unwrap();
            assert_eq!(arena.get(id).decl, SymbolDecl::Builtin(b));
        }
        assert!(arena.lookup_builtin("component").is_none());
    }
}
