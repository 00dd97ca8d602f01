//! Name resolution and structural typing.
//!
//! `symbol_of_node` answers "what declaration does this name refer to" by
//! walking the scope chain through parent links, consulting the binder's
//! declaration tables at each level. `type_of_symbol` maps a declaration to
//! its structural type, and `members_of_type` answers member access. All
//! three are memoized by identity for the session's lifetime.

use crate::error::InternalError;
use crate::program::Program;
use crate::types::{TypeId, TypeKind, TypeTable};
use dzn_ast::{FileId, NodeArena, NodeId, NodeIndex, NodeKind, UnaryOp};
use dzn_binder::{Builtin, DeclTable, SymbolBinder, SymbolDecl, SymbolId};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::trace;

/// Name → symbol mapping exposed by a type, in declaration order.
pub type MemberTable = IndexMap<String, SymbolId>;

/// One per analysis session; bounded by the owning [`Program`].
pub struct TypeChecker<'p> {
    program: &'p Program,
    pub binder: SymbolBinder,
    types: TypeTable,
    node_symbols: FxHashMap<NodeId, Option<SymbolId>>,
    symbol_types: FxHashMap<SymbolId, TypeId>,
    type_members: FxHashMap<TypeId, Rc<MemberTable>>,
}

impl<'p> TypeChecker<'p> {
    pub fn new(program: &'p Program) -> TypeChecker<'p> {
        TypeChecker {
            program,
            binder: SymbolBinder::new(),
            types: TypeTable::new(),
            node_symbols: FxHashMap::default(),
            symbol_types: FxHashMap::default(),
            type_members: FxHashMap::default(),
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn symbol(&self, id: SymbolId) -> &dzn_binder::Symbol {
        self.binder.symbols.get(id)
    }

    fn arena(&self, file: FileId) -> Option<&'p NodeArena> {
        self.program.file(file).map(|s| &s.arena)
    }

    // ----- symbol resolution ------------------------------------------------

    /// The declaration `node` refers to, or `None` when the name does not
    /// resolve (expected absence — callers own any diagnostic).
    pub fn symbol_of_node(&mut self, node: NodeId) -> Result<Option<SymbolId>, InternalError> {
        if let Some(&cached) = self.node_symbols.get(&node) {
            return Ok(cached);
        }
        let resolved = self.resolve_node(node)?;
        self.node_symbols.insert(node, resolved);
        Ok(resolved)
    }

    fn resolve_node(&mut self, node: NodeId) -> Result<Option<SymbolId>, InternalError> {
        let Some(arena) = self.arena(node.file) else {
            return Ok(None);
        };
        let Some(kind) = arena.kind(node.node) else {
            return Ok(None);
        };
        match kind {
            // Unwrap to the referenced name; the identifier underneath sees
            // its own type-position flag.
            NodeKind::TypeRef { name } => self.symbol_of_node(NodeId::new(node.file, *name)),
            NodeKind::Identifier { text } => {
                if let Some(compound) = self.member_side_of(arena, node) {
                    return self.symbol_of_node(compound);
                }
                if !self.is_binding_endpoint(arena, node.node) {
                    if let Some(builtin) = self.binder.symbols.lookup_builtin(text) {
                        return Ok(Some(builtin));
                    }
                }
                self.resolve_scope_chain(node, text, self.is_type_position(arena, node.node))
            }
            NodeKind::Compound { .. } => self.resolve_compound(node),
            NodeKind::Call { callee, .. } => self.symbol_of_node(NodeId::new(node.file, *callee)),
            // A namespace declaration resolves to the merged view visible in
            // its enclosing scope.
            NodeKind::Namespace { .. } => {
                let Some(name) = arena.declared_name(node.node) else {
                    return Ok(None);
                };
                self.resolve_scope_chain(node, name, false)
            }
            NodeKind::Interface { .. }
            | NodeKind::Component { .. }
            | NodeKind::Instance { .. }
            | NodeKind::Port { .. }
            | NodeKind::Event { .. }
            | NodeKind::Function { .. }
            | NodeKind::Parameter { .. }
            | NodeKind::Variable { .. }
            | NodeKind::EnumDecl { .. }
            | NodeKind::EnumMember { .. }
            | NodeKind::Extern { .. }
            | NodeKind::Subrange { .. } => {
                let Some(name) = arena.declared_name(node.node) else {
                    return Ok(None);
                };
                Ok(Some(self.binder.symbols.intern_node(node, name)))
            }
            _ => Ok(None),
        }
    }

    /// Member access: resolve the head's type, then look the member up in
    /// that type's member table — not a scope search. A head with no name
    /// (leading dot) addresses the file's top-level scope directly.
    fn resolve_compound(&mut self, node: NodeId) -> Result<Option<SymbolId>, InternalError> {
        let Some(arena) = self.arena(node.file) else {
            return Ok(None);
        };
        let Some(NodeKind::Compound { head, member }) = arena.kind(node.node) else {
            return Ok(None);
        };
        let Some(member_name) = arena.identifier_text(*member) else {
            return Ok(None);
        };
        match head {
            None => {
                let Some(root) = self.program.file(node.file).and_then(|s| s.root) else {
                    return Ok(None);
                };
                let table = self
                    .binder
                    .declarations_in(NodeId::new(node.file, root), self.program);
                Ok(table.get(member_name).copied())
            }
            Some(head) => {
                let head_ty = self.type_of_node(NodeId::new(node.file, *head))?;
                if self.types.kind(head_ty) == TypeKind::Invalid {
                    // Unresolved head: absence, not an internal error.
                    return Ok(None);
                }
                let members = self.members_of_type(head_ty)?;
                Ok(members.get(member_name).copied())
            }
        }
    }

    /// Walk the scope chain outward from the node's nearest enclosing scope;
    /// innermost match wins. Crossing out of a namespace remembers its name
    /// so a failed direct check is retried as a sibling declaration still
    /// qualified by the crossed namespaces.
    fn resolve_scope_chain(
        &mut self,
        node: NodeId,
        name: &str,
        type_only: bool,
    ) -> Result<Option<SymbolId>, InternalError> {
        let Some(arena) = self.arena(node.file) else {
            return Ok(None);
        };
        let mut crossed: Vec<String> = Vec::new();
        let mut scope = self.enclosing_scope(arena, node.node);
        while let Some(scope_idx) = scope {
            let table = self
                .binder
                .declarations_in(NodeId::new(node.file, scope_idx), self.program);
            if let Some(&sym) = table.get(name) {
                if self.accepts(sym, type_only) {
                    trace!(name, scope = ?scope_idx, "resolved in scope chain");
                    return Ok(Some(sym));
                }
            }
            if !crossed.is_empty() {
                if let Some(sym) = self.resolve_qualified(&table, &crossed, name, type_only) {
                    trace!(name, "resolved via namespace-qualified retry");
                    return Ok(Some(sym));
                }
            }
            if matches!(arena.kind(scope_idx), Some(NodeKind::Namespace { .. })) {
                if let Some(ns) = arena.declared_name(scope_idx) {
                    crossed.push(ns.to_string());
                }
            }
            scope = self.enclosing_scope(arena, scope_idx);
        }
        trace!(name, "unresolved after scope chain");
        Ok(None)
    }

    /// Retry `name` as `Outer.Inner.name` where `crossed` holds the
    /// namespaces exited between the reference and the current scope,
    /// innermost first.
    fn resolve_qualified(
        &mut self,
        table: &DeclTable,
        crossed: &[String],
        name: &str,
        type_only: bool,
    ) -> Option<SymbolId> {
        let mut qualifiers = crossed.iter().rev();
        let mut current = *table.get(qualifiers.next()?)?;
        loop {
            let fragments = self
                .binder
                .symbols
                .get(current)
                .namespace_fragments()?
                .to_vec();
            let members = self.binder.namespace_members(&fragments, self.program);
            let next = match qualifiers.next() {
                Some(q) => q.as_str(),
                None => {
                    let sym = *members.get(name)?;
                    return self.accepts(sym, type_only).then_some(sym);
                }
            };
            current = *members.get(next)?;
        }
    }

    /// Type-reference filter: in type position, only type-introducing
    /// declarations match; anything else keeps the search going outward.
    fn accepts(&self, sym: SymbolId, type_only: bool) -> bool {
        if !type_only {
            return true;
        }
        match &self.binder.symbols.get(sym).decl {
            SymbolDecl::Namespace(_) => true,
            SymbolDecl::Builtin(_) => true,
            SymbolDecl::Node(decl) => self
                .arena(decl.file)
                .and_then(|a| a.kind(decl.node))
                .is_some_and(|k| k.is_type_declaration()),
        }
    }

    fn enclosing_scope(&self, arena: &NodeArena, idx: NodeIndex) -> Option<NodeIndex> {
        let mut current = arena.parent(idx);
        while let Some(p) = current {
            if arena.kind(p).is_some_and(|k| k.is_scope_root()) {
                return Some(p);
            }
            current = arena.parent(p);
        }
        None
    }

    fn member_side_of(&self, arena: &NodeArena, node: NodeId) -> Option<NodeId> {
        let parent = arena.parent(node.node)?;
        match arena.kind(parent)? {
            NodeKind::Compound { member, .. } if *member == node.node => {
                Some(NodeId::new(node.file, parent))
            }
            _ => None,
        }
    }

    fn is_binding_endpoint(&self, arena: &NodeArena, idx: NodeIndex) -> bool {
        arena
            .parent(idx)
            .and_then(|p| arena.kind(p))
            .is_some_and(|k| matches!(k, NodeKind::Binding { .. }))
    }

    fn is_type_position(&self, arena: &NodeArena, idx: NodeIndex) -> bool {
        arena
            .parent(idx)
            .and_then(|p| arena.kind(p))
            .is_some_and(|k| matches!(k, NodeKind::TypeRef { .. }))
    }

    // ----- typing -----------------------------------------------------------

    /// Structural type of a symbol's declaration. Memoized by symbol
    /// identity.
    pub fn type_of_symbol(&mut self, sym: SymbolId) -> Result<TypeId, InternalError> {
        if let Some(&ty) = self.symbol_types.get(&sym) {
            return Ok(ty);
        }
        let ty = self.compute_symbol_type(sym)?;
        self.symbol_types.insert(sym, ty);
        Ok(ty)
    }

    fn compute_symbol_type(&mut self, sym: SymbolId) -> Result<TypeId, InternalError> {
        let symbol = self.binder.symbols.get(sym);
        let name = symbol.name.clone();
        let decl = symbol.decl.clone();
        match decl {
            SymbolDecl::Builtin(b) => Ok(match b {
                Builtin::Bool | Builtin::True | Builtin::False => self.types.boolean(),
                // No void member in the type lattice; nothing consumes it.
                Builtin::Void => self.types.invalid(),
                Builtin::Reply => self.types.intern(TypeKind::Function, Some(name), None),
                Builtin::Optional | Builtin::Inevitable => {
                    self.types.intern(TypeKind::Event, Some(name), None)
                }
            }),
            SymbolDecl::Namespace(_) => {
                Ok(self.types.intern(TypeKind::Namespace, Some(name), Some(sym)))
            }
            SymbolDecl::Node(decl) => self.compute_declaration_type(sym, decl, name),
        }
    }

    fn compute_declaration_type(
        &mut self,
        sym: SymbolId,
        decl: NodeId,
        name: String,
    ) -> Result<TypeId, InternalError> {
        let Some(arena) = self.arena(decl.file) else {
            return Ok(self.types.invalid());
        };
        let Some(kind) = arena.kind(decl.node) else {
            return Ok(self.types.invalid());
        };
        match kind {
            NodeKind::Extern { .. } => {
                Ok(self.types.intern(TypeKind::External, Some(name), Some(sym)))
            }
            NodeKind::Instance { type_ref, .. } | NodeKind::Variable { type_ref, .. } => {
                self.type_of_annotation(NodeId::new(decl.file, *type_ref))
            }
            NodeKind::Parameter { type_ref, .. } => match type_ref {
                Some(tr) => self.type_of_annotation(NodeId::new(decl.file, *tr)),
                // Trigger formals carry no annotation.
                None => Ok(self.types.invalid()),
            },
            NodeKind::Port { type_ref, .. } => {
                let ty = self.type_of_annotation(NodeId::new(decl.file, *type_ref))?;
                if self.types.kind(ty) == TypeKind::Invalid {
                    // Port of an unknown interface: still identifiable as a
                    // port, just without members.
                    Ok(self.types.intern(TypeKind::Port, Some(name), Some(sym)))
                } else {
                    Ok(ty)
                }
            }
            NodeKind::EnumDecl { .. } => Ok(self.types.intern(TypeKind::Enum, Some(name), Some(sym))),
            // Enum membership tests are boolean-valued in this language.
            NodeKind::EnumMember { .. } => Ok(self.types.boolean()),
            NodeKind::Event { .. } => Ok(self.types.intern(TypeKind::Event, Some(name), Some(sym))),
            NodeKind::Component { .. } => {
                Ok(self.types.intern(TypeKind::Component, Some(name), Some(sym)))
            }
            NodeKind::Interface { .. } => {
                Ok(self.types.intern(TypeKind::Interface, Some(name), Some(sym)))
            }
            NodeKind::Function { .. } => {
                Ok(self.types.intern(TypeKind::Function, Some(name), Some(sym)))
            }
            NodeKind::Subrange { .. } => {
                Ok(self.types.intern(TypeKind::Subrange, Some(name), Some(sym)))
            }
            NodeKind::Namespace { .. } => {
                Ok(self.types.intern(TypeKind::Namespace, Some(name), Some(sym)))
            }
            NodeKind::Error { .. } => Ok(self.types.invalid()),
            other => Err(InternalError::new(
                Some(decl),
                format!("no type rule for declaration kind {other:?}"),
            )),
        }
    }

    fn type_of_annotation(&mut self, type_ref: NodeId) -> Result<TypeId, InternalError> {
        match self.symbol_of_node(type_ref)? {
            Some(sym) => self.type_of_symbol(sym),
            None => Ok(self.types.invalid()),
        }
    }

    /// Members a type exposes, keyed by name. Memoized by type identity.
    ///
    /// Member access on a kind that structurally cannot have members is an
    /// internal inconsistency (§ error handling), not an absence.
    pub fn members_of_type(&mut self, ty: TypeId) -> Result<Rc<MemberTable>, InternalError> {
        if let Some(members) = self.type_members.get(&ty) {
            return Ok(Rc::clone(members));
        }
        let table = self.compute_members(ty)?;
        let rc = Rc::new(table);
        self.type_members.insert(ty, Rc::clone(&rc));
        Ok(rc)
    }

    fn compute_members(&mut self, ty: TypeId) -> Result<MemberTable, InternalError> {
        let t = self.types.get(ty).clone();
        let decl = t
            .symbol
            .and_then(|s| self.binder.symbols.get(s).declaration());
        match t.kind {
            // Opaque: external types never expose members, and neither does
            // a port whose interface did not resolve.
            TypeKind::External | TypeKind::Port => Ok(MemberTable::new()),
            TypeKind::Enum => {
                let Some(decl) = decl else {
                    return Ok(MemberTable::new());
                };
                let Some(arena) = self.arena(decl.file) else {
                    return Ok(MemberTable::new());
                };
                let Some(NodeKind::EnumDecl { members, .. }) = arena.kind(decl.node) else {
                    return Ok(MemberTable::new());
                };
                let mut table = MemberTable::new();
                for &member in members {
                    if let Some(name) = arena.declared_name(member) {
                        let sym = self
                            .binder
                            .symbols
                            .intern_node(NodeId::new(decl.file, member), name);
                        table.insert(name.to_string(), sym);
                    }
                }
                Ok(table)
            }
            TypeKind::Namespace => {
                let Some(sym) = t.symbol else {
                    return Ok(MemberTable::new());
                };
                let Some(fragments) = self.binder.symbols.get(sym).namespace_fragments() else {
                    // Namespace symbol interned from a single declaration.
                    let Some(decl) = decl else {
                        return Ok(MemberTable::new());
                    };
                    let table = self.binder.declarations_in(decl, self.program);
                    return Ok((*table).clone());
                };
                let fragments = fragments.to_vec();
                Ok(self.binder.namespace_members(&fragments, self.program))
            }
            TypeKind::Component => {
                let Some(decl) = decl else {
                    return Ok(MemberTable::new());
                };
                let table = self.binder.declarations_in(decl, self.program);
                Ok((*table).clone())
            }
            TypeKind::Interface => {
                let Some(decl) = decl else {
                    return Ok(MemberTable::new());
                };
                let mut table = (*self.binder.declarations_in(decl, self.program)).clone();
                // Every interface answers `reply` through a port.
                table.insert(
                    "reply".to_string(),
                    self.binder.symbols.builtin(Builtin::Reply),
                );
                self.add_shared_state(&mut table, decl)?;
                Ok(table)
            }
            TypeKind::Invalid
            | TypeKind::Bool
            | TypeKind::PortCollection
            | TypeKind::Event
            | TypeKind::Function
            | TypeKind::Subrange => Err(InternalError::new(
                decl,
                format!("member access on {:?} type", t.kind),
            )),
        }
    }

    /// Top-level variables and enums of an interface's behavior are visible
    /// through ports as shared state (`port.name`).
    fn add_shared_state(
        &mut self,
        table: &mut MemberTable,
        interface: NodeId,
    ) -> Result<(), InternalError> {
        let Some(arena) = self.arena(interface.file) else {
            return Ok(());
        };
        let Some(NodeKind::Interface {
            behavior: Some(behavior),
            ..
        }) = arena.kind(interface.node)
        else {
            return Ok(());
        };
        let behavior_decls = self
            .binder
            .declarations_in(NodeId::new(interface.file, *behavior), self.program);
        for (name, &sym) in behavior_decls.iter() {
            let is_state = self
                .binder
                .symbols
                .get(sym)
                .declaration()
                .and_then(|d| self.arena(d.file).and_then(|a| a.kind(d.node)))
                .is_some_and(|k| {
                    matches!(k, NodeKind::Variable { .. } | NodeKind::EnumDecl { .. })
                });
            if is_state {
                table.entry(name.clone()).or_insert(sym);
            }
        }
        Ok(())
    }

    /// Structural type of any expression or declaration node.
    pub fn type_of_node(&mut self, node: NodeId) -> Result<TypeId, InternalError> {
        let Some(arena) = self.arena(node.file) else {
            return Ok(self.types.invalid());
        };
        let Some(kind) = arena.kind(node.node) else {
            return Ok(self.types.invalid());
        };
        match kind {
            NodeKind::Binary { op, .. } if op.is_boolean() => Ok(self.types.boolean()),
            NodeKind::Unary {
                op: UnaryOp::Not, ..
            } => Ok(self.types.boolean()),
            NodeKind::Wildcard => Ok(self.types.port_collection()),
            NodeKind::Call { callee, .. } => {
                let callee = NodeId::new(node.file, *callee);
                self.type_of_call(callee)
            }
            _ => match self.symbol_of_node(node)? {
                Some(sym) => self.type_of_symbol(sym),
                None => Ok(self.types.invalid()),
            },
        }
    }

    /// A call's type is the callee's declared return type.
    fn type_of_call(&mut self, callee: NodeId) -> Result<TypeId, InternalError> {
        let Some(sym) = self.symbol_of_node(callee)? else {
            return Ok(self.types.invalid());
        };
        let decl = self.binder.symbols.get(sym).decl.clone();
        let SymbolDecl::Node(decl) = decl else {
            // `reply` and the trigger builtins declare no return type.
            return Ok(self.types.invalid());
        };
        let Some(arena) = self.arena(decl.file) else {
            return Ok(self.types.invalid());
        };
        match arena.kind(decl.node) {
            Some(NodeKind::Function { return_type, .. }) => {
                self.type_of_annotation(NodeId::new(decl.file, *return_type))
            }
            Some(NodeKind::Event { type_ref, .. }) => {
                self.type_of_annotation(NodeId::new(decl.file, *type_ref))
            }
            _ => Ok(self.types.invalid()),
        }
    }
}
