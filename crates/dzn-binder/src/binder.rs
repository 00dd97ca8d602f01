//! Lazy, memoized declaration tables per scope root.
//!
//! Independent of any live traversal: given a scope-introducing node, the
//! binder computes the full set of names declared directly in that scope,
//! merging same-named namespace fragments into one synthesized view and
//! expanding imports through the program. The result is cached per node for
//! the session's lifetime.

use crate::symbol::{SymbolArena, SymbolId};
use crate::ProgramView;
use dzn_ast::{FileId, NodeArena, NodeId, NodeIndex, NodeKind};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use tracing::debug;

/// Name → symbol mapping for one scope, in encounter order.
pub type DeclTable = IndexMap<String, SymbolId>;

pub struct SymbolBinder {
    pub symbols: SymbolArena,
    scope_decls: FxHashMap<NodeId, Rc<DeclTable>>,
    /// Files whose top-level table is currently being computed. Guards
    /// import cycles: a file re-entered during its own expansion contributes
    /// nothing to the inner request.
    expanding: FxHashSet<FileId>,
}

impl SymbolBinder {
    pub fn new() -> SymbolBinder {
        SymbolBinder {
            symbols: SymbolArena::new(),
            scope_decls: FxHashMap::default(),
            expanding: FxHashSet::default(),
        }
    }

    /// Names declared directly in the scope rooted at `scope_root`.
    /// Memoized; non-scope-root nodes yield an empty table.
    pub fn declarations_in(
        &mut self,
        scope_root: NodeId,
        program: &dyn ProgramView,
    ) -> Rc<DeclTable> {
        if let Some(table) = self.scope_decls.get(&scope_root) {
            return Rc::clone(table);
        }
        let table = Rc::new(self.compute(scope_root, program));
        self.scope_decls.insert(scope_root, Rc::clone(&table));
        table
    }

    /// Union of declarations across the fragments of a merged namespace.
    /// Same-named nested namespaces merge transitively.
    pub fn namespace_members(
        &mut self,
        fragments: &[NodeId],
        program: &dyn ProgramView,
    ) -> DeclTable {
        let mut table = DeclTable::new();
        for &fragment in fragments {
            let part = self.declarations_in(fragment, program);
            self.merge_into(&mut table, &part);
        }
        table
    }

    fn compute(&mut self, scope_root: NodeId, program: &dyn ProgramView) -> DeclTable {
        let Some(source) = program.source_file(scope_root.file) else {
            return DeclTable::new();
        };
        let arena = &source.arena;
        let Some(node) = arena.get(scope_root.node) else {
            return DeclTable::new();
        };
        match &node.kind {
            NodeKind::File { statements } => {
                self.expanding.insert(scope_root.file);
                let mut table = self.collect_container(arena, scope_root.file, statements);
                self.expand_imports(&mut table, arena, statements, scope_root.file, program);
                self.expanding.remove(&scope_root.file);
                table
            }
            NodeKind::Namespace { statements, .. } => {
                self.collect_container(arena, scope_root.file, statements)
            }
            NodeKind::Interface { body, .. } => {
                let mut table = DeclTable::new();
                for &member in body {
                    let declares = matches!(
                        arena.kind(member),
                        Some(
                            NodeKind::Event { .. }
                                | NodeKind::EnumDecl { .. }
                                | NodeKind::Extern { .. }
                                | NodeKind::Subrange { .. }
                        )
                    );
                    if declares {
                        self.declare(&mut table, arena, scope_root.file, member);
                    }
                }
                table
            }
            NodeKind::Component { ports, .. } => {
                let mut table = DeclTable::new();
                for &port in ports {
                    self.declare(&mut table, arena, scope_root.file, port);
                }
                table
            }
            NodeKind::Behavior { statements } => {
                let mut table = DeclTable::new();
                for &stmt in statements {
                    let declares = matches!(
                        arena.kind(stmt),
                        Some(
                            NodeKind::EnumDecl { .. }
                                | NodeKind::Function { .. }
                                | NodeKind::Variable { .. }
                                | NodeKind::Subrange { .. }
                        )
                    );
                    if declares {
                        self.declare(&mut table, arena, scope_root.file, stmt);
                    }
                }
                table
            }
            NodeKind::Block { statements } => {
                let mut table = DeclTable::new();
                for &stmt in statements {
                    if matches!(arena.kind(stmt), Some(NodeKind::Variable { .. })) {
                        self.declare(&mut table, arena, scope_root.file, stmt);
                    }
                }
                table
            }
            NodeKind::Function { formals, .. } => {
                let mut table = DeclTable::new();
                for &formal in formals {
                    self.declare(&mut table, arena, scope_root.file, formal);
                }
                table
            }
            NodeKind::On { triggers, .. } => {
                let mut table = DeclTable::new();
                for &trigger in triggers {
                    if let Some(NodeKind::Trigger { formals, .. }) = arena.kind(trigger) {
                        for &formal in formals {
                            self.declare(&mut table, arena, scope_root.file, formal);
                        }
                    }
                }
                table
            }
            NodeKind::System { instances, .. } => {
                let mut table = DeclTable::new();
                for &instance in instances {
                    self.declare(&mut table, arena, scope_root.file, instance);
                }
                table
            }
            _ => DeclTable::new(),
        }
    }

    /// Collect a file or namespace body: type and callable declarations keyed
    /// by name, with same-named namespace fragments folded into one symbol.
    fn collect_container(
        &mut self,
        arena: &NodeArena,
        file: FileId,
        statements: &[NodeIndex],
    ) -> DeclTable {
        let mut table = DeclTable::new();
        let mut fragments: IndexMap<String, Vec<NodeId>> = IndexMap::new();
        for &stmt in statements {
            match arena.kind(stmt) {
                Some(
                    NodeKind::EnumDecl { .. }
                    | NodeKind::Component { .. }
                    | NodeKind::Interface { .. }
                    | NodeKind::Extern { .. }
                    | NodeKind::Subrange { .. }
                    | NodeKind::Function { .. },
                ) => self.declare(&mut table, arena, file, stmt),
                Some(NodeKind::Namespace { .. }) => {
                    if let Some(name) = arena.declared_name(stmt) {
                        fragments
                            .entry(name.to_string())
                            .or_default()
                            .push(NodeId::new(file, stmt));
                    }
                }
                _ => {}
            }
        }
        for (name, frags) in fragments {
            if frags.len() > 1 {
                debug!(namespace = %name, fragments = frags.len(), "merging namespace fragments");
            }
            let sym = self.symbols.intern_namespace(&name, frags);
            table.entry(name).or_insert(sym);
        }
        table
    }

    fn declare(&mut self, table: &mut DeclTable, arena: &NodeArena, file: FileId, decl: NodeIndex) {
        if let Some(name) = arena.declared_name(decl) {
            let sym = self.symbols.intern_node(NodeId::new(file, decl), name);
            // First declaration wins; duplicate reporting is rule territory.
            table.entry(name.to_string()).or_insert(sym);
        }
    }

    /// Fold every import's top-level declarations into `table`. An import
    /// that does not resolve contributes zero entries and raises nothing.
    fn expand_imports(
        &mut self,
        table: &mut DeclTable,
        arena: &NodeArena,
        statements: &[NodeIndex],
        from: FileId,
        program: &dyn ProgramView,
    ) {
        for &stmt in statements {
            let Some(NodeKind::Import { path }) = arena.kind(stmt) else {
                continue;
            };
            let Some(target) = program.resolve_import(path, from) else {
                debug!(import = %path, "import did not resolve; skipping");
                continue;
            };
            if self.expanding.contains(&target) {
                debug!(import = %path, "import cycle; skipping inner expansion");
                continue;
            }
            let Some(target_source) = program.source_file(target) else {
                continue;
            };
            let Some(target_root) = target_source.root else {
                continue;
            };
            let imported = self.declarations_in(NodeId::new(target, target_root), program);
            self.merge_into(table, &imported);
        }
    }

    /// Fold `incoming` into `table`: absent names are added, same-named
    /// namespaces merge transitively, anything else keeps the local entry.
    fn merge_into(&mut self, table: &mut DeclTable, incoming: &DeclTable) {
        for (name, &sym) in incoming {
            match table.get(name) {
                None => {
                    table.insert(name.clone(), sym);
                }
                Some(&existing) => {
                    let left = self.symbols.get(existing).namespace_fragments();
                    let right = self.symbols.get(sym).namespace_fragments();
                    if let (Some(left), Some(right)) = (left, right) {
                        let mut merged: Vec<NodeId> = left.to_vec();
                        for id in right {
                            if !merged.contains(id) {
                                merged.push(*id);
                            }
                        }
                        let merged_sym = self.symbols.intern_namespace(name, merged);
                        table.insert(name.clone(), merged_sym);
                    }
                }
            }
        }
    }
}

impl Default for SymbolBinder {
    fn default() -> Self {
        SymbolBinder::new()
    }
}
