//! The structural type lattice.
//!
//! Types are interned in a [`TypeTable`] and compared by [`TypeId`]; the
//! member cache is keyed by that identity. Non-primitive types carry a name
//! and a back-pointer (through their symbol) to the declaring node so member
//! lookup can re-enter the binder.

use dzn_binder::SymbolId;
use rustc_hash::FxHashMap;

/// Handle into a [`TypeTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// Coarse structural classification of what a symbol's declaration is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Unknown or unresolvable; the expected-absence sentinel.
    Invalid,
    Bool,
    /// Opaque foreign type (`extern`).
    External,
    Enum,
    /// A port whose interface annotation did not resolve; resolvable
    /// annotations type directly as that interface.
    Port,
    /// The `*` endpoint of a wildcard binding.
    PortCollection,
    Event,
    Interface,
    Component,
    Namespace,
    Function,
    /// Integer subrange declaration.
    Subrange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Type {
    pub kind: TypeKind,
    pub name: Option<String>,
    /// Symbol of the declaring node, when the type has one.
    pub symbol: Option<SymbolId>,
}

pub struct TypeTable {
    types: Vec<Type>,
    interned: FxHashMap<(TypeKind, Option<SymbolId>, Option<String>), TypeId>,
    invalid: TypeId,
    boolean: TypeId,
    port_collection: TypeId,
}

impl TypeTable {
    pub fn new() -> TypeTable {
        let mut table = TypeTable {
            types: Vec::new(),
            interned: FxHashMap::default(),
            invalid: TypeId(0),
            boolean: TypeId(0),
            port_collection: TypeId(0),
        };
        table.invalid = table.intern(TypeKind::Invalid, None, None);
        table.boolean = table.intern(TypeKind::Bool, Some("bool".to_string()), None);
        table.port_collection = table.intern(TypeKind::PortCollection, None, None);
        table
    }

    pub fn invalid(&self) -> TypeId {
        self.invalid
    }

    pub fn boolean(&self) -> TypeId {
        self.boolean
    }

    pub fn port_collection(&self) -> TypeId {
        self.port_collection
    }

    pub fn intern(
        &mut self,
        kind: TypeKind,
        name: Option<String>,
        symbol: Option<SymbolId>,
    ) -> TypeId {
        let key = (kind, symbol, name.clone());
        if let Some(&id) = self.interned.get(&key) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(Type { kind, name, symbol });
        self.interned.insert(key, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn kind(&self, id: TypeId) -> TypeKind {
        self.get(id).kind
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable::new()
    }
}
