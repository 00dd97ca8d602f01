//! Symbol binding and scope machinery for the dzn analyzer.
//!
//! Three pieces live here:
//! - [`symbol`]: interned symbol handles ([`SymbolId`]) — one per declaring
//!   node, plus the fixed builtins and synthesized merged namespaces.
//! - [`visitor`]: the scope-aware depth-first traversal driver used by rule
//!   execution, maintaining a live [`ScopeStack`].
//! - [`binder`]: the lazy, memoized per-scope-root declaration tables,
//!   including namespace-fragment merging and import expansion.
//!
//! Cross-file access goes through the [`ProgramView`] trait; the concrete
//! program type lives in `dzn-checker`.

pub mod binder;
pub mod scope;
pub mod symbol;
pub mod visitor;

pub use binder::{DeclTable, SymbolBinder};
pub use scope::{Scope, ScopeStack};
pub use symbol::{Builtin, Symbol, SymbolArena, SymbolDecl, SymbolId};
pub use visitor::{VisitAction, visit};

use dzn_ast::{FileId, SourceFile};

/// Program facilities the binder needs: file access and import resolution.
///
/// Import resolution failure is `None`, never an error; an unresolvable
/// import simply contributes no declarations.
pub trait ProgramView {
    fn source_file(&self, file: FileId) -> Option<&SourceFile>;
    fn resolve_import(&self, import_path: &str, from: FileId) -> Option<FileId>;
    fn file_path(&self, file: FileId) -> Option<&str>;
}
