//! Structural type checking for the dzn analyzer.
//!
//! One [`TypeChecker`] exists per analysis session, bounded by the owning
//! [`Program`]. Rules ask it two questions about any node: which declaration
//! a name refers to ([`TypeChecker::symbol_of_node`]) and what structural
//! type an expression or declaration has ([`TypeChecker::type_of_node`]).
//! All memoization lives inside the checker and binder, so independent
//! programs never share state.

pub mod checker;
pub mod error;
pub mod program;
pub mod rules;
pub mod types;

pub use checker::{MemberTable, TypeChecker};
pub use error::InternalError;
pub use program::{Host, NullHost, OsHost, Program};
pub use rules::{Rule, RuleContext, RuleMeta, RuleSet, run_rules};
pub use types::{Type, TypeId, TypeKind, TypeTable};
