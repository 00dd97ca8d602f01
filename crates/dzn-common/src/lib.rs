//! Common types for the dzn analyzer.
//!
//! This crate provides the foundational types shared by every other crate:
//! - Source spans (`Span`)
//! - Diagnostics (`Diagnostic`, `Severity`, `DiagnosticRelatedInformation`)

pub mod diagnostics;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticRelatedInformation, Severity, format_message};
pub use span::Span;
