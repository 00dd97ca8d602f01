//! Rule registration and the per-file driver.
//!
//! Rules are the checker's consumers: each one inspects nodes during a
//! scope-aware walk and reports diagnostics through [`RuleContext`]. Codes
//! are immutable, claimed once at registration.

use crate::checker::TypeChecker;
use crate::error::InternalError;
use crate::program::Program;
use dzn_ast::{FileId, NodeId, NodeIndex, SourceFile};
use dzn_binder::{ScopeStack, VisitAction, visit};
use dzn_common::{Diagnostic, Severity, Span};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Code reserved for the internal-error fallback diagnostic.
pub const INTERNAL_ERROR_CODE: u32 = 0;

/// Identity of a rule: its stable code, name, and default severity.
#[derive(Clone, Copy, Debug)]
pub struct RuleMeta {
    pub code: u32,
    pub name: &'static str,
    pub severity: Severity,
}

/// One analysis rule. `check` is called for every node of every file, with
/// the live scope stack positioned at that node.
pub trait Rule {
    fn meta(&self) -> RuleMeta;

    fn check(&self, ctx: &mut RuleContext<'_, '_>, node: NodeIndex) -> Result<(), InternalError>;
}

/// Everything a rule sees at one node.
pub struct RuleContext<'a, 'p> {
    pub checker: &'a mut TypeChecker<'p>,
    pub scopes: &'a ScopeStack,
    pub file: FileId,
    pub source: &'p SourceFile,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a, 'p> RuleContext<'a, 'p> {
    pub fn program(&self) -> &'p Program {
        self.checker.program()
    }

    pub fn node_id(&self, node: NodeIndex) -> NodeId {
        NodeId::new(self.file, node)
    }

    pub fn report(&mut self, meta: &RuleMeta, node: NodeIndex, message: impl Into<String>) {
        let span = self
            .source
            .arena
            .get(node)
            .map(|n| n.span)
            .unwrap_or(Span::EMPTY);
        let diagnostic = Diagnostic {
            severity: meta.severity,
            code: meta.code,
            file: self.source.display_name().to_string(),
            span,
            message: message.into(),
            related_information: Vec::new(),
        };
        self.diagnostics.push(diagnostic);
    }
}

/// Registered rules, each holding a unique code.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
    codes: FxHashSet<u32>,
}

impl RuleSet {
    pub fn new() -> RuleSet {
        RuleSet::default()
    }

    /// Claim the rule's code. Codes collide only through a programming
    /// mistake, so a duplicate (or the reserved code) panics at startup.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        let meta = rule.meta();
        assert_ne!(meta.code, INTERNAL_ERROR_CODE, "code 0 is reserved");
        assert!(
            self.codes.insert(meta.code),
            "rule code {} registered twice",
            meta.code
        );
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Run every rule over every file of the program.
///
/// Parse diagnostics are carried through. An internal inconsistency raised
/// by the checker becomes one generic diagnostic at the offending node and
/// analysis continues with the next node.
pub fn run_rules(program: &Program, rules: &RuleSet) -> Vec<Diagnostic> {
    let mut checker = TypeChecker::new(program);
    let mut diagnostics = Vec::new();
    for (file, source) in program.files() {
        diagnostics.extend(source.parse_diagnostics.iter().cloned());
        let Some(root) = source.root else {
            continue;
        };
        let mut scopes = ScopeStack::new();
        visit(source, file, root, &mut scopes, &mut |node, scopes| {
            for rule in rules.rules() {
                let mut ctx = RuleContext {
                    checker: &mut checker,
                    scopes,
                    file,
                    source,
                    diagnostics: &mut diagnostics,
                };
                if let Err(err) = rule.check(&mut ctx, node) {
                    debug!(rule = rule.meta().name, error = %err, "rule aborted on internal error");
                    diagnostics.push(internal_error_diagnostic(program, source, &err));
                }
            }
            VisitAction::Descend
        });
    }
    diagnostics
}

fn internal_error_diagnostic(
    program: &Program,
    source: &SourceFile,
    err: &InternalError,
) -> Diagnostic {
    let (name, span) = match err.node {
        Some(node) => {
            let source = program.file(node.file).unwrap_or(source);
            let span = source
                .arena
                .get(node.node)
                .map(|n| n.span)
                .unwrap_or(Span::EMPTY);
            (source.display_name().to_string(), span)
        }
        None => (source.display_name().to_string(), Span::EMPTY),
    };
    Diagnostic::error(name, span, err.to_string(), INTERNAL_ERROR_CODE)
}
