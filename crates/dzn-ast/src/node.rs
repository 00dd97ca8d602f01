//! Node definitions: one closed tagged union over every syntactic kind.
//!
//! The enum is deliberately closed: the binder, visitor and checker match on
//! it exhaustively, so adding a kind without updating those passes fails to
//! compile instead of surfacing as a runtime "unknown node kind" error.

use crate::arena::NodeIndex;
use dzn_common::Span;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PortDirection {
    Provides,
    Requires,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EventDirection {
    In,
    Out,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    And,
    Or,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Plus,
    Minus,
}

impl BinaryOp {
    /// Operators whose result is boolean regardless of operand types.
    pub fn is_boolean(self) -> bool {
        !matches!(self, BinaryOp::Plus | BinaryOp::Minus)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Minus,
}

/// The syntactic kind of a node, with its structural children inline.
///
/// Children are stored as `NodeIndex` handles (or lists thereof) into the
/// owning arena. `Option<NodeIndex>` marks genuinely optional children;
/// error recovery never replaces a child with a sentinel, it attaches
/// recovery nodes to [`Node::recovered`] instead.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    File {
        statements: Vec<NodeIndex>,
    },
    Import {
        path: String,
    },
    Namespace {
        /// Always an `Identifier`; dotted declarations are desugared into
        /// nested namespaces by the parser.
        name: NodeIndex,
        statements: Vec<NodeIndex>,
    },
    Interface {
        name: NodeIndex,
        /// Events and nested type declarations, in declaration order.
        body: Vec<NodeIndex>,
        behavior: Option<NodeIndex>,
    },
    Component {
        name: NodeIndex,
        ports: Vec<NodeIndex>,
        behavior: Option<NodeIndex>,
        system: Option<NodeIndex>,
    },
    System {
        instances: Vec<NodeIndex>,
        bindings: Vec<NodeIndex>,
    },
    Instance {
        type_ref: NodeIndex,
        name: NodeIndex,
    },
    Binding {
        left: NodeIndex,
        right: NodeIndex,
    },
    /// The `*` endpoint in a binding (`p.* <=> ...`).
    Wildcard,
    Port {
        direction: PortDirection,
        type_ref: NodeIndex,
        name: NodeIndex,
    },
    Event {
        direction: EventDirection,
        type_ref: NodeIndex,
        name: NodeIndex,
        formals: Vec<NodeIndex>,
    },
    Behavior {
        statements: Vec<NodeIndex>,
    },
    Function {
        return_type: NodeIndex,
        name: NodeIndex,
        formals: Vec<NodeIndex>,
        body: Option<NodeIndex>,
    },
    /// Function/event formal, or a trigger formal (no type annotation).
    Parameter {
        type_ref: Option<NodeIndex>,
        name: NodeIndex,
    },
    Variable {
        type_ref: NodeIndex,
        name: NodeIndex,
        initializer: Option<NodeIndex>,
    },
    EnumDecl {
        name: NodeIndex,
        members: Vec<NodeIndex>,
    },
    EnumMember {
        name: NodeIndex,
    },
    Extern {
        name: NodeIndex,
        value: String,
    },
    Subrange {
        name: NodeIndex,
        from: i64,
        to: i64,
    },
    On {
        triggers: Vec<NodeIndex>,
        body: NodeIndex,
    },
    Trigger {
        /// Event name: `Identifier`, `Compound` (`port.event`), or one of
        /// the builtin trigger names (`optional`, `inevitable`).
        name: NodeIndex,
        formals: Vec<NodeIndex>,
    },
    Guard {
        /// `None` for the `otherwise` guard.
        condition: Option<NodeIndex>,
        body: NodeIndex,
    },
    Block {
        statements: Vec<NodeIndex>,
    },
    Identifier {
        text: String,
    },
    /// Dotted name `head.member`; `head` is `None` for global-scope names
    /// written with a leading dot.
    Compound {
        head: Option<NodeIndex>,
        member: NodeIndex,
    },
    /// Wrapper marking a name used in type position.
    TypeRef {
        name: NodeIndex,
    },
    Call {
        callee: NodeIndex,
        arguments: Vec<NodeIndex>,
    },
    Binary {
        op: BinaryOp,
        left: NodeIndex,
        right: NodeIndex,
    },
    Unary {
        op: UnaryOp,
        operand: NodeIndex,
    },
    Assign {
        target: NodeIndex,
        value: NodeIndex,
    },
    Return {
        expression: Option<NodeIndex>,
    },
    If {
        condition: NodeIndex,
        then_branch: NodeIndex,
        else_branch: Option<NodeIndex>,
    },
    ExprStatement {
        expression: NodeIndex,
    },
    /// Parse-error placeholder produced by recovery.
    Error {
        text: String,
    },
}

impl NodeKind {
    /// Kinds that introduce a lexical scope.
    pub fn is_scope_root(&self) -> bool {
        matches!(
            self,
            NodeKind::File { .. }
                | NodeKind::Namespace { .. }
                | NodeKind::Interface { .. }
                | NodeKind::Component { .. }
                | NodeKind::Behavior { .. }
                | NodeKind::Function { .. }
                | NodeKind::Block { .. }
                | NodeKind::On { .. }
                | NodeKind::System { .. }
        )
    }

    /// Kinds whose declaration introduces a *type* name. Used by the
    /// checker's type-reference filter during scope search.
    pub fn is_type_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::Component { .. }
                | NodeKind::EnumDecl { .. }
                | NodeKind::Extern { .. }
                | NodeKind::Interface { .. }
                | NodeKind::Subrange { .. }
                | NodeKind::Namespace { .. }
        )
    }
}

/// A single AST node: kind (with children), source range, and the list of
/// error-recovery nodes attached during parsing.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// Recovery nodes skipped over while parsing this node. They are part
    /// of the tree for linking and traversal purposes.
    pub recovered: Vec<NodeIndex>,
}

impl Node {
    /// Invoke `f` for every structural child, in source order, followed by
    /// the attached recovery nodes. This is the single child enumeration
    /// used by the linking pass and the traversal driver; a new kind that
    /// is not covered here fails the exhaustive match.
    pub fn for_each_child(&self, mut f: impl FnMut(NodeIndex)) {
        let mut opt = |child: &Option<NodeIndex>, f: &mut dyn FnMut(NodeIndex)| {
            if let Some(idx) = child {
                f(*idx);
            }
        };
        match &self.kind {
            NodeKind::File { statements }
            | NodeKind::Behavior { statements }
            | NodeKind::Block { statements } => {
                for &s in statements {
                    f(s);
                }
            }
            NodeKind::Import { .. }
            | NodeKind::Wildcard
            | NodeKind::Identifier { .. }
            | NodeKind::Error { .. } => {}
            NodeKind::Extern { name, .. } | NodeKind::Subrange { name, .. } => f(*name),
            NodeKind::Namespace { name, statements } => {
                f(*name);
                for &s in statements {
                    f(s);
                }
            }
            NodeKind::Interface {
                name,
                body,
                behavior,
            } => {
                f(*name);
                for &m in body {
                    f(m);
                }
                opt(behavior, &mut f);
            }
            NodeKind::Component {
                name,
                ports,
                behavior,
                system,
            } => {
                f(*name);
                for &p in ports {
                    f(p);
                }
                opt(behavior, &mut f);
                opt(system, &mut f);
            }
            NodeKind::System {
                instances,
                bindings,
            } => {
                for &i in instances {
                    f(i);
                }
                for &b in bindings {
                    f(b);
                }
            }
            NodeKind::Instance { type_ref, name } => {
                f(*type_ref);
                f(*name);
            }
            NodeKind::Binding { left, right } => {
                f(*left);
                f(*right);
            }
            NodeKind::Port {
                type_ref, name, ..
            } => {
                f(*type_ref);
                f(*name);
            }
            NodeKind::Event {
                type_ref,
                name,
                formals,
                ..
            } => {
                f(*type_ref);
                f(*name);
                for &p in formals {
                    f(p);
                }
            }
            NodeKind::Function {
                return_type,
                name,
                formals,
                body,
            } => {
                f(*return_type);
                f(*name);
                for &p in formals {
                    f(p);
                }
                opt(body, &mut f);
            }
            NodeKind::Parameter { type_ref, name } => {
                opt(type_ref, &mut f);
                f(*name);
            }
            NodeKind::Variable {
                type_ref,
                name,
                initializer,
            } => {
                f(*type_ref);
                f(*name);
                opt(initializer, &mut f);
            }
            NodeKind::EnumDecl { name, members } => {
                f(*name);
                for &m in members {
                    f(m);
                }
            }
            NodeKind::EnumMember { name } => f(*name),
            NodeKind::On { triggers, body } => {
                for &t in triggers {
                    f(t);
                }
                f(*body);
            }
            NodeKind::Trigger { name, formals } => {
                f(*name);
                for &p in formals {
                    f(p);
                }
            }
            NodeKind::Guard { condition, body } => {
                opt(condition, &mut f);
                f(*body);
            }
            NodeKind::Compound { head, member } => {
                opt(head, &mut f);
                f(*member);
            }
            NodeKind::TypeRef { name } => f(*name),
            NodeKind::Call { callee, arguments } => {
                f(*callee);
                for &a in arguments {
                    f(a);
                }
            }
            NodeKind::Binary { left, right, .. } => {
                f(*left);
                f(*right);
            }
            NodeKind::Unary { operand, .. } => f(*operand),
            NodeKind::Assign { target, value } => {
                f(*target);
                f(*value);
            }
            NodeKind::Return { expression } => opt(expression, &mut f),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                f(*condition);
                f(*then_branch);
                opt(else_branch, &mut f);
            }
            NodeKind::ExprStatement { expression } => f(*expression),
        }
        for &e in &self.recovered {
            f(e);
        }
    }
}
