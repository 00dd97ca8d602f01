//! `NodeArena`: flat storage for one file's AST, addressed by `NodeIndex`.
//!
//! A parallel `parents` array holds the navigational back-references filled
//! in by the linking pass. Keeping parents out of `Node` makes the ownership
//! story explicit: children are owned through `NodeKind` fields, parents are
//! plain indices.

use crate::node::{
    BinaryOp, EventDirection, Node, NodeKind, PortDirection, UnaryOp,
};
use dzn_common::Span;
use serde::Serialize;

/// Handle into a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Sentinel used in the parent array before linking.
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }
}

#[derive(Default, Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
    parents: Vec<NodeIndex>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
            parents: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            recovered: Vec::new(),
        });
        self.parents.push(NodeIndex::NONE);
        idx
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.0 as usize)
    }

    pub fn kind(&self, idx: NodeIndex) -> Option<&NodeKind> {
        self.get(idx).map(|n| &n.kind)
    }

    pub fn span(&self, idx: NodeIndex) -> Span {
        self.get(idx).map(|n| n.span).unwrap_or(Span::EMPTY)
    }

    /// Parent assigned by the linking pass, if any.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        let p = *self.parents.get(idx.0 as usize)?;
        if p.is_none() { None } else { Some(p) }
    }

    pub(crate) fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if let Some(slot) = self.parents.get_mut(child.0 as usize) {
            *slot = parent;
        }
    }

    /// Attach an error-recovery node to `owner`. Recovery nodes participate
    /// in linking and traversal like structural children.
    pub fn attach_recovered(&mut self, owner: NodeIndex, error: NodeIndex) {
        if let Some(node) = self.nodes.get_mut(owner.0 as usize) {
            node.recovered.push(error);
        }
    }

    /// Text of an identifier node, or of the member side of a compound name.
    pub fn identifier_text(&self, idx: NodeIndex) -> Option<&str> {
        match self.kind(idx)? {
            NodeKind::Identifier { text } => Some(text),
            NodeKind::Compound { member, .. } => self.identifier_text(*member),
            NodeKind::TypeRef { name } => self.identifier_text(*name),
            _ => None,
        }
    }

    /// Name under which a declaration is entered into a scope table.
    pub fn declared_name(&self, idx: NodeIndex) -> Option<&str> {
        match self.kind(idx)? {
            NodeKind::Namespace { name, .. }
            | NodeKind::Interface { name, .. }
            | NodeKind::Component { name, .. }
            | NodeKind::Instance { name, .. }
            | NodeKind::Port { name, .. }
            | NodeKind::Event { name, .. }
            | NodeKind::Function { name, .. }
            | NodeKind::Parameter { name, .. }
            | NodeKind::Variable { name, .. }
            | NodeKind::EnumDecl { name, .. }
            | NodeKind::EnumMember { name }
            | NodeKind::Extern { name, .. }
            | NodeKind::Subrange { name, .. } => self.identifier_text(*name),
            _ => None,
        }
    }

    // ----- construction helpers -------------------------------------------
    //
    // The parser materializes trees through these; the test suites use them
    // directly.

    pub fn add_identifier(&mut self, text: impl Into<String>, span: Span) -> NodeIndex {
        self.alloc(
            NodeKind::Identifier { text: text.into() },
            span,
        )
    }

    pub fn add_compound(
        &mut self,
        head: Option<NodeIndex>,
        member: NodeIndex,
        span: Span,
    ) -> NodeIndex {
        self.alloc(NodeKind::Compound { head, member }, span)
    }

    pub fn add_type_ref(&mut self, name: NodeIndex, span: Span) -> NodeIndex {
        self.alloc(NodeKind::TypeRef { name }, span)
    }

    pub fn add_file(&mut self, statements: Vec<NodeIndex>, span: Span) -> NodeIndex {
        self.alloc(NodeKind::File { statements }, span)
    }

    pub fn add_import(&mut self, path: impl Into<String>, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Import { path: path.into() }, span)
    }

    pub fn add_namespace(
        &mut self,
        name: NodeIndex,
        statements: Vec<NodeIndex>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(NodeKind::Namespace { name, statements }, span)
    }

    pub fn add_interface(
        &mut self,
        name: NodeIndex,
        body: Vec<NodeIndex>,
        behavior: Option<NodeIndex>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(
            NodeKind::Interface {
                name,
                body,
                behavior,
            },
            span,
        )
    }

    pub fn add_component(
        &mut self,
        name: NodeIndex,
        ports: Vec<NodeIndex>,
        behavior: Option<NodeIndex>,
        system: Option<NodeIndex>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(
            NodeKind::Component {
                name,
                ports,
                behavior,
                system,
            },
            span,
        )
    }

    pub fn add_system(
        &mut self,
        instances: Vec<NodeIndex>,
        bindings: Vec<NodeIndex>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(
            NodeKind::System {
                instances,
                bindings,
            },
            span,
        )
    }

    pub fn add_instance(&mut self, type_ref: NodeIndex, name: NodeIndex, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Instance { type_ref, name }, span)
    }

    pub fn add_binding(&mut self, left: NodeIndex, right: NodeIndex, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Binding { left, right }, span)
    }

    pub fn add_wildcard(&mut self, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Wildcard, span)
    }

    pub fn add_port(
        &mut self,
        direction: PortDirection,
        type_ref: NodeIndex,
        name: NodeIndex,
        span: Span,
    ) -> NodeIndex {
        self.alloc(
            NodeKind::Port {
                direction,
                type_ref,
                name,
            },
            span,
        )
    }

    pub fn add_event(
        &mut self,
        direction: EventDirection,
        type_ref: NodeIndex,
        name: NodeIndex,
        formals: Vec<NodeIndex>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(
            NodeKind::Event {
                direction,
                type_ref,
                name,
                formals,
            },
            span,
        )
    }

    pub fn add_behavior(&mut self, statements: Vec<NodeIndex>, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Behavior { statements }, span)
    }

    pub fn add_function(
        &mut self,
        return_type: NodeIndex,
        name: NodeIndex,
        formals: Vec<NodeIndex>,
        body: Option<NodeIndex>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(
            NodeKind::Function {
                return_type,
                name,
                formals,
                body,
            },
            span,
        )
    }

    pub fn add_parameter(
        &mut self,
        type_ref: Option<NodeIndex>,
        name: NodeIndex,
        span: Span,
    ) -> NodeIndex {
        self.alloc(NodeKind::Parameter { type_ref, name }, span)
    }

    pub fn add_variable(
        &mut self,
        type_ref: NodeIndex,
        name: NodeIndex,
        initializer: Option<NodeIndex>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(
            NodeKind::Variable {
                type_ref,
                name,
                initializer,
            },
            span,
        )
    }

    pub fn add_enum(&mut self, name: NodeIndex, members: Vec<NodeIndex>, span: Span) -> NodeIndex {
        self.alloc(NodeKind::EnumDecl { name, members }, span)
    }

    pub fn add_enum_member(&mut self, name: NodeIndex, span: Span) -> NodeIndex {
        self.alloc(NodeKind::EnumMember { name }, span)
    }

    pub fn add_extern(
        &mut self,
        name: NodeIndex,
        value: impl Into<String>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(
            NodeKind::Extern {
                name,
                value: value.into(),
            },
            span,
        )
    }

    pub fn add_subrange(&mut self, name: NodeIndex, from: i64, to: i64, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Subrange { name, from, to }, span)
    }

    pub fn add_on(&mut self, triggers: Vec<NodeIndex>, body: NodeIndex, span: Span) -> NodeIndex {
        self.alloc(NodeKind::On { triggers, body }, span)
    }

    pub fn add_trigger(
        &mut self,
        name: NodeIndex,
        formals: Vec<NodeIndex>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(NodeKind::Trigger { name, formals }, span)
    }

    pub fn add_guard(
        &mut self,
        condition: Option<NodeIndex>,
        body: NodeIndex,
        span: Span,
    ) -> NodeIndex {
        self.alloc(NodeKind::Guard { condition, body }, span)
    }

    pub fn add_block(&mut self, statements: Vec<NodeIndex>, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Block { statements }, span)
    }

    pub fn add_call(
        &mut self,
        callee: NodeIndex,
        arguments: Vec<NodeIndex>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(NodeKind::Call { callee, arguments }, span)
    }

    pub fn add_binary(
        &mut self,
        op: BinaryOp,
        left: NodeIndex,
        right: NodeIndex,
        span: Span,
    ) -> NodeIndex {
        self.alloc(NodeKind::Binary { op, left, right }, span)
    }

    pub fn add_unary(&mut self, op: UnaryOp, operand: NodeIndex, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Unary { op, operand }, span)
    }

    pub fn add_assign(&mut self, target: NodeIndex, value: NodeIndex, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Assign { target, value }, span)
    }

    pub fn add_return(&mut self, expression: Option<NodeIndex>, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Return { expression }, span)
    }

    pub fn add_if(
        &mut self,
        condition: NodeIndex,
        then_branch: NodeIndex,
        else_branch: Option<NodeIndex>,
        span: Span,
    ) -> NodeIndex {
        self.alloc(
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        )
    }

    pub fn add_expr_statement(&mut self, expression: NodeIndex, span: Span) -> NodeIndex {
        self.alloc(NodeKind::ExprStatement { expression }, span)
    }

    pub fn add_error(&mut self, text: impl Into<String>, span: Span) -> NodeIndex {
        self.alloc(NodeKind::Error { text: text.into() }, span)
    }
}
