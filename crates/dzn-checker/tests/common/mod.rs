#![allow(dead_code)]

//! Tree-building helpers shared by the integration suites. The parser is a
//! separate concern; these construct arenas directly.

use dzn_ast::{EventDirection, NodeArena, NodeIndex, PortDirection, SourceFile};
use dzn_common::Span;

pub const SP: Span = Span::EMPTY;

pub fn source(name: &str) -> SourceFile {
    SourceFile::new(Some(name.to_string()), "")
}

pub fn type_ref(a: &mut NodeArena, name: &str) -> NodeIndex {
    let id = a.add_identifier(name, SP);
    a.add_type_ref(id, SP)
}

/// `head.member` with an identifier head.
pub fn member_access(a: &mut NodeArena, head: &str, member: &str) -> NodeIndex {
    let head = a.add_identifier(head, SP);
    let member = a.add_identifier(member, SP);
    a.add_compound(Some(head), member, SP)
}

pub fn variable(a: &mut NodeArena, ty: &str, name: &str) -> NodeIndex {
    let tr = type_ref(a, ty);
    let n = a.add_identifier(name, SP);
    a.add_variable(tr, n, None, SP)
}

pub fn event_in(a: &mut NodeArena, ret: &str, name: &str) -> NodeIndex {
    let tr = type_ref(a, ret);
    let n = a.add_identifier(name, SP);
    a.add_event(EventDirection::In, tr, n, vec![], SP)
}

pub fn port(a: &mut NodeArena, direction: PortDirection, ty: &str, name: &str) -> NodeIndex {
    let tr = type_ref(a, ty);
    let n = a.add_identifier(name, SP);
    a.add_port(direction, tr, n, SP)
}

pub fn enum_decl(a: &mut NodeArena, name: &str, members: &[&str]) -> NodeIndex {
    let member_nodes = members
        .iter()
        .copied()
        .map(|m| {
            let n = a.add_identifier(m, SP);
            a.add_enum_member(n, SP)
        })
        .collect();
    let n = a.add_identifier(name, SP);
    a.add_enum(n, member_nodes, SP)
}

pub fn interface(a: &mut NodeArena, name: &str, body: Vec<NodeIndex>) -> NodeIndex {
    let n = a.add_identifier(name, SP);
    a.add_interface(n, body, None, SP)
}

/// `void <name>() { <statements> }`; returns (function, body block).
pub fn void_function(
    a: &mut NodeArena,
    name: &str,
    statements: Vec<NodeIndex>,
) -> (NodeIndex, NodeIndex) {
    let block = a.add_block(statements, SP);
    let tr = type_ref(a, "void");
    let n = a.add_identifier(name, SP);
    let func = a.add_function(tr, n, vec![], Some(block), SP);
    (func, block)
}
