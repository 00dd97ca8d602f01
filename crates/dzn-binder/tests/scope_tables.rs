//! Declaration-table coverage for every scope-introducing node kind, plus
//! namespace merging and import expansion against a mock program.

use dzn_ast::{FileId, NodeId, NodeIndex, PortDirection, SourceFile};
use dzn_binder::{ProgramView, SymbolBinder, SymbolDecl};
use dzn_common::Span;
use std::rc::Rc;

const SP: Span = Span::EMPTY;

/// Minimal program: files resolve imports by exact file name.
struct MockProgram {
    files: Vec<SourceFile>,
}

impl MockProgram {
    fn new() -> MockProgram {
        MockProgram { files: Vec::new() }
    }

    fn add(&mut self, source: SourceFile) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(source);
        id
    }

    fn root(&self, file: FileId) -> NodeId {
        NodeId::new(file, self.files[file.0 as usize].root.unwrap())
    }
}

impl ProgramView for MockProgram {
    fn source_file(&self, file: FileId) -> Option<&SourceFile> {
        self.files.get(file.0 as usize)
    }

    fn resolve_import(&self, import_path: &str, _from: FileId) -> Option<FileId> {
        self.files
            .iter()
            .position(|f| f.file_name.as_deref() == Some(import_path))
            .map(|i| FileId(i as u32))
    }

    fn file_path(&self, file: FileId) -> Option<&str> {
        self.files.get(file.0 as usize)?.file_name.as_deref()
    }
}

fn source(name: &str) -> SourceFile {
    SourceFile::new(Some(name.to_string()), "")
}

/// `interface I { in void e(); }` at file scope.
fn interface_file(name: &str, iface: &str) -> (SourceFile, NodeIndex) {
    let mut s = source(name);
    let a = &mut s.arena;
    let void_name = a.add_identifier("void", SP);
    let void_ref = a.add_type_ref(void_name, SP);
    let e_name = a.add_identifier("e", SP);
    let event = a.add_event(dzn_ast::EventDirection::In, void_ref, e_name, vec![], SP);
    let i_name = a.add_identifier(iface, SP);
    let iface_node = a.add_interface(i_name, vec![event], None, SP);
    let root = a.add_file(vec![iface_node], SP);
    s.set_root(root);
    (s, iface_node)
}

#[test]
fn file_scope_collects_type_declarations() {
    let mut program = MockProgram::new();
    let mut s = source("a.dzn");
    let a = &mut s.arena;
    let e_name = a.add_identifier("Color", SP);
    let red = {
        let n = a.add_identifier("red", SP);
        a.add_enum_member(n, SP)
    };
    let enum_decl = a.add_enum(e_name, vec![red], SP);
    let x_name = a.add_identifier("millis", SP);
    let ext = a.add_extern(x_name, "int", SP);
    let c_name = a.add_identifier("Comp", SP);
    let comp = a.add_component(c_name, vec![], None, None, SP);
    let root = a.add_file(vec![enum_decl, ext, comp], SP);
    s.set_root(root);
    let file = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(program.root(file), &program);
    assert_eq!(
        table.keys().collect::<Vec<_>>(),
        vec!["Color", "millis", "Comp"]
    );
}

#[test]
fn declaration_tables_are_memoized() {
    let mut program = MockProgram::new();
    let (s, _) = interface_file("a.dzn", "I");
    let file = program.add(s);

    let mut binder = SymbolBinder::new();
    let first = binder.declarations_in(program.root(file), &program);
    let second = binder.declarations_in(program.root(file), &program);
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn namespace_fragments_merge_into_one_symbol() {
    let mut program = MockProgram::new();
    let mut s = source("a.dzn");
    let a = &mut s.arena;
    let first = {
        let i_name = a.add_identifier("A", SP);
        let iface = a.add_interface(i_name, vec![], None, SP);
        let ns_name = a.add_identifier("NS", SP);
        a.add_namespace(ns_name, vec![iface], SP)
    };
    let second = {
        let i_name = a.add_identifier("B", SP);
        let iface = a.add_interface(i_name, vec![], None, SP);
        let ns_name = a.add_identifier("NS", SP);
        a.add_namespace(ns_name, vec![iface], SP)
    };
    let root = a.add_file(vec![first, second], SP);
    s.set_root(root);
    let file = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(program.root(file), &program);
    assert_eq!(table.len(), 1);
    let sym = table["NS"];
    let fragments = binder
        .symbols
        .get(sym)
        .namespace_fragments()
        .expect("merged namespace")
        .to_vec();
    assert_eq!(fragments.len(), 2);

    let members = binder.namespace_members(&fragments, &program);
    assert_eq!(members.keys().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[test]
fn three_fragments_merge_transitively() {
    // Three namespace NS fragments, one extern each; the merged view exposes
    // all of NS.A, NS.B, NS.C regardless of declaration order.
    let mut program = MockProgram::new();
    let mut s = source("a.dzn");
    let a = &mut s.arena;
    let mut fragments = Vec::new();
    for ext in ["A", "B", "C"] {
        let x_name = a.add_identifier(ext, SP);
        let decl = a.add_extern(x_name, "int", SP);
        let ns_name = a.add_identifier("NS", SP);
        fragments.push(a.add_namespace(ns_name, vec![decl], SP));
    }
    let root = a.add_file(fragments, SP);
    s.set_root(root);
    let file = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(program.root(file), &program);
    let frags = binder
        .symbols
        .get(table["NS"])
        .namespace_fragments()
        .unwrap()
        .to_vec();
    assert_eq!(frags.len(), 3);
    let members = binder.namespace_members(&frags, &program);
    assert_eq!(members.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
}

#[test]
fn nested_namespaces_merge_transitively() {
    // NS { M { A } } and NS { M { B } }: the merged NS exposes one M whose
    // members are the union of both inner fragments.
    let mut program = MockProgram::new();
    fn outer(a: &mut dzn_ast::NodeArena, inner_iface: &str) -> NodeIndex {
        let i_name = a.add_identifier(inner_iface, SP);
        let iface = a.add_interface(i_name, vec![], None, SP);
        let m_name = a.add_identifier("M", SP);
        let m = a.add_namespace(m_name, vec![iface], SP);
        let ns_name = a.add_identifier("NS", SP);
        a.add_namespace(ns_name, vec![m], SP)
    }
    let mut s = source("a.dzn");
    let a = &mut s.arena;
    let first = outer(a, "A");
    let second = outer(a, "B");
    let root = a.add_file(vec![first, second], SP);
    s.set_root(root);
    let file = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(program.root(file), &program);
    let ns_fragments = binder.symbols.get(table["NS"]).namespace_fragments().unwrap().to_vec();
    let ns_members = binder.namespace_members(&ns_fragments, &program);

    let m_fragments = binder.symbols.get(ns_members["M"]).namespace_fragments().unwrap().to_vec();
    assert_eq!(m_fragments.len(), 2);
    let m_members = binder.namespace_members(&m_fragments, &program);
    assert_eq!(m_members.keys().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[test]
fn imports_expand_into_the_file_scope() {
    let mut program = MockProgram::new();
    let (lib, _) = interface_file("lib.dzn", "I");
    program.add(lib);

    let mut s = source("main.dzn");
    let a = &mut s.arena;
    let import = a.add_import("lib.dzn", SP);
    let c_name = a.add_identifier("C", SP);
    let comp = a.add_component(c_name, vec![], None, None, SP);
    let root = a.add_file(vec![import, comp], SP);
    s.set_root(root);
    let main = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(program.root(main), &program);
    assert!(table.contains_key("C"));
    assert!(table.contains_key("I"));
}

#[test]
fn imported_symbol_is_identical_to_source_symbol() {
    let mut program = MockProgram::new();
    let (lib, _) = interface_file("lib.dzn", "I");
    let lib_id = program.add(lib);

    let mut s = source("main.dzn");
    let import = s.arena.add_import("lib.dzn", SP);
    let root = s.arena.add_file(vec![import], SP);
    s.set_root(root);
    let main = program.add(s);

    let mut binder = SymbolBinder::new();
    let via_import = binder.declarations_in(program.root(main), &program)["I"];
    let direct = binder.declarations_in(program.root(lib_id), &program)["I"];
    assert_eq!(via_import, direct);
}

#[test]
fn unresolvable_import_contributes_nothing() {
    let mut program = MockProgram::new();
    let mut s = source("main.dzn");
    let a = &mut s.arena;
    let import = a.add_import("missing.dzn", SP);
    let c_name = a.add_identifier("C", SP);
    let comp = a.add_component(c_name, vec![], None, None, SP);
    let root = a.add_file(vec![import, comp], SP);
    s.set_root(root);
    let main = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(program.root(main), &program);
    assert_eq!(table.keys().collect::<Vec<_>>(), vec!["C"]);
}

#[test]
fn import_cycles_terminate() {
    let mut program = MockProgram::new();

    let mut a_src = source("a.dzn");
    let import_b = a_src.arena.add_import("b.dzn", SP);
    let a_name = a_src.arena.add_identifier("A", SP);
    let a_iface = a_src.arena.add_interface(a_name, vec![], None, SP);
    let a_root = a_src.arena.add_file(vec![import_b, a_iface], SP);
    a_src.set_root(a_root);
    let a_id = program.add(a_src);

    let mut b_src = source("b.dzn");
    let import_a = b_src.arena.add_import("a.dzn", SP);
    let b_name = b_src.arena.add_identifier("B", SP);
    let b_iface = b_src.arena.add_interface(b_name, vec![], None, SP);
    let b_root = b_src.arena.add_file(vec![import_a, b_iface], SP);
    b_src.set_root(b_root);
    let b_id = program.add(b_src);

    let mut binder = SymbolBinder::new();
    let a_table = binder.declarations_in(program.root(a_id), &program);
    // The cycle back into a.dzn contributes nothing to b's inner expansion,
    // but a's own view still sees both declarations.
    assert!(a_table.contains_key("A"));
    assert!(a_table.contains_key("B"));

    let mut fresh = SymbolBinder::new();
    let b_table = fresh.declarations_in(program.root(b_id), &program);
    assert!(b_table.contains_key("A"));
    assert!(b_table.contains_key("B"));
}

#[test]
fn local_declaration_wins_over_import() {
    let mut program = MockProgram::new();
    let (lib, lib_iface) = interface_file("lib.dzn", "I");
    let lib_id = program.add(lib);

    let (mut s, local_iface) = interface_file("main.dzn", "I");
    // Rebuild the root with an import in front.
    let import = s.arena.add_import("lib.dzn", SP);
    let root = s.arena.add_file(vec![import, local_iface], SP);
    s.set_root(root);
    let main = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(program.root(main), &program);
    let sym = binder.symbols.get(table["I"]).clone();
    assert_eq!(sym.decl, SymbolDecl::Node(NodeId::new(main, local_iface)));
    assert_ne!(sym.decl, SymbolDecl::Node(NodeId::new(lib_id, lib_iface)));
}

#[test]
fn interface_scope_declares_events_and_types() {
    let mut program = MockProgram::new();
    let mut s = source("a.dzn");
    let a = &mut s.arena;
    let event = {
        let t = a.add_identifier("void", SP);
        let tr = a.add_type_ref(t, SP);
        let n = a.add_identifier("hello", SP);
        a.add_event(dzn_ast::EventDirection::In, tr, n, vec![], SP)
    };
    let enum_decl = {
        let n = a.add_identifier("State", SP);
        let m = a.add_identifier("idle", SP);
        let m = a.add_enum_member(m, SP);
        a.add_enum(n, vec![m], SP)
    };
    let sub = {
        let n = a.add_identifier("Small", SP);
        a.add_subrange(n, 0, 9, SP)
    };
    let i_name = a.add_identifier("I", SP);
    let iface = a.add_interface(i_name, vec![event, enum_decl, sub], None, SP);
    let root = a.add_file(vec![iface], SP);
    s.set_root(root);
    let file = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(NodeId::new(file, iface), &program);
    assert_eq!(
        table.keys().collect::<Vec<_>>(),
        vec!["hello", "State", "Small"]
    );
}

#[test]
fn component_scope_declares_ports() {
    let mut program = MockProgram::new();
    let mut s = source("a.dzn");
    let a = &mut s.arena;
    let port = {
        let t = a.add_identifier("I", SP);
        let tr = a.add_type_ref(t, SP);
        let n = a.add_identifier("p", SP);
        a.add_port(PortDirection::Requires, tr, n, SP)
    };
    let c_name = a.add_identifier("C", SP);
    let comp = a.add_component(c_name, vec![port], None, None, SP);
    let root = a.add_file(vec![comp], SP);
    s.set_root(root);
    let file = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(NodeId::new(file, comp), &program);
    assert_eq!(table.keys().collect::<Vec<_>>(), vec!["p"]);
}

#[test]
fn behavior_block_function_and_on_scopes() {
    let mut program = MockProgram::new();
    let mut s = source("a.dzn");
    let a = &mut s.arena;

    let local = {
        let t = a.add_identifier("bool", SP);
        let tr = a.add_type_ref(t, SP);
        let n = a.add_identifier("inner", SP);
        a.add_variable(tr, n, None, SP)
    };
    let block = a.add_block(vec![local], SP);

    let formal = {
        let t = a.add_identifier("bool", SP);
        let tr = a.add_type_ref(t, SP);
        let n = a.add_identifier("flag", SP);
        a.add_parameter(Some(tr), n, SP)
    };
    let func = {
        let t = a.add_identifier("void", SP);
        let tr = a.add_type_ref(t, SP);
        let n = a.add_identifier("f", SP);
        a.add_function(tr, n, vec![formal], Some(block), SP)
    };

    let trigger_formal = {
        let n = a.add_identifier("arg", SP);
        a.add_parameter(None, n, SP)
    };
    let on = {
        let n = a.add_identifier("e", SP);
        let trigger = a.add_trigger(n, vec![trigger_formal], SP);
        let body = a.add_block(vec![], SP);
        a.add_on(vec![trigger], body, SP)
    };

    let state = {
        let t = a.add_identifier("bool", SP);
        let tr = a.add_type_ref(t, SP);
        let n = a.add_identifier("busy", SP);
        a.add_variable(tr, n, None, SP)
    };
    let behavior = a.add_behavior(vec![state, func, on], SP);
    let i_name = a.add_identifier("I", SP);
    let iface = a.add_interface(i_name, vec![], Some(behavior), SP);
    let root = a.add_file(vec![iface], SP);
    s.set_root(root);
    let file = program.add(s);

    let mut binder = SymbolBinder::new();
    let behavior_table = binder.declarations_in(NodeId::new(file, behavior), &program);
    assert_eq!(
        behavior_table.keys().collect::<Vec<_>>(),
        vec!["busy", "f"]
    );

    let func_table = binder.declarations_in(NodeId::new(file, func), &program);
    assert_eq!(func_table.keys().collect::<Vec<_>>(), vec!["flag"]);

    let block_table = binder.declarations_in(NodeId::new(file, block), &program);
    assert_eq!(block_table.keys().collect::<Vec<_>>(), vec!["inner"]);

    let on_table = binder.declarations_in(NodeId::new(file, on), &program);
    assert_eq!(on_table.keys().collect::<Vec<_>>(), vec!["arg"]);
}

#[test]
fn system_scope_declares_instances() {
    let mut program = MockProgram::new();
    let mut s = source("a.dzn");
    let a = &mut s.arena;
    let instance = {
        let t = a.add_identifier("Worker", SP);
        let tr = a.add_type_ref(t, SP);
        let n = a.add_identifier("w", SP);
        a.add_instance(tr, n, SP)
    };
    let system = a.add_system(vec![instance], vec![], SP);
    let c_name = a.add_identifier("Top", SP);
    let comp = a.add_component(c_name, vec![], None, Some(system), SP);
    let root = a.add_file(vec![comp], SP);
    s.set_root(root);
    let file = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(NodeId::new(file, system), &program);
    assert_eq!(table.keys().collect::<Vec<_>>(), vec!["w"]);
}

#[test]
fn non_scope_nodes_yield_empty_tables() {
    let mut program = MockProgram::new();
    let mut s = source("a.dzn");
    let ident = s.arena.add_identifier("x", SP);
    let root = s.arena.add_file(vec![], SP);
    s.set_root(root);
    let file = program.add(s);

    let mut binder = SymbolBinder::new();
    let table = binder.declarations_in(NodeId::new(file, ident), &program);
    assert!(table.is_empty());
}
