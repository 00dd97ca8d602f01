//! Disk-backed import resolution through `OsHost`.

use dzn_ast::SourceFile;
use dzn_checker::{Host, OsHost, Program};
use std::fs;

#[test]
fn os_host_resolves_imports_against_search_paths() {
    let dir = tempfile::tempdir().unwrap();
    let lib = dir.path().join("iface.dzn");
    fs::write(&lib, "interface I {}").unwrap();

    let host = OsHost::new(vec![dir.path().to_path_buf()]);
    let mut program = Program::new(Box::new(host));
    let main = program.add_source_file(SourceFile::new(Some("main.dzn".into()), ""));

    // Not in the in-memory set, so the disk pass finds it.
    assert_eq!(program.resolve_import_path("iface.dzn", main), Some(lib));
    assert_eq!(program.resolve_import_path("missing.dzn", main), None);
}

#[test]
fn in_memory_sources_shadow_the_disk() {
    let dir = tempfile::tempdir().unwrap();
    let on_disk = dir.path().join("iface.dzn");
    fs::write(&on_disk, "interface I {}").unwrap();

    let host = OsHost::new(vec![dir.path().to_path_buf()]);
    let mut program = Program::new(Box::new(host));
    let main = program.add_source_file(SourceFile::new(Some("main.dzn".into()), ""));
    program.add_source_file(SourceFile::new(Some("iface.dzn".into()), ""));

    // The importing file's directory candidate is registered in memory and
    // wins over the search-path hit on disk.
    assert_eq!(
        program.resolve_import_path("iface.dzn", main),
        Some("iface.dzn".into())
    );
}

#[test]
fn os_host_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.dzn");
    fs::write(&path, "component C {}").unwrap();

    let host = OsHost::new(vec![]);
    assert!(host.file_exists(&path));
    assert_eq!(host.read_file(&path), Some("component C {}".to_string()));
    assert!(!host.file_exists(&dir.path().join("b.dzn")));
}
