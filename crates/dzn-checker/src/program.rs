//! Program: the top-level analysis session.
//!
//! Owns the source-file set and a pluggable host, and is the sole authority
//! mapping an import path to a concrete file. Resolution order: the
//! in-memory source set relative to the importing file, then each configured
//! search path, then the same order against the host's disk checks.

use dzn_ast::{FileId, SourceFile};
use dzn_binder::ProgramView;
use rustc_hash::FxHashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Host capabilities the program delegates to. All calls are synchronous
/// and assumed cheap; failures are `None`, never errors.
pub trait Host {
    fn file_exists(&self, path: &Path) -> bool;
    fn read_file(&self, path: &Path) -> Option<String>;
    fn search_paths(&self) -> &[PathBuf];
}

/// Disk-backed host.
pub struct OsHost {
    search_paths: Vec<PathBuf>,
}

impl OsHost {
    pub fn new(search_paths: Vec<PathBuf>) -> OsHost {
        OsHost { search_paths }
    }
}

impl Host for OsHost {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

/// Host with no disk: resolution only ever hits the in-memory source set.
#[derive(Default)]
pub struct NullHost {
    search_paths: Vec<PathBuf>,
}

impl NullHost {
    pub fn new() -> NullHost {
        NullHost::default()
    }

    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> NullHost {
        NullHost { search_paths }
    }
}

impl Host for NullHost {
    fn file_exists(&self, _path: &Path) -> bool {
        false
    }

    fn read_file(&self, _path: &Path) -> Option<String> {
        None
    }

    fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

/// Top-level session object owning the file set for its lifetime.
pub struct Program {
    files: Vec<SourceFile>,
    by_path: FxHashMap<PathBuf, FileId>,
    host: Box<dyn Host>,
}

impl Program {
    pub fn new(host: Box<dyn Host>) -> Program {
        Program {
            files: Vec::new(),
            by_path: FxHashMap::default(),
            host,
        }
    }

    /// Program with no disk access, for fully in-memory analysis.
    pub fn in_memory() -> Program {
        Program::new(Box::new(NullHost::new()))
    }

    pub fn add_source_file(&mut self, source: SourceFile) -> FileId {
        let id = FileId(self.files.len() as u32);
        if let Some(name) = &source.file_name {
            self.by_path.insert(normalize(Path::new(name)), id);
        }
        self.files.push(source);
        id
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, f)| (FileId(i as u32), f))
    }

    /// Source file registered under `path`, if any.
    pub fn get_source_file(&self, path: &Path) -> Option<FileId> {
        self.by_path.get(&normalize(path)).copied()
    }

    pub fn get_file_path(&self, id: FileId) -> Option<&str> {
        self.file(id)?.file_name.as_deref()
    }

    /// Resolve an import to a concrete path: in-memory set first, then each
    /// search path in order, then the same candidate order against the disk
    /// host. `None` on failure — absence, not an error.
    pub fn resolve_import_path(&self, import_path: &str, from: FileId) -> Option<PathBuf> {
        let candidates = self.import_candidates(import_path, from);
        for candidate in &candidates {
            if self.by_path.contains_key(candidate) {
                return Some(candidate.clone());
            }
        }
        for candidate in &candidates {
            if self.host.file_exists(candidate) {
                return Some(candidate.clone());
            }
        }
        debug!(import = %import_path, "import path did not resolve");
        None
    }

    fn import_candidates(&self, import_path: &str, from: FileId) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        let importing_dir = self
            .get_file_path(from)
            .map(|p| Path::new(p).parent().unwrap_or(Path::new("")).to_path_buf())
            .unwrap_or_default();
        candidates.push(normalize(&importing_dir.join(import_path)));
        for search_path in self.host.search_paths() {
            candidates.push(normalize(&search_path.join(import_path)));
        }
        candidates
    }
}

impl ProgramView for Program {
    fn source_file(&self, file: FileId) -> Option<&SourceFile> {
        self.file(file)
    }

    fn resolve_import(&self, import_path: &str, from: FileId) -> Option<FileId> {
        let path = self.resolve_import_path(import_path, from)?;
        self.by_path.get(&path).copied()
    }

    fn file_path(&self, file: FileId) -> Option<&str> {
        self.get_file_path(file)
    }
}

/// Textual path normalization: strips `.` components and folds `..` where a
/// parent segment is available. No filesystem access.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}
