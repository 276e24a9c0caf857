//! Compiler configuration.
//!
//! Built by the CLI from its flags, or constructed directly when the
//! compiler is driven as a library (from a build script, say).

use std::path::PathBuf;

use wire_schema::IdentifierSet;

/// Everything one compile needs to know
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Search roots, in lookup order
    pub proto_paths: Vec<PathBuf>,
    /// Directory artifacts are written below
    pub out_dir: PathBuf,
    /// Files to compile. Empty means every file found under the roots.
    pub source_files: Vec<String>,
    pub identifier_set: IdentifierSet,
    /// Emit `MESSAGE_OPTIONS` and `FIELD_OPTIONS_*` constants
    pub emit_options: bool,
    /// Generate everything but write nothing
    pub dry_run: bool,
    /// Module path generated type references start from
    pub rust_root: String,
}

impl CompilerConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            proto_paths: Vec::new(),
            out_dir: out_dir.into(),
            source_files: Vec::new(),
            identifier_set: IdentifierSet::default(),
            emit_options: true,
            dry_run: false,
            rust_root: "crate".to_string(),
        }
    }

    pub fn proto_path(mut self, root: impl Into<PathBuf>) -> Self {
        self.proto_paths.push(root.into());
        self
    }

    pub fn source_file(mut self, name: impl Into<String>) -> Self {
        self.source_files.push(name.into());
        self
    }

    pub fn identifier_set(mut self, identifier_set: IdentifierSet) -> Self {
        self.identifier_set = identifier_set;
        self
    }

    pub fn emit_options(mut self, emit_options: bool) -> Self {
        self.emit_options = emit_options;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn rust_root(mut self, rust_root: impl Into<String>) -> Self {
        self.rust_root = rust_root.into();
        self
    }
}
