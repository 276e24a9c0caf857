//! Generation dispatcher: load, prune, generate, persist.
//!
//! A compile is all-or-nothing up to the first write. Every artifact is
//! generated before any is persisted, so a type that fails to generate
//! leaves the output directory untouched.

use std::path::PathBuf;

use tracing::debug;
use wire_schema::{Diagnostics, FileOrigin, ProtoFile, SchemaLoader, prune};

use crate::config::CompilerConfig;
use crate::emitter::{ArtifactWriter, FsWriter};
use crate::error::{CompileError, CompileResult};
use crate::generator::RustGenerator;
use crate::names::file_stem;

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Package of the type, if its file declares one
    pub namespace: Option<String>,
    /// Simple name of the top-level type
    pub name: String,
    /// Destination below the output directory
    pub path: PathBuf,
    pub source: String,
}

impl Artifact {
    /// `pkg.Name`, or just `Name` without a package
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Outcome of a successful compile
#[derive(Debug, Clone, Default)]
pub struct CompileReport {
    /// Artifacts in generation order; not written in a dry run
    pub artifacts: Vec<Artifact>,
    pub diagnostics: Diagnostics,
}

impl CompileReport {
    /// Destination of every artifact, in generation order
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.artifacts.iter().map(|artifact| &artifact.path)
    }
}

pub struct Compiler<W = FsWriter> {
    config: CompilerConfig,
    writer: W,
}

impl Compiler<FsWriter> {
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_writer(config, FsWriter)
    }
}

impl<W: ArtifactWriter> Compiler<W> {
    pub fn with_writer(config: CompilerConfig, writer: W) -> Self {
        Self { config, writer }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn compile(&mut self) -> CompileResult<CompileReport> {
        let mut diagnostics = Diagnostics::new();

        let mut loader = SchemaLoader::new();
        for root in &self.config.proto_paths {
            loader.add_source(root.clone());
        }
        for name in &self.config.source_files {
            loader.add_proto(name.clone());
        }
        let mut schema = loader.load(&mut diagnostics)?;

        let identifier_set = &self.config.identifier_set;
        if !identifier_set.is_empty() {
            diagnostics.info("Analyzing dependencies of root types.");
            let pruned = prune(&schema, identifier_set);
            for rule in &pruned.report.unused_includes {
                diagnostics.info(format!("Unused include: {rule}"));
            }
            for rule in &pruned.report.unused_excludes {
                diagnostics.info(format!("Unused exclude: {rule}"));
            }
            schema = pruned.schema;
        }

        let generator = RustGenerator::new(&schema, &self.config.rust_root)?
            .with_options(self.config.emit_options);

        let mut artifacts = Vec::new();
        for file in schema.files() {
            if !self.is_emitted(file) {
                debug!(path = file.path(), "skipping file loaded only for its types");
                continue;
            }

            for ty in &file.types {
                let name = ty.simple_name().to_string();
                let source = generator.generate(file, ty)?;
                let artifact = Artifact {
                    namespace: ty.package.clone(),
                    path: self.destination(ty.package.as_deref(), &name),
                    name,
                    source,
                };
                debug!(type_name = %ty.name, path = %artifact.path.display(), "generated");
                artifacts.push(artifact);
            }
        }

        for artifact in &artifacts {
            if self.config.dry_run {
                diagnostics.info(format!("Would write {}", artifact.path.display()));
                continue;
            }
            self.writer
                .write(&artifact.path, &artifact.source)
                .map_err(|source| CompileError::Emit {
                    namespace: artifact.namespace.clone(),
                    name: artifact.name.clone(),
                    path: artifact.path.clone(),
                    source,
                })?;
            diagnostics.info(format!(
                "Writing {} to {}",
                artifact.qualified_name(),
                artifact.path.display()
            ));
        }

        Ok(CompileReport {
            artifacts,
            diagnostics,
        })
    }

    /// Files not named by the caller are loaded only to resolve references
    fn is_emitted(&self, file: &ProtoFile) -> bool {
        file.origin == FileOrigin::Explicit
    }

    /// `<out>/<package segments>/<snake_case name>.rs`
    fn destination(&self, package: Option<&str>, name: &str) -> PathBuf {
        let mut path = self.config.out_dir.clone();
        if let Some(package) = package {
            path.extend(package.split('.').map(file_stem));
        }
        path.push(format!("{}.rs", file_stem(name)));
        path
    }
}
