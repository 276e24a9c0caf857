//! Wire protocol buffer compiler for Rust
//!
//! Loads `.proto` files, optionally prunes the type graph to the types
//! reachable from a set of roots, and emits one Rust source file per
//! top-level type. Generated code depends on the `wire` crate.
//!
//! ```rust,no_run
//! use wire_compiler::{Compiler, CompilerConfig};
//! use wire_schema::IdentifierSet;
//!
//! let config = CompilerConfig::new("src/proto")
//!     .proto_path("protos")
//!     .source_file("squareup/person.proto")
//!     .identifier_set(IdentifierSet::builder().include("squareup.Person").build());
//!
//! let report = Compiler::new(config).compile()?;
//! for artifact in &report.artifacts {
//!     println!("{}", artifact.path.display());
//! }
//! # Ok::<(), wire_compiler::CompileError>(())
//! ```
//!
//! Generated types refer to each other by absolute path from
//! [`CompilerConfig::rust_root`], so the including crate declares one module
//! per package segment and `include!`s each artifact into the module of its
//! package.

pub mod compiler;
pub mod config;
pub mod emitter;
pub mod error;
pub mod generator;
mod names;

pub use compiler::{Artifact, CompileReport, Compiler};
pub use config::CompilerConfig;
pub use emitter::{ArtifactWriter, FsWriter};
pub use error::{CompileError, CompileResult};
pub use generator::{CODE_GENERATED_BY_WIRE, RustGenerator};
