//! Protocol buffer schema model for Wire
//!
//! This crate loads `.proto` files into a cross-referenced [`Schema`] and
//! prunes it down to the types an [`IdentifierSet`] asks for.
//!
//! ## Loading
//!
//! ```rust,no_run
//! use wire_schema::{Diagnostics, IdentifierSet, SchemaLoader};
//!
//! let mut diagnostics = Diagnostics::new();
//! let mut loader = SchemaLoader::new();
//! loader.add_source("protos").add_proto("squareup/person.proto");
//! let schema = loader.load(&mut diagnostics)?;
//!
//! let pruned = schema.prune(
//!     &IdentifierSet::builder()
//!         .include("squareup.Person")
//!         .exclude("squareup.Person#email")
//!         .build(),
//! );
//! for rule in &pruned.report.unused_includes {
//!     diagnostics.warn(format!("Unused include: {rule}"));
//! }
//! # Ok::<(), wire_schema::SchemaError>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **`parser`**: `.proto` text to an unlinked [`ProtoFile`]
//! 2. **`loader`**: search roots, imports and name resolution
//! 3. **`schema`**: the linked type graph, addressed by fully-qualified name
//! 4. **`prune`**: dependency closure of an identifier set

pub mod diagnostics;
pub mod error;
pub mod identifier_set;
pub mod loader;
pub mod parser;
pub mod prune;
pub mod schema;

pub use diagnostics::{Diagnostic, Diagnostics, Level};
pub use error::{SchemaError, SchemaResult};
pub use identifier_set::{IdentifierSet, IdentifierSetBuilder, Rule, Target};
pub use loader::{MAX_TAG, RESERVED_TAGS, SchemaLoader, normalize_proto_path};
pub use parser::{DefaultParser, ProtoParser};
pub use prune::{PruneReport, Pruned, prune};
pub use schema::{
    EnumConstant, EnumType, Field, FileOrigin, Label, Location, MessageType, Options, ProtoFile,
    ProtoType, ScalarType, Schema, Type, TypeKind,
};
