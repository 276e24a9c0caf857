//! Schema load errors.
//!
//! Every variant is fatal for a compile: loading aborts before pruning or
//! generation is attempted, and the message names the offending file, field
//! or type.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Location;

/// Result type for schema loading
pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// A source file could not be found under any search root
    #[error("Failed to locate {path} in {}", format_roots(.roots))]
    FileNotFound { path: String, roots: Vec<PathBuf> },

    /// A source file exists but could not be read
    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Interface-definition text could not be parsed
    #[error("Syntax error in {location}: {message}")]
    Syntax { location: Location, message: String },

    /// A field names a type that no loaded file declares
    #[error("Unable to resolve {type_name} for field {field} of {owner} ({location})")]
    UnresolvedType {
        type_name: String,
        field: String,
        owner: String,
        location: Location,
    },

    /// Two fields of one message share a tag
    #[error("Multiple fields share tag {tag} in {message}: {first} and {second} ({location})")]
    DuplicateTag {
        tag: u32,
        message: String,
        first: String,
        second: String,
        location: Location,
    },

    /// A tag is zero, too large, or inside the reserved range
    #[error("Illegal tag {tag} on field {field} of {message} ({location})")]
    InvalidTag {
        tag: u64,
        field: String,
        message: String,
        location: Location,
    },

    /// Two declarations produce the same fully-qualified name
    #[error("{name} is declared twice: {first} and {second}")]
    DuplicateType {
        name: String,
        first: Location,
        second: Location,
    },
}

fn format_roots(roots: &[PathBuf]) -> String {
    if roots.is_empty() {
        return "no search roots".to_string();
    }
    roots
        .iter()
        .map(|root| root.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SchemaError {
    pub(crate) fn syntax(location: Location, message: impl Into<String>) -> Self {
        Self::Syntax {
            location,
            message: message.into(),
        }
    }
}
