//! Compile errors.

use std::path::PathBuf;

use thiserror::Error;
use wire_schema::SchemaError;

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    /// Loading or linking the schema failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// `--rust-root` is not a Rust path
    #[error("Invalid Rust root module `{root}`: {reason}")]
    InvalidRustRoot { root: String, reason: String },

    /// A type could not be turned into Rust source
    #[error("Failed to generate {type_name}: {reason}")]
    Generate { type_name: String, reason: String },

    /// An artifact could not be persisted
    #[error("Error emitting {} to {}", qualified(.namespace, .name), .path.display())]
    Emit {
        namespace: Option<String>,
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn qualified(namespace: &Option<String>, name: &str) -> String {
    match namespace {
        Some(namespace) => format!("{namespace}.{name}"),
        None => name.to_string(),
    }
}

impl CompileError {
    pub(crate) fn generate(type_name: &str, reason: impl Into<String>) -> Self {
        Self::Generate {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }
}
