use thiserror::Error;

/// Failure to freeze a builder into a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("required fields not set on {message}: {}", .fields.join(", "))]
    MissingRequiredFields {
        message: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("{message}.{field} contains a null element")]
    NullElement {
        message: &'static str,
        field: &'static str,
    },
}

/// Malformed wire input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {offset}")]
    Truncated { offset: usize },

    #[error("varint longer than 10 bytes at offset {offset}")]
    VarintTooLong { offset: usize },

    #[error("invalid wire type {bits} for tag {tag}")]
    InvalidWireType { tag: u32, bits: u8 },

    #[error("field with tag 0 at offset {offset}")]
    ZeroTag { offset: usize },

    #[error("field tag out of range at offset {offset}")]
    TagOutOfRange { offset: usize },

    #[error("end group for tag {tag} without a matching start group")]
    UnexpectedEndGroup { tag: u32 },

    #[error("{value} is not a constant of {type_name} (offset {offset})")]
    UnknownEnumValue {
        type_name: &'static str,
        value: i32,
        offset: usize,
    },

    #[error("message nesting exceeds {limit} levels")]
    RecursionLimitExceeded { limit: u32 },

    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    #[error(transparent)]
    Build(#[from] BuildError),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_lists_every_name() {
        let err = BuildError::MissingRequiredFields {
            message: "pkg.Person",
            fields: vec!["name", "id"],
        };
        assert_eq!(err.to_string(), "required fields not set on pkg.Person: name, id");
    }

    #[test]
    fn test_build_error_converts() {
        let err: DecodeError = BuildError::NullElement {
            message: "pkg.Person",
            field: "phones",
        }
        .into();
        assert_eq!(err.to_string(), "pkg.Person.phones contains a null element");
    }
}
