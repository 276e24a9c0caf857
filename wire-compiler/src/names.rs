//! Proto names to Rust identifiers.

use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro2::{Ident, Span};

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers
const UNRAWABLE: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Field names that would shadow methods or fields the derive generates
const RESERVED_FIELDS: &[&str] = &[
    "unknown_fields",
    "cached_hash",
    "builder",
    "to_builder",
    "new",
    "with_unknown_fields",
    "hash_code",
    "encode",
    "decode",
    "build",
];

fn ident(name: &str) -> Ident {
    if UNRAWABLE.contains(&name) {
        Ident::new(&format!("{name}_"), Span::call_site())
    } else if KEYWORDS.contains(&name) {
        Ident::new_raw(name, Span::call_site())
    } else {
        Ident::new(name, Span::call_site())
    }
}

/// `phone_number` -> `PhoneNumber`
pub fn type_ident(simple_name: &str) -> Ident {
    ident(&simple_name.to_upper_camel_case())
}

/// Module holding the nested types of `simple_name`
pub fn module_ident(simple_name: &str) -> Ident {
    ident(&simple_name.to_snake_case())
}

/// Package segment as a module name
pub fn package_ident(segment: &str) -> Ident {
    ident(&segment.to_snake_case())
}

pub fn field_ident(name: &str) -> Ident {
    let snake = name.to_snake_case();
    if RESERVED_FIELDS.contains(&snake.as_str()) {
        return Ident::new(&format!("{snake}_"), Span::call_site());
    }
    ident(&snake)
}

/// `WORK_PHONE` -> `WorkPhone`
pub fn variant_ident(constant: &str) -> Ident {
    ident(&constant.to_upper_camel_case())
}

/// Suffix for `DEFAULT_*` and `FIELD_OPTIONS_*` constants
pub fn constant_suffix(field_name: &str) -> String {
    field_name.to_shouty_snake_case()
}

/// File stem of a type's artifact
pub fn file_stem(simple_name: &str) -> String {
    simple_name.to_snake_case()
}
