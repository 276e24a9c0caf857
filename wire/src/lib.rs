//! Wire: protocol buffer messages for Rust
//!
//! This crate is what generated code depends on. It re-exports the runtime
//! (`wire-runtime`) together with the `Message` and `Enum` derives
//! (`wire-macros`).
//!
//! ## Generated messages
//!
//! The compiler emits one struct per message, with a derive doing the rest:
//!
//! ```rust
//! use wire::{Enum, HashCache, Message, Repeated, UnknownFields};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum)]
//! #[wire(name = "squareup.PhoneType")]
//! pub enum PhoneType {
//!     #[wire(value = 0)]
//!     Mobile,
//!     #[wire(value = 1)]
//!     Home,
//! }
//!
//! #[derive(Clone, Debug, Message)]
//! #[wire(name = "squareup.Person")]
//! pub struct Person {
//!     #[wire(tag = 1, kind = "string", required)]
//!     name: Option<String>,
//!     #[wire(tag = 2, kind = "enum")]
//!     phone_type: Option<PhoneType>,
//!     #[wire(tag = 3, kind = "string")]
//!     emails: Repeated<String>,
//!     #[wire(unknown_fields)]
//!     unknown_fields: UnknownFields,
//!     #[wire(hash_cache)]
//!     cached_hash: HashCache,
//! }
//!
//! let person = Person::builder()
//!     .name("Alice")
//!     .phone_type(PhoneType::Home)
//!     .emails(vec!["alice@example.com".to_string()])
//!     .build()?;
//!
//! let decoded = Person::decode(&person.encode())?;
//! assert_eq!(decoded, person);
//! assert_eq!(decoded.hash_code(), person.hash_code());
//! # Ok::<(), wire::DecodeError>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **`wire-schema` crate**: `.proto` loading and pruning
//! 2. **`wire-compiler` crate**: Rust code generation
//! 3. **`wire-runtime` crate**: the message contract and wire codec
//! 4. **`wire-macros` crate**: derives implementing the contract
//! 5. **`wire` crate**: re-exports the runtime and derives

extern crate self as wire;

pub use wire_runtime::*;

// Re-export the derives
pub use wire_macros::{Enum, Message};
