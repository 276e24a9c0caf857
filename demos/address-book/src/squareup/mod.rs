//! Types of the `squareup` package, as emitted by `wire-compiler`:
//!
//! ```text
//! wire-compiler --proto-path protos --rust-out src squareup/address_book.proto
//! ```

include!("person.rs");
include!("address_book.rs");
