//! Runtime support for Wire-generated messages
//!
//! Generated message types are plain structs with a
//! `#[derive(wire::Message)]`; the derive expands into calls against this
//! crate. Most users depend on the `wire` facade, which re-exports
//! everything here alongside the derives.
//!
//! ## Contract
//!
//! - **Immutable values**: fields are only set through a constructor or a
//!   builder, so a message's hash can be cached on first use.
//! - **Equality**: two messages are equal when their unknown fields and every
//!   declared field are equal.
//! - **Hashing**: start from the unknown-field hash, then fold each field in
//!   declaration order as `acc * 37 + contribution`. An absent scalar or
//!   message contributes 0; a repeated field contributes its sequence hash,
//!   which is 1 when empty.
//! - **Unknown fields**: decoding keeps unrecognised fields as raw bytes and
//!   encoding writes them back after the declared fields.

pub mod adapter;
pub mod codec;
pub mod error;
pub mod field;
pub mod hash;
pub mod message;
pub mod repeated;
pub mod unknown;

pub use codec::{FieldKey, ProtoReader, ProtoWriter, RECURSION_LIMIT, WireType};
pub use error::{BuildError, DecodeError, DecodeResult};
pub use hash::{ContractHash, HashCache};
pub use message::{Message, MessageBuilder, WireEnum};
pub use repeated::Repeated;
pub use unknown::UnknownFields;
