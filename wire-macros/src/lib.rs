//! Derive macros implementing the Wire message contract
//!
//! `#[derive(Message)]` turns a struct of `Option<T>` and `Repeated<T>`
//! fields into an immutable message with a builder, structural equality,
//! cached hashing and an encoder/decoder that preserves unknown fields.
//! `#[derive(Enum)]` maps a fieldless enum to its proto values.
//!
//! ```rust,ignore
//! use wire::{HashCache, Message, Repeated, UnknownFields};
//!
//! #[derive(Clone, Debug, Message)]
//! #[wire(name = "squareup.Person")]
//! pub struct Person {
//!     #[wire(tag = 1, kind = "string", required)]
//!     name: Option<String>,
//!     #[wire(tag = 2, kind = "int32")]
//!     id: Option<i32>,
//!     #[wire(tag = 3, kind = "message")]
//!     phones: Repeated<PhoneNumber>,
//!     #[wire(unknown_fields)]
//!     unknown_fields: UnknownFields,
//!     #[wire(hash_cache)]
//!     cached_hash: HashCache,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::Span;
use quote::quote;
use syn::{DeriveInput, Ident, parse_macro_input};

mod attrs;
mod enumeration;
mod message;

#[proc_macro_derive(Message, attributes(wire))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match message::derive(&input, &wire_path()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[proc_macro_derive(Enum, attributes(wire))]
pub fn derive_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match enumeration::derive(&input, &wire_path()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Path of the crate generated code calls into
fn wire_path() -> proc_macro2::TokenStream {
    // The facade declares `extern crate self as wire`, so `::wire` also
    // resolves inside it.
    match crate_name("wire") {
        Ok(FoundCrate::Itself) => quote!(::wire),
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Err(_) => match crate_name("wire-runtime") {
            Ok(FoundCrate::Itself) => quote!(crate),
            Ok(FoundCrate::Name(name)) => {
                let ident = Ident::new(&name, Span::call_site());
                quote!(::#ident)
            }
            Err(_) => quote!(::wire),
        },
    }
}
