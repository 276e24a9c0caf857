//! Rust source generator
//!
//! Turns one top-level [`Type`] of a loaded schema into the source of one
//! artifact: a struct deriving `wire::Message` for a message, an enum
//! deriving `wire::Enum` for an enum, and a module per type holding its
//! nested declarations.
//!
//! Uses [`quote`] for quasi-quoting token streams and [`prettyplease`] for
//! formatting the output into idiomatic Rust.

use std::collections::BTreeMap;

use heck::ToShoutySnakeCase;
use proc_macro2::{Ident, Literal, TokenStream};
use quote::{format_ident, quote};
use wire_schema::{
    EnumType, Field, Label, MessageType, Options, ProtoFile, ProtoType, ScalarType, Schema, Type,
    TypeKind,
};

use crate::error::{CompileError, CompileResult};
use crate::names::{
    constant_suffix, field_ident, module_ident, package_ident, type_ident, variant_ident,
};

/// First line of every artifact
pub const CODE_GENERATED_BY_WIRE: &str =
    "Code generated by Wire protocol buffer compiler, do not edit.";

/// Field options with dedicated handling, never reflected into `FIELD_OPTIONS_*`
const STANDARD_FIELD_OPTIONS: &[&str] = &["default", "deprecated", "packed"];

/// Generates Rust source for the types of one schema
pub struct RustGenerator<'a> {
    schema: &'a Schema,
    root: syn::Path,
    emit_options: bool,
}

impl<'a> RustGenerator<'a> {
    /// `rust_root` is the module generated type paths start from, e.g. `crate`
    pub fn new(schema: &'a Schema, rust_root: &str) -> CompileResult<Self> {
        let root = syn::parse_str::<syn::Path>(rust_root).map_err(|err| {
            CompileError::InvalidRustRoot {
                root: rust_root.to_string(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            schema,
            root,
            emit_options: true,
        })
    }

    /// Whether option values are reflected into constants
    pub fn with_options(mut self, emit_options: bool) -> Self {
        self.emit_options = emit_options;
        self
    }

    /// Full source of the artifact for a top-level type of `file`
    pub fn generate(&self, file: &ProtoFile, ty: &Type) -> CompileResult<String> {
        let items = self.type_items(ty)?;
        let file_tokens = quote! {
            #(#items)*
        };

        let syntax_tree = syn::parse2::<syn::File>(file_tokens)
            .map_err(|err| CompileError::generate(&ty.name, err.to_string()))?;
        let body = prettyplease::unparse(&syntax_tree);

        let mut header = format!("// {CODE_GENERATED_BY_WIRE}\n");
        if !file.path().is_empty() {
            header.push_str(&format!("// Source file: {}\n", file.path()));
        }
        Ok(format!("{header}\n{body}"))
    }

    /// Path of the Rust type generated for a fully-qualified proto name
    pub fn type_path(&self, name: &str) -> Option<TokenStream> {
        self.schema.get_type(name).map(|ty| self.path_of(ty))
    }

    fn path_of(&self, ty: &Type) -> TokenStream {
        let root = &self.root;
        let mut modules: Vec<Ident> = Vec::new();
        let mut relative = ty.name.as_str();
        if let Some(package) = &ty.package {
            modules.extend(package.split('.').map(package_ident));
            relative = relative
                .strip_prefix(package.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(relative);
        }
        let simple = match relative.rsplit_once('.') {
            Some((enclosing, simple)) => {
                modules.extend(enclosing.split('.').map(module_ident));
                simple
            }
            None => relative,
        };
        let ident = type_ident(simple);
        quote!(#root #(:: #modules)* :: #ident)
    }

    fn type_items(&self, ty: &Type) -> CompileResult<Vec<TokenStream>> {
        let mut items = match &ty.kind {
            TypeKind::Message(message) => vec![self.message_item(ty, message)?],
            TypeKind::Enum(enum_type) => vec![self.enum_item(ty, enum_type)?],
            TypeKind::Enclosing => Vec::new(),
        };

        if !ty.nested_types.is_empty() {
            let module = module_ident(ty.simple_name());
            let doc = format!(" Types declared inside `{}`", ty.name);
            let mut nested = Vec::new();
            for nested_type in &ty.nested_types {
                nested.extend(self.type_items(nested_type)?);
            }
            items.push(quote! {
                #[doc = #doc]
                pub mod #module {
                    #(#nested)*
                }
            });
        }
        Ok(items)
    }

    fn message_item(&self, ty: &Type, message: &MessageType) -> CompileResult<TokenStream> {
        let ident = type_ident(ty.simple_name());
        let type_name = &ty.name;
        let docs = doc_attrs(&ty.documentation);

        let mut fields = Vec::new();
        let mut constants = Vec::new();
        for field in &message.fields {
            fields.push(self.field_decl(ty, field)?);
            if let Some(constant) = self.default_constant(ty, field)? {
                constants.push(constant);
            }
        }

        if self.emit_options {
            if !message.options.is_empty() {
                constants.push(options_constant(
                    format_ident!("MESSAGE_OPTIONS"),
                    message.options.iter(),
                ));
            }
            for field in &message.fields {
                let options = custom_options(&field.options);
                if !options.is_empty() {
                    let name = format_ident!("FIELD_OPTIONS_{}", constant_suffix(&field.name));
                    constants.push(options_constant(name, options.into_iter()));
                }
            }
        }

        let constants = if constants.is_empty() {
            quote!()
        } else {
            quote! {
                impl #ident {
                    #(#constants)*
                }
            }
        };

        Ok(quote! {
            #(#docs)*
            #[derive(Clone, Debug, ::wire::Message)]
            #[wire(name = #type_name)]
            pub struct #ident {
                #(#fields,)*
                #[wire(unknown_fields)]
                unknown_fields: ::wire::UnknownFields,
                #[wire(hash_cache)]
                cached_hash: ::wire::HashCache,
            }

            #constants
        })
    }

    fn field_decl(&self, owner: &Type, field: &Field) -> CompileResult<TokenStream> {
        let ident = field_ident(&field.name);
        let docs = doc_attrs(&field.documentation);
        let (kind, element, packable) = match &field.ty {
            ProtoType::Scalar(scalar) => {
                (scalar.name(), scalar_type(*scalar), scalar.is_packable())
            }
            ProtoType::Named(target) => {
                let target_type = self.resolve(owner, field, target)?;
                let path = self.path_of(target_type);
                match &target_type.kind {
                    TypeKind::Message(_) => ("message", path, false),
                    TypeKind::Enum(_) => ("enum", path, true),
                    TypeKind::Enclosing => {
                        return Err(CompileError::generate(
                            &owner.name,
                            format!("field {} refers to pruned type {target}", field.name),
                        ));
                    }
                }
            }
        };

        let rust_type = match field.label {
            Label::Repeated => quote!(::wire::Repeated<#element>),
            Label::Optional | Label::Required if kind == "message" => {
                quote!(Option<Box<#element>>)
            }
            Label::Optional | Label::Required => quote!(Option<#element>),
        };

        let tag = Literal::u32_unsuffixed(field.tag);
        let mut args = vec![quote!(tag = #tag), quote!(kind = #kind)];
        if field.is_required() {
            args.push(quote!(required));
        }
        if field.is_repeated() && field.is_packed() && packable {
            args.push(quote!(packed));
        }
        let deprecated = field.is_deprecated().then(|| quote!(#[deprecated]));

        Ok(quote! {
            #(#docs)*
            #deprecated
            #[wire(#(#args),*)]
            #ident: #rust_type
        })
    }

    /// `DEFAULT_<FIELD>` for non-repeated scalar and enum fields
    fn default_constant(&self, owner: &Type, field: &Field) -> CompileResult<Option<TokenStream>> {
        if field.is_repeated() {
            return Ok(None);
        }
        let name = format_ident!("DEFAULT_{}", constant_suffix(&field.name));
        let text = field.default.as_deref();

        match &field.ty {
            ProtoType::Scalar(scalar) => {
                let (ty, value) = scalar_default(*scalar, text).map_err(|reason| {
                    CompileError::generate(&owner.name, format!("field {}: {reason}", field.name))
                })?;
                Ok(Some(quote!(pub const #name: #ty = #value;)))
            }
            ProtoType::Named(target) => {
                let target_type = self.resolve(owner, field, target)?;
                let TypeKind::Enum(enum_type) = &target_type.kind else {
                    return Ok(None);
                };
                let constant = match text {
                    Some(text) => enum_type.constant(text),
                    None => enum_type.constants.first(),
                }
                .ok_or_else(|| {
                    CompileError::generate(
                        &owner.name,
                        format!(
                            "field {}: {target} has no constant {}",
                            field.name,
                            text.unwrap_or("")
                        ),
                    )
                })?;
                let variant = canonical_variant(enum_type, constant.value);
                let path = self.path_of(target_type);
                Ok(Some(quote!(pub const #name: #path = #path::#variant;)))
            }
        }
    }

    fn enum_item(&self, ty: &Type, enum_type: &EnumType) -> CompileResult<TokenStream> {
        if enum_type.constants.is_empty() {
            return Err(CompileError::generate(&ty.name, "enum declares no constants"));
        }
        let ident = type_ident(ty.simple_name());
        let type_name = &ty.name;
        let docs = doc_attrs(&ty.documentation);

        let mut variants = Vec::new();
        let mut aliases = Vec::new();
        let mut seen: BTreeMap<i32, Ident> = BTreeMap::new();
        for constant in &enum_type.constants {
            let docs = doc_attrs(&constant.documentation);
            let deprecated =
                (constant.options.get("deprecated") == Some("true")).then(|| quote!(#[deprecated]));

            // Aliases share a value with an earlier constant
            if let Some(canonical) = seen.get(&constant.value) {
                let alias = format_ident!("{}", constant.name.to_shouty_snake_case());
                aliases.push(quote! {
                    #(#docs)*
                    #deprecated
                    pub const #alias: Self = Self::#canonical;
                });
                continue;
            }

            let variant = variant_ident(&constant.name);
            let proto_name = &constant.name;
            let name_attr = (variant.to_string().to_shouty_snake_case() != constant.name)
                .then(|| quote!(#[wire(name = #proto_name)]));
            let value = signed_literal(i128::from(constant.value));
            variants.push(quote! {
                #(#docs)*
                #deprecated
                #name_attr
                #variant = #value
            });
            seen.insert(constant.value, variant);
        }

        let aliases = if aliases.is_empty() {
            quote!()
        } else {
            quote! {
                impl #ident {
                    #(#aliases)*
                }
            }
        };

        Ok(quote! {
            #(#docs)*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::wire::Enum)]
            #[wire(name = #type_name)]
            pub enum #ident {
                #(#variants,)*
            }

            #aliases
        })
    }

    fn resolve(&self, owner: &Type, field: &Field, target: &str) -> CompileResult<&'a Type> {
        self.schema.get_type(target).ok_or_else(|| {
            CompileError::generate(
                &owner.name,
                format!("field {} refers to unknown type {target}", field.name),
            )
        })
    }
}

fn doc_attrs(documentation: &str) -> Vec<TokenStream> {
    if documentation.trim().is_empty() {
        return Vec::new();
    }
    documentation
        .lines()
        .map(|line| {
            let line = line.trim_end();
            let line = if line.is_empty() {
                String::new()
            } else {
                format!(" {line}")
            };
            quote!(#[doc = #line])
        })
        .collect()
}

fn custom_options(options: &Options) -> Vec<(&str, &str)> {
    options
        .iter()
        .filter(|(name, _)| !STANDARD_FIELD_OPTIONS.contains(name))
        .collect()
}

fn options_constant<'o>(
    name: Ident,
    options: impl Iterator<Item = (&'o str, &'o str)>,
) -> TokenStream {
    let (keys, values): (Vec<&str>, Vec<&str>) = options.unzip();
    quote! {
        pub const #name: &[(&str, &str)] = &[#((#keys, #values)),*];
    }
}

/// The variant an enum value is declared as (the first constant holding it)
fn canonical_variant(enum_type: &EnumType, value: i32) -> Ident {
    let constant = enum_type
        .constants
        .iter()
        .find(|constant| constant.value == value)
        .map_or("", |constant| constant.name.as_str());
    variant_ident(constant)
}

fn scalar_type(scalar: ScalarType) -> TokenStream {
    match scalar {
        ScalarType::Double => quote!(f64),
        ScalarType::Float => quote!(f32),
        ScalarType::Int32 | ScalarType::SInt32 | ScalarType::SFixed32 => quote!(i32),
        ScalarType::Int64 | ScalarType::SInt64 | ScalarType::SFixed64 => quote!(i64),
        ScalarType::UInt32 | ScalarType::Fixed32 => quote!(u32),
        ScalarType::UInt64 | ScalarType::Fixed64 => quote!(u64),
        ScalarType::Bool => quote!(bool),
        ScalarType::String => quote!(String),
        ScalarType::Bytes => quote!(Vec<u8>),
    }
}

/// Constant type and value for a scalar default, zero when none is declared
fn scalar_default(
    scalar: ScalarType,
    text: Option<&str>,
) -> Result<(TokenStream, TokenStream), String> {
    let int = |min: i128, max: i128| -> Result<TokenStream, String> {
        let value = match text {
            Some(text) => parse_int(text)?,
            None => 0,
        };
        if value < min || value > max {
            return Err(format!("default {value} is out of range"));
        }
        Ok(signed_literal(value))
    };

    Ok(match scalar {
        ScalarType::Int32 | ScalarType::SInt32 | ScalarType::SFixed32 => {
            (quote!(i32), int(i32::MIN.into(), i32::MAX.into())?)
        }
        ScalarType::Int64 | ScalarType::SInt64 | ScalarType::SFixed64 => {
            (quote!(i64), int(i64::MIN.into(), i64::MAX.into())?)
        }
        ScalarType::UInt32 | ScalarType::Fixed32 => (quote!(u32), int(0, u32::MAX.into())?),
        ScalarType::UInt64 | ScalarType::Fixed64 => (quote!(u64), int(0, u64::MAX.into())?),
        ScalarType::Bool => {
            let value = match text {
                None | Some("false") => false,
                Some("true") => true,
                Some(other) => return Err(format!("invalid bool default {other}")),
            };
            (quote!(bool), quote!(#value))
        }
        ScalarType::Float => (quote!(f32), float_literal(text, quote!(f32))?),
        ScalarType::Double => (quote!(f64), float_literal(text, quote!(f64))?),
        ScalarType::String => {
            let value = text.unwrap_or("");
            (quote!(&str), quote!(#value))
        }
        ScalarType::Bytes => {
            let value = Literal::byte_string(text.unwrap_or("").as_bytes());
            (quote!(&[u8]), quote!(#value))
        }
    })
}

/// Decimal, `0x` hex, or leading-zero octal, optionally negative
fn parse_int(text: &str) -> Result<i128, String> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let parsed = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i128::from_str_radix(hex, 16)
    } else if digits.len() > 1 && digits.starts_with('0') {
        i128::from_str_radix(&digits[1..], 8)
    } else {
        digits.parse::<i128>()
    };
    let value = parsed.map_err(|_| format!("invalid integer default {text}"))?;
    Ok(if negative { -value } else { value })
}

fn float_literal(text: Option<&str>, ty: TokenStream) -> Result<TokenStream, String> {
    let text = text.unwrap_or("0");
    match text {
        "inf" => return Ok(quote!(#ty::INFINITY)),
        "-inf" => return Ok(quote!(#ty::NEG_INFINITY)),
        "nan" => return Ok(quote!(#ty::NAN)),
        _ => {}
    }
    let value = text
        .parse::<f64>()
        .map_err(|_| format!("invalid float default {text}"))?;
    if !value.is_finite() {
        return Err(format!("default {text} is out of range"));
    }
    let literal = Literal::f64_unsuffixed(value.abs());
    Ok(if value.is_sign_negative() {
        quote!(-#literal)
    } else {
        quote!(#literal)
    })
}

fn signed_literal(value: i128) -> TokenStream {
    let literal = Literal::u128_unsuffixed(value.unsigned_abs());
    if value < 0 {
        quote!(-#literal)
    } else {
        quote!(#literal)
    }
}
