use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Error, Fields, GenericArgument, Ident, LitStr, PathArguments,
    Result, Type,
};

use crate::attrs::{FieldAttrs, TypeAttrs, deprecated};

/// How a singular value is exposed by its getter
#[derive(Clone, Copy, PartialEq, Eq)]
enum Access {
    Copy,
    Str,
    Bytes,
}

enum Kind {
    Scalar { adapter: Ident, access: Access },
    Message,
    Enum,
}

impl Kind {
    fn parse(lit: &LitStr) -> Result<Self> {
        let (adapter, access) = match lit.value().as_str() {
            "message" => return Ok(Kind::Message),
            "enum" => return Ok(Kind::Enum),
            "int32" => ("Int32", Access::Copy),
            "int64" => ("Int64", Access::Copy),
            "uint32" => ("UInt32", Access::Copy),
            "uint64" => ("UInt64", Access::Copy),
            "sint32" => ("SInt32", Access::Copy),
            "sint64" => ("SInt64", Access::Copy),
            "fixed32" => ("Fixed32", Access::Copy),
            "fixed64" => ("Fixed64", Access::Copy),
            "sfixed32" => ("SFixed32", Access::Copy),
            "sfixed64" => ("SFixed64", Access::Copy),
            "bool" => ("Bool", Access::Copy),
            "float" => ("Float", Access::Copy),
            "double" => ("Double", Access::Copy),
            "string" => ("Str", Access::Str),
            "bytes" => ("Bytes", Access::Bytes),
            other => {
                return Err(Error::new(
                    lit.span(),
                    format!("unknown proto kind `{other}`"),
                ));
            }
        };
        Ok(Kind::Scalar {
            adapter: Ident::new(adapter, lit.span()),
            access,
        })
    }
}

/// A declared proto field and the pieces of code it contributes
struct ProtoField<'a> {
    ident: &'a Ident,
    name: String,
    tag: u32,
    kind: Kind,
    repeated: bool,
    required: bool,
    packed: bool,
    /// Element type: the `T` of `Option<T>` or `Repeated<T>`, unboxed for messages
    value_ty: &'a Type,
    deprecated: Vec<&'a Attribute>,
}

impl ProtoField<'_> {
    fn adapter(&self, wire: &TokenStream) -> TokenStream {
        let ty = self.value_ty;
        match &self.kind {
            Kind::Scalar { adapter, .. } => quote!(#wire::adapter::#adapter),
            Kind::Message => quote!(#wire::adapter::MessageAdapter<#ty>),
            Kind::Enum => quote!(#wire::adapter::EnumAdapter<#ty>),
        }
    }

    fn is_message(&self) -> bool {
        matches!(self.kind, Kind::Message)
    }

    fn builder_ty(&self) -> TokenStream {
        let ty = self.value_ty;
        if self.repeated {
            quote!(::std::vec::Vec<#ty>)
        } else if self.is_message() {
            quote!(::core::option::Option<::std::boxed::Box<#ty>>)
        } else {
            quote!(::core::option::Option<#ty>)
        }
    }

    fn param(&self, wire: &TokenStream) -> TokenStream {
        let ident = self.ident;
        let ty = self.value_ty;
        if self.repeated {
            quote!(#ident: impl ::core::convert::Into<#wire::Repeated<#ty>>)
        } else {
            quote!(#ident: ::core::option::Option<#ty>)
        }
    }

    fn init(&self) -> TokenStream {
        let ident = self.ident;
        if self.repeated {
            quote!(#ident: #ident.into())
        } else if self.is_message() {
            quote!(#ident: #ident.map(::std::boxed::Box::new))
        } else {
            quote!(#ident)
        }
    }

    fn getter(&self) -> TokenStream {
        let ident = self.ident;
        let ty = self.value_ty;
        let deprecated = &self.deprecated;
        let (ret, body) = if self.repeated {
            (quote!(&[#ty]), quote!(&self.#ident))
        } else {
            match &self.kind {
                Kind::Message => (
                    quote!(::core::option::Option<&#ty>),
                    quote!(self.#ident.as_deref()),
                ),
                Kind::Scalar {
                    access: Access::Str,
                    ..
                } => (
                    quote!(::core::option::Option<&str>),
                    quote!(self.#ident.as_deref()),
                ),
                Kind::Scalar {
                    access: Access::Bytes,
                    ..
                } => (
                    quote!(::core::option::Option<&[u8]>),
                    quote!(self.#ident.as_deref()),
                ),
                Kind::Scalar {
                    access: Access::Copy,
                    ..
                }
                | Kind::Enum => (quote!(::core::option::Option<#ty>), quote!(self.#ident)),
            }
        };
        quote! {
            #(#deprecated)*
            pub fn #ident(&self) -> #ret {
                #body
            }
        }
    }

    fn setters(&self, wire: &TokenStream, type_name: &str) -> TokenStream {
        let ident = self.ident;
        let ty = self.value_ty;
        let deprecated = &self.deprecated;
        let clear = format_ident!("clear_{}", self.name);

        if self.repeated {
            let try_set = format_ident!("try_{}", self.name);
            let name = &self.name;
            return quote! {
                #(#deprecated)*
                pub fn #ident(mut self, values: impl ::core::convert::Into<::std::vec::Vec<#ty>>) -> Self {
                    self.#ident = values.into();
                    self
                }

                /// Fails if any element is missing
                #(#deprecated)*
                pub fn #try_set(
                    mut self,
                    values: ::std::vec::Vec<::core::option::Option<#ty>>,
                ) -> ::core::result::Result<Self, #wire::BuildError> {
                    self.#ident = values
                        .into_iter()
                        .collect::<::core::option::Option<::std::vec::Vec<#ty>>>()
                        .ok_or(#wire::BuildError::NullElement {
                            message: #type_name,
                            field: #name,
                        })?;
                    ::core::result::Result::Ok(self)
                }

                pub fn #clear(mut self) -> Self {
                    self.#ident = ::std::vec::Vec::new();
                    self
                }
            };
        }

        let (param, value) = match &self.kind {
            Kind::Message => (quote!(#ty), quote!(::std::boxed::Box::new(value))),
            Kind::Scalar {
                access: Access::Str,
                ..
            } => (
                quote!(impl ::core::convert::Into<::std::string::String>),
                quote!(value.into()),
            ),
            Kind::Scalar {
                access: Access::Bytes,
                ..
            } => (
                quote!(impl ::core::convert::Into<::std::vec::Vec<u8>>),
                quote!(value.into()),
            ),
            Kind::Scalar {
                access: Access::Copy,
                ..
            }
            | Kind::Enum => (quote!(#ty), quote!(value)),
        };
        quote! {
            #(#deprecated)*
            pub fn #ident(mut self, value: #param) -> Self {
                self.#ident = ::core::option::Option::Some(#value);
                self
            }

            pub fn #clear(mut self) -> Self {
                self.#ident = ::core::option::Option::None;
                self
            }
        }
    }

    fn copy_from_message(&self) -> TokenStream {
        let ident = self.ident;
        if self.repeated {
            quote!(#ident: message.#ident.to_vec())
        } else {
            quote!(#ident: ::core::clone::Clone::clone(&message.#ident))
        }
    }

    fn freeze(&self, wire: &TokenStream) -> TokenStream {
        let ident = self.ident;
        if self.repeated {
            quote!(#ident: #wire::Repeated::from(self.#ident))
        } else {
            quote!(#ident: self.#ident)
        }
    }

    fn hash_contribution(&self, wire: &TokenStream) -> TokenStream {
        let ident = self.ident;
        if self.repeated {
            quote!(#wire::ContractHash::contract_hash(&self.#ident))
        } else {
            quote!(self.#ident.as_ref().map_or(0, #wire::ContractHash::contract_hash))
        }
    }

    fn encode(&self, wire: &TokenStream) -> TokenStream {
        let ident = self.ident;
        let tag = self.tag;
        let adapter = self.adapter(wire);
        if self.repeated {
            let packed = self.packed;
            quote!(#wire::field::write_repeated::<#adapter>(writer, #tag, &self.#ident, #packed);)
        } else if self.is_message() {
            quote!(#wire::field::write_single::<#adapter>(writer, #tag, self.#ident.as_deref());)
        } else {
            quote!(#wire::field::write_single::<#adapter>(writer, #tag, self.#ident.as_ref());)
        }
    }

    fn merge(&self, wire: &TokenStream) -> TokenStream {
        let ident = self.ident;
        let tag = self.tag;
        let adapter = self.adapter(wire);
        let step = match (&self.kind, self.repeated) {
            (Kind::Enum, true) => quote!(#wire::field::merge_repeated_enum),
            (Kind::Enum, false) => quote!(#wire::field::merge_enum),
            (Kind::Message, false) => quote!(#wire::field::merge_message),
            (_, true) => quote!(#wire::field::merge_repeated::<#adapter>),
            (Kind::Scalar { .. }, false) => quote!(#wire::field::merge_single::<#adapter>),
        };
        quote! {
            #tag => #step(reader, key, &mut builder.#ident, &mut builder.unknown_fields)?,
        }
    }
}

fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

pub fn derive(input: &DeriveInput, wire: &TokenStream) -> Result<TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;
    let builder = format_ident!("{}Builder", name);
    let type_name = TypeAttrs::parse(&input.attrs)?
        .name
        .unwrap_or_else(|| name.to_string());

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "generic messages are not supported",
        ));
    }
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named,
            _ => {
                return Err(Error::new_spanned(
                    name,
                    "Message requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                name,
                "Message can only be derived for structs",
            ));
        }
    };

    let mut fields = Vec::new();
    let mut unknown_fields: Option<&Ident> = None;
    let mut hash_cache: Option<&Ident> = None;
    let mut tags = Vec::new();

    for field in &named.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.unknown_fields {
            unknown_fields = Some(ident);
            continue;
        }
        if attrs.hash_cache {
            hash_cache = Some(ident);
            continue;
        }

        let tag = attrs
            .tag
            .ok_or_else(|| Error::new_spanned(ident, "missing `#[wire(tag = ..)]`"))?;
        if tags.contains(&tag) {
            return Err(Error::new_spanned(ident, format!("duplicate tag {tag}")));
        }
        tags.push(tag);

        let kind_lit = attrs
            .kind
            .ok_or_else(|| Error::new_spanned(ident, "missing `#[wire(kind = \"..\")]`"))?;
        let kind = Kind::parse(&kind_lit)?;

        let (repeated, value_ty) = if let Some(inner) = generic_inner(&field.ty, "Repeated") {
            (true, inner)
        } else if let Some(inner) = generic_inner(&field.ty, "Option") {
            let inner = if matches!(kind, Kind::Message) {
                generic_inner(inner, "Box").ok_or_else(|| {
                    Error::new_spanned(inner, "message fields must be `Option<Box<T>>`")
                })?
            } else {
                inner
            };
            (false, inner)
        } else {
            return Err(Error::new_spanned(
                &field.ty,
                "fields must be `Option<T>` or `Repeated<T>`",
            ));
        };
        if attrs.required && repeated {
            return Err(Error::new_spanned(ident, "repeated fields cannot be required"));
        }

        fields.push(ProtoField {
            ident,
            name: ident.unraw().to_string(),
            tag,
            kind,
            repeated,
            required: attrs.required,
            packed: attrs.packed,
            value_ty,
            deprecated: deprecated(&field.attrs),
        });
    }

    let unknown = unknown_fields.ok_or_else(|| {
        Error::new_spanned(name, "missing a `#[wire(unknown_fields)]` field")
    })?;

    let params: Vec<_> = fields.iter().map(|field| field.param(wire)).collect();
    let args: Vec<_> = fields.iter().map(|field| field.ident).collect();
    let inits: Vec<_> = fields.iter().map(ProtoField::init).collect();
    let getters: Vec<_> = fields.iter().map(ProtoField::getter).collect();
    let setters: Vec<_> = fields
        .iter()
        .map(|field| field.setters(wire, &type_name))
        .collect();
    let field_idents: Vec<_> = fields.iter().map(|field| field.ident).collect();
    let builder_tys: Vec<_> = fields.iter().map(ProtoField::builder_ty).collect();
    let copies: Vec<_> = fields.iter().map(ProtoField::copy_from_message).collect();
    let freezes: Vec<_> = fields.iter().map(|field| field.freeze(wire)).collect();
    let contributions: Vec<_> = fields
        .iter()
        .map(|field| field.hash_contribution(wire))
        .collect();
    let encodes: Vec<_> = fields.iter().map(|field| field.encode(wire)).collect();
    let merges: Vec<_> = fields.iter().map(|field| field.merge(wire)).collect();

    let cache_init = hash_cache.map(|cache| quote!(#cache: #wire::HashCache::new(),));

    let compute_hash = quote! {
        let result = #wire::ContractHash::contract_hash(&self.#unknown);
        #(let result = #wire::hash::combine(result, #contributions);)*
        result
    };
    let hash_code = match hash_cache {
        Some(cache) => quote!(self.#cache.get_or_init(|| { #compute_hash })),
        None => compute_hash,
    };

    let required: Vec<_> = fields.iter().filter(|field| field.required).collect();
    let required_check = if required.is_empty() {
        quote!()
    } else {
        let idents = required.iter().map(|field| field.ident);
        let names = required.iter().map(|field| field.name.as_str());
        quote! {
            let mut missing = ::std::vec::Vec::new();
            #(
                if self.#idents.is_none() {
                    missing.push(#names);
                }
            )*
            if !missing.is_empty() {
                return ::core::result::Result::Err(#wire::BuildError::MissingRequiredFields {
                    message: #type_name,
                    fields: missing,
                });
            }
        }
    };

    let builder_doc = format!("Builder for [`{name}`]");

    Ok(quote! {
        #[automatically_derived]
        #[allow(deprecated)]
        impl #name {
            /// Creates a message with no unknown fields
            #[allow(clippy::too_many_arguments)]
            pub fn new(#(#params),*) -> Self {
                Self::with_unknown_fields(#(#args,)* #wire::UnknownFields::new())
            }

            #[allow(clippy::too_many_arguments)]
            pub fn with_unknown_fields(#(#params,)* unknown_fields: #wire::UnknownFields) -> Self {
                Self {
                    #(#inits,)*
                    #unknown: unknown_fields,
                    #cache_init
                }
            }

            pub fn builder() -> #builder {
                #builder::default()
            }

            pub fn to_builder(&self) -> #builder {
                #builder::from(self)
            }

            #(#getters)*
        }

        #[doc = #builder_doc]
        #[derive(Debug, Clone, Default)]
        #vis struct #builder {
            #(pub #field_idents: #builder_tys,)*
            pub unknown_fields: #wire::UnknownFields,
        }

        #[automatically_derived]
        #[allow(deprecated)]
        impl #builder {
            pub fn new() -> Self {
                Self::default()
            }

            #(#setters)*

            pub fn build(self) -> ::core::result::Result<#name, #wire::BuildError> {
                <Self as #wire::MessageBuilder>::build(self)
            }
        }

        #[automatically_derived]
        #[allow(deprecated)]
        impl ::core::convert::From<&#name> for #builder {
            fn from(message: &#name) -> Self {
                Self {
                    #(#copies,)*
                    unknown_fields: ::core::clone::Clone::clone(&message.#unknown),
                }
            }
        }

        #[automatically_derived]
        #[allow(deprecated)]
        impl #wire::MessageBuilder for #builder {
            type Message = #name;

            fn build(self) -> ::core::result::Result<#name, #wire::BuildError> {
                #required_check
                ::core::result::Result::Ok(#name {
                    #(#freezes,)*
                    #unknown: self.unknown_fields,
                    #cache_init
                })
            }

            fn unknown_fields_mut(&mut self) -> &mut #wire::UnknownFields {
                &mut self.unknown_fields
            }
        }

        #[automatically_derived]
        #[allow(deprecated)]
        impl ::core::cmp::PartialEq for #name {
            fn eq(&self, other: &Self) -> bool {
                self.#unknown == other.#unknown #(&& self.#field_idents == other.#field_idents)*
            }
        }

        #[automatically_derived]
        impl ::core::hash::Hash for #name {
            fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                state.write_i32(<Self as #wire::Message>::hash_code(self));
            }
        }

        #[automatically_derived]
        impl #wire::ContractHash for #name {
            fn contract_hash(&self) -> i32 {
                <Self as #wire::Message>::hash_code(self)
            }
        }

        #[automatically_derived]
        #[allow(deprecated)]
        impl #wire::Message for #name {
            type Builder = #builder;

            const TYPE_NAME: &'static str = #type_name;

            fn unknown_fields(&self) -> &#wire::UnknownFields {
                &self.#unknown
            }

            fn hash_code(&self) -> i32 {
                #hash_code
            }

            fn to_builder(&self) -> #builder {
                #builder::from(self)
            }

            fn encode_to(&self, writer: &mut #wire::ProtoWriter) {
                #(#encodes)*
                self.#unknown.write_to(writer);
            }

            fn decode_from(reader: &mut #wire::ProtoReader<'_>) -> #wire::DecodeResult<Self> {
                let mut builder = #builder::default();
                while let ::core::option::Option::Some(key) = reader.read_key()? {
                    match key.tag {
                        #(#merges)*
                        _ => builder.unknown_fields.capture(reader, key)?,
                    }
                }
                ::core::result::Result::Ok(<#builder as #wire::MessageBuilder>::build(builder)?)
            }
        }
    })
}
