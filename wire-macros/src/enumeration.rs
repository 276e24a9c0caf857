use heck::ToShoutySnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Expr, ExprLit, ExprUnary, Fields, Lit, Result, UnOp};

use crate::attrs::{TypeAttrs, VariantAttrs};

/// Reads `= 3` or `= -1` when no `#[wire(value = ..)]` is given
fn discriminant(expr: &Expr) -> Result<i32> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(lit), ..
        }) => lit.base10_parse(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => discriminant(expr).map(|value| -value),
        _ => Err(Error::new_spanned(expr, "expected an integer literal")),
    }
}

pub fn derive(input: &DeriveInput, wire: &TokenStream) -> Result<TokenStream> {
    let name = &input.ident;
    let type_name = TypeAttrs::parse(&input.attrs)?
        .name
        .unwrap_or_else(|| name.to_string());

    let Data::Enum(data) = &input.data else {
        return Err(Error::new_spanned(name, "Enum can only be derived for enums"));
    };
    if data.variants.is_empty() {
        return Err(Error::new_spanned(name, "enums need at least one constant"));
    }

    let mut variants = Vec::new();
    let mut values = Vec::new();
    let mut names = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new_spanned(variant, "enum constants cannot carry data"));
        }
        let attrs = VariantAttrs::parse(&variant.attrs)?;
        let value = match (attrs.value, &variant.discriminant) {
            (Some(value), _) => value,
            (None, Some((_, expr))) => discriminant(expr)?,
            (None, None) => {
                return Err(Error::new_spanned(
                    variant,
                    "missing `#[wire(value = ..)]` or discriminant",
                ));
            }
        };
        if values.contains(&value) {
            return Err(Error::new_spanned(
                variant,
                format!("duplicate enum value {value}"),
            ));
        }
        variants.push(&variant.ident);
        values.push(value);
        names.push(
            attrs
                .name
                .unwrap_or_else(|| variant.ident.to_string().to_shouty_snake_case()),
        );
    }

    Ok(quote! {
        #[automatically_derived]
        #[allow(deprecated)]
        impl #name {
            /// The constant's name as declared in the `.proto` file
            pub fn name(self) -> &'static str {
                match self {
                    #(Self::#variants => #names,)*
                }
            }
        }

        #[automatically_derived]
        #[allow(deprecated)]
        impl #wire::WireEnum for #name {
            const TYPE_NAME: &'static str = #type_name;

            fn value(self) -> i32 {
                match self {
                    #(Self::#variants => #values,)*
                }
            }

            fn from_value(value: i32) -> ::core::option::Option<Self> {
                match value {
                    #(#values => ::core::option::Option::Some(Self::#variants),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        #[automatically_derived]
        impl #wire::ContractHash for #name {
            fn contract_hash(&self) -> i32 {
                <Self as #wire::WireEnum>::value(*self)
            }
        }
    })
}
