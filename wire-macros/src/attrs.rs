use syn::{Attribute, Error, LitInt, LitStr, Result, Token};

/// Container attributes: `#[wire(name = "pkg.Type")]`
#[derive(Default)]
pub struct TypeAttrs {
    pub name: Option<String>,
}

impl TypeAttrs {
    pub fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut parsed = TypeAttrs::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("wire")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    parsed.name = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported wire attribute, expected `name`"))
                }
            })?;
        }
        Ok(parsed)
    }
}

/// Field attributes
///
/// ```text
/// #[wire(tag = 1, kind = "string")]
/// #[wire(tag = 2, kind = "int32", required)]
/// #[wire(tag = 3, kind = "enum", packed)]
/// #[wire(unknown_fields)]
/// #[wire(hash_cache)]
/// ```
#[derive(Default)]
pub struct FieldAttrs {
    pub tag: Option<u32>,
    pub kind: Option<LitStr>,
    pub required: bool,
    pub packed: bool,
    pub unknown_fields: bool,
    pub hash_cache: bool,
}

impl FieldAttrs {
    pub fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut parsed = FieldAttrs::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("wire")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("tag") {
                    let lit: LitInt = meta.value()?.parse()?;
                    parsed.tag = Some(lit.base10_parse()?);
                } else if meta.path.is_ident("kind") {
                    parsed.kind = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("required") {
                    parsed.required = true;
                } else if meta.path.is_ident("packed") {
                    parsed.packed = true;
                } else if meta.path.is_ident("unknown_fields") {
                    parsed.unknown_fields = true;
                } else if meta.path.is_ident("hash_cache") {
                    parsed.hash_cache = true;
                } else {
                    return Err(meta.error("unsupported wire field attribute"));
                }
                Ok(())
            })?;
        }
        Ok(parsed)
    }
}

/// Enum variant attributes: `#[wire(value = -1, name = "UNKNOWN")]`
#[derive(Default)]
pub struct VariantAttrs {
    pub value: Option<i32>,
    pub name: Option<String>,
}

impl VariantAttrs {
    pub fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut parsed = VariantAttrs::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("wire")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("value") {
                    let input = meta.value()?;
                    let negative = input.parse::<Option<Token![-]>>()?.is_some();
                    let lit: LitInt = input.parse()?;
                    let value: i64 = lit.base10_parse()?;
                    let value = if negative { -value } else { value };
                    parsed.value = Some(
                        i32::try_from(value)
                            .map_err(|_| Error::new(lit.span(), "enum value must fit in i32"))?,
                    );
                } else if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    parsed.name = Some(lit.value());
                } else {
                    return Err(meta.error("unsupported wire variant attribute"));
                }
                Ok(())
            })?;
        }
        Ok(parsed)
    }
}

/// `#[deprecated]` attributes to carry onto generated accessors
pub fn deprecated(attrs: &[Attribute]) -> Vec<&Attribute> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("deprecated"))
        .collect()
}
