use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Error, Field, Fields, Ident, LitInt, Result, Token,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_from_fields(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromFields` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`FromFields` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let entries = fields.iter().map(|field| {
        let FieldMetadata {
            name,
            attribute:
                TlvAttribute {
                    tag,
                    width,
                    offset,
                    kind,
                    optional,
                },
        } = field;

        let name = name.to_string();
        let width = match width {
            Width::Exact(n) => quote! { ::tachocard::schema::Width::Exact(#n) },
            Width::Rest => quote! { ::tachocard::schema::Width::Rest },
        };
        let required = !*optional;

        quote! {
            ::tachocard::schema::FieldSchema {
                name: #name,
                tag: ::tachocard::schema::Tag::new(#tag),
                width: #width,
                offset: #offset,
                kind: ::tachocard::value::ValueKind::#kind,
                required: #required,
            }
        }
    });

    let cases = fields.iter().enumerate().map(|(index, field)| {
        let name = &field.name;
        quote! {
            #index => self.#name = ::tachocard::value::FromValue::from_value(value)?,
        }
    });

    let name = &input.ident;
    let shape = name.to_string();

    let expanded = quote! {
        impl ::tachocard::schema::FromFields for #name {
            const SHAPE: &'static str = #shape;
            const SCHEMA: &'static [::tachocard::schema::FieldSchema] = &[#(#entries),*];

            fn set_field(
                &mut self,
                index: usize,
                value: ::tachocard::value::Value,
            ) -> ::tachocard::Result<()> {
                match index {
                    #(#cases)*
                    _ => {}
                };
                Ok(())
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    attribute: TlvAttribute,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("tlv")) else {
            return Ok(None);
        };

        let attribute = attr.meta.require_list()?.parse_args()?;

        Ok(Some(Self { name, attribute }))
    }
}

#[derive(Debug)]
enum Width {
    Exact(LitInt),
    Rest,
}

#[derive(Debug)]
struct TlvAttribute {
    tag: LitInt,
    width: Width,
    offset: LitInt,
    kind: Ident,
    optional: bool,
}

impl Parse for TlvAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let tag = input.parse::<LitInt>()?;
        input.parse::<Token![,]>()?;

        let width = if input.peek(Ident) {
            let ident = input.parse::<Ident>()?;
            if ident != "rest" {
                Err(Error::new_spanned(
                    ident,
                    "Field width must be an integer literal or `rest`.",
                ))?
            }
            Width::Rest
        } else {
            Width::Exact(input.parse::<LitInt>()?)
        };
        input.parse::<Token![,]>()?;

        let offset = input.parse::<LitInt>()?;
        input.parse::<Token![,]>()?;

        let kind = input.parse::<Ident>()?;
        let kind = match kind.to_string().as_str() {
            "int" => format_ident!("Int", span = kind.span()),
            "date" => format_ident!("Date", span = kind.span()),
            "birthday" => format_ident!("Birthday", span = kind.span()),
            "string" => format_ident!("String", span = kind.span()),
            "hexadecimal" => format_ident!("Hexadecimal", span = kind.span()),
            "daylicounter" => format_ident!("DailyCounter", span = kind.span()),
            "activities" => format_ident!("Activities", span = kind.span()),
            _ => Err(Error::new_spanned(
                kind,
                "Unknown value kind; expected one of `int`, `date`, `birthday`, `string`, \
                 `hexadecimal`, `daylicounter` or `activities`.",
            ))?,
        };

        let optional = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            let flag = input.parse::<Ident>()?;
            if flag != "optional" {
                Err(Error::new_spanned(flag, "Expected `optional`."))?
            }
            true
        } else {
            false
        };

        Ok(Self {
            tag,
            width,
            offset,
            kind,
            optional,
        })
    }
}
