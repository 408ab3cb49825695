// #[derive(Describe)] implementation
//
// Generates `describe()` (type-level descriptors) and `to_properties()`
// (descriptors carrying the field values).

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::ParseStream;
use syn::{Data, DeriveInput, Expr, Field, Fields, Ident, LitStr, Result, Token};

/// Ad hoc metadata declared with `#[attribute(...)]`
struct AttributeSpec {
    label: String,
    values: Vec<(String, Expr)>,
}

/// One described field
struct FieldSpec {
    ident: Ident,
    ty: syn::Type,
    name: String,
    description: Option<String>,
    attributes: Vec<AttributeSpec>,
}

/// Expands #[derive(Describe)].
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[derive(Describe)]
/// struct Person {
///     #[attribute(Range, min = 0)]
///     age: i32,
/// }
///
/// // Output:
/// impl ::dynclass_engine::Describe for Person {
///     fn describe() -> Vec<::dynclass_engine::PropertyDescriptor> {
///         vec![
///             ::dynclass_engine::PropertyDescriptor::new(
///                 "age",
///                 <i32 as ::dynclass_engine::StaticType>::type_ref(),
///             )
///             .with_attribute(
///                 ::dynclass_engine::AttributeDescriptor::new("Range").with_value("min", 0),
///             ),
///         ]
///     }
///
///     fn to_properties(&self) -> Vec<::dynclass_engine::PropertyDescriptor> {
///         // same descriptors, each followed by
///         // .with_value(::dynclass_engine::ToValue::to_value(&self.age))
///     }
/// }
/// ```
pub fn expand_describe(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Describe can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Describe can only be derived for structs",
            ))
        }
    };

    let mut specs = Vec::new();
    for field in fields {
        if let Some(spec) = parse_field(field)? {
            specs.push(spec);
        }
    }

    let descriptors: Vec<TokenStream> = specs.iter().map(descriptor_tokens).collect();
    let field_idents = specs.iter().map(|s| &s.ident);

    Ok(quote! {
        impl #impl_generics ::dynclass_engine::Describe for #name #ty_generics #where_clause {
            fn describe() -> ::std::vec::Vec<::dynclass_engine::PropertyDescriptor> {
                ::std::vec![#(#descriptors),*]
            }

            fn to_properties(&self) -> ::std::vec::Vec<::dynclass_engine::PropertyDescriptor> {
                ::std::vec![#(
                    #descriptors.with_value(::dynclass_engine::ToValue::to_value(&self.#field_idents))
                ),*]
            }
        }
    })
}

/// Parse one field's options. Returns `None` for skipped fields.
fn parse_field(field: &Field) -> Result<Option<FieldSpec>> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };

    let mut name = ident.to_string();
    if let Some(stripped) = name.strip_prefix("r#") {
        name = stripped.to_string();
    }
    let mut description = None;
    let mut skip = false;
    let mut attributes = Vec::new();

    for attr in &field.attrs {
        if attr.path().is_ident("describe") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    name = value.value();
                    Ok(())
                } else if meta.path.is_ident("description") {
                    let value: LitStr = meta.value()?.parse()?;
                    description = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported describe option, expected `rename`, `description` or `skip`"))
                }
            })?;
        } else if attr.path().is_ident("attribute") {
            attributes.push(attr.parse_args_with(parse_attribute_spec)?);
        }
    }

    if skip {
        return Ok(None);
    }

    Ok(Some(FieldSpec {
        ident,
        ty: field.ty.clone(),
        name,
        description,
        attributes,
    }))
}

/// Parse `Label, key = value, ...` (label may also be a string literal)
fn parse_attribute_spec(input: ParseStream) -> Result<AttributeSpec> {
    let label = if input.peek(LitStr) {
        input.parse::<LitStr>()?.value()
    } else {
        input.parse::<Ident>()?.to_string()
    };

    let mut values = Vec::new();
    while !input.is_empty() {
        input.parse::<Token![,]>()?;
        if input.is_empty() {
            break;
        }
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let value: Expr = input.parse()?;
        values.push((key.to_string(), value));
    }

    Ok(AttributeSpec { label, values })
}

fn descriptor_tokens(spec: &FieldSpec) -> TokenStream {
    let name = &spec.name;
    let ty = &spec.ty;

    let description = spec.description.as_ref().map(|d| {
        quote! { .with_description(#d) }
    });

    let attributes = spec.attributes.iter().map(|attr| {
        let label = &attr.label;
        let values = attr.values.iter().map(|(key, value)| {
            quote! { .with_value(#key, #value) }
        });
        quote! {
            .with_attribute(::dynclass_engine::AttributeDescriptor::new(#label) #(#values)*)
        }
    });

    quote! {
        ::dynclass_engine::PropertyDescriptor::new(
            #name,
            <#ty as ::dynclass_engine::StaticType>::type_ref(),
        )
        #description
        #(#attributes)*
    }
}
