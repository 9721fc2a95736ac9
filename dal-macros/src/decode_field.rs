use proc_macro2::TokenStream;
use quote::quote;
use syn::{Field, Ident, LitStr, Type, parse::ParseBuffer};

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    pub(crate) skip: bool,
}

pub fn decode_field(field: &Field) -> FieldMetadata {
    let Some(ident) = field.ident.clone() else {
        panic!("Aggregate can only be derived for structs with named fields");
    };
    let mut metadata = FieldMetadata {
        name: ident.to_string(),
        ident,
        ty: field.ty.clone(),
        skip: false,
    };
    if metadata.name.starts_with("r#") {
        metadata.name.drain(..2);
    }
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("dal") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `dal`, use it like: `#[dal(attribute = value, ...)]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!("Error while parsing `name`, use it like: `#[dal(name = \"my_column\")]`");
                    };
                    metadata.name = v.value();
                } else if arg.path.is_ident("skip") {
                    let Err(..) = arg.value() else {
                        // value() is Err for Meta::Path
                        panic!("Error while parsing `skip`, use it like: `#[dal(skip)]`");
                    };
                    metadata.skip = true;
                } else {
                    panic!(
                        "Unknown attribute `{}` inside dal macro",
                        arg.path.get_ident().map(ToString::to_string).unwrap_or_default()
                    );
                }
                Ok(())
            });
        }
    }
    if metadata.name.is_empty() {
        panic!("Field `{}` cannot have an empty name", metadata.ident);
    }
    metadata
}

/// `dal::FieldDef` reading and writing `field` of the aggregate `aggregate`.
pub(crate) fn field_def(aggregate: &Ident, field: &FieldMetadata) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let key = &field.name;
    quote! {
        ::dal::FieldDef {
            name: #key,
            get: |aggregate: &#aggregate| {
                ::dal::AsValue::as_value(<#ty as ::std::clone::Clone>::clone(&aggregate.#ident))
            },
            set: |aggregate: &mut #aggregate, value: ::dal::Value| {
                ::dal::AsValue::assign_from_value(&mut aggregate.#ident, value)
            },
        }
    }
}
