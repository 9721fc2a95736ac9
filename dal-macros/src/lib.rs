mod decode_field;

use decode_field::{decode_field, field_def};
use proc_macro::TokenStream;
use quote::quote;
use syn::{Fields, ItemStruct, parse_macro_input};

/// Derives `dal::Aggregate` and `dal::AsValue` for a struct with named fields.
///
/// Every field type must implement `AsValue` and `Clone`, the struct must implement `Default`.
/// Field attributes:
/// - `#[dal(name = "column")]` uses `column` as the key instead of the field name.
/// - `#[dal(skip)]` leaves the field out of every conversion.
#[proc_macro_derive(Aggregate, attributes(dal))]
pub fn derive_aggregate(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    if !item.generics.params.is_empty() {
        panic!("Aggregate cannot be derived for the generic struct `{}`", name);
    }
    if !matches!(item.fields, Fields::Named(..)) {
        panic!(
            "Aggregate can only be derived for structs with named fields, `{}` is not",
            name
        );
    }
    let fields = item
        .fields
        .iter()
        .map(decode_field)
        .filter(|f| !f.skip)
        .collect::<Vec<_>>();
    let field_defs = fields.iter().map(|f| field_def(name, f));
    quote! {
        impl ::dal::Aggregate for #name {
            fn name() -> &'static str {
                ::std::concat!(::std::module_path!(), "::", ::std::stringify!(#name))
            }
            fn fields() -> &'static [::dal::FieldDef<Self>] {
                static FIELDS: &[::dal::FieldDef<#name>] = &[#(#field_defs),*];
                FIELDS
            }
        }
        impl ::dal::AsValue for #name {
            fn as_value(self) -> ::dal::Value {
                ::dal::aggregate_as_value(&self)
            }
            fn try_from_value(value: ::dal::Value) -> ::dal::Result<Self> {
                ::dal::aggregate_from_value(value)
            }
            fn assign_from_value(&mut self, value: ::dal::Value) -> ::dal::Result<()> {
                ::dal::aggregate_assign(self, value)
            }
        }
        impl ::std::convert::From<#name> for ::dal::Value {
            fn from(value: #name) -> Self {
                ::dal::aggregate_as_value(&value)
            }
        }
        impl ::std::convert::From<&#name> for ::dal::Value {
            fn from(value: &#name) -> Self {
                ::dal::aggregate_as_value(value)
            }
        }
    }
    .into()
}
