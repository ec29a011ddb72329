use crate::decode_column::{ColumnMetadata, Kind};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ItemStruct;

pub(crate) fn record_trait(item: &ItemStruct, columns: &[ColumnMetadata]) -> TokenStream {
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let count = columns.len();
    let column_defs = columns.iter().map(|c| {
        let column = &c.name;
        let field = c.ident.to_string();
        let primary_key = c.primary_key;
        let nullable = c.nullable;
        let kind = c.kind;
        quote! {
            ::sqlcrud::ColumnDef {
                name: #column,
                field: #field,
                primary_key: #primary_key,
                nullable: #nullable,
                kind: #kind,
            }
        }
    });
    let field_values = columns.iter().enumerate().map(|(i, c)| {
        let field = &c.ident;
        let value = match (c.kind, c.nullable) {
            (Kind::Structured, false) => quote!(Some(::sqlcrud::encode_json(&self.#field)?)),
            (Kind::Structured, true) => quote! {
                self.#field
                    .as_ref()
                    .map(|v| ::sqlcrud::encode_json(v))
                    .transpose()?
            },
            (_, false) => quote! {
                Some(::sqlcrud::AsValue::as_value(::std::clone::Clone::clone(&self.#field)))
            },
            (_, true) => quote! {
                ::std::clone::Clone::clone(&self.#field).map(::sqlcrud::AsValue::as_value)
            },
        };
        quote! {
            ::sqlcrud::FieldValue {
                column: &columns[#i],
                value: #value,
            }
        }
    });
    let assignments = columns.iter().enumerate().map(|(i, c)| {
        let field = &c.ident;
        let message = format!("Cannot assign column `{}` to field `{}`", c.name, c.ident);
        let converted = if c.kind == Kind::Structured {
            quote!(::sqlcrud::decode_json(value))
        } else {
            quote!(::sqlcrud::AsValue::try_from_value(value))
        };
        quote! {
            Some(#i) => {
                self.#field = ::sqlcrud::Context::context(#converted, #message)?;
            }
        }
    });
    quote! {
        impl #impl_generics ::sqlcrud::Record for #name #ty_generics #where_clause {
            fn columns() -> &'static [::sqlcrud::ColumnDef] {
                static COLUMNS: [::sqlcrud::ColumnDef; #count] = [#(#column_defs),*];
                &COLUMNS
            }

            fn field_values(&self) -> ::sqlcrud::Result<Vec<::sqlcrud::FieldValue>> {
                let columns = <Self as ::sqlcrud::Record>::columns();
                Ok(vec![#(#field_values),*])
            }

            fn set_column(
                &mut self,
                name: &str,
                value: ::sqlcrud::Value,
            ) -> ::sqlcrud::Result<bool> {
                match ::sqlcrud::find_column::<Self>(name) {
                    #(#assignments)*
                    _ => return Ok(false),
                }
                Ok(true)
            }
        }
    }
}
