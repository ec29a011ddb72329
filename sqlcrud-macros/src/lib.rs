mod decode_column;
mod record_trait;

use decode_column::decode_column;
use proc_macro::TokenStream;
use record_trait::record_trait;
use syn::{Fields, ItemStruct, parse_macro_input};

/// Implement `sqlcrud::Record` for a struct with named fields.
///
/// A public field is persisted when it carries `#[crud(column = "NAME")]`,
/// `primary_key` marks it as part of the key and `json` stores it as JSON text
/// whatever its type.
#[proc_macro_derive(Record, attributes(crud))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let Fields::Named(fields) = &item.fields else {
        panic!(
            "Record can only be derived on structs with named fields, `{}` is not",
            item.ident
        );
    };
    let columns = fields.named.iter().filter_map(decode_column).collect::<Vec<_>>();
    record_trait(&item, &columns).into()
}
