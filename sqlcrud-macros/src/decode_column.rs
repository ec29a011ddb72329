use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use std::cmp::min;
use syn::{
    Field, GenericArgument, Ident, LitStr, Path, PathArguments, Type, TypePath, Visibility,
    parse::ParseBuffer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Primitive,
    Temporal,
    Structured,
}

impl ToTokens for Kind {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Kind::Primitive => quote!(::sqlcrud::FieldKind::Primitive),
            Kind::Temporal => quote!(::sqlcrud::FieldKind::Temporal),
            Kind::Structured => quote!(::sqlcrud::FieldKind::Structured),
        });
    }
}

#[derive(Debug)]
pub(crate) struct ColumnMetadata {
    pub(crate) ident: Ident,
    pub(crate) name: String,
    pub(crate) primary_key: bool,
    pub(crate) nullable: bool,
    pub(crate) kind: Kind,
}

fn matches_path(path: &Path, expect: &[&str]) -> bool {
    let len = min(path.segments.len(), expect.len());
    path.segments
        .iter()
        .rev()
        .take(len)
        .map(|v| &v.ident)
        .eq(expect.iter().rev().take(len))
}

fn single_argument(path: &Path) -> Option<&Type> {
    let PathArguments::AngleBracketed(arguments) = &path.segments.last()?.arguments else {
        return None;
    };
    match arguments.args.first()? {
        GenericArgument::Type(ty) if arguments.args.len() == 1 => Some(ty),
        _ => None,
    }
}

fn is_u8(ty: &Type) -> bool {
    matches!(ty, Type::Path(TypePath { path, .. }) if path.is_ident("u8"))
}

/// Classify a field type, returns whether it is an `Option` and its kind.
pub(crate) fn decode_type(ty: &Type) -> (bool, Kind) {
    let Type::Path(TypePath { path, qself: None }) = ty else {
        return (false, Kind::Structured);
    };
    if matches_path(path, &["std", "option", "Option"]) {
        if let Some(inner) = single_argument(path) {
            return (true, decode_type(inner).1);
        }
    }
    if matches_path(path, &["std", "boxed", "Box"]) {
        match single_argument(path) {
            Some(Type::Slice(slice)) if is_u8(&slice.elem) => return (false, Kind::Primitive),
            Some(inner) => return (false, decode_type(inner).1),
            None => {}
        }
    }
    if matches_path(path, &["std", "vec", "Vec"]) {
        return match single_argument(path) {
            Some(inner) if is_u8(inner) => (false, Kind::Primitive),
            _ => (false, Kind::Structured),
        };
    }
    if let Some(ident) = path.get_ident() {
        if [
            "bool", "i8", "i16", "i32", "i64", "u8", "u16", "u32", "f32", "f64", "char",
        ]
        .iter()
        .any(|v| ident == v)
        {
            return (false, Kind::Primitive);
        }
    }
    let kind = if matches_path(path, &["std", "string", "String"])
        || matches_path(path, &["uuid", "Uuid"])
    {
        Kind::Primitive
    } else if matches_path(path, &["time", "Date"])
        || matches_path(path, &["time", "Time"])
        || matches_path(path, &["time", "PrimitiveDateTime"])
    {
        Kind::Temporal
    } else {
        Kind::Structured
    };
    (false, kind)
}

/// Read the `#[crud(..)]` attribute of a field.
///
/// Returns `None` for fields that are not persisted: private ones and the ones
/// without a column name.
pub(crate) fn decode_column(field: &Field) -> Option<ColumnMetadata> {
    if matches!(field.vis, Visibility::Inherited) {
        return None;
    }
    let ident = field
        .ident
        .clone()
        .expect("Record can only be derived on structs with named fields");
    let (nullable, kind) = decode_type(&field.ty);
    let mut metadata = ColumnMetadata {
        ident,
        name: String::new(),
        primary_key: false,
        nullable,
        kind,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("crud") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `crud`, use it like: `#[crud(column = \"NAME\", ...)]`");
        };
        let result = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("column") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `column`, use it like: `#[crud(column = \"NAME\")]`");
                };
                metadata.name = v.value();
            } else if arg.path.is_ident("primary_key") {
                let Err(..) = arg.value() else {
                    panic!("Error while parsing `primary_key`, use it like: `#[crud(primary_key)]`");
                };
                metadata.primary_key = true;
            } else if arg.path.is_ident("json") {
                let Err(..) = arg.value() else {
                    panic!("Error while parsing `json`, use it like: `#[crud(json)]`");
                };
                metadata.kind = Kind::Structured;
            } else {
                panic!(
                    "Unknown attribute `{}` inside crud macro",
                    arg.path.to_token_stream()
                );
            }
            Ok(())
        });
        if let Err(e) = result {
            panic!("Error while parsing `crud`: {}", e);
        }
    }
    if metadata.name.is_empty() {
        return None;
    }
    Some(metadata)
}

#[cfg(test)]
mod tests {
    use super::{Kind, decode_column, decode_type};
    use syn::{Field, ItemStruct, Type, parse_quote};

    fn classify(ty: Type) -> (bool, Kind) {
        decode_type(&ty)
    }

    fn first_field(item: ItemStruct) -> Field {
        item.fields.into_iter().next().unwrap()
    }

    #[test]
    fn classification() {
        assert_eq!(classify(parse_quote!(i64)), (false, Kind::Primitive));
        assert_eq!(classify(parse_quote!(String)), (false, Kind::Primitive));
        assert_eq!(classify(parse_quote!(std::string::String)), (false, Kind::Primitive));
        assert_eq!(classify(parse_quote!(uuid::Uuid)), (false, Kind::Primitive));
        assert_eq!(classify(parse_quote!(Vec<u8>)), (false, Kind::Primitive));
        assert_eq!(classify(parse_quote!(Box<[u8]>)), (false, Kind::Primitive));
        assert_eq!(classify(parse_quote!(time::Date)), (false, Kind::Temporal));
        assert_eq!(classify(parse_quote!(PrimitiveDateTime)), (false, Kind::Temporal));
        assert_eq!(classify(parse_quote!(Option<f64>)), (true, Kind::Primitive));
        assert_eq!(classify(parse_quote!(Option<Box<Time>>)), (true, Kind::Temporal));
        assert_eq!(classify(parse_quote!(Vec<String>)), (false, Kind::Structured));
        assert_eq!(classify(parse_quote!(Address)), (false, Kind::Structured));
        assert_eq!(classify(parse_quote!(Option<Address>)), (true, Kind::Structured));
        assert_eq!(classify(parse_quote!((i32, i32))), (false, Kind::Structured));
    }

    #[test]
    fn attributes() {
        let field = first_field(parse_quote!(struct S { #[crud(column = "ID", primary_key)] pub id: i32 }));
        let column = decode_column(&field).unwrap();
        assert_eq!(column.name, "ID");
        assert!(column.primary_key);
        assert!(!column.nullable);

        let field = first_field(parse_quote!(struct S { #[crud(column = "TAGS", json)] pub tags: Option<String> }));
        let column = decode_column(&field).unwrap();
        assert_eq!(column.kind, Kind::Structured);
        assert!(column.nullable);

        let field = first_field(parse_quote!(struct S { #[crud(column = "SECRET")] secret: String }));
        assert!(decode_column(&field).is_none());
        let field = first_field(parse_quote!(struct S { pub transient: String }));
        assert!(decode_column(&field).is_none());
        let field = first_field(parse_quote!(struct S { #[crud(column = "")] pub empty: String }));
        assert!(decode_column(&field).is_none());
    }
}
