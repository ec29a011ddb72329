use crate::{Result, Value};
use std::fmt::Write;

/// How a field value travels to and from the database.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Scalars, text, identifiers and byte vectors, used as they are.
    #[default]
    Primitive,
    /// Dates, times and timestamps, used as they are.
    Temporal,
    /// Anything else, stored as JSON text.
    Structured,
}

/// A persisted field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name in the database.
    pub name: &'static str,
    /// Rust field name.
    pub field: &'static str,
    pub primary_key: bool,
    /// The field is an `Option`, `None` means no value was supplied.
    pub nullable: bool,
    pub kind: FieldKind,
}

/// Current value of a persisted field, `None` when an optional field is unset.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub column: &'static ColumnDef,
    pub value: Option<Value>,
}

/// A type whose fields map to the columns of a table row.
///
/// Usually implemented with `#[derive(Record)]`, the metadata depends on the
/// declared shape of the type alone.
pub trait Record {
    /// Persisted columns in declaration order.
    fn columns() -> &'static [ColumnDef];

    /// Values of the persisted fields, aligned with [`Record::columns`].
    fn field_values(&self) -> Result<Vec<FieldValue>>;

    /// Assign the field mapped to `name` (case insensitive, first declared match).
    ///
    /// Returns `false` when no field matches, the error when the value does not
    /// convert into the field type. A failed assignment leaves the field untouched.
    fn set_column(&mut self, name: &str, value: Value) -> Result<bool>;
}

pub fn column_names<R: Record>() -> impl Iterator<Item = &'static str> {
    R::columns().iter().map(|c| c.name)
}

/// Position of the first column matching `name` case insensitively.
pub fn find_column<R: Record>(name: &str) -> Option<usize> {
    R::columns()
        .iter()
        .position(|c| c.name.eq_ignore_ascii_case(name))
}

/// Column values of a record, ready for clause building.
///
/// An unset optional key is kept as `NULL`, an unset optional non key field is
/// left out, so that a statement never overwrites a column the caller gave no
/// value for.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RecordValues {
    entries: Vec<(&'static ColumnDef, Value)>,
}

impl RecordValues {
    pub fn new<R: Record>(record: &R) -> Result<Self> {
        let entries = record
            .field_values()?
            .into_iter()
            .filter_map(|field| match field.value {
                Some(value) => Some((field.column, value)),
                None if field.column.primary_key => Some((field.column, Value::Null)),
                None => None,
            })
            .collect();
        Ok(Self { entries })
    }

    /// Non key columns.
    pub fn values(&self) -> impl Iterator<Item = (&'static str, Value)> + '_ {
        self.select(|c| !c.primary_key)
    }

    /// Primary key columns.
    pub fn keys(&self) -> impl Iterator<Item = (&'static str, Value)> + '_ {
        self.select(|c| c.primary_key)
    }

    /// Every column in declaration order, keys included.
    pub fn all(&self) -> impl Iterator<Item = (&'static str, Value)> + '_ {
        self.select(|_| true)
    }

    pub fn has_keys(&self) -> bool {
        self.entries.iter().any(|(c, _)| c.primary_key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys as `NAME=value` pairs, for diagnostics.
    pub fn describe_keys(&self) -> String {
        let mut out = String::new();
        for (i, (name, value)) in self.keys().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}={}", name, value);
        }
        out
    }

    fn select<'a>(
        &'a self,
        filter: impl Fn(&ColumnDef) -> bool + 'a,
    ) -> impl Iterator<Item = (&'static str, Value)> + 'a {
        self.entries
            .iter()
            .filter(move |(c, _)| filter(c))
            .map(|(c, v)| (c.name, v.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AsValue, Context};

    #[derive(Default, Debug, PartialEq)]
    struct Item {
        id: i64,
        name: Option<String>,
        price: f64,
        tag: Option<String>,
    }

    static ITEM_COLUMNS: [ColumnDef; 4] = [
        ColumnDef {
            name: "ID",
            field: "id",
            primary_key: true,
            nullable: false,
            kind: FieldKind::Primitive,
        },
        ColumnDef {
            name: "NAME",
            field: "name",
            primary_key: false,
            nullable: true,
            kind: FieldKind::Primitive,
        },
        ColumnDef {
            name: "PRICE",
            field: "price",
            primary_key: false,
            nullable: false,
            kind: FieldKind::Primitive,
        },
        ColumnDef {
            name: "TAG",
            field: "tag",
            primary_key: true,
            nullable: true,
            kind: FieldKind::Primitive,
        },
    ];

    impl Record for Item {
        fn columns() -> &'static [ColumnDef] {
            &ITEM_COLUMNS
        }

        fn field_values(&self) -> Result<Vec<FieldValue>> {
            Ok(vec![
                FieldValue {
                    column: &ITEM_COLUMNS[0],
                    value: Some(self.id.as_value()),
                },
                FieldValue {
                    column: &ITEM_COLUMNS[1],
                    value: self.name.clone().map(AsValue::as_value),
                },
                FieldValue {
                    column: &ITEM_COLUMNS[2],
                    value: Some(self.price.as_value()),
                },
                FieldValue {
                    column: &ITEM_COLUMNS[3],
                    value: self.tag.clone().map(AsValue::as_value),
                },
            ])
        }

        fn set_column(&mut self, name: &str, value: Value) -> Result<bool> {
            match find_column::<Self>(name) {
                Some(0) => self.id = AsValue::try_from_value(value).context("id")?,
                Some(1) => self.name = AsValue::try_from_value(value).context("name")?,
                Some(2) => self.price = AsValue::try_from_value(value).context("price")?,
                Some(3) => self.tag = AsValue::try_from_value(value).context("tag")?,
                _ => return Ok(false),
            }
            Ok(true)
        }
    }

    #[test]
    fn names_in_declaration_order() {
        assert_eq!(
            column_names::<Item>().collect::<Vec<_>>(),
            ["ID", "NAME", "PRICE", "TAG"]
        );
        assert_eq!(find_column::<Item>("price"), Some(2));
        assert_eq!(find_column::<Item>("missing"), None);
    }

    #[test]
    fn unset_optionals() {
        let item = Item {
            id: 5,
            name: None,
            price: 1.5,
            tag: None,
        };
        let values = RecordValues::new(&item).unwrap();
        assert_eq!(
            values.values().collect::<Vec<_>>(),
            [("PRICE", Value::Float64(1.5))]
        );
        assert_eq!(
            values.keys().collect::<Vec<_>>(),
            [("ID", Value::Int64(5)), ("TAG", Value::Null)]
        );
        assert_eq!(
            values.all().map(|(n, _)| n).collect::<Vec<_>>(),
            ["ID", "PRICE", "TAG"]
        );
        assert_eq!(values.describe_keys(), "ID=5, TAG=NULL");
    }

    #[test]
    fn assign_columns() {
        let mut item = Item::default();
        assert!(item.set_column("name", Value::from("pen")).unwrap());
        assert!(item.set_column("Id", Value::Int64(3)).unwrap());
        assert!(!item.set_column("other", Value::Int64(3)).unwrap());
        assert!(item.set_column("price", Value::from("abc")).is_err());
        assert_eq!(
            item,
            Item {
                id: 3,
                name: Some("pen".into()),
                price: 0.0,
                tag: None,
            }
        );
    }
}
