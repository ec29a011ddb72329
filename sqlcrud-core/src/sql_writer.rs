use crate::{CrudError, Dialect, Result, Value, separated_by};
use std::{borrow::Cow, fmt::Write};

/// Escape text this crate concatenates into statements: doubles every `'` and
/// strips every `--`.
///
/// Applied to identifiers and fragments built from record metadata. Values never
/// go through here, they are always bound to placeholders.
pub fn sql_safe(value: &str) -> Cow<'_, str> {
    if !value.contains('\'') && !value.contains("--") {
        return Cow::Borrowed(value);
    }
    Cow::Owned(value.replace('\'', "''").replace("--", ""))
}

/// Column and placeholder lists of an `INSERT`, aligned with `values`.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct InsertFragment {
    pub placeholders: String,
    pub columns: String,
    pub values: Vec<Value>,
}

/// `col=<placeholder>` list of an `UPDATE`.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SetFragment {
    pub clause: String,
    pub values: Vec<Value>,
}

/// `AND col=<placeholder>` chain, empty when there is no key.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct WhereFragment {
    pub clause: String,
    pub values: Vec<Value>,
}

impl WhereFragment {
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }
}

/// Build the `INSERT` lists in a single ordered pass.
pub fn insert_fragment<N: AsRef<str>>(
    columns: impl IntoIterator<Item = (N, Value)>,
    dialect: Dialect,
) -> Result<InsertFragment> {
    let mut fragment = InsertFragment::default();
    let mut names = String::new();
    for (i, (name, value)) in columns.into_iter().enumerate() {
        if i > 0 {
            names.push(',');
            fragment.placeholders.push(',');
        }
        names.push_str(name.as_ref());
        dialect.write_placeholder(&mut fragment.placeholders, i);
        fragment.values.push(value);
    }
    if fragment.values.is_empty() {
        return Err(CrudError::EmptyParameters.into());
    }
    fragment.columns = sql_safe(&names).into_owned();
    Ok(fragment)
}

/// Build the `SET` list, placeholders numbered from zero.
pub fn update_fragment<N: AsRef<str>>(
    columns: impl IntoIterator<Item = (N, Value)>,
    dialect: Dialect,
) -> Result<SetFragment> {
    let mut clause = String::new();
    let mut values = Vec::new();
    separated_by(
        &mut clause,
        columns,
        |out, (name, value)| {
            out.push_str(name.as_ref());
            out.push('=');
            dialect.write_placeholder(out, values.len());
            values.push(value);
        },
        ",",
    );
    if values.is_empty() {
        return Err(CrudError::EmptyParameters.into());
    }
    Ok(SetFragment {
        clause: sql_safe(&clause).into_owned(),
        values,
    })
}

/// Build the `AND` chain of a `WHERE`, placeholders numbered from `start`.
///
/// Keys whose name starts with `.` are synthetic and never reach the statement.
pub fn where_fragment<N: AsRef<str>>(
    keys: impl IntoIterator<Item = (N, Value)>,
    start: usize,
    dialect: Dialect,
) -> WhereFragment {
    let mut clause = String::new();
    let mut values = Vec::new();
    separated_by(
        &mut clause,
        keys.into_iter().filter(|(name, _)| !name.as_ref().starts_with('.')),
        |out, (name, value)| {
            out.push_str("AND ");
            out.push_str(name.as_ref());
            out.push('=');
            dialect.write_placeholder(out, start + values.len());
            values.push(value);
        },
        " ",
    );
    WhereFragment {
        clause: sql_safe(&clause).into_owned(),
        values,
    }
}

/// Statement writer for a resolved dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlWriter {
    pub dialect: Dialect,
}

impl SqlWriter {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    fn write_where(&self, out: &mut String, condition: &WhereFragment) {
        out.push_str(" WHERE 1=1");
        if !condition.is_empty() {
            out.push(' ');
            out.push_str(&condition.clause);
        }
    }

    pub fn write_select<N: AsRef<str>>(
        &self,
        out: &mut String,
        table: &str,
        columns: impl IntoIterator<Item = N>,
        condition: &WhereFragment,
    ) {
        let mut names = String::new();
        separated_by(
            &mut names,
            columns,
            |out, name| out.push_str(name.as_ref()),
            ", ",
        );
        let _ = write!(
            out,
            "SELECT {} FROM {}",
            sql_safe(&names),
            sql_safe(table)
        );
        self.write_where(out, condition);
    }

    pub fn write_insert(&self, out: &mut String, table: &str, fragment: &InsertFragment) {
        let _ = write!(
            out,
            "INSERT INTO {} ({}) VALUES ({})",
            sql_safe(table),
            fragment.columns,
            fragment.placeholders
        );
    }

    pub fn write_update(
        &self,
        out: &mut String,
        table: &str,
        set: &SetFragment,
        condition: &WhereFragment,
    ) {
        let _ = write!(out, "UPDATE {} SET {}", sql_safe(table), set.clause);
        self.write_where(out, condition);
    }

    pub fn write_delete(&self, out: &mut String, table: &str, condition: &WhereFragment) {
        let _ = write!(out, "DELETE FROM {}", sql_safe(table));
        self.write_where(out, condition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping() {
        assert_eq!(sql_safe("asdf"), "asdf");
        assert_eq!(sql_safe("asdf'asdf"), "asdf''asdf");
        assert_eq!(sql_safe("asdf--asdf"), "asdfasdf");
        assert_eq!(sql_safe("a'b--c"), "a''bc");
        assert!(matches!(sql_safe("plain"), Cow::Borrowed(..)));
    }

    #[test]
    fn fragments_keep_order() {
        let fragment = insert_fragment(
            [("NAME", Value::from("x")), ("ID", Value::from(1))],
            Dialect::Postgres,
        )
        .unwrap();
        assert_eq!(fragment.columns, "NAME,ID");
        assert_eq!(fragment.placeholders, "$1,$2");
        assert_eq!(fragment.values, vec![Value::from("x"), Value::from(1)]);

        let set = update_fragment([("A", Value::from(1)), ("B", Value::from(2))], Dialect::Oracle)
            .unwrap();
        assert_eq!(set.clause, "A=:1,B=:2");

        let condition = where_fragment(
            [("ID", Value::from(3)), (".synthetic", Value::from(4)), ("K", Value::from(5))],
            2,
            Dialect::SqlServer,
        );
        assert_eq!(condition.clause, "AND ID=@p3 AND K=@p4");
        assert_eq!(condition.values, vec![Value::from(3), Value::from(5)]);
    }

    #[test]
    fn empty_fragments() {
        let empty: [(&str, Value); 0] = [];
        let error = insert_fragment(empty.clone(), Dialect::Sqlite).unwrap_err();
        assert_eq!(
            error.downcast_ref::<CrudError>(),
            Some(&CrudError::EmptyParameters)
        );
        assert!(update_fragment(empty.clone(), Dialect::Sqlite).is_err());
        let condition = where_fragment(empty, 0, Dialect::Sqlite);
        assert!(condition.is_empty());
        assert!(condition.values.is_empty());
    }
}
