use crate::{
    CoercionPolicy, ColumnInfo, Columns, Dialect, Error, QueryResult, Record, Result, Value,
    coerce,
    stream::{Stream, StreamExt},
};
use std::{collections::BTreeMap, pin::pin};

/// Result of an array query: lower-cased column names and positional rows.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RowArrays {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// A row keyed by lower-cased column name.
pub type RowMap = BTreeMap<String, Value>;

/// Drain a query stream, coercing every value and handing rows to `on_row`.
///
/// The stream is read forward to exhaustion. An error before the column header
/// aborts before any row is seen, a row error stops the loop and is returned.
pub async fn for_each_row<S>(
    stream: S,
    dialect: Dialect,
    policy: CoercionPolicy,
    mut on_row: impl FnMut(&[ColumnInfo], Vec<Value>) -> Result<()>,
) -> Result<Columns>
where
    S: Stream<Item = Result<QueryResult>>,
{
    let mut stream = pin!(stream);
    let mut columns: Option<Columns> = None;
    while let Some(item) = stream.next().await {
        match item? {
            QueryResult::Columns(header) => columns = Some(header),
            QueryResult::Row(row) => {
                let Some(columns) = &columns else {
                    return Err(Error::msg("Received a row before the column header"));
                };
                let values = row
                    .into_vec()
                    .into_iter()
                    .enumerate()
                    .map(|(i, value)| {
                        let type_name = columns.get(i).map(|c| c.type_name.as_str());
                        coerce(value, type_name.unwrap_or_default(), dialect, policy)
                    })
                    .collect::<Result<Vec<_>>>()?;
                on_row(&columns[..], values)?;
            }
        }
    }
    Ok(columns.unwrap_or_default())
}

pub async fn collect_arrays<S>(
    stream: S,
    dialect: Dialect,
    policy: CoercionPolicy,
) -> Result<RowArrays>
where
    S: Stream<Item = Result<QueryResult>>,
{
    let mut rows = Vec::new();
    let columns = for_each_row(stream, dialect, policy, |_, row| {
        rows.push(row);
        Ok(())
    })
    .await?;
    Ok(RowArrays {
        columns: columns.iter().map(|c| c.name.to_lowercase()).collect(),
        rows,
    })
}

pub async fn collect_maps<S>(
    stream: S,
    dialect: Dialect,
    policy: CoercionPolicy,
) -> Result<Vec<RowMap>>
where
    S: Stream<Item = Result<QueryResult>>,
{
    let mut rows = Vec::new();
    for_each_row(stream, dialect, policy, |columns, row| {
        rows.push(
            columns
                .iter()
                .map(|c| c.name.to_lowercase())
                .zip(row)
                .collect(),
        );
        Ok(())
    })
    .await?;
    Ok(rows)
}

pub async fn collect_records<R, S>(
    stream: S,
    dialect: Dialect,
    policy: CoercionPolicy,
) -> Result<Vec<R>>
where
    R: Record + Default,
    S: Stream<Item = Result<QueryResult>>,
{
    let mut records = Vec::new();
    for_each_row(stream, dialect, policy, |columns, row| {
        let mut record = R::default();
        assign_row(&mut record, columns, row, policy)?;
        records.push(record);
        Ok(())
    })
    .await?;
    Ok(records)
}

/// Copy a coerced row into the matching fields of `record`.
///
/// Columns without a field are dropped. A value the field rejects leaves the
/// field as it was under the lenient policy and fails under the strict one.
pub fn assign_row<R: Record>(
    record: &mut R,
    columns: &[ColumnInfo],
    row: Vec<Value>,
    policy: CoercionPolicy,
) -> Result<()> {
    for (column, value) in columns.iter().zip(row) {
        match record.set_column(&column.name, value) {
            Ok(..) => {}
            Err(e) if policy == CoercionPolicy::Lenient => {
                log::warn!("Skipping column `{}`: {:#}", column.name, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
