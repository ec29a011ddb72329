use thiserror::Error;

/// Conditions raised by the engine itself, carried inside [`crate::Error`].
///
/// Driver failures are not part of this enum: they propagate unchanged, so
/// `error.downcast_ref::<CrudError>()` tells the two apart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrudError {
    #[error("unknown database type")]
    UnknownDialect,
    #[error("empty parameter map")]
    EmptyParameters,
    #[error("no record found for {table}, {keys}")]
    NotFound { table: String, keys: String },
    #[error("record has no primary key, refusing to {operation} every row of {table}")]
    MissingPrimaryKey {
        operation: &'static str,
        table: String,
    },
    #[error("cannot coerce `{value}` declared as `{type_name}` into {target}")]
    Coercion {
        type_name: String,
        value: String,
        target: &'static str,
    },
}
