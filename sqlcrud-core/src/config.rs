use std::env;

/// Environment variable enabling the failing statement trace when set to `dev`.
pub const ENV_VARIABLE: &str = "SQLCRUD_ENV";
/// Environment variable selecting the coercion policy (`strict` or `lenient`).
pub const COERCION_VARIABLE: &str = "SQLCRUD_COERCION";

/// What to do when a value cannot be interpreted as its declared type.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionPolicy {
    /// Keep the best prior representation and log a warning.
    #[default]
    Lenient,
    /// Fail the operation.
    Strict,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub coercion: CoercionPolicy,
    /// Log the text of every failing statement.
    pub trace_sql: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let trace_sql = env::var(ENV_VARIABLE).is_ok_and(|v| v.eq_ignore_ascii_case("dev"));
        let coercion = match env::var(COERCION_VARIABLE) {
            Ok(v) if v.eq_ignore_ascii_case("strict") => CoercionPolicy::Strict,
            Ok(v) if !v.eq_ignore_ascii_case("lenient") => {
                log::warn!(
                    "Unknown value `{}` for {}, falling back to lenient coercion",
                    v,
                    COERCION_VARIABLE
                );
                CoercionPolicy::Lenient
            }
            _ => CoercionPolicy::Lenient,
        };
        Self {
            coercion,
            trace_sql,
        }
    }

    pub fn strict(mut self) -> Self {
        self.coercion = CoercionPolicy::Strict;
        self
    }

    pub fn trace_sql(mut self, trace_sql: bool) -> Self {
        self.trace_sql = trace_sql;
        self
    }
}
