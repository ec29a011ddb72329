pub use sqlcrud_core::*;
pub use sqlcrud_macros::Record;
