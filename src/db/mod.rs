//! Database layer: dialect-aware SQL generation, the safety filter, per-call
//! execution, and the introspection operations built on top of them.

pub mod dialect;
pub mod executor;
pub mod introspect;
pub mod safety;
pub mod types;

pub use dialect::{Dialect, PostgresDialect, SqlServerDialect};
pub use executor::{Connector, mask_credentials};
pub use introspect::Introspector;
pub use safety::{UNSAFE_KEYWORDS, first_unsafe_keyword, is_unsafe_query};
