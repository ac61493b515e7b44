pub(crate) mod dsn;
pub(crate) mod pragmas;

pub use dsn::{absolutize_sqlite_dsn, is_memory_dsn};
pub(crate) use dsn::{parse_sqlite_dsn, SqliteTarget};
pub(crate) use pragmas::Pragmas;
