use thiserror::Error;

/// Errors produced by the database layer.
///
/// Startup errors (`Connect`, `Catalog`) are fatal; the rest surface on
/// individual requests.
#[derive(Debug, Error)]
pub enum Error {
    #[error("database connection failed: {0}")]
    Connect(String),

    #[error("catalog extraction failed{}: {message}", .table.as_ref().map(|t| format!(" (table {t})")).unwrap_or_default())]
    Catalog {
        /// Table whose metadata query failed, when one was in scope.
        table: Option<String>,
        message: String,
    },

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("cannot decode column {column} of type {ty}")]
    Scan { column: String, ty: String },
}

pub type Result<T> = std::result::Result<T, Error>;
