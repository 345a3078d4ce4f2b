mod client;
mod models;
mod value;

pub use client::Database;
pub use models::{Column, DatabaseMetadata, TableMetadata};
pub use value::RowRecord;
