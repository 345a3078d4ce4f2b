use serde::Serialize;

/// In-memory copy of the table/column/primary-key metadata of the user
/// schema, built once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseMetadata {
    pub tables: Vec<TableMetadata>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(rename = "primaryKey")]
    pub primary_key: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: String,
    /// `YES`/`NO` as reported by information_schema.
    pub nullable: String,
}

impl DatabaseMetadata {
    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.iter().find(|t| t.name == name)
    }
}
