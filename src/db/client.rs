use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use postgres_protocol::escape::escape_identifier;
use tokio_postgres::{Client, NoTls};
use tracing::debug;

use crate::db::models::{Column, DatabaseMetadata, TableMetadata};
use crate::db::value::{decode_cell, RowRecord};
use crate::error::{Error, Result};

const POOL_SIZE: usize = 16;

/// Pooled handle to the target database. Cloning shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

/// Build the data statement for a table. The name comes from the cached
/// catalog, but it is identifier-quoted anyway so names with embedded
/// quotes or other special characters cannot alter the statement.
fn select_all(table: &str) -> String {
    format!("SELECT * FROM {}", escape_identifier(table))
}

impl Database {
    /// Open a pool from a connection string and verify connectivity
    /// with a round-trip probe before handing the handle out.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let config = connection_string
            .parse::<tokio_postgres::Config>()
            .map_err(|e| Error::Connect(e.to_string()))?;

        let manager = Manager::from_config(
            config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager)
            .max_size(POOL_SIZE)
            .build()
            .map_err(|e| Error::Connect(e.to_string()))?;

        let db = Self::with_pool(pool);
        db.probe().await?;
        Ok(db)
    }

    pub(crate) fn with_pool(pool: Pool) -> Self {
        Database { pool }
    }

    async fn probe(&self) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;
        Ok(())
    }

    /// Release all pooled connections. Idempotent.
    pub fn close(&self) {
        self.pool.close();
    }

    /// Build the catalog of the user schema: every base table with its
    /// columns and primary key. All queries run on one pooled client so
    /// the enumeration is stable within the invocation. Any failure
    /// aborts the build; a partial catalog is never returned.
    pub async fn metadata(&self) -> Result<DatabaseMetadata> {
        let client = self.pool.get().await.map_err(|e| Error::Catalog {
            table: None,
            message: e.to_string(),
        })?;

        let names = Self::table_names(&client).await?;

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let columns = Self::table_columns(&client, &name).await?;
            let primary_key = Self::table_primary_key(&client, &name).await?;
            debug!(
                table = %name,
                columns = columns.len(),
                "table metadata loaded"
            );
            tables.push(TableMetadata {
                name,
                columns,
                primary_key,
            });
        }

        Ok(DatabaseMetadata { tables })
    }

    async fn table_names(client: &Client) -> Result<Vec<String>> {
        let rows = client
            .query(
                "SELECT table_name FROM information_schema.tables
                 WHERE table_schema = 'public'
                 AND table_type = 'BASE TABLE'",
                &[],
            )
            .await
            .map_err(|e| Error::Catalog {
                table: None,
                message: format!("listing tables: {e}"),
            })?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn table_columns(client: &Client, table: &str) -> Result<Vec<Column>> {
        let rows = client
            .query(
                "SELECT column_name, data_type, is_nullable
                 FROM information_schema.columns
                 WHERE table_schema = 'public'
                 AND table_name = $1
                 ORDER BY ordinal_position",
                &[&table],
            )
            .await
            .map_err(|e| Error::Catalog {
                table: Some(table.to_string()),
                message: format!("columns: {e}"),
            })?;

        Ok(rows
            .iter()
            .map(|row| Column {
                name: row.get(0),
                data_type: row.get(1),
                nullable: row.get(2),
            })
            .collect())
    }

    async fn table_primary_key(client: &Client, table: &str) -> Result<Vec<String>> {
        // An empty result is a table without a declared primary key.
        let rows = client
            .query(
                "SELECT kcu.column_name
                 FROM information_schema.table_constraints tc
                 JOIN information_schema.key_column_usage kcu
                     ON tc.constraint_name = kcu.constraint_name
                     AND tc.table_schema = kcu.table_schema
                 WHERE tc.constraint_type = 'PRIMARY KEY'
                     AND tc.table_schema = 'public'
                     AND tc.table_name = $1
                 ORDER BY kcu.ordinal_position",
                &[&table],
            )
            .await
            .map_err(|e| Error::Catalog {
                table: Some(table.to_string()),
                message: format!("primary key: {e}"),
            })?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    /// Fetch every row of a table as column-name → JSON value records.
    /// Takes the catalog entry rather than a raw name, so callers must
    /// have resolved the name against the cached catalog first. Column
    /// identity and order come from the live result, not the catalog.
    pub async fn fetch_all(&self, table: &TableMetadata) -> Result<Vec<RowRecord>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| Error::Query(e.to_string()))?;

        let statement = select_all(&table.name);
        let rows = client
            .query(statement.as_str(), &[])
            .await
            .map_err(|e| Error::Query(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = RowRecord::new();
            for (idx, column) in row.columns().iter().enumerate() {
                let cell = decode_cell(row, idx)?;
                record.insert(column.name().to_string(), cell.into_json());
            }
            records.push(record);
        }

        Ok(records)
    }
}
