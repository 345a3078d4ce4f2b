use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{debug, warn};

use crate::db::{Database, DatabaseMetadata, RowRecord, TableMetadata};
use crate::error::Error;

/// Shared request context: the pooled handle and the immutable catalog
/// built before the server started serving.
#[derive(Clone)]
pub struct AppState {
    db: Database,
    catalog: Arc<DatabaseMetadata>,
}

impl AppState {
    pub fn new(db: Database, catalog: DatabaseMetadata) -> Self {
        Self {
            db,
            catalog: Arc::new(catalog),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tables", get(list_tables))
        .route("/tables/{name}/data", get(table_data))
        .with_state(state)
}

async fn list_tables(State(state): State<AppState>) -> Json<Vec<TableMetadata>> {
    Json(state.catalog.tables.clone())
}

async fn table_data(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<RowRecord>>, Error> {
    let table = state
        .catalog
        .table(&name)
        .ok_or_else(|| Error::UnknownTable(name.clone()))?;

    let rows = state.db.fetch_all(table).await.inspect_err(|e| {
        warn!(table = %name, error = %e, "data request failed");
    })?;
    debug!(table = %name, rows = rows.len(), "data request served");

    Ok(Json(rows))
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::UnknownTable(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Column;
    use axum::body::Body;
    use axum::http::{header, Request};
    use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tokio_postgres::NoTls;
    use tower::ServiceExt;

    /// A pool that never dials out: connections are only established on
    /// first checkout, and these tests stop at the catalog check.
    fn lazy_database() -> Database {
        let config = "host=127.0.0.1 user=postgres"
            .parse::<tokio_postgres::Config>()
            .unwrap();
        let manager = Manager::from_config(
            config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager).max_size(1).build().unwrap();
        Database::with_pool(pool)
    }

    fn test_router(tables: Vec<TableMetadata>) -> Router {
        router(AppState::new(
            lazy_database(),
            DatabaseMetadata { tables },
        ))
    }

    fn users_table() -> TableMetadata {
        TableMetadata {
            name: "users".to_string(),
            columns: vec![
                Column {
                    name: "id".to_string(),
                    data_type: "integer".to_string(),
                    nullable: "NO".to_string(),
                },
                Column {
                    name: "name".to_string(),
                    data_type: "text".to_string(),
                    nullable: "NO".to_string(),
                },
                Column {
                    name: "email".to_string(),
                    data_type: "text".to_string(),
                    nullable: "YES".to_string(),
                },
            ],
            primary_key: vec!["id".to_string()],
        }
    }

    async fn get_response(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, body.to_vec())
    }

    #[tokio::test]
    async fn test_tables_empty_catalog() {
        let (status, content_type, body) = get_response(test_router(vec![]), "/tables").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_tables_returns_cached_catalog() {
        let (status, _, body) =
            get_response(test_router(vec![users_table()]), "/tables").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!([{
                "name": "users",
                "columns": [
                    {"name": "id", "dataType": "integer", "nullable": "NO"},
                    {"name": "name", "dataType": "text", "nullable": "NO"},
                    {"name": "email", "dataType": "text", "nullable": "YES"},
                ],
                "primaryKey": ["id"],
            }])
        );
    }

    #[tokio::test]
    async fn test_unknown_table_is_404() {
        let (status, _, body) = get_response(
            test_router(vec![users_table()]),
            "/tables/nonexistent/data",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "unknown table: nonexistent"
        );
    }

    #[tokio::test]
    async fn test_quoted_name_rejected_before_any_sql() {
        // %22 decodes to a double quote; the catalog check must turn
        // this into a 404 without the request ever reaching the pool.
        let (status, _, _) = get_response(
            test_router(vec![users_table()]),
            "/tables/weird%22table/data",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
