//! Postgres-backed document store.
//!
//! Documents live in a single JSONB table keyed by `(collection, id)`:
//!
//! ```sql
//! CREATE TABLE documents (
//!     collection TEXT  NOT NULL,
//!     id         TEXT  NOT NULL,
//!     data       JSONB NOT NULL,
//!     PRIMARY KEY (collection, id)
//! );
//! ```
//!
//! ## Ordering
//!
//! Queries order by a composite key `(type rank, value, id)` so that results
//! agree with [`storefront_catalog::compare_values`]: the type rank mirrors
//! [`storefront_catalog::value_rank`], and within one type Postgres' own jsonb
//! comparison orders numbers numerically and strings by collation. A missing
//! field orders as JSON `null`. Continuation uses a row comparison on the same
//! key, which is what makes "start after" exclusive and stable under ties.

use std::sync::Arc;

use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use storefront_catalog::{value_rank, DocumentQuery, DocumentStore, Filter, SortDirection, StoreError};
use storefront_core::{Document, DocumentId};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT  NOT NULL,
    id         TEXT  NOT NULL,
    data       JSONB NOT NULL,
    PRIMARY KEY (collection, id)
)
"#;

/// Postgres-backed [`DocumentStore`].
///
/// Uses the SQLx connection pool, which is `Send + Sync`; the store itself
/// holds no other state.
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and make sure the documents table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn scan(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 ORDER BY id")
            .bind(collection)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("scan", e))?;

        rows.iter().map(document_from_row).collect()
    }

    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        let mut qb = build_select(query);
        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("query", e))?;

        rows.iter().map(document_from_row).collect()
    }
}

fn build_select(query: &DocumentQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT id, data FROM documents WHERE collection = ");
    qb.push_bind(query.collection.clone());

    for filter in &query.filters {
        match filter {
            Filter::FieldEq { field, value } => {
                qb.push(" AND data -> ");
                qb.push_bind(field.clone());
                qb.push(" = ");
                qb.push_bind(Json(value.clone()));
            }
            Filter::IdEq(id) => {
                qb.push(" AND id = ");
                qb.push_bind(id.as_str().to_owned());
            }
        }
    }

    match &query.order_by {
        Some(order) => {
            if let Some(anchor) = &query.start_after {
                qb.push(" AND (");
                push_sort_key(&mut qb, &order.field);
                qb.push(match order.direction {
                    SortDirection::Asc => ") > (",
                    SortDirection::Desc => ") < (",
                });
                qb.push_bind(i32::from(value_rank(&anchor.value)));
                qb.push(", ");
                qb.push_bind(Json(anchor.value.clone()));
                qb.push("::jsonb, ");
                qb.push_bind(anchor.id.as_str().to_owned());
                qb.push(")");
            }

            let dir = match order.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            qb.push(" ORDER BY ");
            push_rank(&mut qb, &order.field);
            qb.push(format!(" {dir}, "));
            push_value(&mut qb, &order.field);
            qb.push(format!(" {dir}, id {dir}"));
        }
        None => {
            if let Some(anchor) = &query.start_after {
                qb.push(" AND id > ");
                qb.push_bind(anchor.id.as_str().to_owned());
            }
            qb.push(" ORDER BY id ASC");
        }
    }

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }

    qb
}

fn push_sort_key(qb: &mut QueryBuilder<'static, Postgres>, field: &str) {
    push_rank(qb, field);
    qb.push(", ");
    push_value(qb, field);
    qb.push(", id");
}

fn push_rank(qb: &mut QueryBuilder<'static, Postgres>, field: &str) {
    qb.push("(CASE COALESCE(jsonb_typeof(data -> ");
    qb.push_bind(field.to_owned());
    qb.push(
        "), 'null') WHEN 'null' THEN 0 WHEN 'boolean' THEN 1 WHEN 'number' THEN 2 \
         WHEN 'string' THEN 3 WHEN 'array' THEN 4 ELSE 5 END)",
    );
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, field: &str) {
    qb.push("COALESCE(data -> ");
    qb.push_bind(field.to_owned());
    qb.push(", 'null'::jsonb)");
}

fn document_from_row(row: &PgRow) -> Result<Document, StoreError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| StoreError::Decode(format!("failed to read id: {e}")))?;
    let Json(data): Json<Value> = row
        .try_get("data")
        .map_err(|e| StoreError::Decode(format!("failed to read data: {e}")))?;

    let id = DocumentId::new(id).map_err(|e| StoreError::Decode(e.to_string()))?;
    match data {
        Value::Object(fields) => Ok(Document::new(id, fields)),
        other => Err(StoreError::Decode(format!(
            "document {id} is not a JSON object: {other}"
        ))),
    }
}

fn map_sqlx_error(op: &str, err: sqlx::Error) -> StoreError {
    tracing::warn!(operation = op, error = %err, "document store operation failed");
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{op}: {err}"))
        }
        other => StoreError::Query(format!("{op}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storefront_catalog::StartAfter;

    #[test]
    fn select_without_ordering_uses_id() {
        let query = DocumentQuery::collection("categories");
        let sql = build_select(&query).into_sql();
        assert_eq!(
            sql,
            "SELECT id, data FROM documents WHERE collection = $1 ORDER BY id ASC"
        );
    }

    #[test]
    fn ordered_page_query_binds_filters_anchor_and_limit() {
        let query = DocumentQuery::collection("products")
            .where_eq("category", "electronics")
            .order_by("price", SortDirection::Desc)
            .start_after(StartAfter {
                value: json!(300),
                id: DocumentId::new("phone").unwrap(),
            })
            .limit(2);

        let sql = build_select(&query).into_sql();

        assert!(sql.contains("AND data -> $2 = $3"), "{sql}");
        assert!(sql.contains(") < ($"), "{sql}");
        assert!(sql.contains("::jsonb, $"), "{sql}");
        assert!(sql.contains(" DESC, id DESC LIMIT $"), "{sql}");
    }

    #[test]
    fn ascending_anchor_uses_greater_than() {
        let query = DocumentQuery::collection("products")
            .order_by("price", SortDirection::Asc)
            .start_after(StartAfter {
                value: Value::Null,
                id: DocumentId::new("a").unwrap(),
            });

        let sql = build_select(&query).into_sql();
        assert!(sql.contains(") > ($"), "{sql}");
        assert!(sql.ends_with(" ASC, id ASC"), "{sql}");
    }
}
