//! Document repository for CRUD operations.
//!
//! Documents are JSON objects keyed by `(collection, id)`. Equality filters
//! run inside SQLite through `json_extract`; the JSON path is always bound as
//! a parameter.

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{strip_reserved, Collection, Document};

/// Current time in the ISO-8601 form the web client produces.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A value a top-level document field can be compared with.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Int(i64),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

/// Equality filters plus creation-time ordering for a collection listing.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<(&'static str, FieldValue)>,
    newest_first: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only documents whose top-level `field` equals `value`.
    pub fn filter(mut self, field: &'static str, value: impl Into<FieldValue>) -> Self {
        self.filters.push((field, value.into()));
        self
    }

    /// Order by `createdAt` descending instead of ascending.
    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== DOCUMENT OPERATIONS ====================

    /// List documents of a collection.
    ///
    /// Documents that no longer match the model are skipped and logged.
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Document<T>>, AppError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, data, created_at, updated_at FROM documents WHERE collection = ",
        );
        builder.push_bind(collection.as_str());

        for (field, value) in &query.filters {
            builder.push(" AND json_extract(data, ");
            builder.push_bind(format!("$.{}", field));
            builder.push(") = ");
            match value {
                FieldValue::Text(s) => builder.push_bind(s.clone()),
                FieldValue::Bool(b) => builder.push_bind(i64::from(*b)),
                FieldValue::Int(i) => builder.push_bind(*i),
            };
        }

        if query.newest_first {
            builder.push(" ORDER BY created_at DESC, rowid DESC");
        } else {
            builder.push(" ORDER BY created_at ASC, rowid ASC");
        }

        let rows = builder.build().fetch_all(&self.pool).await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in &rows {
            match document_from_row(row) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    let id: String = row.get("id");
                    tracing::warn!(
                        collection = collection.as_str(),
                        id = %id,
                        "Skipping malformed document: {}",
                        e
                    );
                }
            }
        }
        Ok(documents)
    }

    /// Get a document by ID.
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document<T>>, AppError> {
        let row = sqlx::query(
            "SELECT id, data, created_at, updated_at FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(document_from_row)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Stored document {} is malformed: {}", id, e)))
    }

    /// Whether any document has top-level `field` equal to `value`.
    pub async fn exists_where(
        &self,
        collection: Collection,
        field: &'static str,
        value: &str,
    ) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM documents WHERE collection = ? AND json_extract(data, ?) = ?) AS found",
        )
        .bind(collection.as_str())
        .bind(format!("$.{}", field))
        .bind(value)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<i64, _>("found") != 0)
    }

    /// Add a document with a generated id.
    ///
    /// The returned document is read back from what was stored, so reserved
    /// keys a client sent are never echoed.
    pub async fn add<T: Serialize + DeserializeOwned>(
        &self,
        collection: Collection,
        data: T,
    ) -> Result<Document<T>, AppError> {
        let object = to_object(&data)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let now = now_timestamp();

        sqlx::query(
            "INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(Value::Object(object.clone()).to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(collection = collection.as_str(), id = %id, "Document added");

        Ok(Document {
            id,
            data: serde_json::from_value(Value::Object(object))?,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Add a document unless one already has top-level `field` equal to `value`.
    ///
    /// The check and the insert run as one statement. Returns `None` for a duplicate.
    pub async fn add_unique<T: Serialize + DeserializeOwned>(
        &self,
        collection: Collection,
        field: &'static str,
        value: &str,
        data: T,
    ) -> Result<Option<Document<T>>, AppError> {
        let object = to_object(&data)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let now = now_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            SELECT ?, ?, ?, ?, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM documents WHERE collection = ? AND json_extract(data, ?) = ?
            )
            "#,
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(Value::Object(object.clone()).to_string())
        .bind(&now)
        .bind(&now)
        .bind(collection.as_str())
        .bind(format!("$.{}", field))
        .bind(value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(collection = collection.as_str(), field, "Duplicate document skipped");
            return Ok(None);
        }

        Ok(Some(Document {
            id,
            data: serde_json::from_value(Value::Object(object))?,
            created_at: now.clone(),
            updated_at: now,
        }))
    }

    /// Shallow-merge `patch` into an existing document and touch `updatedAt`.
    ///
    /// The merged document must still deserialize as `T`.
    pub async fn update<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Document<T>, AppError> {
        self.merge_into(collection, id, None, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))
    }

    /// Like `update`, but only while top-level `field` still holds `expected`.
    ///
    /// Returns `None` when the field holds something else at write time.
    pub async fn update_where<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
        field: &'static str,
        expected: &str,
        patch: Map<String, Value>,
    ) -> Result<Option<Document<T>>, AppError> {
        self.merge_into(collection, id, Some((field, expected)), patch)
            .await
    }

    async fn merge_into<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
        guard: Option<(&'static str, &str)>,
        patch: Map<String, Value>,
    ) -> Result<Option<Document<T>>, AppError> {
        let row = sqlx::query(
            "SELECT data, created_at FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))?;

        let mut object = parse_object(row.get("data"))?;
        if let Some((field, expected)) = guard {
            if object.get(field).and_then(Value::as_str) != Some(expected) {
                return Ok(None);
            }
        }
        object.extend(strip_reserved(patch));

        let data: T = serde_json::from_value(Value::Object(object.clone()))
            .map_err(|e| AppError::Validation(format!("Invalid update: {}", e)))?;

        let now = now_timestamp();
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE documents SET data = ");
        builder.push_bind(Value::Object(object).to_string());
        builder.push(", updated_at = ");
        builder.push_bind(now.clone());
        builder.push(" WHERE collection = ");
        builder.push_bind(collection.as_str());
        builder.push(" AND id = ");
        builder.push_bind(id.to_string());
        if let Some((field, expected)) = guard {
            builder.push(" AND json_extract(data, ");
            builder.push_bind(format!("$.{}", field));
            builder.push(") = ");
            builder.push_bind(expected.to_string());
        }

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return match guard {
                Some(_) => Ok(None),
                None => Err(AppError::NotFound(format!("Document {} not found", id))),
            };
        }

        Ok(Some(Document {
            id: id.to_string(),
            data,
            created_at: row.get("created_at"),
            updated_at: now,
        }))
    }

    /// Create or merge into the document with a fixed id.
    pub async fn set_merge(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT data FROM documents WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let now = now_timestamp();
        match existing {
            Some(row) => {
                let mut object = parse_object(row.get("data"))?;
                object.extend(strip_reserved(patch));
                sqlx::query(
                    "UPDATE documents SET data = ?, updated_at = ? WHERE collection = ? AND id = ?",
                )
                .bind(Value::Object(object).to_string())
                .bind(&now)
                .bind(collection.as_str())
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(collection.as_str())
                .bind(id)
                .bind(Value::Object(strip_reserved(patch)).to_string())
                .bind(&now)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a document.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Document {} not found", id)));
        }

        tracing::debug!(collection = collection.as_str(), id = %id, "Document deleted");
        Ok(())
    }
}

// ==================== ROW MAPPING HELPERS ====================

fn to_object<T: Serialize>(data: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(data)? {
        Value::Object(object) => Ok(strip_reserved(object)),
        other => Err(AppError::Internal(format!(
            "Documents must be JSON objects, got {}",
            other
        ))),
    }
}

fn parse_object(raw: String) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_str(&raw) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(AppError::Internal("Stored document is not an object".to_string())),
        Err(e) => Err(AppError::Internal(format!("Stored document is not JSON: {}", e))),
    }
}

fn document_from_row<T: DeserializeOwned>(row: &SqliteRow) -> Result<Document<T>, serde_json::Error> {
    let raw: String = row.get("data");
    let data = serde_json::from_str(&raw)?;
    Ok(Document {
        id: row.get("id"),
        data,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Note {
        title: String,
        #[serde(default)]
        active: bool,
        #[serde(default)]
        owner: Option<String>,
    }

    async fn repo() -> (Repository, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("test.sqlite")).await.unwrap();
        (Repository::new(pool), dir)
    }

    fn note(title: &str, active: bool, owner: &str) -> Note {
        Note {
            title: title.to_string(),
            active,
            owner: Some(owner.to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_get_delete() {
        let (repo, _dir) = repo().await;

        let added = repo.add(Collection::Cars, note("a", true, "u1")).await.unwrap();
        assert!(!added.id.is_empty());
        assert_eq!(added.created_at, added.updated_at);

        let fetched: Document<Note> = repo.get(Collection::Cars, &added.id).await.unwrap().unwrap();
        assert_eq!(fetched.data.title, "a");

        // Same id in another collection does not exist
        let other: Option<Document<Note>> = repo.get(Collection::Tours, &added.id).await.unwrap();
        assert!(other.is_none());

        repo.delete(Collection::Cars, &added.id).await.unwrap();
        let gone: Option<Document<Note>> = repo.get(Collection::Cars, &added.id).await.unwrap();
        assert!(gone.is_none());

        let err = repo.delete(Collection::Cars, &added.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let (repo, _dir) = repo().await;

        repo.add(Collection::Offers, note("first", true, "u1")).await.unwrap();
        repo.add(Collection::Offers, note("second", false, "u1")).await.unwrap();
        repo.add(Collection::Offers, note("third", true, "u2")).await.unwrap();

        let all: Vec<Document<Note>> = repo.list(Collection::Offers, &Query::new()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|d| d.data.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);

        let active: Vec<Document<Note>> = repo
            .list(Collection::Offers, &Query::new().filter("active", true).newest_first())
            .await
            .unwrap();
        let titles: Vec<_> = active.iter().map(|d| d.data.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "first"]);

        let owned: Vec<Document<Note>> = repo
            .list(
                Collection::Offers,
                &Query::new().filter("owner", "u1").filter("active", false),
            )
            .await
            .unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].data.title, "second");

        assert!(repo.exists_where(Collection::Offers, "owner", "u2").await.unwrap());
        assert!(!repo.exists_where(Collection::Offers, "owner", "u3").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_merges_and_ignores_reserved_keys() {
        let (repo, _dir) = repo().await;
        let added = repo.add(Collection::Tours, note("old", true, "u1")).await.unwrap();

        let patch = json!({"title": "new", "id": "hijack", "createdAt": "1970"});
        let updated: Document<Note> = repo
            .update(Collection::Tours, &added.id, patch.as_object().unwrap().clone())
            .await
            .unwrap();

        assert_eq!(updated.id, added.id);
        assert_eq!(updated.data.title, "new");
        assert_eq!(updated.data.owner.as_deref(), Some("u1"));
        assert_eq!(updated.created_at, added.created_at);

        let missing = repo
            .update::<Note>(Collection::Tours, "nope", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_shape() {
        let (repo, _dir) = repo().await;
        let added = repo.add(Collection::Cars, note("x", true, "u1")).await.unwrap();

        let patch = json!({"title": 42});
        let err = repo
            .update::<Note>(Collection::Cars, &added.id, patch.as_object().unwrap().clone())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_drops_client_reserved_keys() {
        let (repo, _dir) = repo().await;

        let added: Document<Value> = repo
            .add(Collection::Cars, json!({"title": "a", "id": "client", "createdAt": "1970"}))
            .await
            .unwrap();
        assert_ne!(added.id, "client");
        assert!(added.data.get("id").is_none());
        assert!(added.data.get("createdAt").is_none());

        let body = serde_json::to_string(&added).unwrap();
        assert_eq!(body.matches("\"id\"").count(), 1);
        assert_eq!(body.matches("\"createdAt\"").count(), 1);
    }

    #[tokio::test]
    async fn test_add_unique_skips_duplicates() {
        let (repo, _dir) = repo().await;

        let first = repo
            .add_unique(Collection::Newsletter, "owner", "u1", note("a", true, "u1"))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = repo
            .add_unique(Collection::Newsletter, "owner", "u1", note("b", true, "u1"))
            .await
            .unwrap();
        assert!(second.is_none());

        // Uniqueness is per collection
        let other = repo
            .add_unique(Collection::Contacts, "owner", "u1", note("c", true, "u1"))
            .await
            .unwrap();
        assert!(other.is_some());

        let stored: Vec<Document<Note>> = repo.list(Collection::Newsletter, &Query::new()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].data.title, "a");
    }

    #[tokio::test]
    async fn test_update_where_requires_expected_value() {
        let (repo, _dir) = repo().await;

        let added = repo
            .add(Collection::Bookings, json!({"title": "t", "status": "pending"}))
            .await
            .unwrap();
        let patch = |status: &str| json!({"status": status}).as_object().unwrap().clone();

        let cancelled: Option<Document<Value>> = repo
            .update_where(Collection::Bookings, &added.id, "status", "pending", patch("cancelled"))
            .await
            .unwrap();
        assert_eq!(cancelled.unwrap().data["status"], "cancelled");

        // A writer that still believes the booking is pending loses
        let stale: Option<Document<Value>> = repo
            .update_where(Collection::Bookings, &added.id, "status", "pending", patch("confirmed"))
            .await
            .unwrap();
        assert!(stale.is_none());

        let doc: Document<Value> = repo.get(Collection::Bookings, &added.id).await.unwrap().unwrap();
        assert_eq!(doc.data["status"], "cancelled");

        let missing = repo
            .update_where::<Value>(Collection::Bookings, "nope", "status", "pending", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_merge_upserts() {
        let (repo, _dir) = repo().await;

        let first = json!({"provider": "stripe", "enabled": false});
        repo.set_merge(Collection::Settings, "payment", first.as_object().unwrap().clone())
            .await
            .unwrap();

        let second = json!({"enabled": true});
        repo.set_merge(Collection::Settings, "payment", second.as_object().unwrap().clone())
            .await
            .unwrap();

        let doc: Document<Value> = repo.get(Collection::Settings, "payment").await.unwrap().unwrap();
        assert_eq!(doc.data["provider"], "stripe");
        assert_eq!(doc.data["enabled"], true);
    }
}
