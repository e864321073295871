//! `SQLite` embedding store.
//!
//! One row per API name. Vectors are little-endian `f32` blobs; the metadata
//! needed to rebuild an [`ApiRecord`](crate::models::ApiRecord) is a JSON
//! column. There is no native vector search, so detection ranks
//! [`list_all`](EmbeddingStore::list_all) locally.

mod connection;

pub use connection::{acquire_lock, configure_connection};

use super::traits::EmbeddingStore;
use crate::models::{ApiEmbedding, ApiId};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::instrument;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS api_embeddings (
    api_name TEXT PRIMARY KEY,
    api_id TEXT NOT NULL,
    vector BLOB NOT NULL,
    dimensions INTEGER NOT NULL,
    embedding_text TEXT NOT NULL,
    metadata TEXT NOT NULL,
    generated_at TEXT NOT NULL
);
";

const SELECT_COLUMNS: &str =
    "SELECT api_name, api_id, vector, embedding_text, metadata, generated_at FROM api_embeddings";

/// Embedding metadata persisted as JSON.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default)]
    endpoints: Vec<String>,
    #[serde(default)]
    schemas: Vec<String>,
}

/// A row as read from the table, before decoding.
struct RawRow {
    api_name: String,
    api_id: String,
    vector: Vec<u8>,
    text: String,
    metadata: String,
    generated_at: String,
}

/// `SQLite`-backed embedding store.
pub struct SqliteEmbeddingStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteEmbeddingStore {
    /// Opens (or creates) a store at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::operation("create_store_dir", e))?;
        }

        let conn = Connection::open(&db_path).map_err(|e| Error::operation("open_sqlite", e))?;
        configure_connection(&conn);

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Creates an in-memory store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| Error::operation("open_sqlite_memory", e))?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn initialize(&self) -> Result<()> {
        acquire_lock(&self.conn)
            .execute_batch(SCHEMA)
            .map_err(|e| Error::operation("init_embedding_schema", e))
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
        Ok(RawRow {
            api_name: row.get(0)?,
            api_id: row.get(1)?,
            vector: row.get(2)?,
            text: row.get(3)?,
            metadata: row.get(4)?,
            generated_at: row.get(5)?,
        })
    }

    fn decode(raw: RawRow) -> Result<ApiEmbedding> {
        let metadata: StoredMetadata = serde_json::from_str(&raw.metadata)
            .map_err(|e| Error::operation("decode_embedding_metadata", e))?;
        let generated_at = DateTime::parse_from_rfc3339(&raw.generated_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| Error::operation("decode_embedding_timestamp", e))?;

        Ok(ApiEmbedding {
            api_id: ApiId::new(raw.api_id),
            api_name: raw.api_name,
            vector: decode_vector(&raw.vector),
            text: raw.text,
            generated_at,
            title: metadata.title,
            description: metadata.description,
            kind: metadata.kind,
            endpoints: metadata.endpoints,
            schemas: metadata.schemas,
        })
    }
}

impl EmbeddingStore for SqliteEmbeddingStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[instrument(skip(self, embedding), fields(operation = "upsert", store = "sqlite", api_name = %embedding.api_name))]
    fn upsert(&self, embedding: &ApiEmbedding) -> Result<()> {
        let metadata = StoredMetadata {
            title: embedding.title.clone(),
            description: embedding.description.clone(),
            kind: embedding.kind.clone(),
            endpoints: embedding.endpoints.clone(),
            schemas: embedding.schemas.clone(),
        };
        let metadata =
            serde_json::to_string(&metadata).map_err(|e| Error::operation("encode_metadata", e))?;
        let dimensions = i64::try_from(embedding.dimensions()).unwrap_or(i64::MAX);

        acquire_lock(&self.conn)
            .execute(
                "INSERT INTO api_embeddings
                    (api_name, api_id, vector, dimensions, embedding_text, metadata, generated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(api_name) DO UPDATE SET
                    api_id = excluded.api_id,
                    vector = excluded.vector,
                    dimensions = excluded.dimensions,
                    embedding_text = excluded.embedding_text,
                    metadata = excluded.metadata,
                    generated_at = excluded.generated_at",
                params![
                    embedding.api_name,
                    embedding.api_id.as_str(),
                    encode_vector(&embedding.vector),
                    dimensions,
                    embedding.text,
                    metadata,
                    embedding.generated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| Error::operation("upsert_embedding", e))?;

        metrics::counter!("embedding_store_upserts_total", "store" => "sqlite").increment(1);
        Ok(())
    }

    fn get(&self, api_name: &str) -> Result<Option<ApiEmbedding>> {
        let raw = {
            let conn = acquire_lock(&self.conn);
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE api_name = ?1"),
                params![api_name],
                Self::read_row,
            )
            .optional()
            .map_err(|e| Error::operation("get_embedding", e))?
        };
        raw.map(Self::decode).transpose()
    }

    #[instrument(skip(self), fields(operation = "list_all", store = "sqlite"))]
    fn list_all(&self) -> Result<Vec<ApiEmbedding>> {
        let rows = {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare(&format!("{SELECT_COLUMNS} ORDER BY api_name"))
                .map_err(|e| Error::operation("list_embeddings", e))?;
            let rows = stmt
                .query_map([], Self::read_row)
                .map_err(|e| Error::operation("list_embeddings", e))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| Error::operation("list_embeddings", e))?;
            rows
        };

        let mut out = Vec::with_capacity(rows.len());
        for raw in rows {
            match Self::decode(raw) {
                Ok(embedding) => out.push(embedding),
                Err(e) => tracing::warn!(error = %e, "Skipping undecodable embedding row"),
            }
        }
        Ok(out)
    }

    fn delete(&self, api_name: &str) -> Result<bool> {
        let changed = acquire_lock(&self.conn)
            .execute(
                "DELETE FROM api_embeddings WHERE api_name = ?1",
                params![api_name],
            )
            .map_err(|e| Error::operation("delete_embedding", e))?;
        Ok(changed > 0)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = acquire_lock(&self.conn)
            .query_row("SELECT COUNT(*) FROM api_embeddings", [], |row| row.get(0))
            .map_err(|e| Error::operation("count_embeddings", e))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

/// Encodes a vector as little-endian `f32` bytes.
fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decodes little-endian `f32` bytes. Trailing partial values are dropped.
fn decode_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
