//! SQLite implementation of every storage seam.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use agtrial_map::{all_configs, config_for};
use agtrial_model::{ColumnMap, NewUpload, RawUpload, UploadId, UploadStatus};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, params};

use crate::error::{Result, StoreError};
use crate::traits::{
    CoverageEntry, HistoryEntry, KeyedRow, LoadBatch, RecordSink, StagingStore, UploadLog,
};

const CORE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS raw_uploads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trial_id TEXT NOT NULL,
    filename TEXT NOT NULL,
    data_type TEXT NOT NULL,
    raw_rows TEXT NOT NULL,
    headers TEXT NOT NULL,
    column_map TEXT NOT NULL,
    unmapped_columns TEXT NOT NULL,
    defaults TEXT NOT NULL DEFAULT '{}',
    status TEXT NOT NULL CHECK (status IN ('pending', 'mapped', 'error')),
    error_detail TEXT,
    content_sha256 TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_raw_uploads_trial ON raw_uploads (trial_id);

CREATE TABLE IF NOT EXISTS file_type_coverage (
    trial_id TEXT NOT NULL,
    file_type TEXT NOT NULL,
    has_data INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (trial_id, file_type)
);

CREATE TABLE IF NOT EXISTS upload_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trial_id TEXT,
    filename TEXT NOT NULL,
    file_type TEXT,
    status TEXT NOT NULL,
    record_count INTEGER,
    detail TEXT,
    content_sha256 TEXT,
    created_at TEXT NOT NULL
);
";

fn destination_schema(table: &str) -> String {
    format!(
        "
CREATE TABLE IF NOT EXISTS {table} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trial_id TEXT NOT NULL,
    natural_key TEXT NOT NULL,
    fields TEXT NOT NULL,
    source_row TEXT NOT NULL,
    raw_upload_id INTEGER REFERENCES raw_uploads (id),
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (trial_id, natural_key)
);
"
    )
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Column values of a `raw_uploads` row before JSON decoding.
struct UploadRecord {
    id: i64,
    trial_id: String,
    filename: String,
    data_type: String,
    raw_rows: String,
    headers: String,
    column_map: String,
    unmapped_columns: String,
    defaults: String,
    status: String,
    error_detail: Option<String>,
    content_sha256: String,
    created_at: String,
    updated_at: String,
}

impl UploadRecord {
    fn decode(self) -> Result<RawUpload> {
        Ok(RawUpload {
            id: UploadId::new(self.id),
            trial_id: self.trial_id,
            filename: self.filename,
            data_type: self.data_type.parse()?,
            raw_rows: serde_json::from_str(&self.raw_rows)?,
            headers: serde_json::from_str(&self.headers)?,
            column_map: serde_json::from_str(&self.column_map)?,
            unmapped_columns: serde_json::from_str(&self.unmapped_columns)?,
            defaults: serde_json::from_str(&self.defaults)?,
            status: self.status.parse()?,
            error_detail: self.error_detail,
            content_sha256: self.content_sha256,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SQLite-backed staging store, record sink and upload log.
///
/// The connection sits behind a mutex; SQLite's unique constraints are the
/// serialization point between concurrent batches.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(CORE_SCHEMA)?;
        for config in all_configs() {
            conn.execute_batch(&destination_schema(config.target_table))?;
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn known_table(table: &str) -> Result<&'static str> {
        all_configs()
            .map(|config| config.target_table)
            .find(|known| *known == table)
            .ok_or_else(|| StoreError::UnknownTable {
                table: table.to_string(),
            })
    }

    fn upsert_row(
        tx: &Transaction<'_>,
        table: &str,
        trial_id: &str,
        raw_upload_id: UploadId,
        row: &KeyedRow,
        timestamp: &str,
    ) -> Result<()> {
        let fields = serde_json::to_string(&row.row.fields)?;
        let source = serde_json::to_string(&row.row.source)?;
        tx.execute(
            &format!(
                "
                INSERT INTO {table} (
                    trial_id, natural_key, fields, source_row, raw_upload_id, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                ON CONFLICT(trial_id, natural_key) DO UPDATE SET
                    fields = excluded.fields,
                    source_row = excluded.source_row,
                    raw_upload_id = excluded.raw_upload_id,
                    updated_at = excluded.updated_at
                "
            ),
            params![
                trial_id,
                row.natural_key,
                fields,
                source,
                raw_upload_id.get(),
                timestamp
            ],
        )?;
        Ok(())
    }
}

impl StagingStore for SqliteStore {
    fn stage(&self, upload: &NewUpload) -> Result<UploadId> {
        let mode = config_for(upload.data_type).pivot_mode;
        let status = UploadStatus::at_staging(mode, &upload.unmapped_columns);
        let timestamp = now();
        let conn = self.lock()?;
        conn.execute(
            "
            INSERT INTO raw_uploads (
                trial_id, filename, data_type, raw_rows, headers, column_map,
                unmapped_columns, defaults, status, content_sha256, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            ",
            params![
                upload.trial_id,
                upload.filename,
                upload.data_type.as_str(),
                serde_json::to_string(&upload.raw_rows)?,
                serde_json::to_string(&upload.headers)?,
                serde_json::to_string(&upload.column_map)?,
                serde_json::to_string(&upload.unmapped_columns)?,
                serde_json::to_string(&upload.defaults)?,
                status.as_str(),
                upload.content_sha256,
                timestamp,
            ],
        )?;
        let id = UploadId::new(conn.last_insert_rowid());
        tracing::debug!(%id, %status, filename = %upload.filename, "staged upload");
        Ok(id)
    }

    fn fetch(&self, id: UploadId) -> Result<RawUpload> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "
                SELECT id, trial_id, filename, data_type, raw_rows, headers, column_map,
                       unmapped_columns, defaults, status, error_detail, content_sha256,
                       created_at, updated_at
                FROM raw_uploads
                WHERE id = ?1
                ",
                params![id.get()],
                |row| {
                    Ok(UploadRecord {
                        id: row.get(0)?,
                        trial_id: row.get(1)?,
                        filename: row.get(2)?,
                        data_type: row.get(3)?,
                        raw_rows: row.get(4)?,
                        headers: row.get(5)?,
                        column_map: row.get(6)?,
                        unmapped_columns: row.get(7)?,
                        defaults: row.get(8)?,
                        status: row.get(9)?,
                        error_detail: row.get(10)?,
                        content_sha256: row.get(11)?,
                        created_at: row.get(12)?,
                        updated_at: row.get(13)?,
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::NotFound { id })?;
        record.decode()
    }

    fn apply_overrides(&self, id: UploadId, column_map: &ColumnMap) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let stored: String = tx
            .query_row(
                "SELECT column_map FROM raw_uploads WHERE id = ?1",
                params![id.get()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound { id })?;

        let mut merged: ColumnMap = serde_json::from_str(&stored)?;
        merged.extend(column_map.iter().map(|(h, b)| (h.clone(), b.clone())));

        tx.execute(
            "
            UPDATE raw_uploads
            SET column_map = ?1, unmapped_columns = '[]', status = 'mapped',
                error_detail = NULL, updated_at = ?2
            WHERE id = ?3
            ",
            params![serde_json::to_string(&merged)?, now(), id.get()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn mark_error(&self, id: UploadId, detail: &str) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "
            UPDATE raw_uploads
            SET status = 'error', error_detail = ?1, updated_at = ?2
            WHERE id = ?3
            ",
            params![detail, now(), id.get()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }
}

impl RecordSink for SqliteStore {
    fn apply_load(&self, batch: &LoadBatch<'_>) -> Result<usize> {
        if batch.rows.is_empty() {
            return Ok(0);
        }
        let table = Self::known_table(batch.config.target_table)?;
        let timestamp = now();

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for row in batch.rows {
            Self::upsert_row(
                &tx,
                table,
                batch.trial_id,
                batch.raw_upload_id,
                row,
                &timestamp,
            )?;
        }
        tx.execute(
            "
            INSERT INTO file_type_coverage (trial_id, file_type, has_data, updated_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(trial_id, file_type) DO UPDATE SET
                has_data = 1,
                updated_at = excluded.updated_at
            ",
            params![batch.trial_id, batch.config.file_type_tag, timestamp],
        )?;
        tx.commit()?;
        Ok(batch.rows.len())
    }

    fn count_records(&self, table: &str, trial_id: &str) -> Result<usize> {
        let table = Self::known_table(table)?;
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE trial_id = ?1"),
            params![trial_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn coverage(&self, trial_id: &str) -> Result<Vec<CoverageEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "
            SELECT file_type, has_data, updated_at
            FROM file_type_coverage
            WHERE trial_id = ?1
            ORDER BY file_type ASC
            ",
        )?;
        let rows = stmt.query_map(params![trial_id], |row| {
            Ok(CoverageEntry {
                file_type: row.get(0)?,
                has_data: row.get::<_, i64>(1)? != 0,
                updated_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

impl UploadLog for SqliteStore {
    fn record(&self, entry: &HistoryEntry) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "
            INSERT INTO upload_history (
                trial_id, filename, file_type, status, record_count, detail, content_sha256, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                entry.trial_id,
                entry.filename,
                entry.file_type.map(|t| t.as_str()),
                entry.status.as_str(),
                entry.record_count.and_then(|n| i64::try_from(n).ok()),
                entry.detail,
                entry.content_sha256,
                now(),
            ],
        )?;
        Ok(())
    }
}
