use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use notes_core::{Error, Note, NoteCreate, NoteStore, NoteUpdate, Result, LIST_LIMIT};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::{StorageBackend, StorageConfig};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS notes (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        owner_uid TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        dirty INTEGER NOT NULL DEFAULT 0,
        deleted INTEGER NOT NULL DEFAULT 0,
        has_todos INTEGER NOT NULL DEFAULT 0,
        todos TEXT NOT NULL DEFAULT '[]'
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS notes_owner_updated ON notes (owner_uid, deleted, updated_at)
    "#,
    // Add future migrations here
];

fn storage_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Storage(format!("{}: {}", context, e))
}

// Fixed-width timestamps keep `ORDER BY updated_at` chronological.
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse date: {}", e)))
}

fn note_from_row(row: &SqliteRow) -> Result<Note> {
    let todos: String = row.get("todos");
    Ok(Note {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        owner_uid: row.get("owner_uid"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
        dirty: row.get("dirty"),
        deleted: row.get("deleted"),
        has_todos: row.get("has_todos"),
        todos: serde_json::from_str(&todos)?,
    })
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be writable at the configured path"
    }

    async fn open(config: &StorageConfig) -> Result<Self> {
        Self::new_with_path(&config.database_path).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(storage_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    async fn write(&self, note: &Note) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO notes
            (id, title, content, owner_uid, created_at, updated_at, dirty, deleted, has_todos, todos)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.owner_uid)
        .bind(timestamp(&note.created_at))
        .bind(timestamp(&note.updated_at))
        .bind(note.dirty)
        .bind(note.deleted)
        .bind(note.has_todos)
        .bind(serde_json::to_string(&note.todos)?)
        .execute(&*self.pool)
        .await
        .map_err(storage_error("Failed to store note"))?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Note>> {
        let row = sqlx::query("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(storage_error("Failed to fetch note"))?;
        row.as_ref().map(note_from_row).transpose()
    }
}

#[async_trait]
impl NoteStore for SQLiteStorage {
    async fn create(&self, input: NoteCreate, owner_uid: &str) -> Result<Note> {
        let note = Note::new(input, owner_uid);
        if let Some(existing) = self.fetch(&note.id).await? {
            if !existing.is_owned_by(owner_uid) {
                return Err(Error::Validation(format!("note id {} is already taken", note.id)));
            }
        }
        self.write(&note).await?;
        Ok(note)
    }

    async fn get(&self, id: &str, owner_uid: &str) -> Result<Option<Note>> {
        Ok(self.fetch(id).await?.filter(|note| note.is_owned_by(owner_uid)))
    }

    async fn update(&self, id: &str, owner_uid: &str, patch: NoteUpdate) -> Result<Option<Note>> {
        let Some(mut note) = self.get(id, owner_uid).await? else {
            return Ok(None);
        };
        note.apply(patch);
        self.write(&note).await?;
        Ok(Some(note))
    }

    async fn soft_delete(&self, id: &str, owner_uid: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE notes SET deleted = 1, updated_at = ? WHERE id = ? AND owner_uid = ?")
            .bind(timestamp(&Utc::now()))
            .bind(id)
            .bind(owner_uid)
            .execute(&*self.pool)
            .await
            .map_err(storage_error("Failed to delete note"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn hard_delete(&self, id: &str, owner_uid: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND owner_uid = ?")
            .bind(id)
            .bind(owner_uid)
            .execute(&*self.pool)
            .await
            .map_err(storage_error("Failed to delete note"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_todos(&self, id: &str, owner_uid: &str, todos: Vec<String>) -> Result<Note> {
        let mut note = self
            .get(id, owner_uid)
            .await?
            .ok_or_else(|| Error::NotFound(format!("note {}", id)))?;
        note.has_todos = true;
        note.todos = todos;
        note.updated_at = Utc::now();
        self.write(&note).await?;
        Ok(note)
    }

    async fn list_by_owner(&self, owner_uid: &str) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM notes
            WHERE owner_uid = ? AND deleted = 0
            ORDER BY updated_at DESC
            LIMIT ?
            "#,
        )
        .bind(owner_uid)
        .bind(LIST_LIMIT as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(storage_error("Failed to list notes"))?;

        rows.iter().map(note_from_row).collect()
    }
}
