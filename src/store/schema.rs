//! # Database Schema Module
//!
//! Creates the lesson tables on open. The schema is a four-table tree:
//!
//! 1. `modules` - ordered lesson groups, unique by slug
//! 2. `lessons` - one row per ingested page, unique by slug
//! 3. `sections` - the lesson's structured blocks
//! 4. `tasks` - practice exercises
//!
//! Sections and tasks cascade with their lesson; lessons cascade with their
//! module.

use crate::store::error::StoreError;
use libsql::{Connection, params};

/// Initialize the database schema
pub async fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute("PRAGMA foreign_keys = ON", params![])
        .await
        .map_err(|e| StoreError::Schema(format!("Failed to enable foreign keys: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS modules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            order_index INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create modules table: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lessons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            module_id INTEGER NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            source_url TEXT NOT NULL,
            body_md TEXT NOT NULL,
            reading_time_min INTEGER NOT NULL,
            order_index INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create lessons table: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lesson_id INTEGER NOT NULL,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            body_md TEXT NOT NULL,
            order_index INTEGER NOT NULL,
            FOREIGN KEY (lesson_id) REFERENCES lessons(id) ON DELETE CASCADE
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create sections table: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lesson_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            prompt_md TEXT NOT NULL,
            starter_code TEXT NOT NULL,
            tests_code TEXT NOT NULL,
            points INTEGER NOT NULL,
            order_index INTEGER NOT NULL,
            FOREIGN KEY (lesson_id) REFERENCES lessons(id) ON DELETE CASCADE
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create tasks table: {}", e)))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_lessons_module_id ON lessons(module_id)",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create index on lessons: {}", e)))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sections_lesson_id ON sections(lesson_id)",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create index on sections: {}", e)))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_lesson_id ON tasks(lesson_id)",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create index on tasks: {}", e)))?;

    Ok(())
}
