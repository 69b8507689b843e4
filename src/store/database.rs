//! Database operations for the lesson store

use async_trait::async_trait;
use libsql::{Connection, Row, Rows, params};
use tracing::{debug, instrument, warn};

use crate::rewrite::{Section, StructuredLesson, Task};
use crate::store::error::StoreError;
use crate::store::schema;
use crate::store::{Lesson, LessonStore, Module};

/// libsql-backed lesson store
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new store over an open connection
    #[instrument(skip(conn))]
    pub async fn new(conn: Connection) -> Result<Self, StoreError> {
        schema::initialize_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Open (or create) a local database file
    pub async fn new_from_path(path: &str) -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to connect to database: {}", e)))?;

        Self::new(conn).await
    }

    /// Execute a custom query with parameters
    pub async fn execute_query<P>(&self, sql: &str, params: P) -> Result<Rows, StoreError>
    where
        P: libsql::params::IntoParams,
    {
        self.conn
            .query(sql, params)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to execute query: {}", e)))
    }

    /// All modules in tutorial order
    #[instrument(skip(self))]
    pub async fn list_modules(&self) -> Result<Vec<Module>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, slug, title, order_index FROM modules ORDER BY order_index, id",
                params![],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to list modules: {}", e)))?;

        let mut modules = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            modules.push(row_to_module(&row)?);
        }

        Ok(modules)
    }

    /// Lessons of a module in order
    pub async fn list_lessons(&self, module_id: i64) -> Result<Vec<Lesson>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, module_id, slug, title, source_url, body_md, reading_time_min, order_index
                 FROM lessons
                 WHERE module_id = ?
                 ORDER BY order_index, id",
                params![module_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to list lessons: {}", e)))?;

        let mut lessons = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            lessons.push(row_to_lesson(&row)?);
        }

        Ok(lessons)
    }

    /// Sections of a lesson in order
    pub async fn get_sections(&self, lesson_id: i64) -> Result<Vec<Section>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT kind, title, body_md, order_index FROM sections
                 WHERE lesson_id = ? ORDER BY order_index",
                params![lesson_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to get sections: {}", e)))?;

        let mut sections = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            sections.push(row_to_section(&row)?);
        }

        Ok(sections)
    }

    /// Tasks of a lesson in order
    pub async fn get_tasks(&self, lesson_id: i64) -> Result<Vec<Task>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT title, prompt_md, starter_code, tests_code, points, order_index FROM tasks
                 WHERE lesson_id = ? ORDER BY order_index",
                params![lesson_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to get tasks: {}", e)))?;

        let mut tasks = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            tasks.push(row_to_task(&row)?);
        }

        Ok(tasks)
    }
}

#[async_trait]
impl LessonStore for Database {
    async fn create_module(&self, module: &mut Module) -> Result<(), StoreError> {
        module.id = upsert_module(&self.conn, module).await?;
        debug!("Stored module {} as {}", module.slug, module.id);
        Ok(())
    }

    async fn create_lesson(&self, lesson: &mut Lesson) -> Result<(), StoreError> {
        lesson.id = upsert_lesson(&self.conn, lesson).await?;
        Ok(())
    }

    async fn delete_sections_by_lesson_id(&self, lesson_id: i64) -> Result<u64, StoreError> {
        self.conn
            .execute("DELETE FROM sections WHERE lesson_id = ?", params![lesson_id])
            .await
            .map_err(|e| StoreError::Query(format!("Failed to delete sections: {}", e)))
    }

    async fn delete_tasks_by_lesson_id(&self, lesson_id: i64) -> Result<u64, StoreError> {
        self.conn
            .execute("DELETE FROM tasks WHERE lesson_id = ?", params![lesson_id])
            .await
            .map_err(|e| StoreError::Query(format!("Failed to delete tasks: {}", e)))
    }

    async fn create_section(&self, lesson_id: i64, section: &Section) -> Result<i64, StoreError> {
        insert_section(&self.conn, lesson_id, section).await
    }

    async fn create_task(&self, lesson_id: i64, task: &Task) -> Result<i64, StoreError> {
        insert_task(&self.conn, lesson_id, task).await
    }

    /// Write the lesson, its sections and its tasks in one transaction
    async fn save_lesson(
        &self,
        lesson: &mut Lesson,
        content: &StructuredLesson,
    ) -> Result<(), StoreError> {
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to start transaction: {}", e)))?;

        match write_lesson(&tx, lesson, content).await {
            Ok(id) => {
                tx.commit().await.map_err(|e| {
                    StoreError::Transaction(format!("Failed to commit transaction: {}", e))
                })?;
                lesson.id = id;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(lesson = %lesson.slug, "Rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }
}

async fn write_lesson(
    conn: &Connection,
    lesson: &Lesson,
    content: &StructuredLesson,
) -> Result<i64, StoreError> {
    let lesson_id = upsert_lesson(conn, lesson).await?;

    conn.execute("DELETE FROM sections WHERE lesson_id = ?", params![lesson_id])
        .await
        .map_err(|e| StoreError::Query(format!("Failed to delete sections: {}", e)))?;
    conn.execute("DELETE FROM tasks WHERE lesson_id = ?", params![lesson_id])
        .await
        .map_err(|e| StoreError::Query(format!("Failed to delete tasks: {}", e)))?;

    for section in &content.sections {
        insert_section(conn, lesson_id, section).await?;
    }
    for task in &content.tasks {
        insert_task(conn, lesson_id, task).await?;
    }

    Ok(lesson_id)
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

async fn upsert_module(conn: &Connection, module: &Module) -> Result<i64, StoreError> {
    let now = now();
    let rows = conn
        .query(
            "INSERT INTO modules (slug, title, order_index, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(slug) DO UPDATE SET
             title = excluded.title,
             order_index = excluded.order_index,
             updated_at = excluded.updated_at
             RETURNING id",
            params![
                module.slug.clone(),
                module.title.clone(),
                module.order_index,
                now,
                now
            ],
        )
        .await
        .map_err(|e| StoreError::Query(format!("Failed to upsert module: {}", e)))?;

    returned_id(rows, "module").await
}

async fn upsert_lesson(conn: &Connection, lesson: &Lesson) -> Result<i64, StoreError> {
    let now = now();
    let rows = conn
        .query(
            "INSERT INTO lessons (module_id, slug, title, source_url, body_md, reading_time_min, order_index, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(slug) DO UPDATE SET
             module_id = excluded.module_id,
             title = excluded.title,
             source_url = excluded.source_url,
             body_md = excluded.body_md,
             reading_time_min = excluded.reading_time_min,
             order_index = excluded.order_index,
             updated_at = excluded.updated_at
             RETURNING id",
            params![
                lesson.module_id,
                lesson.slug.clone(),
                lesson.title.clone(),
                lesson.source_url.clone(),
                lesson.body_md.clone(),
                lesson.reading_time_min,
                lesson.order_index,
                now,
                now
            ],
        )
        .await
        .map_err(|e| StoreError::Query(format!("Failed to upsert lesson: {}", e)))?;

    returned_id(rows, "lesson").await
}

async fn insert_section(
    conn: &Connection,
    lesson_id: i64,
    section: &Section,
) -> Result<i64, StoreError> {
    let rows = conn
        .query(
            "INSERT INTO sections (lesson_id, kind, title, body_md, order_index)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id",
            params![
                lesson_id,
                section.kind.as_str().to_string(),
                section.title.clone(),
                section.body_md.clone(),
                section.order_index as i64
            ],
        )
        .await
        .map_err(|e| StoreError::Query(format!("Failed to add section: {}", e)))?;

    returned_id(rows, "section").await
}

async fn insert_task(conn: &Connection, lesson_id: i64, task: &Task) -> Result<i64, StoreError> {
    let rows = conn
        .query(
            "INSERT INTO tasks (lesson_id, title, prompt_md, starter_code, tests_code, points, order_index)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
            params![
                lesson_id,
                task.title.clone(),
                task.prompt_md.clone(),
                task.starter_code.clone(),
                task.tests_code.clone(),
                i64::from(task.points),
                task.order_index as i64
            ],
        )
        .await
        .map_err(|e| StoreError::Query(format!("Failed to add task: {}", e)))?;

    returned_id(rows, "task").await
}

async fn next_row(rows: &mut Rows) -> Result<Option<Row>, StoreError> {
    rows.next()
        .await
        .map_err(|e| StoreError::Data(format!("Failed to read row: {}", e)))
}

async fn returned_id(mut rows: Rows, what: &str) -> Result<i64, StoreError> {
    let row = next_row(&mut rows)
        .await?
        .ok_or_else(|| StoreError::Data(format!("No ID returned for {}", what)))?;

    row.get(0)
        .map_err(|e| StoreError::Data(format!("Failed to get {} ID: {}", what, e)))
}

macro_rules! column {
    ($row:expr, $idx:expr, $name:literal) => {
        $row.get($idx)
            .map_err(|e| StoreError::Data(format!("Failed to get {}: {}", $name, e)))?
    };
}

fn row_to_module(row: &Row) -> Result<Module, StoreError> {
    Ok(Module {
        id: column!(row, 0, "id"),
        slug: column!(row, 1, "slug"),
        title: column!(row, 2, "title"),
        order_index: column!(row, 3, "order_index"),
    })
}

fn row_to_lesson(row: &Row) -> Result<Lesson, StoreError> {
    Ok(Lesson {
        id: column!(row, 0, "id"),
        module_id: column!(row, 1, "module_id"),
        slug: column!(row, 2, "slug"),
        title: column!(row, 3, "title"),
        source_url: column!(row, 4, "source_url"),
        body_md: column!(row, 5, "body_md"),
        reading_time_min: column!(row, 6, "reading_time_min"),
        order_index: column!(row, 7, "order_index"),
    })
}

fn row_to_section(row: &Row) -> Result<Section, StoreError> {
    let kind: String = column!(row, 0, "kind");
    let order_index: i64 = column!(row, 3, "order_index");
    Ok(Section {
        kind: kind.parse().map_err(StoreError::Data)?,
        title: column!(row, 1, "title"),
        body_md: column!(row, 2, "body_md"),
        order_index: order_index as usize,
    })
}

fn row_to_task(row: &Row) -> Result<Task, StoreError> {
    let points: i64 = column!(row, 4, "points");
    let order_index: i64 = column!(row, 5, "order_index");
    Ok(Task {
        title: column!(row, 0, "title"),
        prompt_md: column!(row, 1, "prompt_md"),
        starter_code: column!(row, 2, "starter_code"),
        tests_code: column!(row, 3, "tests_code"),
        points: points as u32,
        order_index: order_index as usize,
    })
}
