//! Lesson store module
//!
//! Defines the persistence contract the pipeline writes through and a
//! libsql-backed implementation of it.

mod database;
pub mod error;
mod schema;

pub use database::Database;
pub use error::StoreError;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::rewrite::{Section, StructuredLesson, Task};

/// A stored module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    /// ID of the module, 0 until stored
    pub id: i64,

    /// Unique slug
    pub slug: String,

    /// Display title
    pub title: String,

    /// 1-based position in the tutorial
    pub order_index: i64,
}

/// A stored lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lesson {
    /// ID of the lesson, 0 until stored
    pub id: i64,

    /// ID of the owning module
    pub module_id: i64,

    /// Unique slug
    pub slug: String,

    /// Display title
    pub title: String,

    /// Page the lesson was ingested from
    pub source_url: String,

    /// Full lesson as Markdown
    pub body_md: String,

    /// Estimated reading time in minutes
    pub reading_time_min: i64,

    /// 1-based position within the module
    pub order_index: i64,
}

/// Persistence operations the ingestion pipeline relies on
#[async_trait]
pub trait LessonStore: Send + Sync {
    /// Insert or update a module by slug and assign its `id`
    async fn create_module(&self, module: &mut Module) -> Result<(), StoreError>;

    /// Insert or update a lesson by slug and assign its `id`
    async fn create_lesson(&self, lesson: &mut Lesson) -> Result<(), StoreError>;

    /// Remove every section of a lesson, returning how many were removed
    async fn delete_sections_by_lesson_id(&self, lesson_id: i64) -> Result<u64, StoreError>;

    /// Remove every task of a lesson, returning how many were removed
    async fn delete_tasks_by_lesson_id(&self, lesson_id: i64) -> Result<u64, StoreError>;

    /// Insert one section and return its ID
    async fn create_section(&self, lesson_id: i64, section: &Section) -> Result<i64, StoreError>;

    /// Insert one task and return its ID
    async fn create_task(&self, lesson_id: i64, task: &Task) -> Result<i64, StoreError>;

    /// Persist a lesson and replace its sections and tasks
    ///
    /// This default issues one call per record. Cleanup and item failures
    /// are logged and do not abort the lesson; stores that can do better
    /// should override it with an atomic write.
    async fn save_lesson(
        &self,
        lesson: &mut Lesson,
        content: &StructuredLesson,
    ) -> Result<(), StoreError> {
        self.create_lesson(lesson).await?;

        if let Err(e) = self.delete_sections_by_lesson_id(lesson.id).await {
            warn!(lesson = %lesson.slug, "Failed to delete old sections: {}", e);
        }
        if let Err(e) = self.delete_tasks_by_lesson_id(lesson.id).await {
            warn!(lesson = %lesson.slug, "Failed to delete old tasks: {}", e);
        }

        for section in &content.sections {
            if let Err(e) = self.create_section(lesson.id, section).await {
                warn!(lesson = %lesson.slug, kind = %section.kind, "Failed to create section: {}", e);
            }
        }
        for task in &content.tasks {
            if let Err(e) = self.create_task(lesson.id, task).await {
                warn!(lesson = %lesson.slug, task = %task.title, "Failed to create task: {}", e);
            }
        }

        Ok(())
    }
}
