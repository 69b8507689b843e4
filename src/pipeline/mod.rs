//! # Ingestion Pipeline Module
//!
//! Drives one ingestion run: fetch the table of contents, group its entries
//! into modules, then fetch, parse, rewrite and persist every lesson in
//! order.
//!
//! The run is strictly sequential. A configurable delay precedes every
//! lesson fetch and is the only point where cancellation is observed.
//! Failures of a single lesson are logged and recorded in the summary; only
//! an unreachable table of contents, a failed module write or cancellation
//! end the run early.

mod cancel;

pub use cancel::{CancelHandle, CancelToken, cancel_pair};

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::page::PageParser;
use crate::profile::SiteProfile;
use crate::rewrite::{LessonMeta, Rewriter};
use crate::slug::slugify;
use crate::store::{Lesson, LessonStore, Module};
use crate::toc::{ModuleGroup, TocEntry, group_by_modules, parse_toc};

/// Progress updates emitted while a run advances
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Lessons were discovered and are about to be processed
    Started {
        /// Number of lessons in the run
        total: usize,
    },

    /// A lesson was stored
    Saved {
        /// Title of the stored lesson
        title: String,
    },

    /// A lesson failed and was skipped
    Skipped {
        /// URL of the failed lesson
        url: String,
    },
}

/// A lesson that could not be ingested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLesson {
    /// URL from the table of contents
    pub url: String,

    /// Why it was skipped
    pub reason: String,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Modules written
    pub modules: usize,

    /// Lessons written
    pub lessons_saved: usize,

    /// Lessons that failed, in processing order
    pub skipped: Vec<SkippedLesson>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} modules, {} lessons saved, {} skipped",
            self.modules,
            self.lessons_saved,
            self.skipped.len()
        )?;
        for skipped in &self.skipped {
            write!(f, "\n  skipped {}: {}", skipped.url, skipped.reason)?;
        }
        Ok(())
    }
}

/// Fetch the table of contents and group its entries into modules
///
/// # Arguments
///
/// * `fetcher` - Fetcher bound to the tutorial site
/// * `toc_path` - Path or URL of the index page
/// * `profile` - Site profile used for extraction and module titles
/// * `limit` - Maximum number of lessons, 0 for all
///
/// # Returns
///
/// Modules in first-seen order, empty when the index lists no lessons
pub async fn discover_modules(
    fetcher: &Fetcher,
    toc_path: &str,
    profile: &SiteProfile,
    limit: usize,
) -> Result<Vec<ModuleGroup>> {
    let html = fetcher
        .fetch(toc_path)
        .await
        .map_err(|source| Error::Toc {
            url: toc_path.to_string(),
            source,
        })?;

    let mut entries = parse_toc(&html, profile);
    debug!("Table of contents lists {} lessons", entries.len());

    if limit > 0 && entries.len() > limit {
        entries.truncate(limit);
    }

    Ok(group_by_modules(entries, &profile.modules))
}

/// Sequential ingestion pipeline over a lesson store
pub struct Pipeline<S: LessonStore> {
    config: IngestConfig,
    profile: SiteProfile,
    fetcher: Fetcher,
    parser: PageParser,
    rewriter: Rewriter,
    store: S,
    progress: Option<mpsc::Sender<Progress>>,
}

impl<S: LessonStore> Pipeline<S> {
    /// Create a pipeline for a site profile writing into `store`
    pub fn new(config: IngestConfig, profile: SiteProfile, store: S) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        let parser = PageParser::new(&profile.exclude_selectors)?;
        let rewriter = Rewriter::new(profile.vocabulary.clone())?;

        Ok(Self {
            config,
            profile,
            fetcher,
            parser,
            rewriter,
            store,
            progress: None,
        })
    }

    /// Send progress updates to `sender` during runs
    pub fn with_progress(mut self, sender: mpsc::Sender<Progress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// The store lessons are written to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one ingestion pass
    ///
    /// # Arguments
    ///
    /// * `cancel` - Checked during every inter-request delay
    /// * `limit` - Maximum number of lessons, 0 for all
    ///
    /// # Returns
    ///
    /// Counts of written records and the lessons that were skipped
    #[instrument(skip(self, cancel), fields(base_url = %self.config.base_url))]
    pub async fn run(&self, cancel: &CancelToken, limit: usize) -> Result<RunSummary> {
        info!("Fetching table of contents from {}", self.config.toc_path);
        let groups =
            discover_modules(&self.fetcher, &self.config.toc_path, &self.profile, limit).await?;

        let mut summary = RunSummary::default();
        let total: usize = groups.iter().map(|group| group.entries.len()).sum();
        if total == 0 {
            warn!("Table of contents lists no lessons");
            return Ok(summary);
        }

        info!("Ingesting {} lessons in {} modules", total, groups.len());
        self.report(Progress::Started { total }).await;

        for group in &groups {
            let mut module = Module {
                id: 0,
                slug: group.slug.clone(),
                title: group.title.clone(),
                order_index: group.order_index as i64,
            };
            self.store
                .create_module(&mut module)
                .await
                .map_err(|source| Error::Module {
                    slug: group.slug.clone(),
                    source,
                })?;
            summary.modules += 1;
            info!(module = %module.slug, "Module {} has {} lessons", module.title, group.entries.len());

            for (position, entry) in group.entries.iter().enumerate() {
                self.pause(cancel).await?;

                match self.ingest_lesson(&module, entry, position + 1).await {
                    Ok(lesson) => {
                        info!(url = %lesson.source_url, "Saved lesson {}", lesson.slug);
                        summary.lessons_saved += 1;
                        self.report(Progress::Saved {
                            title: lesson.title,
                        })
                        .await;
                    }
                    Err(e) => {
                        warn!(url = %entry.url, "Skipping lesson: {}", e);
                        summary.skipped.push(SkippedLesson {
                            url: entry.url.clone(),
                            reason: e.to_string(),
                        });
                        self.report(Progress::Skipped {
                            url: entry.url.clone(),
                        })
                        .await;
                    }
                }
            }
        }

        info!("Run finished: {}", summary);
        Ok(summary)
    }

    async fn pause(&self, cancel: &CancelToken) -> Result<()> {
        let delay = self.config.request_delay();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Cancellation requested, stopping run");
                Err(Error::Cancelled)
            }
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    async fn ingest_lesson(
        &self,
        module: &Module,
        entry: &TocEntry,
        order_index: usize,
    ) -> Result<Lesson> {
        let source_url = self.fetcher.resolve(&entry.url)?.to_string();
        let html = self.fetcher.fetch(&source_url).await?;
        let parsed = self.parser.parse(&html)?;

        let meta = LessonMeta {
            toc_title: entry.title.clone(),
            source_url: source_url.clone(),
        };
        let structured = self.rewriter.rewrite(&parsed, &meta);
        debug!(
            url = %source_url,
            "Rewrote into {} sections and {} tasks",
            structured.sections.len(),
            structured.tasks.len()
        );

        let mut lesson = Lesson {
            id: 0,
            module_id: module.id,
            slug: slugify(&structured.title),
            title: structured.title.clone(),
            source_url,
            body_md: structured.body_md.clone(),
            reading_time_min: structured.reading_time_min as i64,
            order_index: order_index as i64,
        };
        self.store.save_lesson(&mut lesson, &structured).await?;

        Ok(lesson)
    }

    async fn report(&self, progress: Progress) {
        if let Some(sender) = &self.progress {
            // A closed receiver only means nobody is watching
            let _ = sender.send(progress).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::{Section, Task};
    use crate::store::{Database, StoreError};
    use mockito::{Server, ServerGuard};
    use std::time::Duration;
    use tempfile::tempdir;

    const TOC_HTML: &str = r#"
        <html><body>
            <div class="header"><b>METANIT.COM</b></div>
            <nav>
                <h2>Глава 1. Введение</h2>
                <a href="/go/tutorial/1.1.php">Что такое Go</a>
                <a href="/go/tutorial/1.2.php">Первая программа</a>
                <h2>Глава 2. Основы</h2>
                <a href="/go/tutorial/2.1.php">Переменные</a>
            </nav>
        </body></html>
    "#;

    fn lesson_page(title: &str) -> String {
        format!(
            r#"<html><head><title>{title} | METANIT.COM</title></head><body>
                <nav><a href="/go/tutorial/">Содержание</a></nav>
                <h1>{title}</h1>
                <p>Go - это компилируемый язык программирования от Google.</p>
                <p>Синтаксис объявления переменной использует ключевое слово var.</p>
                <pre class="brush:go;">package main

func main() {{}}</pre>
            </body></html>"#
        )
    }

    fn config_for(server: &ServerGuard) -> IngestConfig {
        IngestConfig::builder()
            .base_url(server.url())
            .timeout_secs(5)
            .request_delay_ms(0)
            .build()
    }

    async fn setup_test_db() -> (Database, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let db = Database::new_from_path(&db_path).await.unwrap();
        (db, temp_dir)
    }

    async fn mock_page(server: &mut ServerGuard, path: &str, status: usize, body: &str) {
        server
            .mock("GET", path)
            .with_status(status)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(body)
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn test_run_skips_missing_lesson() {
        let mut server = Server::new_async().await;
        mock_page(&mut server, "/go/tutorial/", 200, TOC_HTML).await;
        mock_page(&mut server, "/go/tutorial/1.1.php", 200, &lesson_page("Что такое Go")).await;
        mock_page(&mut server, "/go/tutorial/1.2.php", 404, "Not Found").await;
        mock_page(&mut server, "/go/tutorial/2.1.php", 200, &lesson_page("Переменные")).await;

        let (db, _temp_dir) = setup_test_db().await;
        let (sender, mut receiver) = mpsc::channel(16);
        let pipeline = Pipeline::new(config_for(&server), SiteProfile::metanit_go(), db)
            .unwrap()
            .with_progress(sender);

        let summary = pipeline.run(&CancelToken::never(), 0).await.unwrap();
        assert_eq!(summary.modules, 2);
        assert_eq!(summary.lessons_saved, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].url, "/go/tutorial/1.2.php");
        assert!(summary.skipped[0].reason.contains("404"));

        let db = pipeline.store();
        let modules = db.list_modules().await.unwrap();
        let slugs: Vec<_> = modules.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs, ["glava-1-vvedenie", "glava-2-osnovy"]);
        assert_eq!(modules[1].order_index, 2);

        let lessons = db.list_lessons(modules[0].id).await.unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].slug, "chto-takoe-go");
        assert_eq!(lessons[0].order_index, 1);
        assert!(lessons[0].source_url.ends_with("/go/tutorial/1.1.php"));
        assert!(lessons[0].body_md.starts_with("# Что такое Go\n"));

        let sections = db.get_sections(lessons[0].id).await.unwrap();
        assert!(!sections.is_empty());
        let tasks = db.get_tasks(lessons[0].id).await.unwrap();
        assert_eq!(tasks.len(), 3);

        assert_eq!(receiver.try_recv().unwrap(), Progress::Started { total: 3 });
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            Progress::Skipped {
                url: "/go/tutorial/1.2.php".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_run_with_empty_toc_writes_nothing() {
        let mut server = Server::new_async().await;
        mock_page(
            &mut server,
            "/go/tutorial/",
            200,
            "<html><body><p>Скоро здесь будет содержание</p></body></html>",
        )
        .await;

        let (db, _temp_dir) = setup_test_db().await;
        let pipeline = Pipeline::new(config_for(&server), SiteProfile::metanit_go(), db).unwrap();

        let summary = pipeline.run(&CancelToken::never(), 0).await.unwrap();
        assert_eq!(summary, RunSummary::default());
        assert!(pipeline.store().list_modules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_fails_when_toc_unreachable() {
        let mut server = Server::new_async().await;
        mock_page(&mut server, "/go/tutorial/", 500, "boom").await;

        let (db, _temp_dir) = setup_test_db().await;
        let pipeline = Pipeline::new(config_for(&server), SiteProfile::metanit_go(), db).unwrap();

        let err = pipeline.run(&CancelToken::never(), 0).await.unwrap_err();
        assert!(matches!(err, Error::Toc { .. }));
    }

    #[tokio::test]
    async fn test_run_respects_limit() {
        let mut server = Server::new_async().await;
        mock_page(&mut server, "/go/tutorial/", 200, TOC_HTML).await;
        mock_page(&mut server, "/go/tutorial/1.1.php", 200, &lesson_page("Что такое Go")).await;
        let untouched = server
            .mock("GET", "/go/tutorial/2.1.php")
            .expect(0)
            .create_async()
            .await;

        let (db, _temp_dir) = setup_test_db().await;
        let pipeline = Pipeline::new(config_for(&server), SiteProfile::metanit_go(), db).unwrap();

        let summary = pipeline.run(&CancelToken::never(), 1).await.unwrap();
        assert_eq!(summary.modules, 1);
        assert_eq!(summary.lessons_saved, 1);
        untouched.assert_async().await;
    }

    #[tokio::test]
    async fn test_delay_precedes_each_lesson_fetch() {
        let mut server = Server::new_async().await;
        mock_page(&mut server, "/go/tutorial/", 200, TOC_HTML).await;
        mock_page(&mut server, "/go/tutorial/1.1.php", 200, &lesson_page("Что такое Go")).await;
        mock_page(&mut server, "/go/tutorial/1.2.php", 200, &lesson_page("Первая программа")).await;

        let (db, _temp_dir) = setup_test_db().await;
        let config = IngestConfig::builder()
            .base_url(server.url())
            .timeout_secs(5)
            .request_delay_ms(150)
            .build();
        let pipeline = Pipeline::new(config, SiteProfile::metanit_go(), db).unwrap();

        let start = tokio::time::Instant::now();
        let summary = pipeline.run(&CancelToken::never(), 2).await.unwrap();
        assert_eq!(summary.lessons_saved, 2);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_waits_for_configured_delay() {
        let config = IngestConfig::builder().request_delay_ms(500).build();
        let pipeline = Pipeline::new(config, SiteProfile::metanit_go(), OfflineStore).unwrap();
        let token = CancelToken::never();

        let start = tokio::time::Instant::now();
        pipeline.pause(&token).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));

        pipeline.pause(&token).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1100));
    }

    #[tokio::test]
    async fn test_cancel_stops_before_next_fetch() {
        let mut server = Server::new_async().await;
        mock_page(&mut server, "/go/tutorial/", 200, TOC_HTML).await;
        let lesson = server
            .mock("GET", "/go/tutorial/1.1.php")
            .expect(0)
            .create_async()
            .await;

        let (db, _temp_dir) = setup_test_db().await;
        let config = IngestConfig::builder()
            .base_url(server.url())
            .request_delay_ms(60_000)
            .build();
        let pipeline = Pipeline::new(config, SiteProfile::metanit_go(), db).unwrap();

        let (handle, token) = cancel_pair();
        handle.cancel();

        let err = pipeline.run(&token, 0).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        lesson.assert_async().await;
    }

    struct OfflineStore;

    #[async_trait::async_trait]
    impl LessonStore for OfflineStore {
        async fn create_module(&self, _module: &mut Module) -> std::result::Result<(), StoreError> {
            Err(StoreError::Connection("offline".to_string()))
        }

        async fn create_lesson(&self, _lesson: &mut Lesson) -> std::result::Result<(), StoreError> {
            Err(StoreError::Connection("offline".to_string()))
        }

        async fn delete_sections_by_lesson_id(
            &self,
            _lesson_id: i64,
        ) -> std::result::Result<u64, StoreError> {
            Ok(0)
        }

        async fn delete_tasks_by_lesson_id(
            &self,
            _lesson_id: i64,
        ) -> std::result::Result<u64, StoreError> {
            Ok(0)
        }

        async fn create_section(
            &self,
            _lesson_id: i64,
            _section: &Section,
        ) -> std::result::Result<i64, StoreError> {
            Ok(0)
        }

        async fn create_task(
            &self,
            _lesson_id: i64,
            _task: &Task,
        ) -> std::result::Result<i64, StoreError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_module_failure_is_fatal() {
        let mut server = Server::new_async().await;
        mock_page(&mut server, "/go/tutorial/", 200, TOC_HTML).await;

        let pipeline =
            Pipeline::new(config_for(&server), SiteProfile::metanit_go(), OfflineStore).unwrap();

        let err = pipeline.run(&CancelToken::never(), 0).await.unwrap_err();
        match err {
            Error::Module { slug, .. } => assert_eq!(slug, "glava-1-vvedenie"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            modules: 2,
            lessons_saved: 5,
            skipped: vec![SkippedLesson {
                url: "/go/tutorial/1.2.php".to_string(),
                reason: "HTTP 404".to_string(),
            }],
        };

        assert_eq!(
            summary.to_string(),
            "2 modules, 5 lessons saved, 1 skipped\n  skipped /go/tutorial/1.2.php: HTTP 404"
        );
    }
}
