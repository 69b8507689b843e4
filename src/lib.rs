//! # Primer - Tutorial Lesson Ingestion
//!
//! This crate imports a public programming tutorial into a structured lesson
//! database. It walks the tutorial's table of contents, fetches every lesson
//! page, decomposes it, and rewrites it with deterministic rules into a
//! lesson with typed sections and practice tasks.
//!
//! ## Features
//!
//! - Table of contents extraction with module detection
//! - Page decomposition into paragraphs, code blocks and lists
//! - Keyword-driven rewriting into overview, syntax, examples, pitfalls and
//!   extra sections
//! - Practice task generation from templates
//! - Upserting persistence through the [`LessonStore`](store::LessonStore)
//!   trait, with a libsql implementation
//! - Polite sequential crawling with a cancellable delay
//! - Site knowledge (URL patterns, keywords, headings) carried as data in a
//!   [`SiteProfile`](profile::SiteProfile)
//!
//! ## Example
//!
//! ```rust,no_run
//! use primer::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = Database::new_from_path("primer.db").await?;
//!     let pipeline = Pipeline::new(
//!         IngestConfig::default(),
//!         SiteProfile::metanit_go(),
//!         store,
//!     )?;
//!
//!     let summary = pipeline.run(&CancelToken::never(), 5).await?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```

mod error;

pub mod config;
pub mod fetch;
pub mod page;
pub mod pipeline;
pub mod profile;
pub mod rewrite;
pub mod slug;
pub mod store;
pub mod toc;

pub use error::{Error, Result};

/// Re-export of the commonly used types
pub mod prelude {
    pub use crate::config::IngestConfig;
    pub use crate::error::{Error, Result};
    pub use crate::pipeline::{CancelHandle, CancelToken, Pipeline, RunSummary, cancel_pair};
    pub use crate::profile::SiteProfile;
    pub use crate::store::{Database, LessonStore};
}
