//! # Lesson Rewriter Module
//!
//! Turns a decomposed page into the fixed lesson structure: overview,
//! syntax, examples, pitfalls and extra sections plus generated practice
//! tasks. The rewrite is a pure function of its input and the vocabulary;
//! it performs no I/O.
//!
//! ## Key Components
//!
//! - `Rewriter`: Holds the compiled keyword predicates and vocabulary
//! - `StructuredLesson`: The rewrite output handed to the store
//! - `Section` / `SectionKind`: One titled block of the lesson
//! - `Task`: A practice exercise
//!
//! ## Ordering
//!
//! Sections are emitted in kind order (Overview, Syntax, Examples, Pitfalls,
//! Extra). Absent kinds are skipped and the remaining sections are numbered
//! densely from zero; `SectionKind::position` still gives the fixed slot.

mod classify;
mod sections;
mod tasks;

pub use classify::{Classifier, KeywordSet};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::page::ParsedContent;
use crate::profile::Vocabulary;

/// Words per minute used for reading time
const WORDS_PER_MINUTE: usize = 200;
const MIN_READING_MINUTES: usize = 3;
const MAX_READING_MINUTES: usize = 30;

/// Kind of lesson section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Overview,
    Syntax,
    Examples,
    Pitfalls,
    Extra,
}

impl SectionKind {
    /// All kinds in emission order
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Overview,
        SectionKind::Syntax,
        SectionKind::Examples,
        SectionKind::Pitfalls,
        SectionKind::Extra,
    ];

    /// Fixed slot of this kind (Overview = 0 ... Extra = 4)
    pub fn position(self) -> usize {
        match self {
            SectionKind::Overview => 0,
            SectionKind::Syntax => 1,
            SectionKind::Examples => 2,
            SectionKind::Pitfalls => 3,
            SectionKind::Extra => 4,
        }
    }

    /// Storage name of this kind
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Overview => "overview",
            SectionKind::Syntax => "syntax",
            SectionKind::Examples => "examples",
            SectionKind::Pitfalls => "pitfalls",
            SectionKind::Extra => "extra",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown section kind: {}", s))
    }
}

/// A titled block of a lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub body_md: String,
    /// Dense position among the lesson's sections
    pub order_index: usize,
}

/// A practice exercise attached to a lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub prompt_md: String,
    pub starter_code: String,
    pub tests_code: String,
    pub points: u32,
    pub order_index: usize,
}

/// A lesson in its final structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredLesson {
    /// Lesson title
    pub title: String,

    /// Full lesson as Markdown
    pub body_md: String,

    /// Estimated reading time, in [3, 30] minutes
    pub reading_time_min: usize,

    /// Sections in kind order
    pub sections: Vec<Section>,

    /// Practice tasks
    pub tasks: Vec<Task>,
}

/// What the rewriter knows about a lesson besides its page
#[derive(Debug, Clone, Default)]
pub struct LessonMeta {
    /// Title from the table of contents, used when the page has none
    pub toc_title: String,

    /// Where the page was fetched from
    pub source_url: String,
}

/// Estimate reading time from paragraph word count
pub fn reading_time(paragraphs: &[String]) -> usize {
    let words: usize = paragraphs
        .iter()
        .map(|p| p.split_whitespace().count())
        .sum();
    (words / WORDS_PER_MINUTE).clamp(MIN_READING_MINUTES, MAX_READING_MINUTES)
}

/// Rule-based rewriter from parsed pages to structured lessons
#[derive(Debug, Clone)]
pub struct Rewriter {
    vocabulary: Vocabulary,
    classifier: Classifier,
}

impl Rewriter {
    /// Create a rewriter for a vocabulary
    ///
    /// Fails when the keyword tables cannot be compiled.
    pub fn new(vocabulary: Vocabulary) -> Result<Self> {
        let classifier = Classifier::new(&vocabulary)
            .map_err(|e| Error::Config(format!("Invalid keyword vocabulary: {}", e)))?;
        Ok(Self {
            vocabulary,
            classifier,
        })
    }

    /// Rewrite a parsed page into a structured lesson
    ///
    /// # Arguments
    ///
    /// * `parsed` - The decomposed page
    /// * `meta` - TOC title and source URL
    ///
    /// # Returns
    ///
    /// The lesson with its sections and tasks
    pub fn rewrite(&self, parsed: &ParsedContent, meta: &LessonMeta) -> StructuredLesson {
        let title = if parsed.title.trim().is_empty() {
            meta.toc_title.trim().to_string()
        } else {
            parsed.title.trim().to_string()
        };

        let mut body_md = format!("# {}\n", title);
        let mut sections = Vec::new();

        for kind in SectionKind::ALL {
            let body = self.section_body(kind, parsed);
            if body.is_empty() {
                continue;
            }

            let heading = self.heading(kind).to_string();
            body_md.push_str(&format!("\n## {}\n\n{}\n", heading, body));
            sections.push(Section {
                kind,
                title: heading,
                body_md: body,
                order_index: sections.len(),
            });
        }

        StructuredLesson {
            title,
            body_md,
            reading_time_min: reading_time(&parsed.paragraphs),
            sections,
            tasks: tasks::generate(&self.vocabulary, !parsed.code_blocks.is_empty()),
        }
    }

    fn section_body(&self, kind: SectionKind, parsed: &ParsedContent) -> String {
        let classifier = &self.classifier;
        match kind {
            SectionKind::Overview => sections::overview(&parsed.paragraphs, classifier),
            SectionKind::Syntax => sections::syntax(
                &parsed.paragraphs,
                &parsed.code_blocks,
                &parsed.lists,
                classifier,
            ),
            SectionKind::Examples => sections::examples(
                &parsed.paragraphs,
                &parsed.code_blocks,
                &self.vocabulary.example_label,
                classifier,
            ),
            SectionKind::Pitfalls => sections::pitfalls(
                &parsed.paragraphs,
                &self.vocabulary.fallback_pitfalls,
                classifier,
            ),
            SectionKind::Extra => sections::extra(&parsed.paragraphs, classifier),
        }
    }

    fn heading(&self, kind: SectionKind) -> &str {
        let headings = &self.vocabulary.headings;
        match kind {
            SectionKind::Overview => &headings.overview,
            SectionKind::Syntax => &headings.syntax,
            SectionKind::Examples => &headings.examples,
            SectionKind::Pitfalls => &headings.pitfalls,
            SectionKind::Extra => &headings.extra,
        }
    }
}
