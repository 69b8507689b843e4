//! # Table of Contents Module
//!
//! Discovers the ordered list of lessons on the tutorial's index page and
//! tags each one with the module heading it appeared under.
//!
//! ## Algorithm
//!
//! 1. Find the navigation container: the first `<nav>` or element whose
//!    class mentions `nav`, `menu` or `sidebar`, depth-first.
//! 2. Walk it in document order. Headings (`h2`, `h3`, `strong`, `b`) that
//!    do not carry the site brand become the current module label.
//! 3. Anchors pointing at lesson pages, with meaningful text, become entries.
//!
//! If the container yields nothing the whole document is scanned instead.
//! An empty result is not an error.

mod grouping;

pub use grouping::{ModuleGroup, group_by_modules};

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::SiteProfile;
use crate::slug::slugify;

/// A lesson reference discovered in the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Link text, trimmed
    pub title: String,

    /// The anchor's `href`, absolute or site-relative
    pub url: String,

    /// Whether this entry is a module heading rather than a lesson
    pub is_module: bool,

    /// Slug of the nearest preceding heading, empty if none was seen
    pub module_slug: String,

    /// 1-based discovery position
    pub order_index: usize,
}

const CONTAINER_CLASS_HINTS: [&str; 3] = ["nav", "menu", "sidebar"];
const HEADING_TAGS: [&str; 4] = ["h2", "h3", "strong", "b"];

/// Parse an index page and extract its lesson entries
pub fn parse_toc(html: &str, profile: &SiteProfile) -> Vec<TocEntry> {
    let document = Html::parse_document(html);
    extract_toc(&document, profile)
}

/// Extract lesson entries from a parsed index page
///
/// # Arguments
///
/// * `document` - The parsed index page
/// * `profile` - Lesson URL pattern, brand and noise filters
///
/// # Returns
///
/// Entries in document order, possibly empty
pub fn extract_toc(document: &Html, profile: &SiteProfile) -> Vec<TocEntry> {
    let root = document.root_element();

    if let Some(container) = find_nav_container(root) {
        let entries = scan(container, profile);
        if !entries.is_empty() {
            debug!("Found {} entries in navigation container", entries.len());
            return entries;
        }
        debug!("Navigation container had no lessons, scanning whole document");
    }

    scan(root, profile)
}

fn find_nav_container(root: ElementRef<'_>) -> Option<ElementRef<'_>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| {
            let value = element.value();
            if value.name() == "nav" {
                return true;
            }
            value.attr("class").is_some_and(|class| {
                let class = class.to_lowercase();
                CONTAINER_CLASS_HINTS
                    .iter()
                    .any(|hint| class.contains(hint))
            })
        })
}

fn scan(scope: ElementRef<'_>, profile: &SiteProfile) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut current_module = String::new();

    for element in scope.descendants().filter_map(ElementRef::wrap) {
        let name = element.value().name();

        if HEADING_TAGS.contains(&name) {
            if inside_anchor(element) {
                continue;
            }
            let text = element_text(element);
            if !text.is_empty() && !profile.is_branded(&text) {
                current_module = text;
            }
            continue;
        }

        if name != "a" {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !profile.is_lesson_href(href) {
            continue;
        }

        let title = element_text(element);
        if title.is_empty() || profile.is_noise(&title) {
            continue;
        }

        let module_slug = if current_module.is_empty() {
            String::new()
        } else {
            slugify(&current_module)
        };

        entries.push(TocEntry {
            title,
            url: href.to_string(),
            is_module: false,
            module_slug,
            order_index: entries.len() + 1,
        });
    }

    entries
}

fn inside_anchor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "a")
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
