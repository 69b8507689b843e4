//! Grouping of TOC entries into ordered modules

use std::collections::HashMap;

use serde::Serialize;

use crate::profile::ModuleCatalog;
use crate::toc::TocEntry;

/// One module and the lessons discovered under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleGroup {
    /// Module slug
    pub slug: String,

    /// Display title resolved from the catalog
    pub title: String,

    /// 1-based position in first-seen order
    pub order_index: usize,

    /// Lessons in discovery order
    pub entries: Vec<TocEntry>,
}

/// Group entries by module slug, preserving first-seen order
///
/// Entries without a slug go to the catalog's default module. Concatenating
/// the entries of the returned groups reproduces the input sequence.
pub fn group_by_modules(entries: Vec<TocEntry>, catalog: &ModuleCatalog) -> Vec<ModuleGroup> {
    let mut groups: Vec<ModuleGroup> = Vec::new();
    let mut index_by_slug: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let slug = if entry.module_slug.is_empty() {
            catalog.default_slug.clone()
        } else {
            entry.module_slug.clone()
        };

        let index = *index_by_slug.entry(slug.clone()).or_insert_with(|| {
            groups.push(ModuleGroup {
                title: catalog.title_for(&slug),
                slug,
                order_index: groups.len() + 1,
                entries: Vec::new(),
            });
            groups.len() - 1
        });

        groups[index].entries.push(entry);
    }

    groups
}
