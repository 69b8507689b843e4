//! Section extractors
//!
//! Each extractor returns the Markdown body of one section, or an empty
//! string when the page has nothing for it.

use crate::page::CodeBlock;
use crate::rewrite::classify::Classifier;

const OVERVIEW_LIMIT: usize = 3;
const OVERVIEW_UNCONDITIONAL: usize = 2;
const SYNTAX_PART_LIMIT: usize = 5;
const EXAMPLE_LIMIT: usize = 4;
const EXTRA_SKIP: usize = 3;
const EXTRA_LIMIT: usize = 5;

/// Render a code block as a fenced Markdown block
pub fn fence(block: &CodeBlock) -> String {
    format!("```{}\n{}\n```", block.language, block.code)
}

/// First two paragraphs, then definitional ones, up to three
pub fn overview(paragraphs: &[String], classifier: &Classifier) -> String {
    let mut picked: Vec<&str> = Vec::with_capacity(OVERVIEW_LIMIT);

    for (i, paragraph) in paragraphs.iter().enumerate() {
        if picked.len() >= OVERVIEW_LIMIT {
            break;
        }
        if i < OVERVIEW_UNCONDITIONAL || classifier.definitional.matches(paragraph) {
            picked.push(paragraph);
        }
    }

    picked.join("\n\n")
}

/// Syntax paragraphs, the first code block, then lists while room remains
pub fn syntax(
    paragraphs: &[String],
    code_blocks: &[CodeBlock],
    lists: &[String],
    classifier: &Classifier,
) -> String {
    let mut parts: Vec<String> = paragraphs
        .iter()
        .filter(|p| classifier.syntax.matches(p))
        .cloned()
        .collect();

    if let Some(first) = code_blocks.first() {
        parts.push(fence(first));
    }

    for list in lists {
        if parts.len() >= SYNTAX_PART_LIMIT {
            break;
        }
        parts.push(list.clone());
    }

    parts.join("\n\n")
}

/// Up to four numbered examples, each introduced by the first example paragraph
pub fn examples(
    paragraphs: &[String],
    code_blocks: &[CodeBlock],
    label: &str,
    classifier: &Classifier,
) -> String {
    let intro = paragraphs.iter().find(|p| classifier.example.matches(p));

    code_blocks
        .iter()
        .take(EXAMPLE_LIMIT)
        .enumerate()
        .map(|(i, block)| {
            let mut example = format!("### {} {}\n\n", label, i + 1);
            if let Some(intro) = intro {
                example.push_str(intro);
                example.push_str("\n\n");
            }
            example.push_str(&fence(block));
            example
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Caution paragraphs as bullets, or the fallback advice when none exist
pub fn pitfalls(paragraphs: &[String], fallback: &[String], classifier: &Classifier) -> String {
    let found: Vec<&String> = paragraphs
        .iter()
        .filter(|p| classifier.caution.matches(p))
        .collect();

    let bullets: Vec<&String> = if found.is_empty() {
        fallback.iter().collect()
    } else {
        found
    };

    bullets
        .iter()
        .map(|b| format!("- {}", b))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Unclaimed paragraphs after the first three, up to five
pub fn extra(paragraphs: &[String], classifier: &Classifier) -> String {
    paragraphs
        .iter()
        .skip(EXTRA_SKIP)
        .filter(|p| !classifier.is_claimed(p))
        .take(EXTRA_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n")
}
