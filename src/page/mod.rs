//! # Page Parser Module
//!
//! Decomposes one lesson page into a flat, ordered intermediate form: the
//! title, paragraph texts, code blocks with a language hint, and list blocks
//! rendered as Markdown. No classification happens here; the rewriter decides
//! what each block means.
//!
//! Page chrome matched by the profile's exclusion selectors (navigation,
//! headers, footers, sidebars) is skipped during the walk.

mod error;

pub use error::ParseError;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::debug;

static LANGUAGE_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[\s;])(?:language-|lang-|brush:\s*)([a-z0-9_+#-]+)").unwrap()
});

/// A code block and its best-effort language tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Language hint, empty if the markup carried none
    pub language: String,

    /// Raw code text
    pub code: String,
}

/// A lesson page decomposed into blocks, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedContent {
    /// Text of the primary title element
    pub title: String,

    /// Paragraph texts, whitespace-normalized
    pub paragraphs: Vec<String>,

    /// Code blocks
    pub code_blocks: Vec<CodeBlock>,

    /// List blocks rendered as Markdown
    pub lists: Vec<String>,
}

/// Parser for lesson pages
#[derive(Debug, Clone)]
pub struct PageParser {
    excluded: Vec<Selector>,
}

impl PageParser {
    /// Create a parser that skips elements matching any of the given selectors
    pub fn new(exclude_selectors: &[String]) -> Result<Self, ParseError> {
        let excluded = exclude_selectors
            .iter()
            .map(|selector| {
                Selector::parse(selector).map_err(|e| ParseError::Selector {
                    selector: selector.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { excluded })
    }

    /// Parse a lesson page
    ///
    /// # Arguments
    ///
    /// * `html` - Raw page markup
    ///
    /// # Returns
    ///
    /// The decomposed page
    pub fn parse(&self, html: &str) -> Result<ParsedContent, ParseError> {
        if html.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        let document = Html::parse_document(html);
        let root = document.root_element();
        let body = root
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == "body")
            .unwrap_or(root);

        let mut content = ParsedContent::default();

        for element in body.descendants().filter_map(ElementRef::wrap) {
            match element.value().name() {
                "h1" | "p" | "pre" | "ul" | "ol" => {}
                _ => continue,
            }
            if self.is_excluded(element) {
                continue;
            }

            match element.value().name() {
                "h1" if content.title.is_empty() => {
                    content.title = normalized_text(element);
                }
                "p" if !has_ancestor(element, &["ul", "ol", "pre"]) => {
                    let text = normalized_text(element);
                    if !text.is_empty() {
                        content.paragraphs.push(text);
                    }
                }
                "pre" => {
                    let code = element.text().collect::<String>();
                    let code = code.trim_matches(|c| c == '\n' || c == '\r');
                    if !code.trim().is_empty() {
                        content.code_blocks.push(CodeBlock {
                            language: code_language(element),
                            code: code.to_string(),
                        });
                    }
                }
                "ul" | "ol" if !has_ancestor(element, &["ul", "ol"]) => {
                    let rendered = render_list(element);
                    if !rendered.is_empty() {
                        content.lists.push(rendered);
                    }
                }
                _ => {}
            }
        }

        if content.title.is_empty() {
            if let Some(title) = root
                .descendants()
                .filter_map(ElementRef::wrap)
                .find(|element| element.value().name() == "title")
            {
                content.title = normalized_text(title);
            }
        }

        debug!(
            "Parsed page '{}': {} paragraphs, {} code blocks, {} lists",
            content.title,
            content.paragraphs.len(),
            content.code_blocks.len(),
            content.lists.len()
        );

        Ok(content)
    }

    fn is_excluded(&self, element: ElementRef<'_>) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        std::iter::once(element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .any(|candidate| self.excluded.iter().any(|s| s.matches(&candidate)))
    }
}

fn has_ancestor(element: ElementRef<'_>, names: &[&str]) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| names.contains(&ancestor.value().name()))
}

fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn code_language(pre: ElementRef<'_>) -> String {
    let inner_code = pre
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "code");

    for candidate in std::iter::once(pre).chain(inner_code) {
        let value = candidate.value();
        if let Some(lang) = value.attr("data-lang").map(str::trim) {
            if !lang.is_empty() {
                return lang.to_lowercase();
            }
        }
        if let Some(captures) = value.attr("class").and_then(|c| LANGUAGE_HINT_RE.captures(c)) {
            return captures[1].to_lowercase();
        }
    }

    String::new()
}

fn render_list(list: ElementRef<'_>) -> String {
    let ordered = list.value().name() == "ol";

    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .map(normalized_text)
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(i, text)| {
            if ordered {
                format!("{}. {}", i + 1, text)
            } else {
                format!("- {}", text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SiteProfile;

    fn parser() -> PageParser {
        PageParser::new(&SiteProfile::metanit_go().exclude_selectors).unwrap()
    }

    const LESSON: &str = r#"
        <html>
        <head><title>Переменные | METANIT.COM</title></head>
        <body>
            <nav><p>Навигация по сайту</p><ul><li>Главная</li></ul></nav>
            <h1>Переменные</h1>
            <p>Переменная   представляет
               именованный участок памяти.</p>
            <pre class="brush:go;">
var x int = 10
fmt.Println(x)
</pre>
            <p></p>
            <ul>
                <li>Первый пункт</li>
                <li>Второй <ul><li>вложенный</li></ul></li>
            </ul>
            <ol><li>Один</li><li>Два</li></ol>
            <pre><code class="language-Go">x := 5</code></pre>
            <pre data-lang="bash">go run main.go</pre>
            <pre>plain</pre>
            <footer><p>Copyright</p></footer>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_lesson_blocks() {
        let content = parser().parse(LESSON).unwrap();

        assert_eq!(content.title, "Переменные");
        assert_eq!(
            content.paragraphs,
            vec!["Переменная представляет именованный участок памяти.".to_string()]
        );

        assert_eq!(content.code_blocks.len(), 4);
        assert_eq!(content.code_blocks[0].language, "go");
        assert_eq!(content.code_blocks[0].code, "var x int = 10\nfmt.Println(x)");
        assert_eq!(content.code_blocks[1].language, "go");
        assert_eq!(content.code_blocks[1].code, "x := 5");
        assert_eq!(content.code_blocks[2].language, "bash");
        assert_eq!(content.code_blocks[3].language, "");

        assert_eq!(
            content.lists,
            vec![
                "- Первый пункт\n- Второй вложенный".to_string(),
                "1. Один\n2. Два".to_string(),
            ]
        );
    }

    #[test]
    fn test_title_falls_back_to_title_tag() {
        let html = "<html><head><title>Каналы</title></head><body><p>Текст</p></body></html>";
        let content = parser().parse(html).unwrap();
        assert_eq!(content.title, "Каналы");
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(matches!(parser().parse("  \n "), Err(ParseError::EmptyDocument)));
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let result = PageParser::new(&["div[".to_string()]);
        assert!(matches!(result, Err(ParseError::Selector { .. })));
    }

    #[test]
    fn test_no_exclusions() {
        let parser = PageParser::new(&[]).unwrap();
        let content = parser
            .parse("<nav><p>Menu text</p></nav><p>Body text</p>")
            .unwrap();
        assert_eq!(content.paragraphs, vec!["Menu text", "Body text"]);
        assert_eq!(content.title, "");
    }
}
