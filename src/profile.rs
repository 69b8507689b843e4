//! # Site Profile Module
//!
//! Everything that ties the pipeline to one particular tutorial site lives
//! here as plain data: the lesson URL pattern, navigation noise phrases, the
//! module title table, the classification keywords, section headings and the
//! practice task templates. Profiles deserialize from JSON with every field
//! optional, so a partial file only overrides what it names.
//!
//! ## Key Components
//!
//! - `SiteProfile`: URL pattern, noise filters and content exclusions
//! - `ModuleCatalog`: slug to title lookup used by the module grouper
//! - `Vocabulary`: keyword tables, headings and fallback advice
//! - `TaskTemplate`: static practice task content
//!
//! The built-in profile targets the METANIT Go tutorial with a Russian
//! vocabulary; `Vocabulary::english()` is provided for English-language sites.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of fallback pitfall bullets a vocabulary must provide
pub const FALLBACK_PITFALL_COUNT: usize = 3;

/// Site-specific knowledge needed to crawl one tutorial
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Path fragment every lesson URL contains
    pub lesson_path_segment: String,

    /// Extension every lesson URL ends with
    pub page_extension: String,

    /// Branding text; headings containing it are not module labels
    pub brand_keyword: String,

    /// Link texts to ignore (previous/next/brand), matched case-insensitively
    pub noise_phrases: Vec<String>,

    /// CSS selectors for page chrome skipped by the page parser
    pub exclude_selectors: Vec<String>,

    /// Module titles and the default module
    pub modules: ModuleCatalog,

    /// Classification keywords, headings and task templates
    pub vocabulary: Vocabulary,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::metanit_go()
    }
}

impl SiteProfile {
    /// Profile for the METANIT Go tutorial
    pub fn metanit_go() -> Self {
        Self {
            lesson_path_segment: "/go/tutorial/".to_string(),
            page_extension: ".php".to_string(),
            brand_keyword: "METANIT".to_string(),
            noise_phrases: strings(&[
                "назад",
                "вперед",
                "вперёд",
                "содержание",
                "metanit",
                "previous",
                "next",
            ]),
            exclude_selectors: strings(&[
                "nav",
                "header",
                "footer",
                "aside",
                ".navigation",
                ".menu",
                ".sidebar",
                ".comments",
                "#comments",
                "script",
                "style",
            ]),
            modules: ModuleCatalog::metanit_go(),
            vocabulary: Vocabulary::russian(),
        }
    }

    /// Load a profile from a JSON file, filling omitted fields from the default
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let profile: SiteProfile = serde_json::from_str(&raw)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reject profiles that could never match a lesson or would leave a
    /// lesson without pitfalls
    pub fn validate(&self) -> Result<()> {
        if self.page_extension.trim().is_empty() {
            return Err(Error::Config("page_extension must not be empty".to_string()));
        }
        if self.modules.default_slug.trim().is_empty() {
            return Err(Error::Config(
                "modules.default_slug must not be empty".to_string(),
            ));
        }

        let fallback = &self.vocabulary.fallback_pitfalls;
        if fallback.len() != FALLBACK_PITFALL_COUNT
            || fallback.iter().any(|bullet| bullet.trim().is_empty())
        {
            return Err(Error::Config(format!(
                "vocabulary.fallback_pitfalls must hold exactly {} non-blank entries",
                FALLBACK_PITFALL_COUNT
            )));
        }
        Ok(())
    }

    /// Whether an `href` points at a lesson page
    pub fn is_lesson_href(&self, href: &str) -> bool {
        href.contains(&self.lesson_path_segment) && href.ends_with(&self.page_extension)
    }

    /// Whether link text is navigation noise rather than a lesson title
    pub fn is_noise(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.noise_phrases
            .iter()
            .any(|phrase| lowered.contains(&phrase.to_lowercase()))
    }

    /// Whether text carries the site's branding
    pub fn is_branded(&self, text: &str) -> bool {
        !self.brand_keyword.is_empty()
            && text
                .to_lowercase()
                .contains(&self.brand_keyword.to_lowercase())
    }
}

/// Module title lookup with a default grouping key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleCatalog {
    /// Slug used for entries discovered before any heading
    pub default_slug: String,

    /// Human-readable titles by module slug
    pub titles: BTreeMap<String, String>,
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self {
            default_slug: "general".to_string(),
            titles: BTreeMap::new(),
        }
    }
}

impl ModuleCatalog {
    /// Chapter titles of the METANIT Go tutorial
    pub fn metanit_go() -> Self {
        let titles = [
            ("general", "Общие сведения"),
            ("glava-1-vvedenie-v-yazyk-go", "Введение в язык Go"),
            ("glava-2-osnovy-yazyka-go", "Основы языка Go"),
            ("glava-3-funktsii", "Функции"),
            ("glava-4-ukazateli", "Указатели"),
            ("glava-5-struktury", "Структуры"),
            ("glava-6-obrabotka-oshibok", "Обработка ошибок"),
            ("glava-7-interfeysy", "Интерфейсы"),
            ("glava-8-gorutiny-i-kanaly", "Горутины и каналы"),
            ("glava-9-vvod-vyvod", "Ввод-вывод"),
            ("glava-10-rabota-s-setyu", "Работа с сетью"),
        ];
        Self {
            default_slug: "general".to_string(),
            titles: titles
                .into_iter()
                .map(|(slug, title)| (slug.to_string(), title.to_string()))
                .collect(),
        }
    }

    /// Resolve a display title for a module slug
    ///
    /// Unknown slugs fall back to the slug itself with hyphens turned into
    /// spaces and the first character uppercased.
    pub fn title_for(&self, slug: &str) -> String {
        if let Some(title) = self.titles.get(slug) {
            return title.clone();
        }

        let spaced = slug.replace('-', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Static content of one practice task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Task title
    pub title: String,

    /// Task statement in Markdown
    pub prompt_md: String,

    /// Code the learner starts from
    pub starter_code: String,

    /// Code that checks the solution
    pub tests_code: String,

    /// Points awarded
    pub points: u32,
}

/// Keyword tables and fixed texts used by the rewriter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Keywords marking a definition ("represents", "allows", ...)
    pub definitional: Vec<String>,

    /// Keywords marking a syntax description
    pub syntax: Vec<String>,

    /// Keywords marking an example introduction
    pub example: Vec<String>,

    /// Keywords marking a caution or pitfall
    pub caution: Vec<String>,

    /// Section headings, one per section kind
    pub headings: SectionHeadings,

    /// Label used for numbered examples ("Example 1")
    pub example_label: String,

    /// Bullets used when no paragraph mentions a pitfall
    pub fallback_pitfalls: Vec<String>,

    /// Always emitted first
    pub warm_up_task: TaskTemplate,

    /// Emitted only for lessons with code
    pub understanding_task: TaskTemplate,

    /// Always emitted last
    pub find_bug_task: TaskTemplate,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::russian()
    }
}

/// Headings for each section kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHeadings {
    pub overview: String,
    pub syntax: String,
    pub examples: String,
    pub pitfalls: String,
    pub extra: String,
}

impl Vocabulary {
    /// Russian vocabulary for METANIT-style tutorials
    pub fn russian() -> Self {
        Self {
            definitional: strings(&[
                "представляет",
                "является",
                "позволяет",
                "используется для",
                "определяет",
                "это ",
            ]),
            syntax: strings(&[
                "синтаксис",
                "имеет вид",
                "имеет форму",
                "записывается",
                "объявляется",
                "определение",
                "формат",
                "структур",
                "шаблон",
            ]),
            example: strings(&["пример", "рассмотрим", "следующ"]),
            caution: strings(&[
                "ошибк",
                "нельзя",
                "не может",
                "не следует",
                "важно",
                "осторожн",
                "не рекомендуется",
                "избега",
                "проблем",
                "некорректн",
                "ограничени",
                "исключени",
                "паник",
            ]),
            headings: SectionHeadings {
                overview: "Обзор".to_string(),
                syntax: "Синтаксис".to_string(),
                examples: "Примеры".to_string(),
                pitfalls: "Типичные ошибки".to_string(),
                extra: "Дополнительно".to_string(),
            },
            example_label: "Пример".to_string(),
            fallback_pitfalls: strings(&[
                "Внимательно проверяйте типы значений: Go не выполняет неявных преобразований.",
                "Не игнорируйте возвращаемые ошибки, обрабатывайте их сразу после вызова.",
                "Неиспользуемые переменные и импорты приводят к ошибке компиляции.",
            ]),
            warm_up_task: TaskTemplate {
                title: "Разминка".to_string(),
                prompt_md: "Напишите программу, которая выводит на консоль строку `Hello, Go!`."
                    .to_string(),
                starter_code: WARM_UP_STARTER.to_string(),
                tests_code: WARM_UP_TESTS.to_string(),
                points: 10,
            },
            understanding_task: TaskTemplate {
                title: "Проверка понимания".to_string(),
                prompt_md: "Реализуйте функцию `Sum`, которая возвращает сумму элементов среза."
                    .to_string(),
                starter_code: UNDERSTANDING_STARTER.to_string(),
                tests_code: UNDERSTANDING_TESTS.to_string(),
                points: 15,
            },
            find_bug_task: TaskTemplate {
                title: "Найдите ошибку".to_string(),
                prompt_md: "Функция `Max` должна возвращать наибольший элемент среза, но работает неверно. Исправьте её."
                    .to_string(),
                starter_code: FIND_BUG_STARTER.to_string(),
                tests_code: FIND_BUG_TESTS.to_string(),
                points: 20,
            },
        }
    }

    /// English vocabulary
    pub fn english() -> Self {
        Self {
            definitional: strings(&["represents", "is", "allows", "used for", "defines"]),
            syntax: strings(&[
                "syntax",
                "has the form",
                "is written as",
                "is declared",
                "format",
                "structure",
                "template",
            ]),
            example: strings(&["example", "consider", "the following"]),
            caution: strings(&[
                "mistake",
                "error",
                "must not",
                "important",
                "be careful",
                "not recommended",
                "avoid",
                "problem",
                "incorrectly",
                "limitation",
                "exception",
            ]),
            headings: SectionHeadings {
                overview: "Overview".to_string(),
                syntax: "Syntax".to_string(),
                examples: "Examples".to_string(),
                pitfalls: "Common pitfalls".to_string(),
                extra: "Additional notes".to_string(),
            },
            example_label: "Example".to_string(),
            fallback_pitfalls: strings(&[
                "Check value types carefully: Go performs no implicit conversions.",
                "Do not ignore returned errors; handle them right after the call.",
                "Unused variables and imports are compile errors.",
            ]),
            warm_up_task: TaskTemplate {
                title: "Warm-up".to_string(),
                prompt_md: "Write a program that prints `Hello, Go!` to the console.".to_string(),
                starter_code: WARM_UP_STARTER.to_string(),
                tests_code: WARM_UP_TESTS.to_string(),
                points: 10,
            },
            understanding_task: TaskTemplate {
                title: "Check your understanding".to_string(),
                prompt_md: "Implement `Sum`, which returns the sum of a slice's elements."
                    .to_string(),
                starter_code: UNDERSTANDING_STARTER.to_string(),
                tests_code: UNDERSTANDING_TESTS.to_string(),
                points: 15,
            },
            find_bug_task: TaskTemplate {
                title: "Find the bug".to_string(),
                prompt_md: "`Max` should return the largest element of a slice but is wrong. Fix it."
                    .to_string(),
                starter_code: FIND_BUG_STARTER.to_string(),
                tests_code: FIND_BUG_TESTS.to_string(),
                points: 20,
            },
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const WARM_UP_STARTER: &str = r#"package main

import "fmt"

func Greeting() string {
	// TODO: return the greeting
	return ""
}

func main() {
	fmt.Println(Greeting())
}
"#;

const WARM_UP_TESTS: &str = r#"package main

import "testing"

func TestGreeting(t *testing.T) {
	if got := Greeting(); got != "Hello, Go!" {
		t.Fatalf("Greeting() = %q, want %q", got, "Hello, Go!")
	}
}
"#;

const UNDERSTANDING_STARTER: &str = r#"package main

func Sum(values []int) int {
	// TODO: add up the values
	return 0
}
"#;

const UNDERSTANDING_TESTS: &str = r#"package main

import "testing"

func TestSum(t *testing.T) {
	cases := []struct {
		in   []int
		want int
	}{
		{nil, 0},
		{[]int{1, 2, 3}, 6},
		{[]int{-4, 4}, 0},
	}
	for _, c := range cases {
		if got := Sum(c.in); got != c.want {
			t.Errorf("Sum(%v) = %d, want %d", c.in, got, c.want)
		}
	}
}
"#;

const FIND_BUG_STARTER: &str = r#"package main

func Max(values []int) int {
	max := 0
	for i := 1; i < len(values); i++ {
		if values[i] > max {
			max = values[i]
		}
	}
	return max
}
"#;

const FIND_BUG_TESTS: &str = r#"package main

import "testing"

func TestMax(t *testing.T) {
	if got := Max([]int{-3, -1, -2}); got != -1 {
		t.Fatalf("Max = %d, want -1", got)
	}
	if got := Max([]int{7, 2, 5}); got != 7 {
		t.Fatalf("Max = %d, want 7", got)
	}
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_lesson_href_matching() {
        let profile = SiteProfile::metanit_go();
        assert!(profile.is_lesson_href("/go/tutorial/1.1.php"));
        assert!(profile.is_lesson_href("https://metanit.com/go/tutorial/2.3.php"));
        assert!(!profile.is_lesson_href("/go/tutorial/"));
        assert!(!profile.is_lesson_href("/python/tutorial/1.1.php"));
    }

    #[test]
    fn test_noise_and_branding() {
        let profile = SiteProfile::metanit_go();
        assert!(profile.is_noise("Назад"));
        assert!(profile.is_noise("  Вперед  "));
        assert!(profile.is_noise("Metanit.com"));
        assert!(!profile.is_noise("Переменные"));
        assert!(profile.is_branded("METANIT.COM - сайт о программировании"));
        assert!(!profile.is_branded("Основы языка Go"));
    }

    #[test]
    fn test_module_title_lookup_and_fallback() {
        let catalog = ModuleCatalog::metanit_go();
        assert_eq!(catalog.title_for("glava-3-funktsii"), "Функции");
        assert_eq!(catalog.title_for("error-handling"), "Error handling");
        assert_eq!(catalog.title_for(""), "");
    }

    #[test]
    fn test_partial_profile_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"lesson_path_segment": "/rust/", "page_extension": ".html", "vocabulary": {{"example_label": "Sample"}}}}"#
        )
        .unwrap();

        let profile = SiteProfile::from_json_file(file.path()).unwrap();
        assert_eq!(profile.lesson_path_segment, "/rust/");
        assert_eq!(profile.page_extension, ".html");
        assert_eq!(profile.brand_keyword, "METANIT");
        assert_eq!(profile.vocabulary.example_label, "Sample");
        assert_eq!(profile.vocabulary.fallback_pitfalls.len(), 3);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"page_extension": " "}}"#).unwrap();

        let result = SiteProfile::from_json_file(file.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_fallback_pitfalls_must_hold_three_bullets() {
        for fallback in [r#"[]"#, r#"["one", "two"]"#, r#"["one", " ", "three"]"#] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, r#"{{"vocabulary": {{"fallback_pitfalls": {}}}}}"#, fallback).unwrap();

            let result = SiteProfile::from_json_file(file.path());
            assert!(matches!(result, Err(Error::Config(_))), "accepted {}", fallback);
        }

        for vocabulary in [Vocabulary::russian(), Vocabulary::english()] {
            let profile = SiteProfile {
                vocabulary,
                ..SiteProfile::metanit_go()
            };
            assert!(profile.validate().is_ok());
        }
    }

    #[test]
    fn test_missing_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SiteProfile::from_json_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_task_points() {
        for vocabulary in [Vocabulary::russian(), Vocabulary::english()] {
            assert_eq!(vocabulary.warm_up_task.points, 10);
            assert_eq!(vocabulary.understanding_task.points, 15);
            assert_eq!(vocabulary.find_bug_task.points, 20);
        }
    }
}
