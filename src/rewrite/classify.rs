//! Keyword predicates used to classify paragraphs

use regex::{Regex, RegexBuilder};

use crate::profile::Vocabulary;

/// A compiled, case-insensitive keyword set
///
/// A text matches when it contains any keyword as a substring, so stems like
/// `ошибк` cover every inflection. Keywords are taken verbatim: a trailing
/// space in `это ` is part of the keyword.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    pattern: Option<Regex>,
}

impl KeywordSet {
    /// Compile a keyword list; an empty list never matches
    pub fn new(keywords: &[String]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| regex::escape(k))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Whether the text contains any keyword
    pub fn matches(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }
}

/// The keyword predicates the rewriter consults, in vocabulary order
#[derive(Debug, Clone)]
pub struct Classifier {
    pub definitional: KeywordSet,
    pub syntax: KeywordSet,
    pub example: KeywordSet,
    pub caution: KeywordSet,
}

impl Classifier {
    /// Compile the predicates from a vocabulary
    pub fn new(vocabulary: &Vocabulary) -> Result<Self, regex::Error> {
        Ok(Self {
            definitional: KeywordSet::new(&vocabulary.definitional)?,
            syntax: KeywordSet::new(&vocabulary.syntax)?,
            example: KeywordSet::new(&vocabulary.example)?,
            caution: KeywordSet::new(&vocabulary.caution)?,
        })
    }

    /// Whether a paragraph was claimed by overview, syntax or pitfall detection
    pub fn is_claimed(&self, text: &str) -> bool {
        self.definitional.matches(text) || self.syntax.matches(text) || self.caution.matches(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> KeywordSet {
        KeywordSet::new(&words.iter().map(|w| w.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn test_case_insensitive_substring() {
        let keywords = set(&["error", "be careful"]);
        assert!(keywords.matches("An Error occurs"));
        assert!(keywords.matches("errors are values"));
        assert!(keywords.matches("Be careful with nil maps"));
        assert!(keywords.matches("terror"));
        assert!(!keywords.matches("err on the safe side"));
    }

    #[test]
    fn test_keyword_inside_word() {
        let keywords = set(&["is"]);
        assert!(keywords.matches("This holds values."));
        assert!(!keywords.matches("A slice holds values."));
    }

    #[test]
    fn test_cyrillic_stems() {
        let keywords = set(&["ошибк"]);
        assert!(keywords.matches("Частые ошибки новичков"));
        assert!(keywords.matches("Ошибка компиляции"));
        assert!(!keywords.matches("Без проблем"));
    }

    #[test]
    fn test_trailing_space_is_kept() {
        let keywords = set(&["это "]);
        assert!(keywords.matches("Go - это язык"));
        assert!(!keywords.matches("Об этом позже"));
        assert!(!keywords.matches("Так и есть это"));
    }

    #[test]
    fn test_special_characters_escaped() {
        let keywords = set(&["c++", "(x)"]);
        assert!(keywords.matches("learn c++ today"));
        assert!(!keywords.matches("learn c today"));
    }

    #[test]
    fn test_empty_set_never_matches() {
        let keywords = set(&["", "  "]);
        assert!(!keywords.matches("anything"));
    }

    #[test]
    fn test_oversized_vocabulary_is_an_error() {
        let mut vocabulary = Vocabulary::english();
        vocabulary.caution = (0..500_000).map(|i| format!("keyword{}", i)).collect();
        assert!(Classifier::new(&vocabulary).is_err());
    }

    #[test]
    fn test_claimed_paragraphs() {
        let classifier = Classifier::new(&Vocabulary::english()).unwrap();
        assert!(classifier.is_claimed("A slice is a view over an array."));
        assert!(classifier.is_claimed("The syntax looks like this."));
        assert!(classifier.is_claimed("Avoid shadowing variables."));
        assert!(!classifier.is_claimed("Go was created at Google."));
    }
}
