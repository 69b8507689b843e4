//! Slug generation for modules and lessons
//!
//! Slugs are lowercase ASCII letters, digits and single hyphens. Cyrillic
//! letters are transliterated so that Russian headings still produce
//! readable identifiers; any other character acts as a separator.

/// Slug returned when a title has no usable characters
pub const FALLBACK_SLUG: &str = "lesson";

/// Convert a title into a URL-safe slug
///
/// # Arguments
///
/// * `title` - The display title
///
/// # Returns
///
/// A non-empty slug, or [`FALLBACK_SLUG`] if nothing survives
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        let piece: Option<&str> = if ch.is_ascii_alphanumeric() {
            None
        } else {
            match transliterate(ch) {
                Some(latin) => Some(latin),
                None => {
                    pending_hyphen = true;
                    continue;
                }
            }
        };

        // hard/soft signs transliterate to nothing and must not split words
        if piece == Some("") {
            continue;
        }

        if pending_hyphen && !slug.is_empty() {
            slug.push('-');
        }
        pending_hyphen = false;

        match piece {
            Some(latin) => slug.push_str(latin),
            None => slug.push(ch),
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

fn transliterate(ch: char) -> Option<&'static str> {
    let latin = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_well_formed(slug: &str) -> bool {
        !slug.is_empty()
            && !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    #[test]
    fn test_simple_titles() {
        assert_eq!(slugify("Basics"), "basics");
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Go  Modules 101 "), "go-modules-101");
    }

    #[test]
    fn test_cyrillic_transliteration() {
        assert_eq!(slugify("Основы"), "osnovy");
        assert_eq!(
            slugify("Глава 1. Введение в язык Go"),
            "glava-1-vvedenie-v-yazyk-go"
        );
        assert_eq!(slugify("Объекты"), "obekty");
    }

    #[test]
    fn test_fallback_slug() {
        assert_eq!(slugify(""), FALLBACK_SLUG);
        assert_eq!(slugify("   "), FALLBACK_SLUG);
        assert_eq!(slugify("!?…—"), FALLBACK_SLUG);
    }

    #[test]
    fn test_output_charset() {
        let inputs = [
            "Basics",
            "--leading and trailing--",
            "a -- b",
            "Ünïcödé Straße",
            "Каналы и горутины!",
            "C++ / C#",
            "日本語 text",
            "100%",
        ];
        for input in inputs {
            let slug = slugify(input);
            assert!(is_well_formed(&slug), "bad slug {:?} for {:?}", slug, input);
        }
    }

    #[test]
    fn test_slugify_is_stable() {
        for input in ["Basics", "Основы языка Go", "Pointers & Structs", ""] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once);
        }
    }
}
