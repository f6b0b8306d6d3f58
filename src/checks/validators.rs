//! Source/translation consistency validators, as Qt Linguist runs them.

use std::collections::BTreeSet;

/// Place markers in a text: `%1`..`%99` and `%n`; `%L1` and `%Ln` count as
/// `%1` and `%n`.
#[must_use]
pub fn place_markers(text: &str) -> BTreeSet<String> {
    let mut markers = BTreeSet::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        if chars.peek() == Some(&'L') {
            chars.next();
        }
        match chars.peek().copied() {
            Some('n') => {
                chars.next();
                markers.insert("%n".to_string());
            }
            Some(first) if first.is_ascii_digit() && first != '0' => {
                chars.next();
                let mut number = String::from(first);
                if let Some(second) = chars.peek().copied().filter(char::is_ascii_digit) {
                    chars.next();
                    number.push(second);
                }
                markers.insert(format!("%{number}"));
            }
            _ => {}
        }
    }

    markers
}

/// Compares place markers of a source and one translated form.
///
/// Forms of a numerus message may leave out `%n`, since a language can
/// spell out the count in some forms.
#[must_use]
pub fn check_place_markers(source: &str, translation: &str, numerus: bool) -> Option<String> {
    let mut expected = place_markers(source);
    let actual = place_markers(translation);
    if numerus && !actual.contains("%n") {
        expected.remove("%n");
    }
    if expected == actual {
        return None;
    }

    let missing: Vec<&str> = expected.difference(&actual).map(String::as_str).collect();
    let extra: Vec<&str> = actual.difference(&expected).map(String::as_str).collect();

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        parts.push(format!("unexpected {}", extra.join(", ")));
    }
    Some(format!("Place markers differ from the source text: {}", parts.join("; ")))
}

/// `&` followed by a letter or digit marks a keyboard mnemonic; `&&` is a
/// literal ampersand.
#[must_use]
pub fn has_accelerator(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '&' {
            continue;
        }
        match chars.peek() {
            Some('&') => {
                chars.next();
            }
            Some(next) if next.is_alphanumeric() => return true,
            _ => {}
        }
    }
    false
}

#[must_use]
pub fn check_accelerator(source: &str, translation: &str) -> Option<String> {
    match (has_accelerator(source), has_accelerator(translation)) {
        (true, false) => Some("Accelerator '&' is missing from the translation".to_string()),
        (false, true) => Some("Translation has an accelerator '&' the source text lacks".to_string()),
        _ => None,
    }
}

/// Trailing punctuation class; full-width forms count as their ASCII
/// counterparts and a trailing `...` as `…`.
#[must_use]
pub fn ending_punctuation(text: &str) -> Option<char> {
    let text = text.trim_end();
    if text.ends_with("...") {
        return Some('…');
    }
    match text.chars().last()? {
        '.' | '。' => Some('.'),
        ':' | '：' => Some(':'),
        '?' | '？' => Some('?'),
        '!' | '！' => Some('!'),
        '…' => Some('…'),
        _ => None,
    }
}

#[must_use]
pub fn check_punctuation(source: &str, translation: &str) -> Option<String> {
    let expected = ending_punctuation(source);
    let actual = ending_punctuation(translation);
    if expected == actual {
        return None;
    }
    let describe = |ending: Option<char>| ending.map_or_else(|| "none".to_string(), |c| format!("'{c}'"));
    Some(format!(
        "Ending punctuation differs from the source text: expected {}, found {}",
        describe(expected),
        describe(actual)
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("%1 (%Ln pieces @ %2)", &["%1", "%2", "%n"])]
    #[case("Upload to %L1", &["%1"])]
    #[case("%10 and %2", &["%10", "%2"])]
    #[case("100%", &[])]
    #[case("%0 is not a marker", &[])]
    #[case("%n file(s)", &["%n"])]
    fn test_place_markers(#[case] text: &str, #[case] expected: &[&str]) {
        let markers: Vec<String> = place_markers(text).into_iter().collect();

        assert_eq!(markers, expected.iter().map(ToString::to_string).collect::<Vec<_>>());
    }

    #[googletest::test]
    fn test_check_place_markers() {
        expect_that!(check_place_markers("%1 of %2", "%2 od %1", false), none());
        expect_that!(
            check_place_markers("%1 of %2", "%1 od", false),
            some(contains_substring("missing %2"))
        );
        expect_that!(
            check_place_markers("Done", "Končano %1", false),
            some(contains_substring("unexpected %1"))
        );
    }

    #[googletest::test]
    fn test_check_place_markers_numerus_may_drop_count() {
        expect_that!(check_place_markers("%Ln file(s)", "jedna datoteka", true), none());
        expect_that!(check_place_markers("%Ln file(s)", "jedna datoteka", false), some(anything()));
        expect_that!(check_place_markers("File", "%n datotek", true), some(anything()));
    }

    #[rstest]
    #[case("&Open", true)]
    #[case("Save &As...", true)]
    #[case("Tom && Jerry", false)]
    #[case("A & B", false)]
    #[case("Plain", false)]
    #[case("&&&Edit", true)]
    fn test_has_accelerator(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(has_accelerator(text), expected);
    }

    #[googletest::test]
    fn test_check_accelerator() {
        expect_that!(check_accelerator("&Open", "&Odpri"), none());
        expect_that!(check_accelerator("&Open", "Odpri"), some(contains_substring("missing")));
        expect_that!(check_accelerator("Open", "&Odpri"), some(contains_substring("lacks")));
    }

    #[rstest]
    #[case("Done.", Some('.'))]
    #[case("Open...", Some('…'))]
    #[case("Open…", Some('…'))]
    #[case("Name:  ", Some(':'))]
    #[case("完成。", Some('.'))]
    #[case("Why？", Some('?'))]
    #[case("Plain", None)]
    #[case("", None)]
    fn test_ending_punctuation(#[case] text: &str, #[case] expected: Option<char>) {
        assert_eq!(ending_punctuation(text), expected);
    }

    #[googletest::test]
    fn test_check_punctuation() {
        expect_that!(check_punctuation("Open...", "Odpri…"), none());
        expect_that!(check_punctuation("Name :", "Ime:"), none());
        expect_that!(
            check_punctuation("Really quit?", "Res končam"),
            some(contains_substring("expected '?', found none"))
        );
    }
}
