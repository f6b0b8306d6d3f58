//! Numerus (plural form) rules for translation catalogs.
//!
//! A numerus message carries one `<numerusform>` per grammatical form of the
//! target language. The rules below follow the families Qt's translator uses
//! to pick a form for a count.

/// Languages that do not inflect for number.
const JAPANESE_STYLE: &[&str] = &[
    "bo", "dz", "fa", "fj", "gn", "hu", "id", "ja", "jv", "ko", "ms", "my", "na", "om", "su", "th",
    "tr", "tt", "vi", "yo", "za", "zh",
];

const FRENCH_STYLE: &[&str] = &["fr", "hy", "ln", "ti", "wa"];

const RUSSIAN_STYLE: &[&str] = &["ru", "uk", "be", "hr", "sr", "bs"];

const SLOVAK_STYLE: &[&str] = &["cs", "sk"];

/// Languages with the `n == 1` / other split.
const ENGLISH_STYLE: &[&str] = &[
    "af", "an", "as", "ast", "az", "bg", "bn", "ca", "da", "de", "el", "en", "eo", "es", "et", "eu",
    "fi", "fo", "fur", "fy", "gl", "gu", "ha", "he", "hi", "it", "ka", "kk", "kn", "ku", "ky", "lb",
    "ml", "mn", "mr", "nb", "ne", "nl", "nn", "no", "oc", "or", "pa", "ps", "pt", "sq", "sv", "sw",
    "ta", "te", "tk", "ur", "uz",
];

/// A plural rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralRule {
    Japanese,
    English,
    French,
    Icelandic,
    Latvian,
    Irish,
    Slovak,
    Macedonian,
    Lithuanian,
    Russian,
    Polish,
    Romanian,
    Slovenian,
    Maltese,
    Welsh,
    Arabic,
}

/// Splits a language code into lowercase language and uppercase territory.
///
/// `pt_BR`, `pt-br` and `sr-Cyrl-BA` are all accepted; script subtags are
/// skipped.
#[must_use]
pub fn split_language_code(code: &str) -> (String, Option<String>) {
    let mut parts = code.split(['_', '-']).filter(|part| !part.is_empty());
    let language = parts.next().unwrap_or_default().to_lowercase();
    let territory = parts
        .find(|part| part.len() == 2 || part.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_uppercase);
    (language, territory)
}

impl PluralRule {
    /// Looks up the rule for a language code, or `None` for unknown languages.
    #[must_use]
    pub fn for_language(code: &str) -> Option<Self> {
        let (language, territory) = split_language_code(code);
        let language = language.as_str();

        if language == "pt" && territory.as_deref() == Some("BR") {
            return Some(Self::French);
        }

        let rule = match language {
            _ if JAPANESE_STYLE.contains(&language) => Self::Japanese,
            _ if FRENCH_STYLE.contains(&language) => Self::French,
            _ if RUSSIAN_STYLE.contains(&language) => Self::Russian,
            _ if SLOVAK_STYLE.contains(&language) => Self::Slovak,
            _ if ENGLISH_STYLE.contains(&language) => Self::English,
            "is" => Self::Icelandic,
            "lv" => Self::Latvian,
            "ga" => Self::Irish,
            "mk" => Self::Macedonian,
            "lt" => Self::Lithuanian,
            "pl" => Self::Polish,
            "ro" => Self::Romanian,
            "sl" => Self::Slovenian,
            "mt" => Self::Maltese,
            "cy" => Self::Welsh,
            "ar" => Self::Arabic,
            _ => return None,
        };
        Some(rule)
    }

    /// Number of `<numerusform>` entries a message needs.
    #[must_use]
    pub const fn form_count(self) -> usize {
        match self {
            Self::Japanese => 1,
            Self::English | Self::French | Self::Icelandic => 2,
            Self::Latvian
            | Self::Irish
            | Self::Slovak
            | Self::Macedonian
            | Self::Lithuanian
            | Self::Russian
            | Self::Polish
            | Self::Romanian => 3,
            Self::Slovenian | Self::Maltese => 4,
            Self::Welsh => 5,
            Self::Arabic => 6,
        }
    }

    /// Index of the form to use for `n`.
    ///
    /// Negative counts select the same form as their absolute value.
    #[must_use]
    pub const fn form_index(self, n: i64) -> usize {
        let n = n.unsigned_abs();
        let mod10 = n % 10;
        let mod100 = n % 100;
        let teen = mod100 >= 10 && mod100 <= 19;

        match self {
            Self::Japanese => 0,
            Self::English => {
                if n == 1 {
                    0
                } else {
                    1
                }
            }
            Self::French => {
                if n <= 1 {
                    0
                } else {
                    1
                }
            }
            Self::Icelandic => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else {
                    1
                }
            }
            Self::Latvian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            }
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Slovak => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Macedonian => match mod10 {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Lithuanian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if mod10 != 0 && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Russian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if mod10 >= 2 && mod10 <= 4 && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if mod10 >= 2 && mod10 <= 4 && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (mod100 >= 1 && mod100 <= 19) {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match mod100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Maltese => {
                if n == 1 {
                    0
                } else if n == 0 || (mod100 >= 2 && mod100 <= 10) {
                    1
                } else if mod100 >= 11 && mod100 <= 19 {
                    2
                } else {
                    3
                }
            }
            Self::Welsh => match n {
                0 => 0,
                1 => 1,
                2..=5 => 2,
                6 => 3,
                _ => 4,
            },
            Self::Arabic => {
                if n == 0 {
                    0
                } else if n == 1 {
                    1
                } else if n == 2 {
                    2
                } else if mod100 >= 3 && mod100 <= 10 {
                    3
                } else if mod100 >= 11 {
                    4
                } else {
                    5
                }
            }
        }
    }
}
