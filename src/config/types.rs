use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::checks::Rule;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "translationFiles.includePatterns[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Payload of `workspace/didChangeConfiguration`.
///
/// Clients send either the settings object itself or wrap it under `qtTs`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ServerSettings {
    Wrapped {
        #[serde(rename = "qtTs")]
        qt_ts: TsSettings,
    },
    Bare(TsSettings),
}

impl ServerSettings {
    #[must_use]
    pub fn into_settings(self) -> TsSettings {
        match self {
            Self::Wrapped { qt_ts } | Self::Bare(qt_ts) => qt_ts,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TsSettings {
    pub translation_files: TranslationFilesConfig,

    /// Applied to every walk, on top of `translationFiles.excludePatterns`.
    pub exclude_patterns: Vec<String>,

    pub indexing: IndexingConfig,

    /// Form count per language code, overriding the built-in plural rules.
    pub plural_forms: BTreeMap<String, usize>,

    pub diagnostics: DiagnosticsConfig,

    /// Language the `<source>` texts are written in.
    pub source_language: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexingConfig {
    /// Parallel thread count for indexing.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationFilesConfig {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for TranslationFilesConfig {
    fn default() -> Self {
        Self { include_patterns: vec!["**/*.ts".to_string()], exclude_patterns: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
    /// Rule id to severity, e.g. `{"unfinished-translation": "off"}`.
    pub severities: BTreeMap<String, SeverityLevel>,
    pub validators: ValidatorsConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorsConfig {
    pub place_markers: bool,
    pub accelerators: bool,
    pub punctuation: bool,
}

impl Default for ValidatorsConfig {
    fn default() -> Self {
        Self { place_markers: true, accelerators: true, punctuation: true }
    }
}

/// Configured severity of a rule; `off` disables it.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Error,
    Warning,
    Information,
    Hint,
    Off,
}

impl TsSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Zero plural form count
    /// - Unknown rule id
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.translation_files.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "translationFiles.includePatterns",
                "At least one pattern is required. Example: [\"**/translations/*.ts\"]",
            ));
        }

        let pattern_groups = [
            ("translationFiles.includePatterns", &self.translation_files.include_patterns),
            ("translationFiles.excludePatterns", &self.translation_files.exclude_patterns),
            ("excludePatterns", &self.exclude_patterns),
        ];
        for (field, patterns) in pattern_groups {
            for (index, pattern) in patterns.iter().enumerate() {
                if let Err(e) = globset::Glob::new(pattern) {
                    errors.push(ValidationError::new(
                        format!("{field}[{index}]"),
                        format!("Invalid glob pattern '{pattern}': {e}"),
                    ));
                }
            }
        }

        if self.indexing.num_threads == Some(0) {
            errors.push(ValidationError::new(
                "indexing.numThreads",
                "Thread count must be at least 1, or remove this field to use the default",
            ));
        }

        for (language, count) in &self.plural_forms {
            if *count == 0 {
                errors.push(ValidationError::new(
                    format!("pluralForms.{language}"),
                    "A language needs at least one plural form",
                ));
            }
        }

        for rule_id in self.diagnostics.severities.keys() {
            if Rule::from_id(rule_id).is_none() {
                errors.push(ValidationError::new(
                    format!("diagnostics.severities.{rule_id}"),
                    format!("Unknown rule '{rule_id}'"),
                ));
            }
        }

        if self.source_language.is_empty() {
            errors.push(ValidationError::new(
                "sourceLanguage",
                "The language cannot be empty. Example: \"en\"",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for TsSettings {
    fn default() -> Self {
        Self {
            translation_files: TranslationFilesConfig::default(),
            exclude_patterns: vec!["node_modules/**".to_string(), "target/**".to_string()],
            indexing: IndexingConfig::default(),
            plural_forms: BTreeMap::new(),
            diagnostics: DiagnosticsConfig::default(),
            source_language: "en".to_string(),
        }
    }
}
