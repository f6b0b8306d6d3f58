//! Integrity checks over a read catalog.

pub mod validators;

use std::collections::{
    BTreeMap,
    HashMap,
};

use crate::config::{
    SeverityLevel,
    TsSettings,
    ValidatorsConfig,
};
use crate::plural::PluralRule;
use crate::ts::{
    Catalog,
    IssueKind,
    Message,
    ReadError,
    ReadOutcome,
    TranslationPayload,
    TranslationStatus,
};
use crate::types::{
    SourcePosition,
    SourceRange,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "information",
            Self::Hint => "hint",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    MalformedXml,
    MissingDoctype,
    MissingVersion,
    MissingSource,
    MultipleSources,
    EmptySource,
    NumerusFormCount,
    DuplicateMessage,
    NumerusMismatch,
    MissingTranslation,
    UnknownLanguage,
    UnknownElement,
    MissingContextName,
    InvalidLocation,
    UnfinishedTranslation,
    PlaceMarkerMismatch,
    AcceleratorMismatch,
    PunctuationMismatch,
}

impl Rule {
    pub const ALL: [Self; 18] = [
        Self::MalformedXml,
        Self::MissingDoctype,
        Self::MissingVersion,
        Self::MissingSource,
        Self::MultipleSources,
        Self::EmptySource,
        Self::NumerusFormCount,
        Self::DuplicateMessage,
        Self::NumerusMismatch,
        Self::MissingTranslation,
        Self::UnknownLanguage,
        Self::UnknownElement,
        Self::MissingContextName,
        Self::InvalidLocation,
        Self::UnfinishedTranslation,
        Self::PlaceMarkerMismatch,
        Self::AcceleratorMismatch,
        Self::PunctuationMismatch,
    ];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::MalformedXml => "malformed-xml",
            Self::MissingDoctype => "missing-doctype",
            Self::MissingVersion => "missing-version",
            Self::MissingSource => "missing-source",
            Self::MultipleSources => "multiple-sources",
            Self::EmptySource => "empty-source",
            Self::NumerusFormCount => "numerus-form-count",
            Self::DuplicateMessage => "duplicate-message",
            Self::NumerusMismatch => "numerus-mismatch",
            Self::MissingTranslation => "missing-translation",
            Self::UnknownLanguage => "unknown-language",
            Self::UnknownElement => "unknown-element",
            Self::MissingContextName => "missing-context-name",
            Self::InvalidLocation => "invalid-location",
            Self::UnfinishedTranslation => "unfinished-translation",
            Self::PlaceMarkerMismatch => "place-marker-mismatch",
            Self::AcceleratorMismatch => "accelerator-mismatch",
            Self::PunctuationMismatch => "punctuation-mismatch",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.id() == id)
    }

    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::UnknownLanguage
            | Self::UnknownElement
            | Self::InvalidLocation
            | Self::PlaceMarkerMismatch
            | Self::AcceleratorMismatch => Severity::Warning,
            Self::UnfinishedTranslation | Self::PunctuationMismatch => Severity::Hint,
            _ => Severity::Error,
        }
    }

    const fn from_issue(kind: IssueKind) -> Self {
        match kind {
            IssueKind::MissingDoctype => Self::MissingDoctype,
            IssueKind::MissingVersion => Self::MissingVersion,
            IssueKind::MissingContextName => Self::MissingContextName,
            IssueKind::MissingSource => Self::MissingSource,
            IssueKind::MultipleSources => Self::MultipleSources,
            IssueKind::MissingTranslation => Self::MissingTranslation,
            IssueKind::UnknownElement | IssueKind::UnknownTranslationType => Self::UnknownElement,
            IssueKind::InvalidLocation => Self::InvalidLocation,
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// One problem found in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule: Rule,
    pub severity: Severity,
    pub range: SourceRange,
    pub message: String,
}

/// The part of [`TsSettings`] that affects checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CheckSettings {
    pub severities: BTreeMap<Rule, SeverityLevel>,
    pub validators: ValidatorsConfig,
    pub plural_forms: BTreeMap<String, usize>,
    /// Fallback when a catalog has no `sourcelanguage` attribute; empty
    /// means no catalog is treated as the source language.
    pub source_language: String,
}

impl From<&TsSettings> for CheckSettings {
    fn from(settings: &TsSettings) -> Self {
        let severities = settings
            .diagnostics
            .severities
            .iter()
            .filter_map(|(id, level)| Rule::from_id(id).map(|rule| (rule, *level)))
            .collect();
        Self {
            severities,
            validators: settings.diagnostics.validators,
            plural_forms: settings.plural_forms.clone(),
            source_language: settings.source_language.clone(),
        }
    }
}

impl CheckSettings {
    /// Effective severity, `None` when the rule is off.
    #[must_use]
    pub fn severity(&self, rule: Rule) -> Option<Severity> {
        match self.severities.get(&rule) {
            None => Some(rule.default_severity()),
            Some(SeverityLevel::Error) => Some(Severity::Error),
            Some(SeverityLevel::Warning) => Some(Severity::Warning),
            Some(SeverityLevel::Information) => Some(Severity::Information),
            Some(SeverityLevel::Hint) => Some(Severity::Hint),
            Some(SeverityLevel::Off) => None,
        }
    }

    /// Number of plural forms a language needs, if known.
    #[must_use]
    pub fn expected_form_count(&self, language: &str) -> Option<usize> {
        let (primary, _) = crate::plural::split_language_code(language);
        self.plural_forms
            .get(language)
            .or_else(|| self.plural_forms.get(&primary))
            .copied()
            .or_else(|| PluralRule::for_language(language).map(PluralRule::form_count))
    }

    /// Whether the catalog translates into the language its sources are
    /// written in, like `transmission_en.ts`. Only its plural forms need
    /// translating.
    #[must_use]
    pub fn is_source_language_catalog(&self, catalog: &Catalog) -> bool {
        let source = catalog
            .source_language
            .as_deref()
            .filter(|language| !language.is_empty())
            .unwrap_or(self.source_language.as_str());
        let Some(language) = catalog.language.as_deref() else {
            return false;
        };
        if source.is_empty() || language.is_empty() {
            return false;
        }
        let (primary, _) = crate::plural::split_language_code(language);
        let (source_primary, _) = crate::plural::split_language_code(source);
        primary == source_primary
    }
}

struct Collector<'a> {
    settings: &'a CheckSettings,
    findings: Vec<Finding>,
}

impl Collector<'_> {
    fn push(&mut self, rule: Rule, position: SourcePosition, message: impl Into<String>) {
        if let Some(severity) = self.settings.severity(rule) {
            self.findings.push(Finding {
                rule,
                severity,
                range: SourceRange::line_from(position),
                message: message.into(),
            });
        }
    }

    fn enabled(&self, rule: Rule) -> bool {
        self.settings.severity(rule).is_some()
    }
}

/// Finding for a file that could not be read.
#[must_use]
pub fn check_read_error(error: &ReadError, settings: &CheckSettings) -> Vec<Finding> {
    let mut collector = Collector { settings, findings: Vec::new() };
    collector.push(Rule::MalformedXml, error.position(), error.to_string());
    collector.findings
}

/// Runs every enabled check on a read catalog. Findings are sorted by
/// position.
#[must_use]
pub fn check_catalog(outcome: &ReadOutcome, settings: &CheckSettings) -> Vec<Finding> {
    let mut collector = Collector { settings, findings: Vec::new() };
    let catalog = &outcome.catalog;

    for issue in &outcome.issues {
        collector.push(Rule::from_issue(issue.kind), issue.position, issue.detail.clone());
    }

    let expected_forms = check_language(&mut collector, catalog);
    let source_catalog = settings.is_source_language_catalog(catalog);

    for context in &catalog.contexts {
        let mut seen: HashMap<(&str, &str, &str), SourcePosition> = HashMap::new();

        for message in &context.messages {
            let position = message.source_position.unwrap_or(message.position);
            let retired = message.translation.status.is_retired();

            if message.source_position.is_some() && message.source.is_empty() {
                collector.push(Rule::EmptySource, position, "<source> is empty");
            }

            if !retired && message.source_position.is_some() {
                let key = (
                    message.source.as_str(),
                    message.comment.as_deref().unwrap_or_default(),
                    message.extra_comment.as_deref().unwrap_or_default(),
                );
                if let Some(first) = seen.get(&key) {
                    collector.push(
                        Rule::DuplicateMessage,
                        position,
                        format!(
                            "Duplicate of the message on line {} in context '{}'; add a distinct <comment> or <extracomment>",
                            first.line + 1,
                            context.name
                        ),
                    );
                } else {
                    seen.insert(key, position);
                }
            }

            check_translation(&mut collector, message, expected_forms, source_catalog);
        }
    }

    collector.findings.sort_by_key(|finding| finding.range.start);
    tracing::debug!(findings = collector.findings.len(), "Checked catalog");
    collector.findings
}

/// Reports a missing or unknown language; returns the expected form count.
fn check_language(collector: &mut Collector<'_>, catalog: &Catalog) -> Option<usize> {
    let Some(language) = catalog.language.as_deref().filter(|language| !language.is_empty())
    else {
        collector.push(
            Rule::UnknownLanguage,
            catalog.position,
            "<TS> has no language attribute; plural forms cannot be checked",
        );
        return None;
    };

    let expected = collector.settings.expected_form_count(language);
    if expected.is_none() {
        collector.push(
            Rule::UnknownLanguage,
            catalog.position,
            format!("No plural rule known for language '{language}'; set pluralForms to check it"),
        );
    }
    expected
}

fn check_translation(
    collector: &mut Collector<'_>,
    message: &Message,
    expected_forms: Option<usize>,
    source_catalog: bool,
) {
    let translation = &message.translation;
    if !translation.present {
        return;
    }
    let position = translation.position.unwrap_or(message.position);

    match (&translation.payload, message.numerus) {
        (TranslationPayload::Plural(_), false) => collector.push(
            Rule::NumerusMismatch,
            position,
            "<numerusform> used in a message without numerus=\"yes\"",
        ),
        (TranslationPayload::Text(_), true) => collector.push(
            Rule::NumerusMismatch,
            position,
            "Numerus message has a plain translation instead of <numerusform> elements",
        ),
        (TranslationPayload::Plural(forms), true) => {
            if let Some(expected) = expected_forms
                && !translation.status.is_retired()
                && forms.len() != expected
            {
                collector.push(
                    Rule::NumerusFormCount,
                    position,
                    format!("Expected {expected} plural forms, found {}", forms.len()),
                );
            }
        }
        (TranslationPayload::Text(_), false) => {}
    }

    if source_catalog && !message.numerus {
        return;
    }
    match translation.status {
        TranslationStatus::Unfinished => {
            collector.push(Rule::UnfinishedTranslation, position, "Translation is unfinished");
        }
        TranslationStatus::Finished => check_validators(collector, message, position),
        TranslationStatus::Obsolete | TranslationStatus::Vanished => {}
    }
}

fn check_validators(collector: &mut Collector<'_>, message: &Message, position: SourcePosition) {
    let switches = collector.settings.validators;
    let source = message.source.as_str();

    for form in message.translation.forms().iter().filter(|form| !form.is_empty()) {
        let mut results = Vec::new();
        if switches.place_markers && collector.enabled(Rule::PlaceMarkerMismatch) {
            results.push((
                Rule::PlaceMarkerMismatch,
                validators::check_place_markers(source, form, message.numerus),
            ));
        }
        if switches.accelerators && collector.enabled(Rule::AcceleratorMismatch) {
            results.push((Rule::AcceleratorMismatch, validators::check_accelerator(source, form)));
        }
        if switches.punctuation && collector.enabled(Rule::PunctuationMismatch) {
            results.push((Rule::PunctuationMismatch, validators::check_punctuation(source, form)));
        }
        for (rule, result) in results {
            if let Some(detail) = result {
                collector.push(rule, position, format!("{detail} (\"{form}\")"));
            }
        }
    }
}

/// Whether any finding is an error.
#[must_use]
pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|finding| finding.severity == Severity::Error)
}
