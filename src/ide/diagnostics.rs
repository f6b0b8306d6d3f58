//! Diagnostics for catalog files.

use tower_lsp::lsp_types::{
    Diagnostic,
    DiagnosticSeverity,
    NumberOrString,
};

use crate::analysis::file_findings;
use crate::checks::{
    CheckSettings,
    Finding,
    Severity,
};
use crate::db::LinguistDatabase;
use crate::input::catalog::CatalogFile;

pub const DIAGNOSTIC_SOURCE: &str = "qt-ts";

/// Runs the checks for a file and converts the findings.
pub fn generate_diagnostics(
    db: &dyn LinguistDatabase,
    file: CatalogFile,
    settings: &CheckSettings,
) -> Vec<Diagnostic> {
    tracing::debug!(uri = %file.uri(db), "Generating diagnostics");
    file_findings(db, file, settings.clone()).iter().map(to_diagnostic).collect()
}

#[must_use]
pub fn to_diagnostic(finding: &Finding) -> Diagnostic {
    Diagnostic {
        range: finding.range.into(),
        severity: Some(to_lsp_severity(finding.severity)),
        code: Some(NumberOrString::String(finding.rule.id().to_string())),
        code_description: None,
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: finding.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

const fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}
