//! Catalog file input definitions.

use std::path::Path;

use crate::plural::PluralRule;

/// A `.ts` file known to the server, keyed by its URI.
#[salsa::input]
pub struct CatalogFile {
    #[returns(ref)]
    pub uri: String,

    #[returns(ref)]
    pub text: String,
}

/// Guesses a catalog's language from its file name.
///
/// Qt projects name catalogs `<base>_<ll>[_<CC>].ts`, e.g.
/// `transmission_pt_BR.ts`; the shortest prefix that leaves a known
/// language code wins.
///
/// # Examples
/// - `qt/translations/transmission_pt_BR.ts` -> `Some("pt_BR")`
/// - `translations/app_sl.ts` -> `Some("sl")`
/// - `translations/app.ts` -> `None`
#[must_use]
pub fn language_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split(['_', '-']).collect();

    (1..parts.len()).find_map(|start| {
        let candidate = parts.get(start..)?;
        if candidate.len() > 3 {
            return None;
        }
        let first = candidate.first()?;
        PluralRule::for_language(first)?;
        Some(candidate.join("_"))
    })
}
