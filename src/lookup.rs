//! Runtime message lookup over a catalog, as an application sees it.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use crate::plural::{
    PluralRule,
    split_language_code,
};
use crate::ts::{
    Catalog,
    MessageKey,
    TranslationPayload,
    TranslationStatus,
};

/// Lookup table built from the finished messages of one catalog.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    language: Option<String>,
    rule: Option<PluralRule>,
    entries: HashMap<MessageKey, TranslationPayload>,
}

impl Translator {
    /// Builds the table. Retired messages are left out; unfinished ones are
    /// kept out as well, so they fall back to the source text.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let entries: HashMap<MessageKey, TranslationPayload> = catalog
            .messages()
            .filter(|(_, message)| {
                message.translation.present
                    && message.translation.status == TranslationStatus::Finished
            })
            .map(|(context, message)| (message.key(&context.name), message.translation.payload.clone()))
            .collect();

        tracing::debug!(
            language = catalog.language.as_deref().unwrap_or("unknown"),
            entries = entries.len(),
            "Built translator"
        );

        Self {
            language: catalog.language.clone(),
            rule: catalog.language.as_deref().and_then(PluralRule::for_language),
            entries,
        }
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translates `source`, falling back to it when there is no usable
    /// translation. `%n` and `%Ln` are replaced with `n` when it is given.
    #[must_use]
    pub fn translate<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguation: Option<&str>,
        n: Option<i64>,
    ) -> Cow<'a, str> {
        let text = self
            .find(context, source, disambiguation)
            .and_then(|payload| self.select(payload, n))
            .unwrap_or(source);

        match n {
            Some(n) if text.contains("%n") || text.contains("%Ln") => {
                let count = n.to_string();
                Cow::Owned(text.replace("%Ln", &count).replace("%n", &count))
            }
            _ => Cow::Borrowed(text),
        }
    }

    fn find(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
    ) -> Option<&TranslationPayload> {
        let mut key = MessageKey {
            context: context.to_string(),
            source: source.to_string(),
            comment: disambiguation.unwrap_or_default().to_string(),
        };
        if let Some(payload) = self.entries.get(&key) {
            return Some(payload);
        }
        if key.comment.is_empty() {
            return None;
        }
        key.comment.clear();
        self.entries.get(&key)
    }

    fn select<'a>(&self, payload: &'a TranslationPayload, n: Option<i64>) -> Option<&'a str> {
        let text = match payload {
            TranslationPayload::Text(text) => text.as_str(),
            TranslationPayload::Plural(forms) => {
                let rule = self.rule.unwrap_or(PluralRule::English);
                let index = rule.form_index(n.unwrap_or(1));
                forms.get(index).or_else(|| forms.last())?.as_str()
            }
        };
        if text.is_empty() { None } else { Some(text) }
    }
}

/// Finds the catalog for a locale the way `QTranslator::load` searches:
/// `base_ll_CC.ts`, then `base_ll.ts`, then `base.ts`.
#[must_use]
pub fn find_catalog_file(dir: &Path, base: &str, locale: &str) -> Option<PathBuf> {
    let (language, territory) = split_language_code(locale);
    let mut candidates = Vec::with_capacity(3);
    if !language.is_empty() {
        if let Some(territory) = territory {
            candidates.push(format!("{base}_{language}_{territory}.ts"));
        }
        candidates.push(format!("{base}_{language}.ts"));
    }
    candidates.push(format!("{base}.ts"));

    candidates.into_iter().map(|name| dir.join(name)).find(|path| path.is_file())
}

/// Tries each directory in order; the first one holding a match wins.
#[must_use]
pub fn find_catalog_in_dirs<P: AsRef<Path>>(dirs: &[P], base: &str, locale: &str) -> Option<PathBuf> {
    dirs.iter().find_map(|dir| find_catalog_file(dir.as_ref(), base, locale))
}
