//! Translation progress counts.

use serde::Serialize;

use crate::ts::{
    Catalog,
    TranslationStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub finished: usize,
    pub unfinished: usize,
    pub obsolete: usize,
    pub vanished: usize,
    pub numerus: usize,
}

impl CatalogStats {
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        catalog.messages().fold(Self::default(), |mut stats, (_, message)| {
            match message.translation.status {
                // No <translation> element at all: nothing to show yet.
                TranslationStatus::Finished if !message.translation.present => {
                    stats.unfinished += 1;
                }
                TranslationStatus::Finished => stats.finished += 1,
                TranslationStatus::Unfinished => stats.unfinished += 1,
                TranslationStatus::Obsolete => stats.obsolete += 1,
                TranslationStatus::Vanished => stats.vanished += 1,
            }
            if message.numerus {
                stats.numerus += 1;
            }
            stats
        })
    }

    /// Messages still used by the application.
    #[must_use]
    pub const fn active(&self) -> usize {
        self.finished + self.unfinished
    }

    /// Finished share of active messages, 100 for a catalog with none.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::float_arithmetic)]
    pub fn completion(&self) -> f64 {
        if self.active() == 0 {
            return 100.0;
        }
        self.finished as f64 * 100.0 / self.active() as f64
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::ts::read_catalog;

    #[googletest::test]
    fn test_from_catalog_counts_statuses() {
        let catalog = read_catalog(
            r#"<!DOCTYPE TS><TS version="2.1" language="sl"><context><name>A</name>
<message><source>a</source><translation>a</translation></message>
<message><source>b</source><translation>b</translation></message>
<message><source>c</source><translation>c</translation></message>
<message><source>d</source><translation type="unfinished"></translation></message>
<message><source>e</source><translation type="obsolete">e</translation></message>
<message><source>f</source><translation type="vanished">f</translation></message>
<message numerus="yes"><source>%n g</source><translation><numerusform>g</numerusform></translation></message>
</context></TS>"#,
        )
        .unwrap()
        .catalog;

        let stats = CatalogStats::from_catalog(&catalog);

        expect_that!(
            stats,
            eq(CatalogStats { finished: 4, unfinished: 1, obsolete: 1, vanished: 1, numerus: 1 })
        );
        expect_that!(stats.active(), eq(5));
        expect_that!(stats.completion(), eq(80.0));
    }

    #[googletest::test]
    fn test_message_without_translation_is_unfinished() {
        let catalog = read_catalog(
            r#"<!DOCTYPE TS><TS version="2.1" language="sl"><context><name>A</name>
<message><source>a</source><translation>a</translation></message>
<message><source>b</source></message>
</context></TS>"#,
        )
        .unwrap()
        .catalog;

        let stats = CatalogStats::from_catalog(&catalog);

        expect_that!(stats.finished, eq(1));
        expect_that!(stats.unfinished, eq(1));
        expect_that!(stats.completion(), eq(50.0));
    }

    #[googletest::test]
    fn test_empty_catalog_is_complete() {
        let stats = CatalogStats::from_catalog(&Catalog::default());

        expect_that!(stats.completion(), eq(100.0));
    }

    #[googletest::test]
    fn test_only_retired_messages_is_complete() {
        let stats = CatalogStats { obsolete: 3, ..CatalogStats::default() };

        expect_that!(stats.completion(), eq(100.0));
    }
}
