//! Resolution of relative `<location>` lines.

use std::collections::HashMap;

use super::model::{
    Catalog,
    LineRef,
};

/// A location with its line made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub filename: Option<String>,
    pub line: Option<u32>,
}

/// Resolves every message's locations, in [`Catalog::messages`] order.
///
/// Each file keeps a counter starting at 0; a relative line moves it and
/// resolves to its new value. Absolute lines are taken as they are and
/// leave the counter alone, as Qt's own reader does. A location without a filename refers to the current
/// file: the previous location's file or, for the first location of a
/// message, the first location of the previous message.
#[must_use]
pub fn resolve_locations(catalog: &Catalog) -> Vec<Vec<ResolvedLocation>> {
    let mut last_line: HashMap<Option<String>, i64> = HashMap::new();
    let mut previous_first: Option<String> = None;

    catalog
        .messages()
        .map(|(_, message)| {
            let mut current = previous_first.clone();
            let resolved: Vec<ResolvedLocation> = message
                .locations
                .iter()
                .map(|location| {
                    if location.filename.is_some() {
                        current.clone_from(&location.filename);
                    }
                    let line = location.line.map(|line| match line {
                        LineRef::Absolute(line) => line,
                        LineRef::Relative(offset) => {
                            let counter = last_line.entry(current.clone()).or_insert(0);
                            *counter += offset;
                            u32::try_from((*counter).max(0)).unwrap_or(u32::MAX)
                        }
                    });
                    ResolvedLocation { filename: current.clone(), line }
                })
                .collect();

            if let Some(first) = resolved.first() {
                previous_first.clone_from(&first.filename);
            }
            resolved
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::ts::reader::read_catalog;

    fn resolved(filename: &str, line: u32) -> ResolvedLocation {
        ResolvedLocation { filename: Some(filename.to_string()), line: Some(line) }
    }

    #[test]
    fn test_relative_lines_accumulate_per_file() {
        let text = r#"<!DOCTYPE TS><TS version="2.1" language="sl"><context><name>A</name>
<message><location filename="../AboutDialog.ui" line="+14"/><source>a</source><translation/></message>
<message><location line="+63"/><source>b</source><translation/></message>
<message><location filename="../AboutDialog.cc" line="+35"/><location filename="../AboutDialog.ui" line="+3"/><source>c</source><translation/></message>
<message><location filename="../AboutDialog.cc" line="-5"/><source>d</source><translation/></message>
</context></TS>"#;
        let catalog = read_catalog(text).unwrap().catalog;

        let locations = resolve_locations(&catalog);

        assert_eq!(locations[0], vec![resolved("../AboutDialog.ui", 14)]);
        assert_eq!(locations[1], vec![resolved("../AboutDialog.ui", 77)]);
        assert_eq!(
            locations[2],
            vec![resolved("../AboutDialog.cc", 35), resolved("../AboutDialog.ui", 80)]
        );
        assert_eq!(locations[3], vec![resolved("../AboutDialog.cc", 30)]);
    }

    #[test]
    fn test_absolute_line_leaves_file_counter() {
        let text = r#"<!DOCTYPE TS><TS version="2.1"><context><name>A</name>
<message><location filename="main.cc" line="100"/><source>a</source><translation/></message>
<message><location line="+2"/><source>b</source><translation/></message>
<message><source>c</source><translation/></message>
</context></TS>"#;
        let catalog = read_catalog(text).unwrap().catalog;

        let locations = resolve_locations(&catalog);

        assert_eq!(locations[0], vec![resolved("main.cc", 100)]);
        assert_eq!(locations[1], vec![resolved("main.cc", 2)]);
        assert!(locations[2].is_empty());
    }
}
