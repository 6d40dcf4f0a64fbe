//! HTML spreadsheet export of an intranet address registry.
//!
//! The `.xls` export is an HTML document; only the `IPv4` column of its first
//! table is used, so this source never yields IPv6 records.

use super::CidrSource;
use crate::config::CountryConfig;
use crate::error::{AggregateError, Result};
use crate::models::{AggregatedSet, CidrRecord};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};

/// Header of the address column.
pub const ADDRESS_COLUMN: &str = "IPv4";

lazy_static! {
    static ref TABLE: Selector = Selector::parse("table").expect("Invalid selector?");
}

pub struct HtmlRegistry {
    path: PathBuf,
}

impl HtmlRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HtmlRegistry { path: path.into() }
    }
}

impl CidrSource for HtmlRegistry {
    fn name(&self) -> &str {
        "HTML registry"
    }

    fn fetch(&self, country: &CountryConfig) -> Result<AggregatedSet> {
        if !self.path.is_file() {
            return Err(AggregateError::MissingFileError(self.path.clone()));
        }
        let bytes = std::fs::read(&self.path).map_err(|e| AggregateError::io(&self.path, e))?;
        let html = String::from_utf8_lossy(&bytes);

        let networks = extract_table_column(&html, ADDRESS_COLUMN, &self.path)?;

        Ok(AggregatedSet {
            ipv4: networks
                .into_iter()
                .map(|network| CidrRecord::new(network, country.iso_code.as_str()))
                .collect(),
            ipv6: Vec::new(),
        })
    }
}

/// Child elements of `parent` with one of the given tag names.
fn children_named<'a>(
    parent: ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| names.contains(&child.value().name()))
}

/// Rows owned by `table`, nested tables excluded.
fn table_rows<'a>(table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut rows = Vec::new();
    for child in children_named(table, &["tr", "thead", "tbody", "tfoot"]) {
        if child.value().name() == "tr" {
            rows.push(child);
        } else {
            rows.extend(children_named(child, &["tr"]));
        }
    }
    rows
}

/// Text of `element` without the text of any nested table.
fn own_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if child.value().name() != "table" {
                own_text(child, out);
            }
        }
    }
}

fn cell_texts(row: ElementRef) -> Vec<String> {
    children_named(row, &["th", "td"])
        .map(|cell| {
            let mut text = String::new();
            own_text(cell, &mut text);
            text.trim().to_string()
        })
        .collect()
}

/// Values of the column headed `column` in the first table of `html`.
///
/// The first row of the table is the header row. Blank cells are skipped.
/// `path` only labels errors.
pub fn extract_table_column(html: &str, column: &str, path: &Path) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let table = document
        .select(&TABLE)
        .next()
        .ok_or_else(|| AggregateError::format(path, "no <table> found"))?;

    let rows = table_rows(table);
    let header = rows
        .first()
        .map(|row| cell_texts(*row))
        .ok_or_else(|| AggregateError::format(path, "table has no rows"))?;
    let index = header.iter().position(|h| h == column).ok_or_else(|| {
        AggregateError::format(
            path,
            format!("column '{column}' not found in header {header:?}"),
        )
    })?;

    let values: Vec<String> = rows[1..]
        .iter()
        .filter_map(|row| cell_texts(*row).into_iter().nth(index))
        .filter(|value| !value.is_empty())
        .collect();
    log::debug!("Extracted {} '{column}' cells", values.len());
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;
    use tempfile::TempDir;

    const EXPORT: &str = r#"<html><head><meta charset="utf-8"></head><body>
        <table border="1">
          <thead><tr><th>Row</th><th>Company</th><th>IPv4</th></tr></thead>
          <tbody>
            <tr><td>1</td><td>Shatel</td><td>2.144.0.0/14</td></tr>
            <tr><td>2</td><td>Pars Online</td><td> 5.22.0.0/17 </td></tr>
            <tr><td>3</td><td>Blank</td><td></td></tr>
          </tbody>
        </table>
        <table><tr><th>IPv4</th></tr><tr><td>9.9.9.9/32</td></tr></table>
        </body></html>"#;

    fn export_path() -> &'static Path {
        Path::new("Export.xls")
    }

    #[test]
    fn test_extract_first_table_column() {
        assert_eq!(
            extract_table_column(EXPORT, "IPv4", export_path()).unwrap(),
            vec!["2.144.0.0/14", "5.22.0.0/17"]
        );
    }

    #[test]
    fn test_extract_missing_column() {
        let err = extract_table_column(EXPORT, "IPv6", export_path()).unwrap_err();
        assert!(matches!(err, AggregateError::FileFormatError { .. }));
        assert!(err.to_string().contains("IPv6"));
        assert!(matches!(
            extract_table_column("<p>nothing</p>", "IPv4", export_path()),
            Err(AggregateError::FileFormatError { .. })
        ));
    }

    #[test]
    fn test_nested_table_not_counted() {
        let html = "<table>\
            <tr><th>Row</th><th>IPv4</th></tr>\
            <tr><td>1</td><td>1.0.0.0/24</td></tr>\
            <tr><td>2</td><td><table><tr><td>9.9.9.9/32</td></tr></table></td></tr>\
            </table>";
        assert_eq!(
            extract_table_column(html, "IPv4", export_path()).unwrap(),
            vec!["1.0.0.0/24"]
        );
    }

    #[test]
    fn test_fetch_stamps_country() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Export.xls");
        std::fs::write(&path, EXPORT).unwrap();
        let country = CountryConfig::new("Iran", "IR", &[SourceKind::HtmlRegistry]);
        let set = HtmlRegistry::new(&path).fetch(&country).unwrap();
        assert_eq!(
            set.ipv4,
            vec![
                CidrRecord::new("2.144.0.0/14", "IR"),
                CidrRecord::new("5.22.0.0/17", "IR")
            ]
        );
        assert!(set.ipv6.is_empty());
    }

    #[test]
    fn test_fetch_missing_export() {
        let country = CountryConfig::new("Iran", "IR", &[SourceKind::HtmlRegistry]);
        let err = HtmlRegistry::new("no/such/export.xls")
            .fetch(&country)
            .unwrap_err();
        assert!(matches!(err, AggregateError::MissingFileError(_)));
    }
}
