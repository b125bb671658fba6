//! Ontology and definition tables as read from JSON files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt, JsonResultExt};
use crate::domain::Named;

/// One row of the ontology table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyRecord {
    /// Term URI
    pub id: String,
    /// URI of the broader concept, absent for top-level terms
    #[serde(default)]
    pub broader: Option<String>,
    /// Preferred label
    #[serde(default)]
    pub label: Option<String>,
}

/// One row of the definition table, keyed by term name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRow {
    pub term: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Term record carried as payload through the forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Term {
    #[serde(skip)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    pub synonyms: Vec<String>,
    pub topics: Vec<String>,
}

impl Term {
    pub fn from_record(record: &OntologyRecord) -> Self {
        Self {
            name: term_name_from_uri(&record.id).to_string(),
            uri: Some(record.id.clone()),
            label: record.label.clone(),
            ..Default::default()
        }
    }

    /// Term known only through a reference, e.g. a broader concept that has
    /// no row of its own.
    pub fn from_uri(uri: &str) -> Self {
        Self {
            name: term_name_from_uri(uri).to_string(),
            uri: Some(uri.to_string()),
            ..Default::default()
        }
    }

    pub fn apply_definition(&mut self, row: &DefinitionRow) {
        self.definition = row.definition.clone();
        self.synonyms = row.synonyms.clone();
        self.topics = row.topics.clone();
    }
}

impl Named for Term {
    fn name(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

const SEPARATORS: [char; 2] = ['/', '#'];

/// Last non-empty path or fragment segment of a URI.
///
/// `http://example.org/onto#Dog` and `http://example.org/onto/Dog/` both
/// yield `Dog`. Strings without separators are returned unchanged.
pub fn term_name_from_uri(uri: &str) -> &str {
    let trimmed = uri.trim_end_matches(&SEPARATORS[..]);
    trimmed.rsplit(&SEPARATORS[..]).next().unwrap_or(trimmed)
}

#[instrument(level = "debug")]
pub fn load_ontology(path: &Path) -> ApplicationResult<Vec<OntologyRecord>> {
    let content = std::fs::read_to_string(path).with_path_context("read ontology", path)?;
    let records: Vec<OntologyRecord> = serde_json::from_str(&content).in_dataset(path)?;
    debug!("loaded {} ontology records", records.len());
    Ok(records)
}

#[instrument(level = "debug")]
pub fn load_definitions(path: &Path) -> ApplicationResult<Vec<DefinitionRow>> {
    let content = std::fs::read_to_string(path).with_path_context("read definitions", path)?;
    let rows: Vec<DefinitionRow> = serde_json::from_str(&content).in_dataset(path)?;
    debug!("loaded {} definition rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://example.org/onto#Dog", "Dog")]
    #[case("http://example.org/onto/Dog", "Dog")]
    #[case("http://example.org/onto/Dog/", "Dog")]
    #[case("Dog", "Dog")]
    fn given_uri_when_extracting_term_name_then_returns_last_segment(
        #[case] uri: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(term_name_from_uri(uri), expected);
    }

    #[test]
    fn given_record_with_label_when_converting_then_label_names_term() {
        let record = OntologyRecord {
            id: "http://x.org/a/Canine".into(),
            broader: None,
            label: Some("Canines".into()),
        };

        let term = Term::from_record(&record);

        assert_eq!(term.name, "Canine");
        assert_eq!(Named::name(&term), Some("Canines"));
    }

    #[test]
    fn given_minimal_json_row_when_parsing_then_optional_fields_default() {
        let rows: Vec<OntologyRecord> = serde_json::from_str(r#"[{"id": "a"}]"#).unwrap();

        assert_eq!(rows[0].broader, None);
        assert_eq!(rows[0].label, None);
    }
}
