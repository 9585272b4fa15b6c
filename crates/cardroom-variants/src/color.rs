//! Clue colors: the vocabulary a player can use in a color clue.

use std::collections::HashMap;

use serde::Deserialize;

use crate::CatalogError;

/// One declarative color record as it appears in `colors.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ColorRecord {
    pub name: String,
    /// Single-letter form used in notes; defaults to the first letter.
    #[serde(default)]
    pub abbreviation: Option<String>,
    /// CSS fill used by clients.
    pub fill: String,
}

/// A compiled color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color {
    pub name: String,
    pub abbreviation: String,
    pub fill: String,
}

/// All known colors, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct ColorCatalog {
    by_name: HashMap<String, Color>,
    names: Vec<String>,
}

impl ColorCatalog {
    /// Validates the records and builds the catalog.
    pub fn compile(records: Vec<ColorRecord>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();

        for record in records {
            if record.name.is_empty() {
                return Err(CatalogError::EmptyName("color"));
            }
            if catalog.by_name.contains_key(&record.name) {
                return Err(CatalogError::DuplicateName {
                    kind: "color",
                    name: record.name,
                });
            }

            let abbreviation = record
                .abbreviation
                .unwrap_or_else(|| first_letter(&record.name));
            catalog.names.push(record.name.clone());
            catalog.by_name.insert(
                record.name.clone(),
                Color {
                    name: record.name,
                    abbreviation,
                    fill: record.fill,
                },
            );
        }

        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Color> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Color names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Uppercased first character of `name`.
pub(crate) fn first_letter(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}
