//! Suits: the card families a variant is built from.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::color::first_letter;
use crate::{CatalogError, ColorCatalog};

/// Appended to the name of a suit's reversed twin.
pub const SUIT_REVERSED_SUFFIX: &str = " Reversed";

/// One declarative suit record as it appears in `suits.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuitRecord {
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    /// Colors that touch this suit. Omitted means "the color with my name".
    #[serde(default)]
    pub clue_colors: Option<Vec<String>>,
    #[serde(default)]
    pub all_clue_colors: bool,
    #[serde(default)]
    pub no_clue_colors: bool,
    #[serde(default)]
    pub all_clue_ranks: bool,
    #[serde(default)]
    pub no_clue_ranks: bool,
    /// Only one copy of each rank (e.g. "Black").
    #[serde(default)]
    pub one_of_each: bool,
    /// Also register "<name> Reversed", played from 5 down to 1.
    #[serde(default)]
    pub create_reversed: bool,
}

/// A compiled suit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suit {
    pub name: String,
    pub abbreviation: String,
    pub clue_colors: Vec<String>,
    pub all_clue_colors: bool,
    pub no_clue_colors: bool,
    pub all_clue_ranks: bool,
    pub no_clue_ranks: bool,
    pub one_of_each: bool,
    pub reversed: bool,
}

/// All known suits, indexed by name. Variants hold `Arc`s into it.
#[derive(Debug, Clone, Default)]
pub struct SuitCatalog {
    by_name: HashMap<String, Arc<Suit>>,
    names: Vec<String>,
}

impl SuitCatalog {
    /// Validates the records against `colors` and builds the catalog,
    /// including reversed twins.
    pub fn compile(
        records: Vec<SuitRecord>,
        colors: &ColorCatalog,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();

        for record in records {
            if record.name.is_empty() {
                return Err(CatalogError::EmptyName("suit"));
            }

            let clue_colors = match &record.clue_colors {
                Some(explicit) => {
                    for color in explicit {
                        if !colors.contains(color) {
                            return Err(CatalogError::UnknownColor {
                                owner: record.name.clone(),
                                color: color.clone(),
                            });
                        }
                    }
                    explicit.clone()
                }
                None if record.all_clue_colors || record.no_clue_colors => Vec::new(),
                None => {
                    if !colors.contains(&record.name) {
                        return Err(CatalogError::UnknownColor {
                            owner: record.name.clone(),
                            color: record.name.clone(),
                        });
                    }
                    vec![record.name.clone()]
                }
            };

            let suit = Suit {
                abbreviation: record
                    .abbreviation
                    .clone()
                    .unwrap_or_else(|| first_letter(&record.name)),
                name: record.name.clone(),
                clue_colors,
                all_clue_colors: record.all_clue_colors,
                no_clue_colors: record.no_clue_colors,
                all_clue_ranks: record.all_clue_ranks,
                no_clue_ranks: record.no_clue_ranks,
                one_of_each: record.one_of_each,
                reversed: false,
            };

            if record.create_reversed {
                let twin = Suit {
                    name: format!("{}{SUIT_REVERSED_SUFFIX}", suit.name),
                    reversed: true,
                    ..suit.clone()
                };
                catalog.insert(suit)?;
                catalog.insert(twin)?;
            } else {
                catalog.insert(suit)?;
            }
        }

        Ok(catalog)
    }

    fn insert(&mut self, suit: Suit) -> Result<(), CatalogError> {
        if self.by_name.contains_key(&suit.name) {
            return Err(CatalogError::DuplicateName {
                kind: "suit",
                name: suit.name,
            });
        }
        self.names.push(suit.name.clone());
        self.by_name.insert(suit.name.clone(), Arc::new(suit));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Suit>> {
        self.by_name.get(name)
    }

    /// Suit names in declaration order (twins directly after their base).
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
