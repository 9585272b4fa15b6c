//! Reads the three catalog files and compiles them in dependency order:
//! colors, then suits, then variants.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{
    CatalogError, ColorCatalog, ColorRecord, SuitCatalog, SuitRecord, VariantCatalog,
    VariantRecord,
};

pub const COLORS_FILE: &str = "colors.json";
pub const SUITS_FILE: &str = "suits.json";
pub const VARIANTS_FILE: &str = "variants.json";

/// Everything compiled from the data directory.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    pub colors: ColorCatalog,
    pub suits: SuitCatalog,
    pub variants: VariantCatalog,
}

impl RuleCatalog {
    /// Loads `colors.json`, `suits.json`, and `variants.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let read = |file: &str| {
            let path = dir.join(file);
            std::fs::read_to_string(&path).map_err(|source| CatalogError::Io { path, source })
        };

        tracing::debug!(dir = %dir.display(), "loading rule catalog");
        Self::from_json(&read(COLORS_FILE)?, &read(SUITS_FILE)?, &read(VARIANTS_FILE)?)
    }

    /// Compiles the catalog from in-memory JSON documents.
    pub fn from_json(colors: &str, suits: &str, variants: &str) -> Result<Self, CatalogError> {
        let colors = ColorCatalog::compile(parse::<ColorRecord>("color", colors)?)?;
        let suits = SuitCatalog::compile(parse::<SuitRecord>("suit", suits)?, &colors)?;
        let variants =
            VariantCatalog::compile(parse::<VariantRecord>("variant", variants)?, &suits, &colors)?;

        Ok(Self {
            colors,
            suits,
            variants,
        })
    }
}

fn parse<T: DeserializeOwned>(kind: &'static str, json: &str) -> Result<Vec<T>, CatalogError> {
    let records: Vec<T> =
        serde_json::from_str(json).map_err(|source| CatalogError::Json { kind, source })?;
    if records.is_empty() {
        return Err(CatalogError::Empty(kind));
    }
    Ok(records)
}
