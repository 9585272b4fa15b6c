//! Variant compilation: declarative records → validated, indexed variants.
//!
//! Compilation runs once at startup. Any validation failure is fatal; the
//! resulting [`VariantCatalog`] is immutable for the rest of the process.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::{CatalogError, ColorCatalog, Suit, SuitCatalog};

/// The variant every new table falls back to.
pub const DEFAULT_VARIANT_NAME: &str = "No Variant";

/// Variants whose name starts with this also have START cards.
pub const UP_OR_DOWN_PREFIX: &str = "Up or Down";

/// Rank value of a START card.
pub const START_CARD_RANK: i32 = 7;

/// Points a fully played suit is worth.
pub const POINTS_PER_STACK: usize = 5;

/// `special_rank` value meaning "this variant has no special rank".
pub const NO_SPECIAL_RANK: i32 = -1;

pub const DEFAULT_CARD_RANKS: [i32; 5] = [1, 2, 3, 4, 5];
pub const DEFAULT_CLUE_RANKS: [i32; 5] = [1, 2, 3, 4, 5];

/// One declarative variant record as it appears in `variants.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    pub name: String,
    pub id: i64,
    pub suits: Vec<String>,
    #[serde(default)]
    pub clue_colors: Option<Vec<String>>,
    #[serde(default)]
    pub clue_ranks: Option<Vec<i32>>,
    #[serde(default)]
    pub special_rank: Option<i32>,
    #[serde(default)]
    pub color_clues_touch_nothing: bool,
    #[serde(default)]
    pub rank_clues_touch_nothing: bool,
    #[serde(default)]
    pub special_all_clue_colors: bool,
    #[serde(default)]
    pub special_all_clue_ranks: bool,
    #[serde(default)]
    pub special_no_clue_colors: bool,
    #[serde(default)]
    pub special_no_clue_ranks: bool,
    #[serde(default)]
    pub special_deceptive: bool,
    #[serde(default)]
    pub odds_and_evens: bool,
    #[serde(default)]
    pub funnels: bool,
    #[serde(default)]
    pub chimneys: bool,
    #[serde(default)]
    pub show_suit_names: bool,
}

/// A fully compiled rule configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub id: u32,
    pub suits: Vec<Arc<Suit>>,
    pub ranks: Vec<i32>,
    pub clue_colors: Vec<String>,
    pub clue_ranks: Vec<i32>,
    /// [`NO_SPECIAL_RANK`] when the variant has none.
    pub special_rank: i32,
    pub color_clues_touch_nothing: bool,
    pub rank_clues_touch_nothing: bool,
    pub special_all_clue_colors: bool,
    pub special_all_clue_ranks: bool,
    pub special_no_clue_colors: bool,
    pub special_no_clue_ranks: bool,
    pub special_deceptive: bool,
    pub odds_and_evens: bool,
    pub funnels: bool,
    pub chimneys: bool,
    pub show_suit_names: bool,
    /// Some suit is touched by more than one color.
    pub offset_corner_elements: bool,
    pub max_score: usize,
}

impl Variant {
    pub fn has_special_rank(&self) -> bool {
        self.special_rank != NO_SPECIAL_RANK
    }

    pub fn is_up_or_down(&self) -> bool {
        self.name.starts_with(UP_OR_DOWN_PREFIX)
    }
}

/// The compiled, queryable set of variants.
///
/// Built once by [`VariantCatalog::compile`] and shared behind an `Arc`
/// for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct VariantCatalog {
    by_name: HashMap<String, Arc<Variant>>,
    by_id: HashMap<u32, Arc<Variant>>,
    names: Vec<String>,
    default: Arc<Variant>,
}

impl VariantCatalog {
    /// Validates `records` against the suit and color catalogs and builds
    /// the name/ID indices.
    ///
    /// Per record, in order: name non-empty and unique, ID non-negative
    /// and unique, at least one suit, every suit known, explicit clue
    /// colors known, special rank not below the sentinel. Then across the
    /// whole set: IDs are exactly `0..count` and the default variant exists.
    pub fn compile(
        records: Vec<VariantRecord>,
        suits: &SuitCatalog,
        colors: &ColorCatalog,
    ) -> Result<Self, CatalogError> {
        let mut by_name: HashMap<String, Arc<Variant>> = HashMap::new();
        let mut by_id: HashMap<u32, Arc<Variant>> = HashMap::new();
        let mut names = Vec::with_capacity(records.len());

        for record in records {
            if record.name.is_empty() {
                return Err(CatalogError::EmptyName("variant"));
            }
            if by_name.contains_key(&record.name) {
                return Err(CatalogError::DuplicateName {
                    kind: "variant",
                    name: record.name,
                });
            }

            let id = u32::try_from(record.id).map_err(|_| CatalogError::InvalidId {
                name: record.name.clone(),
                id: record.id,
            })?;
            if by_id.contains_key(&id) {
                return Err(CatalogError::DuplicateId(id));
            }

            let variant = Arc::new(compile_one(record, id, suits, colors)?);
            names.push(variant.name.clone());
            by_name.insert(variant.name.clone(), Arc::clone(&variant));
            by_id.insert(id, variant);
        }

        for expected in 0..names.len() {
            let expected = expected as u32;
            if !by_id.contains_key(&expected) {
                return Err(CatalogError::MissingId(expected));
            }
        }

        let default = by_name
            .get(DEFAULT_VARIANT_NAME)
            .cloned()
            .ok_or_else(|| CatalogError::MissingDefault(DEFAULT_VARIANT_NAME.to_string()))?;

        tracing::info!(variants = names.len(), "variant catalog compiled");

        Ok(Self {
            by_name,
            by_id,
            names,
            default,
        })
    }

    pub fn by_name(&self, name: &str) -> Option<&Arc<Variant>> {
        self.by_name.get(name)
    }

    pub fn by_id(&self, id: u32) -> Option<&Arc<Variant>> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Variant names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn default_variant(&self) -> &Arc<Variant> {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Variants in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Variant>> {
        self.names.iter().filter_map(|name| self.by_name.get(name))
    }
}

fn compile_one(
    record: VariantRecord,
    id: u32,
    suit_catalog: &SuitCatalog,
    colors: &ColorCatalog,
) -> Result<Variant, CatalogError> {
    if record.suits.is_empty() {
        return Err(CatalogError::NoSuits(record.name));
    }

    let mut suits = Vec::with_capacity(record.suits.len());
    for suit_name in &record.suits {
        let suit = suit_catalog
            .get(suit_name)
            .ok_or_else(|| CatalogError::UnknownSuit {
                variant: record.name.clone(),
                suit: suit_name.clone(),
            })?;
        suits.push(Arc::clone(suit));
    }

    let mut ranks = DEFAULT_CARD_RANKS.to_vec();
    if record.name.starts_with(UP_OR_DOWN_PREFIX) {
        ranks.push(START_CARD_RANK);
    }

    let clue_colors = match record.clue_colors {
        Some(explicit) => {
            if let Some(unknown) = explicit.iter().find(|c| !colors.contains(c)) {
                return Err(CatalogError::UnknownColor {
                    owner: record.name.clone(),
                    color: unknown.clone(),
                });
            }
            explicit
        }
        None => derive_clue_colors(&suits),
    };

    let clue_ranks = record
        .clue_ranks
        .unwrap_or_else(|| DEFAULT_CLUE_RANKS.to_vec());

    let special_rank = match record.special_rank {
        None | Some(0) => NO_SPECIAL_RANK,
        Some(rank) if rank < NO_SPECIAL_RANK => {
            return Err(CatalogError::InvalidSpecialRank {
                variant: record.name,
                rank,
            });
        }
        Some(rank) => rank,
    };

    let show_suit_names = record.show_suit_names || suits.iter().any(|s| s.reversed);
    let offset_corner_elements = suits.iter().any(|s| s.clue_colors.len() > 1);
    let max_score = suits.len() * POINTS_PER_STACK;

    Ok(Variant {
        name: record.name,
        id,
        suits,
        ranks,
        clue_colors,
        clue_ranks,
        special_rank,
        color_clues_touch_nothing: record.color_clues_touch_nothing,
        rank_clues_touch_nothing: record.rank_clues_touch_nothing,
        special_all_clue_colors: record.special_all_clue_colors,
        special_all_clue_ranks: record.special_all_clue_ranks,
        special_no_clue_colors: record.special_no_clue_colors,
        special_no_clue_ranks: record.special_no_clue_ranks,
        special_deceptive: record.special_deceptive,
        odds_and_evens: record.odds_and_evens,
        funnels: record.funnels,
        chimneys: record.chimneys,
        show_suit_names,
        offset_corner_elements,
        max_score,
    })
}

/// Union of the suits' clue colors in first-seen order. Suits touched by
/// every color are skipped, otherwise the list would trivially be "all".
fn derive_clue_colors(suits: &[Arc<Suit>]) -> Vec<String> {
    let mut derived: Vec<String> = Vec::new();
    for suit in suits.iter().filter(|s| !s.all_clue_colors) {
        for color in &suit.clue_colors {
            if !derived.contains(color) {
                derived.push(color.clone());
            }
        }
    }
    derived
}
