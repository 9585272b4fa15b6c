//! Rule catalog for Cardroom.
//!
//! Turns the declarative data files (colors, suits, variants) into
//! validated, indexed, immutable structures the rest of the server reads:
//!
//! - [`ColorCatalog`]: clue colors by name
//! - [`SuitCatalog`]: suits by name, with reversed twins
//! - [`VariantCatalog`]: compiled [`Variant`]s by name and by ID, plus
//!   the default variant
//! - [`RuleCatalog`]: all three, loaded from a data directory
//!
//! Character modifiers are static data and live in [`characters`].
//!
//! Every validation failure is a [`CatalogError`] and is fatal at startup.

mod character;
mod color;
mod error;
mod loader;
mod suit;
mod variant;

pub use character::{Character, character_by_id, characters, eligible_characters};
pub use color::{Color, ColorCatalog, ColorRecord};
pub use error::CatalogError;
pub use loader::{COLORS_FILE, RuleCatalog, SUITS_FILE, VARIANTS_FILE};
pub use suit::{SUIT_REVERSED_SUFFIX, Suit, SuitCatalog, SuitRecord};
pub use variant::{
    DEFAULT_CARD_RANKS, DEFAULT_CLUE_RANKS, DEFAULT_VARIANT_NAME, NO_SPECIAL_RANK,
    POINTS_PER_STACK, START_CARD_RANK, UP_OR_DOWN_PREFIX, Variant, VariantCatalog,
    VariantRecord,
};
