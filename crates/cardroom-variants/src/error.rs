//! Error types for the rule catalog.
//!
//! Every variant here is fatal: the server refuses to start with a rule
//! catalog that fails any of these checks.

use std::path::PathBuf;

/// Errors raised while loading or compiling the rule catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A catalog file could not be read.
    #[error("failed to read \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A catalog file is not valid JSON for its record type.
    #[error("failed to parse the {kind} catalog: {source}")]
    Json {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A catalog file parsed to zero records.
    #[error("the {0} catalog does not have any entries")]
    Empty(&'static str),

    /// A record has an empty name.
    #[error("there is a {0} with an empty name")]
    EmptyName(&'static str),

    /// Two records of the same kind share a name.
    #[error("there are two {kind}s with the name of: {name}")]
    DuplicateName { kind: &'static str, name: String },

    /// A variant ID is negative or does not fit the ID space.
    #[error("the variant \"{name}\" has an invalid ID of {id}")]
    InvalidId { name: String, id: i64 },

    /// Two variants share an ID.
    #[error("there are two variants with the ID of: {0}")]
    DuplicateId(u32),

    /// A variant declares no suits.
    #[error("the variant \"{0}\" does not have at least one suit")]
    NoSuits(String),

    /// A variant names a suit that is not in the suit catalog.
    #[error("the suit \"{suit}\" in variant \"{variant}\" does not exist")]
    UnknownSuit { variant: String, suit: String },

    /// A suit or variant names a color that is not in the color catalog.
    #[error("\"{owner}\" has a clue color of \"{color}\", but that color does not exist")]
    UnknownColor { owner: String, color: String },

    /// A special rank below the "none" sentinel.
    #[error("the variant \"{variant}\" has an invalid special rank of {rank}")]
    InvalidSpecialRank { variant: String, rank: i32 },

    /// The ID space has a gap.
    #[error("there is no variant with an ID of {0} (variant IDs must be sequential)")]
    MissingId(u32),

    /// The reserved default variant is not in the catalog.
    #[error("failed to find the default variant of: {0}")]
    MissingDefault(String),
}
