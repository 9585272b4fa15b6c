//! Error types for the table layer.

use cardroom_actor::ActorError;
use cardroom_protocol::{TableId, UserId};

/// Errors returned by registry operations.
///
/// Every variant is raised before any table is mutated.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The table does not exist (or was already removed).
    #[error("table {0} does not exist")]
    NoSuchTable(TableId),

    /// Graceful shutdown has begun; no new tables or seats.
    #[error("the server is shutting down; new games are not accepted")]
    ShuttingDown,

    /// A table name was empty after trimming.
    #[error("you must provide a table name")]
    EmptyName,

    /// The requested variant is not in the catalog.
    #[error("\"{0}\" is not a valid variant")]
    UnknownVariant(String),

    /// Every seat is taken.
    #[error("table {0} is full")]
    TableFull(TableId),

    /// The user already has a seat at this table.
    #[error("user {0} already joined table {1}")]
    AlreadyJoined(UserId, TableId),

    /// The user is seated at a different live table.
    #[error("user {0} is already seated at table {1}")]
    SeatedElsewhere(UserId, TableId),

    /// The user has no seat at this table.
    #[error("user {0} is not joined to table {1}")]
    NotJoined(UserId, TableId),

    /// The user is already watching this table.
    #[error("user {0} is already spectating table {1}")]
    AlreadySpectating(UserId, TableId),

    /// The user is not watching this table.
    #[error("user {0} is not spectating table {1}")]
    NotSpectating(UserId, TableId),

    /// The table's phase does not allow this operation, e.g. joining a
    /// game that has already started.
    #[error("invalid table state for this operation: {0}")]
    InvalidState(String),

    /// The registry refused the request at submit time.
    #[error(transparent)]
    Actor(#[from] ActorError),

    /// The registry accepted the request but stopped before answering.
    #[error("the table registry is unavailable")]
    Unavailable,
}
