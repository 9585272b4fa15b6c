//! Tables and the table registry for Cardroom.
//!
//! Two capabilities reach a table, and each call site uses exactly one:
//!
//! - [`TableRegistry`]: queue-serialized. Creation, lookup, listing, and
//!   every membership change (join, leave, spectate, unspectate,
//!   disconnect) go through the registry's request actor, which also
//!   takes the table's lock while it mutates membership.
//! - [`TableHandle`]: direct lock. Table-local commands (leader transfer,
//!   starting the game) lock the one table they act on and never touch
//!   the registry while holding it.
//!
//! # Key types
//!
//! - [`Table`]: one game room (players, spectators, owner, mode flags)
//! - [`Session`]: a connected user and their outbound channel
//! - [`TableSummary`]: lobby listing snapshot
//! - [`TableConfig`] / [`TablePhase`]: limits and lifecycle phase

mod config;
mod error;
mod registry;
mod session;
mod table;

pub use config::{TableConfig, TablePhase};
pub use error::TableError;
pub use registry::TableRegistry;
pub use session::{Session, SessionSender};
pub use table::{Player, Spectator, Table, TableHandle, TableSummary};
