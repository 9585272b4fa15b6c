//! Shared types for Cardroom.
//!
//! This crate defines what the other layers pass around:
//!
//! - **Identities** ([`UserId`], [`TableId`]): newtypes over database IDs.
//! - **Game options** ([`GameOptions`]): the settings a game is created with.
//! - **Notifications** ([`Outbound`], [`TableEvent`], [`Severity`]): what
//!   the core pushes to connected sessions.
//!
//! It knows nothing about tables, variants, or connections. The transport
//! that serializes [`Outbound`] values lives outside this workspace.

mod types;

pub use types::{GameOptions, Outbound, Severity, TableEvent, TableId, UserId};
