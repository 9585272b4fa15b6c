//! # Cardroom
//!
//! Server core for a real-time multiplayer card game: the table registry,
//! the per-table ownership rules, and the rule catalog every game is
//! configured from.
//!
//! The connection layer (sockets, authentication) is not part of this
//! crate. It creates a [`Session`] per user, drains the session's
//! outbound channel, and feeds decoded requests to
//! [`CardroomServer::handle`] as [`Command`]s.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardroom::prelude::*;
//!
//! # async fn run() -> Result<(), CardroomError> {
//! let server = CardroomServer::builder().data_dir("data").build().await?;
//! let (alice, _outbound) = Session::channel(UserId(1), "Alice");
//! let _ = server
//!     .handle(
//!         &alice,
//!         Command::CreateTable {
//!             name: "friday night".into(),
//!             options: GameOptions::with_variant("No Variant"),
//!         },
//!     )
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod commands;
mod config;
mod error;
pub mod logging;
mod names;
mod server;

pub use commands::{Command, CommandError};
pub use config::{DEFAULT_DATA_DIR, ServerConfig};
pub use error::CardroomError;
pub use names::generate_table_name;
pub use server::{CardroomServer, CardroomServerBuilder};

pub use cardroom_actor as actor;
pub use cardroom_protocol as protocol;
pub use cardroom_table as table;
pub use cardroom_variants as variants;

/// The types most callers need.
pub mod prelude {
    pub use crate::{CardroomError, CardroomServer, Command, CommandError, ServerConfig};
    pub use cardroom_protocol::{GameOptions, Outbound, Severity, TableEvent, TableId, UserId};
    pub use cardroom_table::{Session, TableConfig, TableRegistry};
}
