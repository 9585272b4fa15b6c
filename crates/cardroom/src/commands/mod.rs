//! Command handlers: what a connected user can ask the server to do.
//!
//! Each command takes the acting [`Session`], a target table, and its own
//! parameters, and either applies the change (notifying everyone
//! affected) or returns a [`CommandError`] without touching anything.
//! [`CommandError::reply_to`] turns a rejection into a private notice.
//!
//! Membership commands go through the [`TableRegistry`]. Table-local
//! commands ([`set_leader`], [`start_game`]) look the table up and then
//! lock it directly. [`restart`] does both, in that order, and never
//! holds the replay's lock while talking to the registry.

mod restart;
mod set_leader;
mod start;

use cardroom_protocol::{GameOptions, Severity, TableId};
use cardroom_table::{Session, TableConfig, TableError, TableHandle, TableRegistry};

pub use restart::{RestartStep, restart};
pub use set_leader::set_leader;
pub use start::start_game;

/// A request from a connected user.
#[derive(Debug, Clone)]
pub enum Command {
    CreateTable { name: String, options: GameOptions },
    Join { table_id: TableId },
    Leave { table_id: TableId },
    Spectate { table_id: TableId },
    Unspectate { table_id: TableId },
    SetLeader { table_id: TableId, name: String },
    Start { table_id: TableId },
    Restart { table_id: TableId },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateTable { .. } => "create_table",
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Spectate { .. } => "spectate",
            Self::Unspectate { .. } => "unspectate",
            Self::SetLeader { .. } => "set_leader",
            Self::Start { .. } => "start",
            Self::Restart { .. } => "restart",
        }
    }
}

// ---------------------------------------------------------------------------
// CommandError
// ---------------------------------------------------------------------------

/// Why a command did nothing (or, for a restart, stopped part-way).
///
/// The `Display` text is what the user sees.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Table {} does not exist.", table_number(.0))]
    TableNotFound(TableId),

    #[error("You must specify the username to pass the lead to. (e.g. \"/setleader Alice\")")]
    EmptyName,

    #[error("You cannot set a new leader in a solo replay.")]
    SoloReplay,

    #[error("You cannot pass leadership to yourself.")]
    SelfTransfer,

    #[error("\"{0}\" is not spectating the shared replay.")]
    NotSpectating(String),

    #[error("\"{0}\" is not joined to this table.")]
    NotJoined(String),

    #[error("Only the table leader can do that.")]
    NotOwner,

    #[error("Table {} is not a shared replay, so you cannot restart it.", table_number(.0))]
    NotSharedReplay(TableId),

    #[error("You cannot restart a game unless there are at least two people in it.")]
    TooFewSpectators,

    #[error(
        "Not all of the players from the original game are in the shared replay, \
         so you cannot restart the game."
    )]
    PlayersMissing,

    #[error("You need at least {0} players to start a game.")]
    NotEnoughPlayers(usize),

    /// The table is in the wrong phase for this command.
    #[error("{0}")]
    InvalidState(&'static str),

    /// The registry rejected the request.
    #[error(transparent)]
    Table(TableError),

    /// A restart passed validation but a later step failed. Steps before
    /// `step` were applied and are not undone.
    #[error("The restart failed while {step}: {source}")]
    RestartIncomplete {
        step: RestartStep,
        #[source]
        source: Box<CommandError>,
    },
}

fn table_number(id: &TableId) -> u64 {
    id.0
}

impl From<TableError> for CommandError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::NoSuchTable(id) => Self::TableNotFound(id),
            other => Self::Table(other),
        }
    }
}

impl CommandError {
    /// How the rejection is shown to the user.
    ///
    /// Ordinary validation failures are warnings. Naming someone who is
    /// not there, an unavailable registry, and a half-finished restart
    /// are errors.
    pub fn severity(&self) -> Severity {
        match self {
            Self::NotSpectating(_) | Self::NotJoined(_) | Self::RestartIncomplete { .. } => {
                Severity::Error
            }
            Self::Table(TableError::Actor(_) | TableError::Unavailable) => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// Sends this error to `session` as a private notice.
    pub fn reply_to(&self, session: &Session) {
        session.notice(self.severity(), self.to_string());
    }
}

// ---------------------------------------------------------------------------
// Helpers and thin registry commands
// ---------------------------------------------------------------------------

/// Canonical form of a username for comparisons: trimmed, inner runs of
/// whitespace collapsed to one space, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolves a table through the registry.
pub(crate) async fn lookup(
    registry: &TableRegistry,
    table_id: TableId,
) -> Result<TableHandle, CommandError> {
    registry
        .get_table(table_id)
        .await?
        .ok_or(CommandError::TableNotFound(table_id))
}

pub async fn create_table(
    registry: &TableRegistry,
    session: &Session,
    name: &str,
    options: GameOptions,
) -> Result<TableId, CommandError> {
    Ok(registry.create_table(session.clone(), name, options).await?)
}

pub async fn join(
    registry: &TableRegistry,
    session: &Session,
    table_id: TableId,
) -> Result<(), CommandError> {
    Ok(registry.join(session.clone(), table_id).await?)
}

pub async fn leave(
    registry: &TableRegistry,
    session: &Session,
    table_id: TableId,
) -> Result<(), CommandError> {
    Ok(registry.leave(session.user_id, table_id).await?)
}

pub async fn spectate(
    registry: &TableRegistry,
    session: &Session,
    table_id: TableId,
) -> Result<(), CommandError> {
    Ok(registry.spectate(session.clone(), table_id).await?)
}

pub async fn unspectate(
    registry: &TableRegistry,
    session: &Session,
    table_id: TableId,
) -> Result<(), CommandError> {
    Ok(registry.unspectate(session.user_id, table_id).await?)
}

/// Runs one command to completion.
pub async fn dispatch(
    registry: &TableRegistry,
    config: &TableConfig,
    session: &Session,
    command: Command,
) -> Result<(), CommandError> {
    match command {
        Command::CreateTable { name, options } => {
            create_table(registry, session, &name, options).await.map(|_| ())
        }
        Command::Join { table_id } => join(registry, session, table_id).await,
        Command::Leave { table_id } => leave(registry, session, table_id).await,
        Command::Spectate { table_id } => spectate(registry, session, table_id).await,
        Command::Unspectate { table_id } => unspectate(registry, session, table_id).await,
        Command::SetLeader { table_id, name } => {
            set_leader(registry, session, table_id, &name).await
        }
        Command::Start { table_id } => start_game(registry, config, session, table_id).await,
        Command::Restart { table_id } => {
            restart(registry, config, session, table_id).await.map(|_| ())
        }
    }
}
