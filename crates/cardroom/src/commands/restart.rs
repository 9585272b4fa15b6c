//! Restarting a shared replay as a fresh game with the same players.
//!
//! Validation happens under the replay's lock and either fails with no
//! change or snapshots what the restart needs. The lock is released
//! before any registry call, since the registry worker locks tables
//! too. The registry then confirms the new table can be created and
//! filled, still without changing anything. The steps that follow are
//! each safe to repeat, and a failure part-way is reported as
//! [`CommandError::RestartIncomplete`] naming the step. Earlier steps are
//! not undone.

use std::fmt;

use cardroom_protocol::{GameOptions, TableEvent, TableId, UserId};
use cardroom_table::{Session, TableConfig, TableError, TableRegistry};

use super::{CommandError, lookup, start_game};
use crate::names::generate_table_name;

/// The stages of a restart after validation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartStep {
    LeavingReplay,
    CreatingTable,
    SeatingPlayers,
    StartingGame,
}

impl fmt::Display for RestartStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeavingReplay => write!(f, "leaving the replay"),
            Self::CreatingTable => write!(f, "creating the new table"),
            Self::SeatingPlayers => write!(f, "seating the players"),
            Self::StartingGame => write!(f, "starting the game"),
        }
    }
}

/// Turns the shared replay `table_id` back into a live game.
///
/// The requester must lead the replay, at least two people must be
/// watching, and every player of the original game must be among the
/// spectators (matched by name). Nobody involved may be sitting at
/// another live table, and the registry must not be shutting down.
///
/// Then everyone is booted from the replay, the requester creates a table
/// with a random name and the original options, the original players
/// are seated there, and the game starts.
///
/// Returns the new table's ID.
pub async fn restart(
    registry: &TableRegistry,
    config: &TableConfig,
    session: &Session,
    table_id: TableId,
) -> Result<TableId, CommandError> {
    let handle = lookup(registry, table_id).await?;

    let (options, players) = {
        let table = handle.lock().await;

        if !table.is_shared_replay() {
            return Err(CommandError::NotSharedReplay(table_id));
        }
        if table.owner != session.user_id {
            return Err(CommandError::NotOwner);
        }
        if table.spectators.len() < 2 {
            return Err(CommandError::TooFewSpectators);
        }

        let players: Vec<Session> = table
            .spectators
            .iter()
            .filter(|s| table.players.iter().any(|p| p.name == s.name))
            .map(|s| s.session.clone())
            .collect();
        if players.len() != table.players.len() {
            return Err(CommandError::PlayersMissing);
        }

        (table.options.clone(), players)
    };

    registry.check_seating(seating_order(session, &players)).await?;

    handle.lock().await.notify(TableEvent::Boot);

    tracing::info!(
        table_id = %table_id,
        user_id = %session.user_id,
        players = players.len(),
        "restarting shared replay"
    );

    match execute(registry, config, session, table_id, options, &players).await {
        Ok(new_id) => {
            tracing::info!(table_id = %table_id, new_table_id = %new_id, "shared replay restarted");
            Ok(new_id)
        }
        Err((step, source)) => {
            tracing::error!(
                table_id = %table_id,
                %step,
                error = %source,
                "restart incomplete"
            );
            Err(CommandError::RestartIncomplete {
                step,
                source: Box::new(source),
            })
        }
    }
}

async fn execute(
    registry: &TableRegistry,
    config: &TableConfig,
    initiator: &Session,
    replay_id: TableId,
    options: GameOptions,
    players: &[Session],
) -> Result<TableId, (RestartStep, CommandError)> {
    for user in seating_order(initiator, players) {
        match registry.unspectate(user, replay_id).await {
            // Already gone, or the replay went with its last spectator.
            Ok(()) | Err(TableError::NotSpectating(..)) | Err(TableError::NoSuchTable(_)) => {}
            Err(e) => return Err((RestartStep::LeavingReplay, e.into())),
        }
    }

    let new_id = registry
        .create_table(initiator.clone(), generate_table_name(), options)
        .await
        .map_err(|e| (RestartStep::CreatingTable, e.into()))?;

    for player in players.iter().filter(|s| s.user_id != initiator.user_id) {
        match registry.join(player.clone(), new_id).await {
            Ok(()) | Err(TableError::AlreadyJoined(..)) => {}
            Err(e) => return Err((RestartStep::SeatingPlayers, e.into())),
        }
    }

    start_game(registry, config, initiator, new_id)
        .await
        .map_err(|e| (RestartStep::StartingGame, e))?;

    Ok(new_id)
}

/// Everyone who ends up at the new table: the matched players, plus the
/// initiator if they were not one of them.
fn seating_order(initiator: &Session, players: &[Session]) -> Vec<UserId> {
    let mut users: Vec<UserId> = players.iter().map(|s| s.user_id).collect();
    if !users.contains(&initiator.user_id) {
        users.push(initiator.user_id);
    }
    users
}
