//! Starting a game from the pregame lobby.

use cardroom_protocol::{TableEvent, TableId};
use cardroom_table::{Player, Session, TableConfig, TableRegistry};
use cardroom_variants::{Character, eligible_characters};
use rand::seq::SliceRandom;

use super::{CommandError, lookup};

/// Moves a live table from the lobby into a running game.
///
/// Only the owner may start, and only with at least
/// `config.min_players_to_start` players seated. With character
/// assignments enabled every player gets a different random character
/// that suits the table size.
pub async fn start_game(
    registry: &TableRegistry,
    config: &TableConfig,
    session: &Session,
    table_id: TableId,
) -> Result<(), CommandError> {
    let handle = lookup(registry, table_id).await?;
    let mut table = handle.lock().await;

    if table.replay {
        return Err(CommandError::InvalidState("You cannot start a replay."));
    }
    if table.owner != session.user_id {
        return Err(CommandError::NotOwner);
    }
    if table.running {
        return Err(CommandError::InvalidState("The game has already started."));
    }
    if table.players.len() < config.min_players_to_start {
        return Err(CommandError::NotEnoughPlayers(config.min_players_to_start));
    }

    if table.options.character_assignments {
        assign_characters(&mut table.players);
    }
    table.running = true;
    table.notify(TableEvent::GameStarted);

    tracing::info!(
        table_id = %table_id,
        players = table.players.len(),
        variant = %table.options.variant,
        "game started"
    );
    Ok(())
}

fn assign_characters(players: &mut [Player]) {
    let mut pool: Vec<&Character> = eligible_characters(players.len()).collect();
    pool.shuffle(&mut rand::rng());
    for (player, character) in players.iter_mut().zip(pool) {
        player.character = Some(character.id);
    }
}
