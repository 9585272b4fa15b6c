//! Passing table leadership to someone else at the table.

use cardroom_protocol::{TableEvent, TableId, UserId};
use cardroom_table::{Session, TableRegistry};

use super::{CommandError, lookup, normalize_name};

/// Makes the user called `new_leader` the owner of the table.
///
/// At a replay the new leader must be spectating; at a live table they
/// must be seated. Names are compared after [`normalize_name`] and the
/// first match wins. In the pregame lobby the two players also swap
/// seats, so the owner stays leftmost.
///
/// Everything is checked before anything changes.
pub async fn set_leader(
    registry: &TableRegistry,
    session: &Session,
    table_id: TableId,
    new_leader: &str,
) -> Result<(), CommandError> {
    let handle = lookup(registry, table_id).await?;
    let mut table = handle.lock().await;

    if new_leader.trim().is_empty() {
        return Err(CommandError::EmptyName);
    }
    if table.is_solo_replay() {
        return Err(CommandError::SoloReplay);
    }
    if table.owner != session.user_id {
        return Err(CommandError::NotOwner);
    }

    let wanted = normalize_name(new_leader);
    if wanted == normalize_name(&session.username) {
        return Err(CommandError::SelfTransfer);
    }

    let target: Option<(UserId, String, Option<usize>)> = if table.replay {
        table
            .spectators
            .iter()
            .find(|s| normalize_name(&s.name) == wanted)
            .map(|s| (s.id, s.name.clone(), None))
    } else {
        table
            .players
            .iter()
            .enumerate()
            .find(|(_, p)| normalize_name(&p.name) == wanted)
            .map(|(i, p)| (p.id, p.name.clone(), Some(i)))
    };
    let Some((leader_id, leader_name, leader_index)) = target else {
        return Err(if table.replay {
            CommandError::NotSpectating(new_leader.to_string())
        } else {
            CommandError::NotJoined(new_leader.to_string())
        });
    };

    // The actor's seat, needed for the pregame swap. The owner of a live
    // table is always seated.
    let actor_index = table.player_index(session.user_id);
    if !table.replay && !table.running && actor_index.is_none() {
        return Err(CommandError::NotJoined(session.username.clone()));
    }

    table.owner = leader_id;

    if table.replay {
        table.notify(TableEvent::ReplayLeader { leader: leader_id });
    } else {
        if !table.running {
            if let (Some(a), Some(b)) = (actor_index, leader_index) {
                table.players.swap(a, b);
            }
            table.notify(TableEvent::PlayerChange);
        }
        table.chat(format!(
            "{} has passed table ownership to: {}",
            session.username, leader_name
        ));
    }

    tracing::info!(
        table_id = %table_id,
        from = %session.user_id,
        to = %leader_id,
        replay = table.replay,
        "leadership transferred"
    );
    Ok(())
}
