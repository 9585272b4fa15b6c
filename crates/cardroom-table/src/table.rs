//! The table entity and the lock that guards it.
//!
//! A [`Table`] is plain data. It is only ever reached through a
//! [`TableHandle`], and every read or write happens while holding the
//! handle's lock. The registry takes the lock for membership changes;
//! command handlers take it for table-local actions such as leader
//! transfer. Notifications are queued on unbounded session channels, so
//! nothing under the lock ever waits on a client.

use std::sync::Arc;

use cardroom_protocol::{GameOptions, Outbound, TableEvent, TableId, UserId};
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use crate::{Session, TablePhase};

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// A seat at the table. Order in [`Table::players`] is significant:
/// index 0 is leftmost and acts first.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: UserId,
    pub name: String,
    /// `None` once the user disconnected from a running game, and always
    /// `None` for the historical roster of a replay.
    pub session: Option<Session>,
    /// Character modifier handed out at game start, if any.
    pub character: Option<u32>,
}

impl Player {
    /// A seat occupied by a connected user.
    pub fn seated(session: &Session) -> Self {
        Self {
            id: session.user_id,
            name: session.username.clone(),
            session: Some(session.clone()),
            character: None,
        }
    }

    /// A seat with nobody connected to it (replay rosters).
    pub fn absent(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            session: None,
            character: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }
}

/// Someone watching the table.
#[derive(Debug, Clone)]
pub struct Spectator {
    pub id: UserId,
    pub name: String,
    pub session: Session,
}

impl Spectator {
    pub fn new(session: &Session) -> Self {
        Self {
            id: session.user_id,
            name: session.username.clone(),
            session: session.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// One game room, live or replay.
///
/// `owner` always names someone present: a player at a live table, a
/// spectator at a replay. The membership methods below keep that true
/// by handing ownership on when the owner departs.
#[derive(Debug)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub owner: UserId,
    pub players: Vec<Player>,
    pub spectators: Vec<Spectator>,
    pub replay: bool,
    /// Shared replay (anyone may watch) rather than a solo one.
    pub visible: bool,
    pub running: bool,
    pub options: GameOptions,
    pub max_players: usize,
}

impl Table {
    /// A live pregame table with `creator` as sole player and owner.
    pub fn new_game(
        id: TableId,
        name: impl Into<String>,
        creator: &Session,
        options: GameOptions,
        max_players: usize,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            owner: creator.user_id,
            players: vec![Player::seated(creator)],
            spectators: Vec::new(),
            replay: false,
            visible: true,
            running: false,
            options,
            max_players,
        }
    }

    /// A replay of a finished game, watched (and owned) by `creator`.
    ///
    /// `roster` is the original game's seating, in seat order.
    pub fn new_replay(
        id: TableId,
        name: impl Into<String>,
        roster: Vec<(UserId, String)>,
        creator: &Session,
        options: GameOptions,
        visible: bool,
    ) -> Self {
        let players: Vec<Player> = roster
            .into_iter()
            .map(|(id, name)| Player::absent(id, name))
            .collect();
        Self {
            id,
            name: name.into(),
            owner: creator.user_id,
            max_players: players.len(),
            players,
            spectators: vec![Spectator::new(creator)],
            replay: true,
            visible,
            running: false,
            options,
        }
    }

    pub fn phase(&self) -> TablePhase {
        if self.replay {
            TablePhase::Replay
        } else if self.running {
            TablePhase::Running
        } else {
            TablePhase::Pregame
        }
    }

    pub fn is_shared_replay(&self) -> bool {
        self.replay && self.visible
    }

    pub fn is_solo_replay(&self) -> bool {
        self.replay && !self.visible
    }

    pub fn player_index(&self, user: UserId) -> Option<usize> {
        self.players.iter().position(|p| p.id == user)
    }

    pub fn spectator_index(&self, user: UserId) -> Option<usize> {
        self.spectators.iter().position(|s| s.id == user)
    }

    pub fn is_player(&self, user: UserId) -> bool {
        self.player_index(user).is_some()
    }

    pub fn is_spectator(&self, user: UserId) -> bool {
        self.spectator_index(user).is_some()
    }

    /// Whether `user` holds a seat at a live table with a connection
    /// attached to it.
    pub fn is_connected_player(&self, user: UserId) -> bool {
        !self.replay && self.players.iter().any(|p| p.id == user && p.is_connected())
    }

    /// Whether `user` holds a running game's seat whose connection went away.
    pub fn is_detached_player(&self, user: UserId) -> bool {
        !self.replay && self.players.iter().any(|p| p.id == user && !p.is_connected())
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    /// Returns `true` if nobody is left and the table should be removed.
    ///
    /// A replay's roster is history, so only its spectators count. Seats
    /// of a running game that lost their connection do not count either.
    pub fn is_abandoned(&self) -> bool {
        let connected = !self.replay && self.players.iter().any(Player::is_connected);
        self.spectators.is_empty() && !connected
    }

    /// Whether `user` counts as present, for the registry's user index.
    pub fn is_present(&self, user: UserId) -> bool {
        self.is_spectator(user) || self.is_connected_player(user)
    }

    /// Every connected session at the table, players first.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.players
            .iter()
            .filter_map(|p| p.session.as_ref())
            .chain(self.spectators.iter().map(|s| &s.session))
    }

    /// Tells everyone at the table about `event`.
    pub fn notify(&self, event: TableEvent) {
        for session in self.sessions() {
            session.notify(self.id, event.clone());
        }
    }

    /// Posts a server line to the table's chat room.
    pub fn chat(&self, text: impl Into<String>) {
        let msg = Outbound::Chat {
            room: self.id.room_name(),
            text: text.into(),
        };
        for session in self.sessions() {
            session.send(msg.clone());
        }
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            id: self.id,
            name: self.name.clone(),
            owner: self.owner,
            phase: self.phase(),
            visible: self.visible,
            players: self.players.iter().map(|p| p.name.clone()).collect(),
            spectators: self.spectators.len(),
            max_players: self.max_players,
            variant: self.options.variant.clone(),
        }
    }

    // -- membership, driven by the registry ---------------------------------

    pub(crate) fn seat(&mut self, session: &Session) {
        self.players.push(Player::seated(session));
    }

    /// Removes a player's seat. If they owned the table, the new leftmost
    /// player takes over. Returns `false` if they had no seat.
    pub(crate) fn unseat(&mut self, user: UserId) -> bool {
        let Some(index) = self.player_index(user) else {
            return false;
        };
        self.players.remove(index);
        if self.owner == user {
            if let Some(first) = self.players.first() {
                self.owner = first.id;
            }
        }
        true
    }

    pub(crate) fn add_spectator(&mut self, session: &Session) {
        self.spectators.push(Spectator::new(session));
    }

    /// Removes a spectator. If they owned a replay, the first remaining
    /// spectator takes over. Returns `None` if they were not watching,
    /// otherwise whether ownership moved.
    pub(crate) fn remove_spectator(&mut self, user: UserId) -> Option<bool> {
        let index = self.spectator_index(user)?;
        self.spectators.remove(index);
        if self.replay && self.owner == user {
            if let Some(first) = self.spectators.first() {
                self.owner = first.id;
                return Some(true);
            }
        }
        Some(false)
    }

    /// Keeps a running game's seat but forgets the connection. Returns
    /// `false` if there was nothing to forget.
    pub(crate) fn detach_player(&mut self, user: UserId) -> bool {
        match self.players.iter_mut().find(|p| p.id == user) {
            Some(player) => player.session.take().is_some(),
            None => false,
        }
    }

    /// Puts `session` back on the detached seat of its user. Returns
    /// `false` if that user has no detached seat here.
    pub(crate) fn reattach_player(&mut self, session: &Session) -> bool {
        if self.replay {
            return false;
        }
        match self
            .players
            .iter_mut()
            .find(|p| p.id == session.user_id && !p.is_connected())
        {
            Some(player) => {
                player.session = Some(session.clone());
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// TableSummary
// ---------------------------------------------------------------------------

/// A snapshot of table metadata for lobby listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub id: TableId,
    pub name: String,
    pub owner: UserId,
    pub phase: TablePhase,
    pub visible: bool,
    /// Player names in seat order.
    pub players: Vec<String>,
    pub spectators: usize,
    pub max_players: usize,
    pub variant: String,
}

// ---------------------------------------------------------------------------
// TableHandle
// ---------------------------------------------------------------------------

/// Shared access to one table. Cheap to clone.
///
/// This is the direct-lock capability: whoever holds a handle may lock
/// the table and act on it without going through the registry queue.
/// Never hold the guard across a registry call; the registry worker
/// takes table locks too.
#[derive(Debug, Clone)]
pub struct TableHandle {
    id: TableId,
    inner: Arc<Mutex<Table>>,
}

impl TableHandle {
    pub(crate) fn new(table: Table) -> Self {
        Self {
            id: table.id,
            inner: Arc::new(Mutex::new(table)),
        }
    }

    /// The table's ID, readable without the lock.
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Waits for exclusive access to the table.
    pub async fn lock(&self) -> MutexGuard<'_, Table> {
        self.inner.lock().await
    }
}
