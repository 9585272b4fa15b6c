//! Core types shared by every Cardroom layer.
//!
//! These are the structures the server hands to the connection layer:
//! identities, the options a table was created with, and the outbound
//! notifications pushed to each session. The connection layer decides
//! how to put them on the wire; here they only need to be serializable.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a user account.
///
/// Newtype wrapper around the database ID so a `TableId` can never be
/// passed where a user is expected. `#[serde(transparent)]` keeps the
/// JSON form a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A unique identifier for a table (one game room, live or replay).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u64);

impl TableId {
    /// Name of the chat room attached to this table.
    pub fn room_name(&self) -> String {
        format!("table{}", self.0)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// GameOptions
// ---------------------------------------------------------------------------

/// The full option set a game is created with.
///
/// A shared-replay restart copies this verbatim into the new game, so
/// every field here must survive the round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOptions {
    /// Name of the variant (must exist in the variant catalog).
    pub variant: String,
    /// Whether the game uses a chess clock.
    #[serde(default)]
    pub timed: bool,
    /// Starting clock per player, in seconds.
    #[serde(default)]
    pub base_time: u32,
    /// Seconds added to a player's clock after each turn.
    #[serde(default)]
    pub time_per_turn: u32,
    #[serde(default)]
    pub speedrun: bool,
    #[serde(default)]
    pub deck_plays: bool,
    #[serde(default)]
    pub empty_clues: bool,
    /// Hand out a random character modifier to every player on start.
    #[serde(default)]
    pub character_assignments: bool,
}

impl GameOptions {
    /// Options for an untimed game of the given variant.
    pub fn with_variant(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            timed: false,
            base_time: 0,
            time_per_turn: 0,
            speedrun: false,
            deck_plays: false,
            empty_clues: false,
            character_assignments: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound notifications
// ---------------------------------------------------------------------------

/// A structural change at a table that observers must react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TableEvent {
    /// The pregame roster (order or membership) changed; redraw the lobby.
    PlayerChange,
    /// Someone started or stopped watching.
    SpectatorChange,
    /// A shared replay has a new leader.
    ReplayLeader { leader: UserId },
    /// Everyone is being sent back to the lobby.
    Boot,
    /// The game left the pregame and is now running.
    GameStarted,
}

/// How serious a message to a single user is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The request was rejected; nothing changed.
    Warning,
    /// Something the user asked for does not exist or is inconsistent.
    Error,
}

/// Everything the core pushes to a connected session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Outbound {
    /// A table the session is attached to changed.
    Table { table_id: TableId, event: TableEvent },
    /// A server-authored chat line for a room.
    Chat { room: String, text: String },
    /// A message addressed to this user only.
    Notice { severity: Severity, text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(UserId(7).to_string(), "U-7");
        assert_eq!(TableId(3).to_string(), "T-3");
    }

    #[test]
    fn test_table_room_name() {
        assert_eq!(TableId(12).room_name(), "table12");
    }

    #[test]
    fn test_game_options_defaults_missing_fields() {
        let opts: GameOptions =
            serde_json::from_str(r#"{ "variant": "No Variant", "speedrun": true }"#)
                .unwrap();
        assert_eq!(opts.variant, "No Variant");
        assert!(opts.speedrun);
        assert!(!opts.timed);
        assert!(!opts.character_assignments);
    }

    #[test]
    fn test_outbound_table_event_json_shape() {
        let msg = Outbound::Table {
            table_id: TableId(5),
            event: TableEvent::ReplayLeader { leader: UserId(9) },
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "Table");
        assert_eq!(json["data"]["table_id"], 5);
        assert_eq!(json["data"]["event"]["type"], "ReplayLeader");
        assert_eq!(json["data"]["event"]["leader"], 9);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
