//! Table configuration and lifecycle phase.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TableConfig
// ---------------------------------------------------------------------------

/// Limits applied to every live table the registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Maximum seated players at a live table.
    pub max_players: usize,

    /// Players required before the owner may start the game.
    pub min_players_to_start: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_players: 6,
            min_players_to_start: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// TablePhase
// ---------------------------------------------------------------------------

/// Where a table is in its life, derived from its mode flags.
///
/// ```text
/// Pregame ──(start)──→ Running
/// Replay                         (never changes phase)
/// ```
///
/// - **Pregame**: live table in the lobby. Players may join and leave,
///   and the owner always sits leftmost.
/// - **Running**: live table with a game in progress. Seats are fixed;
///   others may only spectate.
/// - **Replay**: a finished game being reviewed. The roster is the
///   original game's, and everyone present is a spectator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TablePhase {
    Pregame,
    Running,
    Replay,
}

impl TablePhase {
    /// Returns `true` if new players may take a seat.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Pregame)
    }

    /// Returns `true` if non-players may watch.
    pub fn is_watchable(&self) -> bool {
        matches!(self, Self::Running | Self::Replay)
    }
}

impl std::fmt::Display for TablePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pregame => write!(f, "Pregame"),
            Self::Running => write!(f, "Running"),
            Self::Replay => write!(f, "Replay"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_phase_is_joinable_only_in_pregame() {
        assert!(TablePhase::Pregame.is_joinable());
        assert!(!TablePhase::Running.is_joinable());
        assert!(!TablePhase::Replay.is_joinable());
    }

    #[test]
    fn test_table_phase_is_watchable() {
        assert!(!TablePhase::Pregame.is_watchable());
        assert!(TablePhase::Running.is_watchable());
        assert!(TablePhase::Replay.is_watchable());
    }

    #[test]
    fn test_table_phase_display() {
        assert_eq!(TablePhase::Pregame.to_string(), "Pregame");
        assert_eq!(TablePhase::Replay.to_string(), "Replay");
    }

    #[test]
    fn test_table_config_default() {
        let config = TableConfig::default();
        assert_eq!(config.max_players, 6);
        assert_eq!(config.min_players_to_start, 2);
    }
}
