//! Server configuration.

use std::path::PathBuf;

use cardroom_table::TableConfig;
use serde::{Deserialize, Serialize};

/// Directory searched for the rule catalog when none is given.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Everything needed to bring a server up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Directory holding `colors.json`, `suits.json`, and `variants.json`.
    pub data_dir: PathBuf,

    /// Limits for every live table.
    pub table: TableConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            table: TableConfig::default(),
        }
    }
}
