//! `CardroomServer` builder and command entry point.
//!
//! This ties the layers together: the rule catalog is compiled, the
//! table registry is spawned around it, and every user command is routed
//! through [`CardroomServer::handle`]. The connection layer that owns
//! sockets and sessions sits on top of this and is not part of the crate.

use std::path::PathBuf;
use std::sync::Arc;

use cardroom_protocol::UserId;
use cardroom_table::{Session, TableConfig, TableRegistry};
use cardroom_variants::{RuleCatalog, VariantCatalog};

use crate::commands::{self, Command};
use crate::{CardroomError, CommandError, ServerConfig};

/// Builder for configuring and starting a Cardroom server.
///
/// # Example
///
/// ```rust,ignore
/// let server = CardroomServer::builder()
///     .data_dir("data")
///     .build()
///     .await?;
/// ```
pub struct CardroomServerBuilder {
    config: ServerConfig,
    catalog: Option<RuleCatalog>,
}

impl CardroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            catalog: None,
        }
    }

    /// Sets the directory the rule catalog is loaded from.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Sets the limits applied to every live table.
    pub fn table_config(mut self, config: TableConfig) -> Self {
        self.config.table = config;
        self
    }

    /// Uses an already compiled catalog instead of reading `data_dir`.
    pub fn catalog(mut self, catalog: RuleCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Compiles the catalog (unless one was given) and spawns the table
    /// registry.
    ///
    /// # Errors
    /// [`CardroomError::Catalog`] if the rule catalog is missing or
    /// invalid. The server cannot run without one.
    pub async fn build(self) -> Result<CardroomServer, CardroomError> {
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => RuleCatalog::load(&self.config.data_dir)?,
        };
        let variants = Arc::new(catalog.variants);
        tracing::info!(
            variants = variants.len(),
            default = %variants.default_variant().name,
            "rule catalog compiled"
        );

        let registry = TableRegistry::spawn(Arc::clone(&variants), self.config.table.clone());

        Ok(CardroomServer {
            registry,
            variants,
            config: self.config,
        })
    }
}

impl Default for CardroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Cardroom server core.
pub struct CardroomServer {
    registry: TableRegistry,
    variants: Arc<VariantCatalog>,
    config: ServerConfig,
}

impl CardroomServer {
    /// Creates a new builder.
    pub fn builder() -> CardroomServerBuilder {
        CardroomServerBuilder::new()
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn variants(&self) -> &Arc<VariantCatalog> {
        &self.variants
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs `command` for `session`. A rejection is sent back to the
    /// session as a private notice and also returned.
    pub async fn handle(&self, session: &Session, command: Command) -> Result<(), CommandError> {
        let name = command.name();
        let result = commands::dispatch(&self.registry, &self.config.table, session, command).await;
        if let Err(e) = &result {
            tracing::debug!(
                user_id = %session.user_id,
                command = name,
                error = %e,
                "command rejected"
            );
            e.reply_to(session);
        }
        result
    }

    /// Removes a user whose connection closed from every table.
    pub async fn disconnect(&self, user: UserId) -> Result<(), CardroomError> {
        Ok(self.registry.disconnect_user(user).await?)
    }

    /// Stops accepting new tables and joins; running games carry on.
    /// Returns how many games are still running.
    pub async fn graceful_shutdown(&self) -> Result<usize, CardroomError> {
        Ok(self.registry.graceful_shutdown().await?)
    }

    /// Stops the registry after the requests already queued and waits
    /// for it to exit.
    pub async fn shutdown(&self) {
        self.registry.shutdown();
        self.registry.wait().await;
        tracing::info!("Cardroom server stopped");
    }
}
