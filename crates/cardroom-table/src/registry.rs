//! Table registry: creates, tracks, and routes users to tables.
//!
//! Registry-wide bookkeeping (the table map, the user index, the ID
//! counter, the shutting-down flag) lives in [`RegistryWorker`], which is
//! driven by a [`RequestActor`]. Every operation is a [`RegistryRequest`]
//! carrying a reply channel, so callers get a total order across the
//! whole registry without sharing a lock. Per-table fields are still only
//! touched under the table's own lock, because command handlers reach
//! tables directly through [`TableHandle`].

use std::collections::{BTreeSet, HashMap};
use std::convert::Infallible;
use std::sync::Arc;

use cardroom_actor::{RequestActor, RequestHandler};
use cardroom_protocol::{GameOptions, TableEvent, TableId, UserId};
use cardroom_variants::VariantCatalog;
use tokio::sync::oneshot;

use crate::{Session, Table, TableConfig, TableError, TableHandle, TableSummary};

type Reply<T> = oneshot::Sender<Result<T, TableError>>;

/// Operations the registry worker accepts.
pub(crate) enum RegistryRequest {
    CreateTable {
        creator: Session,
        name: String,
        options: GameOptions,
        reply: Reply<TableId>,
    },
    CreateReplay {
        creator: Session,
        name: String,
        roster: Vec<(UserId, String)>,
        options: GameOptions,
        visible: bool,
        reply: Reply<TableId>,
    },
    GetTable {
        id: TableId,
        reply: oneshot::Sender<Option<TableHandle>>,
    },
    ListTables {
        reply: oneshot::Sender<Vec<TableSummary>>,
    },
    ListTablesForUser {
        user: UserId,
        reply: oneshot::Sender<Vec<TableId>>,
    },
    Join {
        session: Session,
        id: TableId,
        reply: Reply<()>,
    },
    Leave {
        user: UserId,
        id: TableId,
        reply: Reply<()>,
    },
    Spectate {
        session: Session,
        id: TableId,
        reply: Reply<()>,
    },
    Unspectate {
        user: UserId,
        id: TableId,
        reply: Reply<()>,
    },
    DisconnectUser {
        user: UserId,
        reply: oneshot::Sender<()>,
    },
    CheckSeating {
        users: Vec<UserId>,
        reply: Reply<()>,
    },
    GracefulShutdown {
        reply: oneshot::Sender<usize>,
    },
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Registry state. Only the actor's worker task ever touches it.
pub(crate) struct RegistryWorker {
    tables: HashMap<TableId, TableHandle>,

    /// Tables each user is present at (connected to a seat at a live
    /// table, or spectating anything).
    user_tables: HashMap<UserId, BTreeSet<TableId>>,

    next_id: u64,
    catalog: Arc<VariantCatalog>,
    config: TableConfig,
    shutting_down: bool,
}

impl RequestHandler for RegistryWorker {
    type Request = RegistryRequest;
    type Error = Infallible;

    async fn handle(&mut self, request: RegistryRequest) -> Result<(), Infallible> {
        // A dropped reply receiver means the caller stopped waiting; the
        // operation itself has already been applied.
        match request {
            RegistryRequest::CreateTable {
                creator,
                name,
                options,
                reply,
            } => {
                let _ = reply.send(self.create_table(creator, name, options).await);
            }
            RegistryRequest::CreateReplay {
                creator,
                name,
                roster,
                options,
                visible,
                reply,
            } => {
                let result = self.create_replay(creator, name, roster, options, visible);
                let _ = reply.send(result);
            }
            RegistryRequest::GetTable { id, reply } => {
                let _ = reply.send(self.tables.get(&id).cloned());
            }
            RegistryRequest::ListTables { reply } => {
                let _ = reply.send(self.list_tables().await);
            }
            RegistryRequest::ListTablesForUser { user, reply } => {
                let ids: Vec<TableId> = self
                    .user_tables
                    .get(&user)
                    .map(|ids| ids.iter().copied().collect())
                    .unwrap_or_default();
                let _ = reply.send(ids);
            }
            RegistryRequest::Join { session, id, reply } => {
                let _ = reply.send(self.join(session, id).await);
            }
            RegistryRequest::Leave { user, id, reply } => {
                let _ = reply.send(self.leave(user, id).await);
            }
            RegistryRequest::Spectate { session, id, reply } => {
                let _ = reply.send(self.spectate(session, id).await);
            }
            RegistryRequest::Unspectate { user, id, reply } => {
                let _ = reply.send(self.unspectate(user, id).await);
            }
            RegistryRequest::DisconnectUser { user, reply } => {
                self.disconnect_user(user).await;
                let _ = reply.send(());
            }
            RegistryRequest::CheckSeating { users, reply } => {
                let _ = reply.send(self.check_seating(&users).await);
            }
            RegistryRequest::GracefulShutdown { reply } => {
                let _ = reply.send(self.graceful_shutdown().await);
            }
        }
        Ok(())
    }
}

impl RegistryWorker {
    fn new(catalog: Arc<VariantCatalog>, config: TableConfig) -> Self {
        Self {
            tables: HashMap::new(),
            user_tables: HashMap::new(),
            next_id: 1,
            catalog,
            config,
            shutting_down: false,
        }
    }

    fn table(&self, id: TableId) -> Result<TableHandle, TableError> {
        self.tables
            .get(&id)
            .cloned()
            .ok_or(TableError::NoSuchTable(id))
    }

    fn allocate_id(&mut self) -> TableId {
        let id = TableId(self.next_id);
        self.next_id += 1;
        id
    }

    fn check_new_table(&self, name: &str, options: &GameOptions) -> Result<(), TableError> {
        if self.shutting_down {
            return Err(TableError::ShuttingDown);
        }
        if name.trim().is_empty() {
            return Err(TableError::EmptyName);
        }
        if !self.catalog.contains(&options.variant) {
            return Err(TableError::UnknownVariant(options.variant.clone()));
        }
        Ok(())
    }

    fn index(&mut self, user: UserId, id: TableId) {
        self.user_tables.entry(user).or_default().insert(id);
    }

    fn unindex(&mut self, user: UserId, id: TableId) {
        if let Some(ids) = self.user_tables.get_mut(&user) {
            ids.remove(&id);
            if ids.is_empty() {
                self.user_tables.remove(&user);
            }
        }
    }

    fn remove_table(&mut self, id: TableId) {
        self.tables.remove(&id);
        self.user_tables.retain(|_, ids| {
            ids.remove(&id);
            !ids.is_empty()
        });
        tracing::info!(table_id = %id, "table removed");
    }

    /// Finds a live table other than `except` where `user` is connected
    /// to a seat.
    async fn seated_elsewhere(&self, user: UserId, except: Option<TableId>) -> Option<TableId> {
        let ids = self.user_tables.get(&user)?;
        for id in ids.iter().filter(|id| Some(**id) != except) {
            if let Some(handle) = self.tables.get(id) {
                let table = handle.lock().await;
                if table.is_connected_player(user) {
                    return Some(*id);
                }
            }
        }
        None
    }

    async fn create_table(
        &mut self,
        creator: Session,
        name: String,
        options: GameOptions,
    ) -> Result<TableId, TableError> {
        self.check_new_table(&name, &options)?;
        if let Some(other) = self.seated_elsewhere(creator.user_id, None).await {
            return Err(TableError::SeatedElsewhere(creator.user_id, other));
        }

        let id = self.allocate_id();
        let name = name.trim().to_string();
        let table = Table::new_game(id, name, &creator, options, self.config.max_players);
        self.tables.insert(id, TableHandle::new(table));
        self.index(creator.user_id, id);

        tracing::info!(table_id = %id, owner = %creator.user_id, "table created");
        Ok(id)
    }

    fn create_replay(
        &mut self,
        creator: Session,
        name: String,
        roster: Vec<(UserId, String)>,
        options: GameOptions,
        visible: bool,
    ) -> Result<TableId, TableError> {
        self.check_new_table(&name, &options)?;
        if roster.is_empty() {
            return Err(TableError::InvalidState(
                "a replay needs the original players".into(),
            ));
        }

        let id = self.allocate_id();
        let name = name.trim().to_string();
        let table = Table::new_replay(id, name, roster, &creator, options, visible);
        self.tables.insert(id, TableHandle::new(table));
        self.index(creator.user_id, id);

        tracing::info!(table_id = %id, owner = %creator.user_id, visible, "replay created");
        Ok(id)
    }

    async fn list_tables(&self) -> Vec<TableSummary> {
        let mut summaries = Vec::with_capacity(self.tables.len());
        for handle in self.tables.values() {
            summaries.push(handle.lock().await.summary());
        }
        summaries.sort_by_key(|s| s.id);
        summaries
    }

    /// Everything a fresh table needs before `users` can sit down at it.
    async fn check_seating(&self, users: &[UserId]) -> Result<(), TableError> {
        if self.shutting_down {
            return Err(TableError::ShuttingDown);
        }
        for &user in users {
            if let Some(other) = self.seated_elsewhere(user, None).await {
                return Err(TableError::SeatedElsewhere(user, other));
            }
        }
        Ok(())
    }

    async fn join(&mut self, session: Session, id: TableId) -> Result<(), TableError> {
        let user = session.user_id;
        let handle = self.table(id)?;
        let elsewhere = self.seated_elsewhere(user, Some(id)).await;

        let mut table = handle.lock().await;
        // Coming back to a running game goes ahead even while shutting
        // down, since that game is allowed to finish.
        if table.running && table.is_detached_player(user) {
            if let Some(other) = elsewhere {
                return Err(TableError::SeatedElsewhere(user, other));
            }
            table.reattach_player(&session);
            table.notify(TableEvent::PlayerChange);
            tracing::info!(table_id = %id, user_id = %user, "player reconnected");
            drop(table);

            self.index(user, id);
            return Ok(());
        }

        if self.shutting_down {
            return Err(TableError::ShuttingDown);
        }
        if let Some(other) = elsewhere {
            return Err(TableError::SeatedElsewhere(user, other));
        }
        if table.replay {
            return Err(TableError::InvalidState("cannot join a replay".into()));
        }
        if table.running {
            return Err(TableError::InvalidState("the game has already started".into()));
        }
        if table.is_player(user) {
            return Err(TableError::AlreadyJoined(user, id));
        }
        if table.is_full() {
            return Err(TableError::TableFull(id));
        }

        table.seat(&session);
        table.notify(TableEvent::PlayerChange);
        tracing::info!(table_id = %id, user_id = %user, players = table.players.len(), "player joined");
        drop(table);

        self.index(user, id);
        Ok(())
    }

    async fn leave(&mut self, user: UserId, id: TableId) -> Result<(), TableError> {
        let handle = self.table(id)?;
        let mut table = handle.lock().await;
        if table.replay {
            return Err(TableError::InvalidState(
                "leave a replay by no longer spectating it".into(),
            ));
        }
        if table.running {
            return Err(TableError::InvalidState("the game has already started".into()));
        }
        if !table.unseat(user) {
            return Err(TableError::NotJoined(user, id));
        }

        tracing::info!(table_id = %id, user_id = %user, players = table.players.len(), "player left");
        let abandoned = table.is_abandoned();
        if !abandoned {
            table.notify(TableEvent::PlayerChange);
        }
        drop(table);

        self.unindex(user, id);
        if abandoned {
            self.remove_table(id);
        }
        Ok(())
    }

    async fn spectate(&mut self, session: Session, id: TableId) -> Result<(), TableError> {
        let user = session.user_id;
        let handle = self.table(id)?;
        let mut table = handle.lock().await;
        if !table.phase().is_watchable() {
            return Err(TableError::InvalidState("the game has not started yet".into()));
        }
        if table.is_solo_replay() && table.owner != user {
            return Err(TableError::InvalidState("that replay is private".into()));
        }
        if !table.replay && table.is_player(user) {
            return Err(TableError::AlreadyJoined(user, id));
        }
        if table.is_spectator(user) {
            return Err(TableError::AlreadySpectating(user, id));
        }

        table.add_spectator(&session);
        table.notify(TableEvent::SpectatorChange);
        tracing::info!(table_id = %id, user_id = %user, spectators = table.spectators.len(), "spectator joined");
        drop(table);

        self.index(user, id);
        Ok(())
    }

    async fn unspectate(&mut self, user: UserId, id: TableId) -> Result<(), TableError> {
        let handle = self.table(id)?;
        let mut table = handle.lock().await;
        let Some(owner_moved) = table.remove_spectator(user) else {
            return Err(TableError::NotSpectating(user, id));
        };

        tracing::info!(table_id = %id, user_id = %user, spectators = table.spectators.len(), "spectator left");
        let abandoned = table.is_abandoned();
        if !abandoned {
            table.notify(TableEvent::SpectatorChange);
            if owner_moved {
                table.notify(TableEvent::ReplayLeader { leader: table.owner });
            }
        }
        drop(table);

        self.unindex(user, id);
        if abandoned {
            self.remove_table(id);
        }
        Ok(())
    }

    /// Removes `user` from everywhere they are present. Calling it for a
    /// user who is nowhere changes nothing.
    async fn disconnect_user(&mut self, user: UserId) {
        let Some(ids) = self.user_tables.get(&user).cloned() else {
            return;
        };

        for id in ids {
            let Some(handle) = self.tables.get(&id).cloned() else {
                continue;
            };
            let mut table = handle.lock().await;

            let mut event = None;
            if let Some(owner_moved) = table.remove_spectator(user) {
                event = Some(if owner_moved {
                    TableEvent::ReplayLeader { leader: table.owner }
                } else {
                    TableEvent::SpectatorChange
                });
            }
            if !table.replay && table.is_player(user) {
                if table.running {
                    // The seat belongs to the game; only the connection
                    // goes. Joining again reattaches it.
                    if table.detach_player(user) {
                        event = Some(TableEvent::PlayerChange);
                    }
                } else {
                    table.unseat(user);
                    event = Some(TableEvent::PlayerChange);
                }
            }

            let abandoned = table.is_abandoned();
            if let (Some(event), false) = (event, abandoned) {
                table.notify(event);
            }
            drop(table);

            self.unindex(user, id);
            if abandoned {
                self.remove_table(id);
            }
        }

        tracing::info!(user_id = %user, "user disconnected from all tables");
    }

    async fn graceful_shutdown(&mut self) -> usize {
        self.shutting_down = true;
        let mut running = 0;
        for handle in self.tables.values() {
            let table = handle.lock().await;
            if table.running && !table.replay {
                running += 1;
            }
        }
        tracing::info!(running, "graceful shutdown: no new tables or joins");
        running
    }
}

// ---------------------------------------------------------------------------
// TableRegistry
// ---------------------------------------------------------------------------

/// The queue-serialized capability: every call becomes one request on the
/// registry's actor and waits for its reply. Cheap to clone.
#[derive(Clone)]
pub struct TableRegistry {
    actor: RequestActor<RegistryRequest>,
}

impl TableRegistry {
    /// Spawns the registry worker. Must be called inside a Tokio runtime.
    pub fn spawn(catalog: Arc<VariantCatalog>, config: TableConfig) -> Self {
        let worker = RegistryWorker::new(catalog, config);
        Self {
            actor: RequestActor::spawn("table", worker),
        }
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(oneshot::Sender<T>) -> RegistryRequest,
    ) -> Result<T, TableError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.actor.submit(request(reply_tx))?;
        reply_rx.await.map_err(|_| TableError::Unavailable)
    }

    /// Creates a live pregame table with `creator` as sole player and
    /// owner.
    ///
    /// # Errors
    /// [`TableError::ShuttingDown`], [`TableError::EmptyName`],
    /// [`TableError::UnknownVariant`], or [`TableError::SeatedElsewhere`].
    pub async fn create_table(
        &self,
        creator: Session,
        name: impl Into<String>,
        options: GameOptions,
    ) -> Result<TableId, TableError> {
        let name = name.into();
        self.call(|reply| RegistryRequest::CreateTable {
            creator,
            name,
            options,
            reply,
        })
        .await?
    }

    /// Creates a replay of a finished game. `roster` is the original
    /// seating; `creator` becomes the only spectator and the owner.
    pub async fn create_replay(
        &self,
        creator: Session,
        name: impl Into<String>,
        roster: Vec<(UserId, String)>,
        options: GameOptions,
        visible: bool,
    ) -> Result<TableId, TableError> {
        let name = name.into();
        self.call(|reply| RegistryRequest::CreateReplay {
            creator,
            name,
            roster,
            options,
            visible,
            reply,
        })
        .await?
    }

    /// Looks up a table. `Ok(None)` if it does not exist.
    pub async fn get_table(&self, id: TableId) -> Result<Option<TableHandle>, TableError> {
        self.call(|reply| RegistryRequest::GetTable { id, reply }).await
    }

    /// Snapshots every table, ordered by ID.
    pub async fn list_tables(&self) -> Result<Vec<TableSummary>, TableError> {
        self.call(|reply| RegistryRequest::ListTables { reply }).await
    }

    /// Tables `user` is seated at or watching, ordered by ID.
    pub async fn list_tables_for_user(&self, user: UserId) -> Result<Vec<TableId>, TableError> {
        self.call(|reply| RegistryRequest::ListTablesForUser { user, reply })
            .await
    }

    /// Checks, without changing anything, that a new table could be
    /// created right now and every one of `users` seated at it.
    ///
    /// # Errors
    /// [`TableError::ShuttingDown`], or [`TableError::SeatedElsewhere`]
    /// for the first user already connected to a live table.
    pub async fn check_seating(&self, users: Vec<UserId>) -> Result<(), TableError> {
        self.call(|reply| RegistryRequest::CheckSeating { users, reply })
            .await?
    }

    /// Seats `session` at a pregame table, or puts a user who lost their
    /// connection back on their seat at a running game.
    pub async fn join(&self, session: Session, id: TableId) -> Result<(), TableError> {
        self.call(|reply| RegistryRequest::Join { session, id, reply })
            .await?
    }

    /// Gives up a pregame seat. The table disappears with its last player.
    pub async fn leave(&self, user: UserId, id: TableId) -> Result<(), TableError> {
        self.call(|reply| RegistryRequest::Leave { user, id, reply })
            .await?
    }

    /// Starts watching a running game or a replay.
    pub async fn spectate(&self, session: Session, id: TableId) -> Result<(), TableError> {
        self.call(|reply| RegistryRequest::Spectate { session, id, reply })
            .await?
    }

    /// Stops watching. A replay disappears with its last spectator.
    pub async fn unspectate(&self, user: UserId, id: TableId) -> Result<(), TableError> {
        self.call(|reply| RegistryRequest::Unspectate { user, id, reply })
            .await?
    }

    /// Removes `user` from every table. At a running game the seat stays
    /// (without a connection) until [`join`](Self::join) reattaches it; a
    /// running game left with no connection at all is removed. Idempotent.
    pub async fn disconnect_user(&self, user: UserId) -> Result<(), TableError> {
        self.call(|reply| RegistryRequest::DisconnectUser { user, reply })
            .await
    }

    /// Stops accepting new tables and joins. Existing games carry on.
    ///
    /// Returns how many games are still running.
    pub async fn graceful_shutdown(&self) -> Result<usize, TableError> {
        self.call(|reply| RegistryRequest::GracefulShutdown { reply })
            .await
    }

    /// Stops the worker once already-queued requests are handled.
    pub fn shutdown(&self) {
        self.actor.shutdown();
    }

    /// Waits for the worker to exit after [`shutdown`](Self::shutdown).
    pub async fn wait(&self) {
        self.actor.wait().await;
    }
}
