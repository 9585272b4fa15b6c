//! Integration tests for the table registry.

use std::sync::Arc;

use cardroom_protocol::{GameOptions, Outbound, TableEvent, TableId, UserId};
use cardroom_table::{Session, TableConfig, TableError, TablePhase, TableRegistry};
use cardroom_variants::{RuleCatalog, VariantCatalog};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

const COLORS: &str = r##"[
    { "name": "Red", "fill": "#d72a2a" },
    { "name": "Blue", "fill": "#1a66ff" }
]"##;

const SUITS: &str = r#"[ { "name": "Red" }, { "name": "Blue" } ]"#;

const VARIANTS: &str = r#"[
    { "name": "No Variant", "id": 0, "suits": ["Red", "Blue"] },
    { "name": "Two Reds", "id": 1, "suits": ["Red", "Red"] }
]"#;

fn catalog() -> Arc<VariantCatalog> {
    let rules = RuleCatalog::from_json(COLORS, SUITS, VARIANTS).unwrap();
    Arc::new(rules.variants)
}

fn registry() -> TableRegistry {
    TableRegistry::spawn(catalog(), TableConfig::default())
}

fn small_registry(max_players: usize) -> TableRegistry {
    let config = TableConfig {
        max_players,
        ..TableConfig::default()
    };
    TableRegistry::spawn(catalog(), config)
}

fn user(id: u64, name: &str) -> (Session, mpsc::UnboundedReceiver<Outbound>) {
    Session::channel(UserId(id), name)
}

/// A session whose receiver is dropped immediately.
fn dummy(id: u64, name: &str) -> Session {
    user(id, name).0
}

fn options() -> GameOptions {
    GameOptions::with_variant("No Variant")
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> Vec<Outbound> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

async fn start(reg: &TableRegistry, id: TableId) {
    let handle = reg.get_table(id).await.unwrap().unwrap();
    handle.lock().await.running = true;
}

// =========================================================================
// create / get / list
// =========================================================================

#[tokio::test]
async fn test_create_table_returns_unique_ids() {
    let reg = registry();
    let t1 = reg.create_table(dummy(1, "Alice"), "one", options()).await.unwrap();
    let t2 = reg.create_table(dummy(2, "Bob"), "two", options()).await.unwrap();

    assert_ne!(t1, t2);
    assert_eq!(reg.list_tables().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_table_creator_is_owner_and_sole_player() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "  fun  ", options()).await.unwrap();

    let handle = reg.get_table(id).await.unwrap().unwrap();
    let table = handle.lock().await;
    assert_eq!(table.name, "fun");
    assert_eq!(table.owner, UserId(1));
    assert_eq!(table.players.len(), 1);
    assert!(!table.running);
    assert!(!table.replay);
}

#[tokio::test]
async fn test_create_table_empty_name_rejected() {
    let reg = registry();
    let result = reg.create_table(dummy(1, "Alice"), "   ", options()).await;
    assert!(matches!(result, Err(TableError::EmptyName)));
}

#[tokio::test]
async fn test_create_table_unknown_variant_rejected() {
    let reg = registry();
    let result = reg
        .create_table(dummy(1, "Alice"), "fun", GameOptions::with_variant("Nope"))
        .await;
    assert!(matches!(result, Err(TableError::UnknownVariant(v)) if v == "Nope"));
}

#[tokio::test]
async fn test_create_table_while_seated_elsewhere_rejected() {
    let reg = registry();
    let first = reg.create_table(dummy(1, "Alice"), "one", options()).await.unwrap();

    let result = reg.create_table(dummy(1, "Alice"), "two", options()).await;
    assert!(matches!(result, Err(TableError::SeatedElsewhere(UserId(1), t)) if t == first));
}

#[tokio::test]
async fn test_get_table_missing_is_none() {
    let reg = registry();
    assert!(reg.get_table(TableId(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_tables_ordered_by_id_with_phase() {
    let reg = registry();
    let t1 = reg.create_table(dummy(1, "Alice"), "one", options()).await.unwrap();
    let t2 = reg.create_table(dummy(2, "Bob"), "two", options()).await.unwrap();
    start(&reg, t2).await;

    let tables = reg.list_tables().await.unwrap();
    assert_eq!(tables[0].id, t1);
    assert_eq!(tables[0].phase, TablePhase::Pregame);
    assert_eq!(tables[1].id, t2);
    assert_eq!(tables[1].phase, TablePhase::Running);
    assert_eq!(tables[1].players, vec!["Bob"]);
}

#[tokio::test]
async fn test_list_tables_for_user() {
    let reg = registry();
    let t1 = reg.create_table(dummy(1, "Alice"), "one", options()).await.unwrap();
    let t2 = reg.create_table(dummy(2, "Bob"), "two", options()).await.unwrap();
    start(&reg, t2).await;
    reg.spectate(dummy(1, "Alice"), t2).await.unwrap();

    assert_eq!(reg.list_tables_for_user(UserId(1)).await.unwrap(), vec![t1, t2]);
    assert!(reg.list_tables_for_user(UserId(7)).await.unwrap().is_empty());
}

// =========================================================================
// join / leave
// =========================================================================

#[tokio::test]
async fn test_join_success_notifies_table() {
    let reg = registry();
    let (alice, mut alice_rx) = user(1, "Alice");
    let id = reg.create_table(alice, "fun", options()).await.unwrap();

    reg.join(dummy(2, "Bob"), id).await.unwrap();

    let handle = reg.get_table(id).await.unwrap().unwrap();
    let names: Vec<String> = handle.lock().await.players.iter().map(|p| p.name.clone()).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
    assert_eq!(
        drain(&mut alice_rx),
        vec![Outbound::Table { table_id: id, event: TableEvent::PlayerChange }]
    );
}

#[tokio::test]
async fn test_join_no_such_table() {
    let reg = registry();
    let result = reg.join(dummy(1, "Alice"), TableId(999)).await;
    assert!(matches!(result, Err(TableError::NoSuchTable(TableId(999)))));
}

#[tokio::test]
async fn test_join_already_joined() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();

    let result = reg.join(dummy(1, "Alice"), id).await;
    assert!(matches!(result, Err(TableError::AlreadyJoined(UserId(1), _))));
}

#[tokio::test]
async fn test_join_one_live_table_at_a_time() {
    let reg = registry();
    let t1 = reg.create_table(dummy(1, "Alice"), "one", options()).await.unwrap();
    let t2 = reg.create_table(dummy(2, "Bob"), "two", options()).await.unwrap();
    reg.join(dummy(3, "Carol"), t1).await.unwrap();

    let result = reg.join(dummy(3, "Carol"), t2).await;
    assert!(matches!(result, Err(TableError::SeatedElsewhere(UserId(3), t)) if t == t1));
}

#[tokio::test]
async fn test_join_full_table() {
    let reg = small_registry(2);
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();
    reg.join(dummy(2, "Bob"), id).await.unwrap();

    let result = reg.join(dummy(3, "Carol"), id).await;
    assert!(matches!(result, Err(TableError::TableFull(_))));
}

#[tokio::test]
async fn test_join_running_game_rejected() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();
    start(&reg, id).await;

    let result = reg.join(dummy(2, "Bob"), id).await;
    assert!(matches!(result, Err(TableError::InvalidState(_))));
}

#[tokio::test]
async fn test_join_replay_rejected() {
    let reg = registry();
    let roster = vec![(UserId(1), "Alice".into()), (UserId(2), "Bob".into())];
    let id = reg
        .create_replay(dummy(3, "Carol"), "replay", roster, options(), true)
        .await
        .unwrap();

    let result = reg.join(dummy(4, "Dave"), id).await;
    assert!(matches!(result, Err(TableError::InvalidState(_))));
}

#[tokio::test]
async fn test_leave_owner_hands_off_to_leftmost() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();
    reg.join(dummy(2, "Bob"), id).await.unwrap();
    reg.join(dummy(3, "Carol"), id).await.unwrap();

    reg.leave(UserId(1), id).await.unwrap();

    let handle = reg.get_table(id).await.unwrap().unwrap();
    let table = handle.lock().await;
    assert_eq!(table.owner, UserId(2));
    assert_eq!(table.players[0].name, "Bob");
    drop(table);
    assert!(reg.list_tables_for_user(UserId(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_leave_last_player_removes_table() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();

    reg.leave(UserId(1), id).await.unwrap();

    assert!(reg.get_table(id).await.unwrap().is_none());
    assert!(reg.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_leave_not_joined() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();

    let result = reg.leave(UserId(2), id).await;
    assert!(matches!(result, Err(TableError::NotJoined(UserId(2), _))));
}

#[tokio::test]
async fn test_leave_running_game_rejected() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();
    start(&reg, id).await;

    let result = reg.leave(UserId(1), id).await;
    assert!(matches!(result, Err(TableError::InvalidState(_))));
}

// =========================================================================
// spectate / unspectate
// =========================================================================

#[tokio::test]
async fn test_spectate_pregame_rejected() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();

    let result = reg.spectate(dummy(2, "Bob"), id).await;
    assert!(matches!(result, Err(TableError::InvalidState(_))));
}

#[tokio::test]
async fn test_spectate_running_game_twice_rejected() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();
    start(&reg, id).await;

    reg.spectate(dummy(2, "Bob"), id).await.unwrap();
    let result = reg.spectate(dummy(2, "Bob"), id).await;
    assert!(matches!(result, Err(TableError::AlreadySpectating(UserId(2), _))));
}

#[tokio::test]
async fn test_spectate_solo_replay_of_someone_else_rejected() {
    let reg = registry();
    let roster = vec![(UserId(1), "Alice".into())];
    let id = reg
        .create_replay(dummy(3, "Carol"), "solo", roster, options(), false)
        .await
        .unwrap();

    let result = reg.spectate(dummy(4, "Dave"), id).await;
    assert!(matches!(result, Err(TableError::InvalidState(_))));
}

#[tokio::test]
async fn test_unspectate_replay_owner_hands_off() {
    let reg = registry();
    let roster = vec![(UserId(1), "Alice".into())];
    let id = reg
        .create_replay(dummy(3, "Carol"), "shared", roster, options(), true)
        .await
        .unwrap();
    let (dave, mut dave_rx) = user(4, "Dave");
    reg.spectate(dave, id).await.unwrap();
    drain(&mut dave_rx);

    reg.unspectate(UserId(3), id).await.unwrap();

    let handle = reg.get_table(id).await.unwrap().unwrap();
    assert_eq!(handle.lock().await.owner, UserId(4));
    let events = drain(&mut dave_rx);
    assert!(events.contains(&Outbound::Table {
        table_id: id,
        event: TableEvent::ReplayLeader { leader: UserId(4) },
    }));
}

#[tokio::test]
async fn test_unspectate_last_spectator_removes_replay() {
    let reg = registry();
    let roster = vec![(UserId(1), "Alice".into())];
    let id = reg
        .create_replay(dummy(3, "Carol"), "shared", roster, options(), true)
        .await
        .unwrap();

    reg.unspectate(UserId(3), id).await.unwrap();

    assert!(reg.get_table(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unspectate_not_spectating() {
    let reg = registry();
    let roster = vec![(UserId(1), "Alice".into())];
    let id = reg
        .create_replay(dummy(3, "Carol"), "shared", roster, options(), true)
        .await
        .unwrap();

    let result = reg.unspectate(UserId(9), id).await;
    assert!(matches!(result, Err(TableError::NotSpectating(UserId(9), _))));
}

// =========================================================================
// disconnect_user
// =========================================================================

#[tokio::test]
async fn test_disconnect_user_removes_everywhere() {
    let reg = registry();
    let pregame = reg.create_table(dummy(2, "Bob"), "lobby", options()).await.unwrap();
    reg.join(dummy(1, "Alice"), pregame).await.unwrap();
    let running = reg.create_table(dummy(3, "Carol"), "game", options()).await.unwrap();
    start(&reg, running).await;
    reg.spectate(dummy(1, "Alice"), running).await.unwrap();

    reg.disconnect_user(UserId(1)).await.unwrap();

    let lobby = reg.get_table(pregame).await.unwrap().unwrap();
    assert!(!lobby.lock().await.is_player(UserId(1)));
    let game = reg.get_table(running).await.unwrap().unwrap();
    assert!(!game.lock().await.is_spectator(UserId(1)));
    assert!(reg.list_tables_for_user(UserId(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_disconnect_user_running_game_keeps_seat() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "game", options()).await.unwrap();
    reg.join(dummy(2, "Bob"), id).await.unwrap();
    start(&reg, id).await;

    reg.disconnect_user(UserId(2)).await.unwrap();

    let handle = reg.get_table(id).await.unwrap().unwrap();
    let table = handle.lock().await;
    assert_eq!(table.players.len(), 2);
    assert!(table.players[1].session.is_none());
    drop(table);
    assert!(reg.list_tables_for_user(UserId(2)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_join_running_game_after_disconnect_reattaches_seat() {
    let reg = registry();
    let (alice, mut alice_rx) = user(1, "Alice");
    let id = reg.create_table(alice, "game", options()).await.unwrap();
    reg.join(dummy(2, "Bob"), id).await.unwrap();
    start(&reg, id).await;
    reg.disconnect_user(UserId(2)).await.unwrap();
    drain(&mut alice_rx);

    let (bob, mut bob_rx) = user(2, "Bob");
    reg.join(bob, id).await.unwrap();

    let handle = reg.get_table(id).await.unwrap().unwrap();
    let table = handle.lock().await;
    assert_eq!(table.players.len(), 2);
    assert!(table.is_connected_player(UserId(2)));
    drop(table);
    assert_eq!(reg.list_tables_for_user(UserId(2)).await.unwrap(), vec![id]);
    assert!(drain(&mut alice_rx).contains(&Outbound::Table {
        table_id: id,
        event: TableEvent::PlayerChange,
    }));
    assert!(!drain(&mut bob_rx).is_empty());

    let again = reg.join(dummy(2, "Bob"), id).await;
    assert!(matches!(again, Err(TableError::InvalidState(_))));
}

#[tokio::test]
async fn test_join_reattach_allowed_during_graceful_shutdown() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "game", options()).await.unwrap();
    reg.join(dummy(2, "Bob"), id).await.unwrap();
    start(&reg, id).await;
    reg.disconnect_user(UserId(2)).await.unwrap();
    reg.graceful_shutdown().await.unwrap();

    reg.join(dummy(2, "Bob"), id).await.unwrap();

    let result = reg.join(dummy(3, "Carol"), id).await;
    assert!(matches!(result, Err(TableError::ShuttingDown)));
}

#[tokio::test]
async fn test_disconnect_from_running_game_frees_user_for_new_table() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "game", options()).await.unwrap();
    reg.join(dummy(2, "Bob"), id).await.unwrap();
    start(&reg, id).await;

    reg.disconnect_user(UserId(1)).await.unwrap();
    let other = reg.create_table(dummy(1, "Alice"), "fresh", options()).await.unwrap();

    assert_ne!(other, id);
    assert_eq!(reg.list_tables_for_user(UserId(1)).await.unwrap(), vec![other]);

    // Connected somewhere else now, so the old seat stays empty.
    let back = reg.join(dummy(1, "Alice"), id).await;
    assert!(matches!(back, Err(TableError::SeatedElsewhere(UserId(1), t)) if t == other));
}

#[tokio::test]
async fn test_disconnect_everyone_from_running_game_removes_table() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "game", options()).await.unwrap();
    reg.join(dummy(2, "Bob"), id).await.unwrap();
    start(&reg, id).await;
    reg.spectate(dummy(3, "Carol"), id).await.unwrap();

    reg.disconnect_user(UserId(1)).await.unwrap();
    reg.disconnect_user(UserId(2)).await.unwrap();
    assert!(reg.get_table(id).await.unwrap().is_some());

    reg.unspectate(UserId(3), id).await.unwrap();

    assert!(reg.get_table(id).await.unwrap().is_none());
    let rejoin = reg.join(dummy(1, "Alice"), id).await;
    assert!(matches!(rejoin, Err(TableError::NoSuchTable(t)) if t == id));
    reg.create_table(dummy(1, "Alice"), "fresh", options()).await.unwrap();
}

#[tokio::test]
async fn test_check_seating_reports_shutdown_and_seated_users() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "game", options()).await.unwrap();

    reg.check_seating(vec![UserId(2), UserId(3)]).await.unwrap();
    let seated = reg.check_seating(vec![UserId(2), UserId(1)]).await;
    assert!(matches!(seated, Err(TableError::SeatedElsewhere(UserId(1), t)) if t == id));

    reg.graceful_shutdown().await.unwrap();
    let closed = reg.check_seating(vec![UserId(2)]).await;
    assert!(matches!(closed, Err(TableError::ShuttingDown)));
}

#[tokio::test]
async fn test_disconnect_user_twice_is_noop() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();
    let (bob, mut bob_rx) = user(2, "Bob");
    reg.join(bob, id).await.unwrap();
    reg.join(dummy(3, "Carol"), id).await.unwrap();

    reg.disconnect_user(UserId(3)).await.unwrap();
    drain(&mut bob_rx);
    reg.disconnect_user(UserId(3)).await.unwrap();
    reg.disconnect_user(UserId(42)).await.unwrap();

    assert!(drain(&mut bob_rx).is_empty());
    let handle = reg.get_table(id).await.unwrap().unwrap();
    assert_eq!(handle.lock().await.players.len(), 2);
}

#[tokio::test]
async fn test_disconnect_owner_removes_abandoned_table() {
    let reg = registry();
    let id = reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();

    reg.disconnect_user(UserId(1)).await.unwrap();

    assert!(reg.get_table(id).await.unwrap().is_none());
}

// =========================================================================
// shutdown
// =========================================================================

#[tokio::test]
async fn test_graceful_shutdown_counts_running_and_blocks_new_work() {
    let reg = registry();
    let pregame = reg.create_table(dummy(1, "Alice"), "lobby", options()).await.unwrap();
    let running = reg.create_table(dummy(2, "Bob"), "game", options()).await.unwrap();
    start(&reg, running).await;

    assert_eq!(reg.graceful_shutdown().await.unwrap(), 1);

    let create = reg.create_table(dummy(3, "Carol"), "late", options()).await;
    assert!(matches!(create, Err(TableError::ShuttingDown)));
    let join = reg.join(dummy(3, "Carol"), pregame).await;
    assert!(matches!(join, Err(TableError::ShuttingDown)));

    // Existing tables are still reachable.
    assert!(reg.get_table(running).await.unwrap().is_some());
}

#[tokio::test]
async fn test_shutdown_then_requests_fail() {
    let reg = registry();
    reg.create_table(dummy(1, "Alice"), "fun", options()).await.unwrap();

    reg.shutdown();
    reg.wait().await;

    let result = reg.list_tables().await;
    assert!(matches!(result, Err(TableError::Actor(_))));
}
