use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    fail_bots: bool,
}

impl ServerState {
    async fn record(&self, path: &str, body: Value) {
        self.requests.lock().await.push((path.to_string(), body));
    }

    async fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }
}

fn agent_json(name: &str, hp: i64, stamina: i64) -> Value {
    json!({
        "name": name, "level": 1, "hp": hp, "max_hp": 100, "stamina": stamina,
        "max_stamina": 50, "xp": 0, "xp_to_next_level": 100, "attack": 10,
        "defense": 5, "avatar": "🦾", "color": "#ff0000", "buffs": [], "debuffs": []
    })
}

async fn list_bots(State(state): State<ServerState>) -> (StatusCode, Json<Value>) {
    if state.fail_bots {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "boom"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!([
            {"id": "mende", "name": "Mende", "title": "Der Stratege", "avatar": "🧠",
             "color": "#00aaff", "stats": {"hp_bonus": 10, "attack_bonus": 2,
             "defense_bonus": 3, "stamina_bonus": 5}, "special": "Analyse"},
            {"id": "regulus", "name": "Regulus", "title": "Der Wächter", "avatar": "🛡️",
             "color": "#ffaa00", "stats": {"hp_bonus": 20}, "special": "Bollwerk"}
        ])),
    )
}

async fn list_actions() -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "Schlag", "description": "Basisangriff", "emoji": "👊",
         "stamina_cost": 5, "damage_range": [5, 10], "effects": []},
        {"id": 4, "name": "Feuerball", "description": "Brennt", "emoji": "🔥",
         "stamina_cost": 25, "damage_range": [15, 25], "effects": ["burn"]}
    ]))
}

async fn start_battle(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let agent1 = body["agent1_name"].as_str().unwrap_or_default().to_string();
    let agent2 = body["agent2_name"].as_str().unwrap_or_default().to_string();
    state.record("/api/battle/start", body).await;
    Json(json!({
        "battle_id": "battle-1",
        "agent1": agent_json(&agent1, 100, 50),
        "agent2": agent_json(&agent2, 100, 50)
    }))
}

async fn ai_action(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
    state.record("/api/battle/ai-action", body).await;
    Json(json!({"action_id": 4}))
}

async fn execute_turn(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("/api/battle/turn", body.clone()).await;

    if body["battle_id"] == "expired" {
        return (
            StatusCode::GONE,
            Json(json!({"error": "Battle abgelaufen oder nicht gefunden", "code": "battle_expired"})),
        );
    }
    if body["battle_id"] == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Battle abgelaufen oder nicht gefunden", "code": "battle_not_found"})),
        );
    }

    if body.get("action1_id").is_some() {
        (
            StatusCode::OK,
            Json(json!({
                "agent1_state": agent_json("Agent Alpha", 100, 45),
                "agent2_state": agent_json("Agent Beta", 0, 25),
                "round": 2,
                "actions": [
                    {"attacker": "Agent Alpha", "action": "Schlag", "damage": 8,
                     "effects": [], "comment": "Treffer"},
                    {"attacker": "Agent Beta", "action": "Feuerball", "damage": 0,
                     "effects": ["burn"], "comment": "Daneben"}
                ],
                "battle_over": true,
                "winner": "Agent Alpha"
            })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({
                "agent1": agent_json("Agent Alpha", 90, 45),
                "agent2": agent_json("Agent Beta", 80, 45),
                "round": 2,
                "commentary": "Alpha trifft; Beta trifft"
            })),
        )
    }
}

async fn summary(Path(battle_id): Path<String>) -> Json<Value> {
    Json(json!({"battle_id": battle_id, "rounds": 5}))
}

async fn skins(Path(bot_id): Path<String>) -> Json<Value> {
    if bot_id != "mende" {
        return Json(json!([]));
    }
    Json(json!([
        {"name": "Standard", "unlock_level": 1},
        {"name": "Goldrüstung", "unlock_level": 5}
    ]))
}

async fn unlocked_skins(Path((bot_id, level)): Path<(String, u32)>) -> Json<Value> {
    let all = [("Standard", 1), ("Goldrüstung", 5)];
    let unlocked: Vec<Value> = all
        .iter()
        .filter(|(_, unlock_level)| *unlock_level <= level)
        .map(|(name, unlock_level)| json!({"name": name, "unlock_level": unlock_level, "bot": bot_id}))
        .collect();
    Json(Value::Array(unlocked))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn spawn_battle_server(state: ServerState) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/api/bots", get(list_bots))
        .route("/api/actions", get(list_actions))
        .route("/api/battle/start", post(start_battle))
        .route("/api/battle/ai-action", post(ai_action))
        .route("/api/battle/turn", post(execute_turn))
        .route("/api/battle/summary/:battle_id", get(summary))
        .route("/api/bots/:bot_id/skins", get(skins))
        .route(
            "/api/bots/:bot_id/unlocked-skins/:level",
            get(unlocked_skins),
        )
        .route("/health", get(health))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn loads_both_catalogs() {
    let server_url = spawn_battle_server(ServerState::default())
        .await
        .expect("spawn server");
    let client = BattleClient::new(&server_url).expect("client");

    let catalog = load_catalog(&client).await;

    assert_eq!(catalog.bots.len(), 2);
    assert_eq!(catalog.bots[0].stats.hp_bonus, 10);
    assert_eq!(catalog.bots[1].stats.attack_bonus, 0);
    assert_eq!(catalog.actions.len(), 2);
    assert_eq!(
        catalog.action(ActionId(4)).map(|a| a.damage.max),
        Some(25)
    );
    assert!(catalog.bot(&BotId::from("regulus")).is_some());
}

#[tokio::test]
async fn failed_bot_catalog_degrades_to_empty_without_blocking_actions() {
    let state = ServerState {
        fail_bots: true,
        ..ServerState::default()
    };
    let server_url = spawn_battle_server(state).await.expect("spawn server");
    let client = BattleClient::new(&server_url).expect("client");

    let catalog = load_catalog(&client).await;

    assert!(catalog.bots.is_empty());
    assert_eq!(catalog.actions.len(), 2);
}

#[tokio::test]
async fn unreachable_server_yields_empty_catalog() {
    // Port 9 (discard) on localhost is not served by anything in tests.
    let client = BattleClient::new("http://127.0.0.1:9").expect("client");
    let catalog = load_catalog(&client).await;
    assert_eq!(catalog, Catalog::default());
}

#[tokio::test]
async fn start_battle_posts_names_and_bots() {
    let state = ServerState::default();
    let server_url = spawn_battle_server(state.clone())
        .await
        .expect("spawn server");
    let client = BattleClient::new(&server_url).expect("client");

    let request = StartBattleRequest::new(
        "",
        "Zed",
        Some(BotId::from("mende")),
        Some(BotId::from("regulus")),
    );
    let started = client.start_battle(&request).await.expect("start");

    assert_eq!(started.battle_id, BattleId::from("battle-1"));
    assert_eq!(started.agent1.name, "Agent Alpha");
    assert_eq!(started.agent2.name, "Zed");

    let requests = state.requests.lock().await;
    assert_eq!(
        requests[0].1,
        json!({
            "agent1_name": "Agent Alpha",
            "agent2_name": "Zed",
            "agent1_bot": "mende",
            "agent2_bot": "regulus"
        })
    );
}

#[tokio::test]
async fn server_decides_mode_sends_single_action() {
    let state = ServerState::default();
    let server_url = spawn_battle_server(state.clone())
        .await
        .expect("spawn server");
    let client = BattleClient::new(&server_url).expect("client");

    let result = play_turn(
        &client,
        TurnMode::ServerDecides,
        &BattleId::from("battle-1"),
        ActionId(1),
    )
    .await
    .expect("turn");

    assert_eq!(result.round, 2);
    assert_eq!(result.agent1.hp, 90.0);
    assert!(result.outcomes.is_empty());
    assert_eq!(result.commentary.as_deref(), Some("Alpha trifft; Beta trifft"));
    assert!(!result.is_over());

    assert_eq!(state.paths().await, vec!["/api/battle/turn".to_string()]);
    let requests = state.requests.lock().await;
    assert_eq!(requests[0].1, json!({"battle_id": "battle-1", "action_id": 1}));
}

#[tokio::test]
async fn ai_assisted_mode_asks_for_opponent_action_first() {
    let state = ServerState::default();
    let server_url = spawn_battle_server(state.clone())
        .await
        .expect("spawn server");
    let client = BattleClient::new(&server_url).expect("client");

    let result = play_turn(
        &client,
        TurnMode::AiAssisted,
        &BattleId::from("battle-1"),
        ActionId(1),
    )
    .await
    .expect("turn");

    assert_eq!(
        state.paths().await,
        vec![
            "/api/battle/ai-action".to_string(),
            "/api/battle/turn".to_string()
        ]
    );
    let requests = state.requests.lock().await;
    assert_eq!(requests[0].1, json!({"battle_id": "battle-1"}));
    assert_eq!(
        requests[1].1,
        json!({"battle_id": "battle-1", "action1_id": 1, "action2_id": 4})
    );

    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(result.winner.as_deref(), Some("Agent Alpha"));
    assert!(result.is_over());
}

#[tokio::test]
async fn expired_and_missing_battles_map_to_typed_errors() {
    let server_url = spawn_battle_server(ServerState::default())
        .await
        .expect("spawn server");
    let client = BattleClient::new(&server_url).expect("client");

    let expired = play_turn(
        &client,
        TurnMode::ServerDecides,
        &BattleId::from("expired"),
        ActionId(1),
    )
    .await
    .expect_err("expired battle");
    assert!(matches!(expired, ClientError::BattleExpired { .. }));

    let missing = play_turn(
        &client,
        TurnMode::ServerDecides,
        &BattleId::from("missing"),
        ActionId(1),
    )
    .await
    .expect_err("missing battle");
    assert!(matches!(missing, ClientError::BattleNotFound { .. }));
}

#[tokio::test]
async fn summary_and_health_are_reachable() {
    let server_url = spawn_battle_server(ServerState::default())
        .await
        .expect("spawn server");
    let client = BattleClient::new(&server_url).expect("client");

    assert!(client.health().await.expect("health").is_ok());
    let summary = client
        .battle_summary(&BattleId::from("battle-1"))
        .await
        .expect("summary");
    assert_eq!(summary["battle_id"], "battle-1");
    assert_eq!(summary["rounds"], 5);
}

#[tokio::test]
async fn skins_and_unlocked_skins_are_fetched_per_bot() {
    let server_url = spawn_battle_server(ServerState::default())
        .await
        .expect("spawn server");
    let client = BattleClient::new(&server_url).expect("client");
    let mende = BotId::from("mende");

    let all = client.fetch_skins(&mende).await.expect("skins");
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let at_level_3 = client.unlocked_skins(&mende, 3).await.expect("unlocked");
    assert_eq!(at_level_3, json!([{"name": "Standard", "unlock_level": 1, "bot": "mende"}]));

    let at_level_5 = client.unlocked_skins(&mende, 5).await.expect("unlocked");
    assert_eq!(at_level_5[1]["name"], "Goldrüstung");

    let unknown = client
        .fetch_skins(&BotId::from("ghost"))
        .await
        .expect("skins");
    assert_eq!(unknown, json!([]));
}

#[test]
fn base_url_gains_trailing_slash_so_endpoints_join_below_it() {
    let client = BattleClient::new("http://example.test/game").expect("client");
    assert_eq!(client.base_url().as_str(), "http://example.test/game/");
    assert_eq!(
        client.endpoint("api/bots").expect("endpoint").as_str(),
        "http://example.test/game/api/bots"
    );
}

#[test]
fn rejects_unparseable_server_url() {
    assert!(matches!(
        BattleClient::new("not a url"),
        Err(ClientError::InvalidUrl { .. })
    ));
}
