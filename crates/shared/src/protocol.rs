use serde::{Deserialize, Serialize};

use crate::domain::{ActionId, ActionOutcome, AgentSnapshot, BattleId, BotId};

pub const DEFAULT_AGENT1_NAME: &str = "Agent Alpha";
pub const DEFAULT_AGENT2_NAME: &str = "Agent Beta";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartBattleRequest {
    pub agent1_name: String,
    pub agent2_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent1_bot: Option<BotId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent2_bot: Option<BotId>,
}

impl StartBattleRequest {
    /// Builds a request from raw name input; blank names fall back to the
    /// default agent names.
    pub fn new(
        agent1_name: &str,
        agent2_name: &str,
        agent1_bot: Option<BotId>,
        agent2_bot: Option<BotId>,
    ) -> Self {
        Self {
            agent1_name: name_or_default(agent1_name, DEFAULT_AGENT1_NAME),
            agent2_name: name_or_default(agent2_name, DEFAULT_AGENT2_NAME),
            agent1_bot,
            agent2_bot,
        }
    }
}

fn name_or_default(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartBattleResponse {
    pub battle_id: BattleId,
    pub agent1: AgentSnapshot,
    pub agent2: AgentSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiActionRequest {
    pub battle_id: BattleId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiActionResponse {
    pub action_id: ActionId,
}

/// Body of `POST /api/battle/turn`. The server decides agent 2's action for
/// `Single`; `Dual` carries both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnRequest {
    Dual {
        battle_id: BattleId,
        action1_id: ActionId,
        action2_id: ActionId,
    },
    Single {
        battle_id: BattleId,
        action_id: ActionId,
    },
}

impl TurnRequest {
    pub fn battle_id(&self) -> &BattleId {
        match self {
            Self::Dual { battle_id, .. } | Self::Single { battle_id, .. } => battle_id,
        }
    }
}

/// A turn response normalised over both server shapes:
/// `{agent1, agent2, round, commentary, winner?}` and
/// `{agent1_state, agent2_state, round, actions, battle_over, winner}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "TurnResponseWire")]
pub struct TurnResult {
    pub round: u32,
    pub agent1: AgentSnapshot,
    pub agent2: AgentSnapshot,
    pub outcomes: Vec<ActionOutcome>,
    pub commentary: Option<String>,
    pub battle_over: bool,
    pub winner: Option<String>,
}

impl TurnResult {
    pub fn is_over(&self) -> bool {
        self.battle_over || self.winner.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct TurnResponseWire {
    round: u32,
    #[serde(alias = "agent1_state")]
    agent1: AgentSnapshot,
    #[serde(alias = "agent2_state")]
    agent2: AgentSnapshot,
    #[serde(default)]
    actions: Option<Vec<ActionOutcome>>,
    #[serde(default)]
    commentary: Option<String>,
    #[serde(default)]
    battle_over: Option<bool>,
    #[serde(default)]
    winner: Option<String>,
}

impl From<TurnResponseWire> for TurnResult {
    fn from(wire: TurnResponseWire) -> Self {
        Self {
            round: wire.round,
            agent1: wire.agent1,
            agent2: wire.agent2,
            outcomes: wire.actions.unwrap_or_default(),
            commentary: wire.commentary.filter(|c| !c.trim().is_empty()),
            battle_over: wire.battle_over.unwrap_or(false),
            winner: wire.winner.filter(|w| !w.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
