//! Backend commands queued from UI to backend worker.

use client_core::TurnMode;
use shared::{
    domain::{ActionId, BattleId, BotId},
    protocol::StartBattleRequest,
};

/// Every battle-scoped command carries the session generation it was issued
/// under so the UI can drop answers that arrive after a reset.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    LoadCatalog,
    StartBattle {
        generation: u64,
        request: StartBattleRequest,
    },
    ExecuteTurn {
        generation: u64,
        battle_id: BattleId,
        action_id: ActionId,
        mode: TurnMode,
    },
    LoadUnlockedSkins {
        generation: u64,
        bot_id: BotId,
        level: u32,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadCatalog => "load_catalog",
            Self::StartBattle { .. } => "start_battle",
            Self::ExecuteTurn { .. } => "execute_turn",
            Self::LoadUnlockedSkins { .. } => "load_unlocked_skins",
        }
    }
}
