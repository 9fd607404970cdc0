//! UI/backend events, user intents, and error modeling for the battle controller.

use client_core::{Catalog, ClientError, TurnMode};
use shared::{
    domain::{ActionId, BattleId, BotId},
    protocol::{StartBattleResponse, TurnResult},
};

use crate::controller::reducer::Slot;

/// Answers from the backend worker.
#[derive(Debug)]
pub enum UiEvent {
    CatalogLoaded(Catalog),
    BattleStarted {
        generation: u64,
        /// Bot ids from the start request, in agent order.
        bots: [Option<BotId>; 2],
        battle: StartBattleResponse,
    },
    TurnResolved {
        generation: u64,
        battle_id: BattleId,
        result: TurnResult,
    },
    /// Skin labels for the winner; empty when the lookup failed.
    UnlockedSkinsLoaded {
        generation: u64,
        skins: Vec<String>,
    },
    RequestFailed {
        generation: u64,
        error: UiError,
    },
    Error(UiError),
}

/// What the user asked for during one frame. Render functions return these
/// instead of mutating state.
#[derive(Debug, Clone, PartialEq)]
pub enum UiIntent {
    SelectBot { slot: Slot, bot_id: BotId },
    SetTurnMode(TurnMode),
    ConfirmSelection,
    ExecuteAction(ActionId),
    NewBattle,
    DismissAlert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Session,
    Server,
    Decode,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    StartBattle,
    ExecuteTurn,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Transport { .. } | ClientError::HttpClient(_) => {
                UiErrorCategory::Transport
            }
            ClientError::BattleNotFound { .. } | ClientError::BattleExpired { .. } => {
                UiErrorCategory::Session
            }
            ClientError::Status { .. } => UiErrorCategory::Server,
            ClientError::Decode { .. } => UiErrorCategory::Decode,
            ClientError::InvalidUrl { .. } => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("connection")
            || lower.contains("timed out")
            || lower.contains("unreachable")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };
        Self {
            category,
            context,
            message,
        }
    }

    /// Text for the blocking alert. One message per call site, whatever
    /// went wrong underneath.
    pub fn alert_text(&self) -> &'static str {
        match self.context {
            UiErrorContext::BackendStartup => "Fehler beim Starten des Hintergrunddienstes!",
            UiErrorContext::StartBattle => "Fehler beim Starten des Kampfes!",
            UiErrorContext::ExecuteTurn => "Fehler beim Ausführen der Aktion!",
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
