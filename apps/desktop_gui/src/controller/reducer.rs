//! View state and its transitions.
//!
//! The UI reads [`ViewState`] to render and feeds user intents and backend
//! events back through the methods here; no other code mutates it.

use std::time::Instant;

use chrono::{DateTime, Local};
use client_core::{
    playback::{DisplayFrame, PlaybackQueue, PlaybackStep},
    Catalog, TurnMode,
};
use shared::{
    domain::{ActionId, AgentSnapshot, BattleId, BotId},
    protocol::{StartBattleRequest, StartBattleResponse, TurnResult},
};
use tracing::{debug, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorContext},
    view::{action_buttons, ActionButtonView, AgentView, VictoryView},
};

pub const DEFAULT_SLOT1_BOT: &str = "mende";
pub const DEFAULT_SLOT2_BOT: &str = "regulus";
pub const SELECTION_WARNING: &str = "Bitte wähle Bots für beide Agents!";
const DRAW_LABEL: &str = "Unentschieden";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Selection,
    Battle,
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub text: String,
}

/// Authoritative mirror of the running battle: the last snapshots the
/// server sent.
#[derive(Debug, Clone)]
struct BattleSession {
    battle_id: BattleId,
    bots: [Option<BotId>; 2],
    round: u32,
    agent1: AgentSnapshot,
    agent2: AgentSnapshot,
}

pub struct ViewState {
    screen: Screen,
    catalog: Catalog,
    slot1: Option<BotId>,
    slot2: Option<BotId>,
    mode: TurnMode,
    generation: u64,
    session: Option<BattleSession>,
    /// What the battle screen shows; lags `session` while a turn plays back.
    displayed: Option<DisplayFrame>,
    busy: bool,
    combat_log: Vec<LogEntry>,
    victory: Option<VictoryView>,
    alert: Option<String>,
    playback: PlaybackQueue,
}

impl ViewState {
    pub fn new(mode: TurnMode) -> Self {
        Self {
            screen: Screen::Selection,
            catalog: Catalog::default(),
            slot1: None,
            slot2: None,
            mode,
            generation: 0,
            session: None,
            displayed: None,
            busy: false,
            combat_log: Vec::new(),
            victory: None,
            alert: None,
            playback: PlaybackQueue::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selected(&self, slot: Slot) -> Option<&BotId> {
        match slot {
            Slot::First => self.slot1.as_ref(),
            Slot::Second => self.slot2.as_ref(),
        }
    }

    pub fn mode(&self) -> TurnMode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn round(&self) -> Option<u32> {
        self.displayed.as_ref().map(|frame| frame.round)
    }

    pub fn combat_log(&self) -> &[LogEntry] {
        &self.combat_log
    }

    pub fn victory(&self) -> Option<&VictoryView> {
        self.victory.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn agent_views(&self) -> Option<(AgentView, AgentView)> {
        self.displayed.as_ref().map(|frame| {
            (
                AgentView::from_snapshot(&frame.agent1),
                AgentView::from_snapshot(&frame.agent2),
            )
        })
    }

    pub fn action_buttons(&self) -> Vec<ActionButtonView> {
        match &self.displayed {
            Some(frame) => action_buttons(&self.catalog.actions, &frame.agent1),
            None => Vec::new(),
        }
    }

    pub fn next_wakeup(&self) -> Option<Instant> {
        self.playback.next_deadline()
    }

    pub fn catalog_loaded(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        self.select_bot(Slot::First, &BotId::from(DEFAULT_SLOT1_BOT));
        self.select_bot(Slot::Second, &BotId::from(DEFAULT_SLOT2_BOT));
    }

    /// Replaces the slot's selection. Ids missing from the catalog are
    /// ignored. Returns whether the selection changed.
    pub fn select_bot(&mut self, slot: Slot, bot_id: &BotId) -> bool {
        if self.catalog.bot(bot_id).is_none() {
            debug!(%bot_id, "ignoring selection of unknown bot");
            return false;
        }
        let target = match slot {
            Slot::First => &mut self.slot1,
            Slot::Second => &mut self.slot2,
        };
        if target.as_ref() == Some(bot_id) {
            return false;
        }
        *target = Some(bot_id.clone());
        true
    }

    pub fn set_mode(&mut self, mode: TurnMode) {
        self.mode = mode;
    }

    /// Both slots must be filled; otherwise shows the selection warning and
    /// returns nothing to send.
    pub fn confirm_selection(
        &mut self,
        agent1_name: &str,
        agent2_name: &str,
    ) -> Option<BackendCommand> {
        let (Some(bot1), Some(bot2)) = (self.slot1.clone(), self.slot2.clone()) else {
            self.alert = Some(SELECTION_WARNING.to_string());
            return None;
        };
        Some(BackendCommand::StartBattle {
            generation: self.generation,
            request: StartBattleRequest::new(agent1_name, agent2_name, Some(bot1), Some(bot2)),
        })
    }

    pub fn battle_started(
        &mut self,
        generation: u64,
        bots: [Option<BotId>; 2],
        battle: StartBattleResponse,
    ) {
        if generation != self.generation {
            warn!(
                generation,
                current = self.generation,
                battle_id = %battle.battle_id,
                "dropping battle start from a previous session"
            );
            return;
        }
        info!(battle_id = %battle.battle_id, "battle screen active");
        self.displayed = Some(DisplayFrame {
            round: 1,
            agent1: battle.agent1.clone(),
            agent2: battle.agent2.clone(),
        });
        self.session = Some(BattleSession {
            battle_id: battle.battle_id,
            bots,
            round: 1,
            agent1: battle.agent1,
            agent2: battle.agent2,
        });
        self.busy = false;
        self.victory = None;
        self.screen = Screen::Battle;
    }

    /// Returns the command for one turn, or `None` when the submission is
    /// dropped: a turn is already in flight, no battle runs, or an agent is
    /// down.
    pub fn request_turn(&mut self, action_id: ActionId) -> Option<BackendCommand> {
        if self.busy {
            debug!(%action_id, "turn already in flight; dropping submission");
            return None;
        }
        let session = self.session.as_ref()?;
        if session.agent1.is_defeated() || session.agent2.is_defeated() {
            return None;
        }
        self.busy = true;
        Some(BackendCommand::ExecuteTurn {
            generation: self.generation,
            battle_id: session.battle_id.clone(),
            action_id,
            mode: self.mode,
        })
    }

    /// The turn command never reached the backend worker, so no answer will
    /// come back for it.
    pub fn turn_not_sent(&mut self) {
        if self.busy {
            warn!("turn command was not queued; accepting submissions again");
        }
        self.busy = false;
    }

    pub fn turn_resolved(
        &mut self,
        generation: u64,
        battle_id: &BattleId,
        result: TurnResult,
        now: Instant,
    ) {
        if generation != self.generation {
            warn!(
                generation,
                current = self.generation,
                %battle_id,
                "dropping turn result from a previous session"
            );
            return;
        }
        self.busy = false;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.round = result.round;
        session.agent1 = result.agent1.clone();
        session.agent2 = result.agent2.clone();
        self.playback.schedule_turn(&result, now);
    }

    /// Surfaces a failed request as a blocking alert. Nothing is rolled
    /// back.
    pub fn request_failed(&mut self, generation: u64, error: &UiError) {
        if generation != self.generation {
            debug!(generation, "ignoring failure from a previous session");
            return;
        }
        if error.context() == UiErrorContext::ExecuteTurn {
            self.busy = false;
        }
        self.show_alert(error);
    }

    pub fn show_alert(&mut self, error: &UiError) {
        self.alert = Some(error.alert_text().to_string());
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Applies every playback step that is due. Returns the unlocked-skins
    /// lookup for the winner when this tick ended the battle.
    pub fn tick(&mut self, now: Instant) -> Option<BackendCommand> {
        let mut follow_up = None;
        for step in self.playback.drain_due(now) {
            match step {
                PlaybackStep::AppendLog(text) => self.combat_log.push(LogEntry {
                    at: Local::now(),
                    text,
                }),
                PlaybackStep::RefreshDisplay(frame) => self.displayed = Some(*frame),
                PlaybackStep::CheckBattleOver {
                    battle_over,
                    winner,
                } => {
                    if battle_over {
                        follow_up = self.show_victory(winner.as_deref().unwrap_or(DRAW_LABEL));
                    }
                }
            }
        }
        follow_up
    }

    fn show_victory(&mut self, winner: &str) -> Option<BackendCommand> {
        if self.victory.is_some() {
            return None;
        }
        let session = self.session.as_ref()?;
        info!(battle_id = %session.battle_id, winner, round = session.round, "battle over");
        self.victory = Some(VictoryView::new(
            winner,
            session.round,
            &session.agent1,
            &session.agent2,
        ));
        self.screen = Screen::Victory;

        let (bot_id, agent) = [
            (&session.bots[0], &session.agent1),
            (&session.bots[1], &session.agent2),
        ]
        .into_iter()
        .find(|(_, agent)| agent.name == winner)?;
        Some(BackendCommand::LoadUnlockedSkins {
            generation: self.generation,
            bot_id: bot_id.clone()?,
            level: agent.level,
        })
    }

    pub fn unlocked_skins_loaded(&mut self, generation: u64, skins: Vec<String>) {
        if generation != self.generation {
            debug!(generation, "ignoring skins from a previous session");
            return;
        }
        if let Some(victory) = self.victory.as_mut() {
            victory.unlocked_skins = skins;
        }
    }

    /// Back to the selection screen. Pending playback is dropped and the
    /// generation moves on so late answers for the old session are ignored.
    /// Bot selections are kept.
    pub fn reset(&mut self) {
        let dropped = self.playback.cancel();
        self.generation += 1;
        debug!(dropped, generation = self.generation, "session reset");
        self.session = None;
        self.displayed = None;
        self.busy = false;
        self.combat_log.clear();
        self.victory = None;
        self.screen = Screen::Selection;
    }
}
