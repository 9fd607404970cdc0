//! Paced playback of a turn result.
//!
//! A turn is shown as one log entry per sub-action, spaced by
//! [`LOG_STAGGER`], followed by a display refresh and, after
//! [`BATTLE_OVER_DELAY`], a battle-over check. Steps sit in a queue with
//! explicit deadlines so a session reset can drop all of them at once.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use shared::{
    domain::{ActionOutcome, AgentSnapshot},
    protocol::TurnResult,
};

pub const LOG_STAGGER: Duration = Duration::from_secs(1);
pub const BATTLE_OVER_DELAY: Duration = Duration::from_millis(1500);

/// Agent state and round counter to show once a turn's log has played.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    pub round: u32,
    pub agent1: AgentSnapshot,
    pub agent2: AgentSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackStep {
    AppendLog(String),
    RefreshDisplay(Box<DisplayFrame>),
    CheckBattleOver {
        battle_over: bool,
        winner: Option<String>,
    },
}

#[derive(Debug, Default)]
pub struct PlaybackQueue {
    steps: VecDeque<(Instant, PlaybackStep)>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the steps for `result`. A turn scheduled while an earlier one
    /// is still playing starts after the earlier turn's last step.
    pub fn schedule_turn(&mut self, result: &TurnResult, now: Instant) {
        let start = self
            .steps
            .back()
            .map(|(at, _)| (*at).max(now))
            .unwrap_or(now);

        let entries = log_entries(result);
        let mut at = start;
        for entry in &entries {
            self.steps.push_back((at, PlaybackStep::AppendLog(entry.clone())));
            at += LOG_STAGGER;
        }

        let refresh_at = start + LOG_STAGGER * entries.len() as u32;
        self.steps.push_back((
            refresh_at,
            PlaybackStep::RefreshDisplay(Box::new(DisplayFrame {
                round: result.round,
                agent1: result.agent1.clone(),
                agent2: result.agent2.clone(),
            })),
        ));
        self.steps.push_back((
            refresh_at + BATTLE_OVER_DELAY,
            PlaybackStep::CheckBattleOver {
                battle_over: result.is_over(),
                winner: result.winner.clone(),
            },
        ));
    }

    /// Removes and returns every step whose deadline has passed, in order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<PlaybackStep> {
        let mut due = Vec::new();
        while let Some((at, _)) = self.steps.front() {
            if *at > now {
                break;
            }
            if let Some((_, step)) = self.steps.pop_front() {
                due.push(step);
            }
        }
        due
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.steps.front().map(|(at, _)| *at)
    }

    /// Drops every pending step; returns how many were dropped.
    pub fn cancel(&mut self) -> usize {
        let dropped = self.steps.len();
        self.steps.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Log lines for a turn: one per sub-action outcome, or the server's joined
/// commentary when it sent no outcomes.
pub fn log_entries(result: &TurnResult) -> Vec<String> {
    if !result.outcomes.is_empty() {
        return result.outcomes.iter().map(format_outcome).collect();
    }
    result
        .commentary
        .iter()
        .map(|commentary| format!("⚔️ {commentary}"))
        .collect()
}

pub fn format_outcome(outcome: &ActionOutcome) -> String {
    let mut line = format!("⚔️ {} nutzt {}", outcome.attacker, outcome.action);
    if outcome.damage > 0.0 {
        line.push_str(&format!(": {} Schaden", outcome.damage));
    }
    if !outcome.effects.is_empty() {
        line.push_str(&format!(" [{}]", outcome.effects.join(", ")));
    }
    if !outcome.comment.is_empty() {
        line.push_str(&format!(" · {}", outcome.comment));
    }
    line
}
