//! Read-only views derived from agent snapshots and the action catalog.
//!
//! Everything here is rebuilt from scratch on each refresh; nothing carries
//! over between frames.

use shared::domain::{ActionDescriptor, ActionId, AgentSnapshot, StatusEffect};

/// One percentage bar. `percent` is `100 * value / max` with no clamping and
/// no guard for a zero `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub percent: f64,
    pub text: String,
}

impl Gauge {
    pub fn new(value: f64, max: f64) -> Self {
        Self {
            percent: 100.0 * value / max,
            text: format!("{value}/{max}"),
        }
    }

    /// Fill fraction for a progress bar widget.
    pub fn fraction(&self) -> f32 {
        (self.percent / 100.0) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    Buff,
    Debuff,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectBadge {
    pub kind: BadgeKind,
    pub label: String,
}

fn badges_of(effects: &[StatusEffect], kind: BadgeKind) -> impl Iterator<Item = EffectBadge> + '_ {
    let icon = match kind {
        BadgeKind::Buff => "✨",
        BadgeKind::Debuff => "💀",
    };
    effects.iter().map(move |effect| EffectBadge {
        kind,
        label: format!("{icon} {}", effect.name),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentView {
    pub name: String,
    pub level: u32,
    pub avatar: String,
    pub color: String,
    pub hp: Gauge,
    pub stamina: Gauge,
    pub xp: Gauge,
    pub attack: f64,
    pub defense: f64,
    /// Buffs first, then debuffs, each in server order.
    pub badges: Vec<EffectBadge>,
}

impl AgentView {
    pub fn from_snapshot(agent: &AgentSnapshot) -> Self {
        Self {
            name: agent.name.clone(),
            level: agent.level,
            avatar: agent.avatar.clone(),
            color: agent.color.clone(),
            hp: Gauge::new(agent.hp, agent.max_hp),
            stamina: Gauge::new(agent.stamina, agent.max_stamina),
            xp: Gauge::new(agent.xp, agent.xp_to_next_level),
            attack: agent.attack,
            defense: agent.defense,
            badges: badges_of(&agent.buffs, BadgeKind::Buff)
                .chain(badges_of(&agent.debuffs, BadgeKind::Debuff))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionButtonView {
    pub action_id: ActionId,
    pub number: usize,
    pub title: String,
    pub cost_label: String,
    pub damage_label: String,
    pub description: String,
    pub enabled: bool,
}

/// Buttons for the action catalog; an action is enabled only when the acting
/// agent's displayed stamina covers its cost.
pub fn action_buttons(actions: &[ActionDescriptor], actor: &AgentSnapshot) -> Vec<ActionButtonView> {
    actions
        .iter()
        .enumerate()
        .map(|(index, action)| ActionButtonView {
            action_id: action.id,
            number: index + 1,
            title: format!("{} {}", action.emoji, action.name),
            cost_label: format!("⚡ {}", action.stamina_cost),
            damage_label: format!("💥 {}-{}", action.damage.min, action.damage.max),
            description: action.description.clone(),
            enabled: actor.can_afford(action),
        })
        .collect()
}

pub const XP_PER_LEVEL: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VictoryView {
    pub winner: String,
    pub stats: Vec<String>,
    /// Filled in once the server answers the unlocked-skins lookup.
    pub unlocked_skins: Vec<String>,
}

impl VictoryView {
    /// XP gained is a display-only estimate: the winner's level times 50.
    pub fn new(winner: &str, round: u32, agent1: &AgentSnapshot, agent2: &AgentSnapshot) -> Self {
        let winner_level = [agent1, agent2]
            .into_iter()
            .find(|agent| agent.name == winner)
            .unwrap_or(agent1)
            .level;
        Self {
            winner: winner.to_string(),
            stats: vec![
                format!("Runden: {round}"),
                format!("{}: {} HP", agent1.name, agent1.hp),
                format!("{}: {} HP", agent2.name, agent2.hp),
                format!("XP erhalten: {}", winner_level * XP_PER_LEVEL),
            ],
            unlocked_skins: Vec::new(),
        }
    }
}

/// Display labels for a skin list whose shape the server decides: strings
/// are taken as-is, objects by `emoji`/`avatar` plus `name`, and an object
/// of skins by its values.
pub fn skin_labels(skins: &serde_json::Value) -> Vec<String> {
    use serde_json::Value;

    fn label(skin: &Value) -> Option<String> {
        match skin {
            Value::String(name) => Some(name.clone()),
            Value::Object(fields) => {
                let name = fields.get("name").and_then(Value::as_str)?;
                let icon = ["emoji", "avatar"]
                    .iter()
                    .find_map(|key| fields.get(*key).and_then(Value::as_str));
                Some(match icon {
                    Some(icon) => format!("{icon} {name}"),
                    None => name.to_string(),
                })
            }
            _ => None,
        }
    }

    match skins {
        Value::Array(items) => items.iter().filter_map(label).collect(),
        Value::Object(map) if map.contains_key("name") => label(skins).into_iter().collect(),
        Value::Object(map) => map.values().filter_map(label).collect(),
        other => label(other).into_iter().collect(),
    }
}
