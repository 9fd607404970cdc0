use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

macro_rules! token_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }
    };
}

id_newtype!(ActionId);
token_newtype!(BotId);
token_newtype!(BattleId);

pub const DEFAULT_AVATAR: &str = "🤖";
pub const DEFAULT_COLOR: &str = "#00ff00";

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A buff or debuff currently attached to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Stat modifiers and anything else the server attaches.
    #[serde(flatten)]
    pub modifiers: BTreeMap<String, serde_json::Value>,
}

impl StatusEffect {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: None,
            modifiers: BTreeMap::new(),
        }
    }
}

/// Last state of one combatant as reported by the server.
///
/// Snapshots are never merged: every response replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub name: String,
    pub level: u32,
    pub hp: f64,
    pub max_hp: f64,
    pub stamina: f64,
    pub max_stamina: f64,
    #[serde(default)]
    pub xp: f64,
    #[serde(default)]
    pub xp_to_next_level: f64,
    pub attack: f64,
    pub defense: f64,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub buffs: Vec<StatusEffect>,
    #[serde(default)]
    pub debuffs: Vec<StatusEffect>,
}

impl AgentSnapshot {
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0.0
    }

    /// Local affordability hint; the server stays the final arbiter.
    pub fn can_afford(&self, action: &ActionDescriptor) -> bool {
        f64::from(action.stamina_cost) <= self.stamina
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: u32,
    pub max: u32,
}

/// Catalog entry for an action. Accepts both `damage_range: [min, max]` and
/// the flat `damage_min`/`damage_max` spelling on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ActionDescriptorWire", into = "ActionDescriptorWire")]
pub struct ActionDescriptor {
    pub id: ActionId,
    pub name: String,
    pub description: String,
    pub emoji: String,
    pub stamina_cost: u32,
    pub damage: DamageRange,
    pub effects: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActionDescriptorWire {
    id: ActionId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    emoji: String,
    stamina_cost: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    damage_range: Option<(u32, u32)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    damage_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    damage_max: Option<u32>,
    #[serde(default)]
    effects: Vec<String>,
}

impl From<ActionDescriptorWire> for ActionDescriptor {
    fn from(wire: ActionDescriptorWire) -> Self {
        let (min, max) = match wire.damage_range {
            Some(range) => range,
            None => {
                let min = wire.damage_min.unwrap_or(0);
                (min, wire.damage_max.unwrap_or(min))
            }
        };
        Self {
            id: wire.id,
            name: wire.name,
            description: wire.description,
            emoji: wire.emoji,
            stamina_cost: wire.stamina_cost,
            damage: DamageRange { min, max },
            effects: wire.effects,
        }
    }
}

impl From<ActionDescriptor> for ActionDescriptorWire {
    fn from(action: ActionDescriptor) -> Self {
        Self {
            id: action.id,
            name: action.name,
            description: action.description,
            emoji: action.emoji,
            stamina_cost: action.stamina_cost,
            damage_range: Some((action.damage.min, action.damage.max)),
            damage_min: None,
            damage_max: None,
            effects: action.effects,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BotStats {
    #[serde(default)]
    pub hp_bonus: i64,
    #[serde(default)]
    pub attack_bonus: i64,
    #[serde(default)]
    pub defense_bonus: i64,
    #[serde(default)]
    pub stamina_bonus: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotDescriptor {
    pub id: BotId,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub stats: BotStats,
    #[serde(default)]
    pub special: String,
}

/// What one combatant did during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    #[serde(default)]
    pub attacker: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub damage: f64,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub comment: String,
}
