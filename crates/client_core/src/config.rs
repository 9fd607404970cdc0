use std::{fmt, fs, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use shared::protocol::{DEFAULT_AGENT1_NAME, DEFAULT_AGENT2_NAME};
use tracing::warn;

use crate::error::ParseTurnModeError;

pub const CONFIG_FILE: &str = "battle_client.toml";

/// How a turn is submitted to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnMode {
    /// `{battle_id, action_id}`; the server picks the opponent's action.
    #[default]
    ServerDecides,
    /// Ask `/api/battle/ai-action` first, then submit both action ids.
    AiAssisted,
}

impl FromStr for TurnMode {
    type Err = ParseTurnModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" | "server_decides" | "single" => Ok(Self::ServerDecides),
            "ai" | "ai_assisted" | "dual" => Ok(Self::AiAssisted),
            other => Err(ParseTurnModeError(other.to_string())),
        }
    }
}

impl fmt::Display for TurnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerDecides => f.write_str("server"),
            Self::AiAssisted => f.write_str("ai"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub turn_mode: TurnMode,
    pub request_timeout: Option<Duration>,
    pub agent1_name: String,
    pub agent2_name: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5001".into(),
            turn_mode: TurnMode::default(),
            request_timeout: None,
            agent1_name: DEFAULT_AGENT1_NAME.into(),
            agent2_name: DEFAULT_AGENT2_NAME.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    turn_mode: Option<String>,
    request_timeout_secs: Option<u64>,
    agent1_name: Option<String>,
    agent2_name: Option<String>,
}

/// Defaults, then `battle_client.toml` in the working directory, then the
/// process environment.
pub fn load_settings() -> ClientSettings {
    let mut settings = load_settings_from(Path::new(CONFIG_FILE));
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();

    let Ok(raw) = fs::read_to_string(path) else {
        return settings;
    };
    match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
        Err(err) => warn!(path = %path.display(), "ignoring unreadable client config: {err}"),
    }

    settings
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.turn_mode {
        match v.parse() {
            Ok(mode) => settings.turn_mode = mode,
            Err(err) => warn!("ignoring turn_mode from config file: {err}"),
        }
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout = timeout_from_secs(v);
    }
    if let Some(v) = file_cfg.agent1_name {
        settings.agent1_name = v;
    }
    if let Some(v) = file_cfg.agent2_name {
        settings.agent2_name = v;
    }
}

pub fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BATTLE_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__TURN_MODE") {
        match v.parse() {
            Ok(mode) => settings.turn_mode = mode,
            Err(err) => warn!("ignoring APP__TURN_MODE: {err}"),
        }
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout = timeout_from_secs(parsed),
            Err(err) => warn!("ignoring APP__REQUEST_TIMEOUT_SECS '{v}': {err}"),
        }
    }

    if let Some(v) = lookup("APP__AGENT1_NAME") {
        settings.agent1_name = v;
    }
    if let Some(v) = lookup("APP__AGENT2_NAME") {
        settings.agent2_name = v;
    }
}

// Zero disables the timeout.
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_config(contents: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("battle_client_test_{suffix}.toml"));
        fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings_from(Path::new("/nonexistent/battle_client.toml"));
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let path = temp_config(
            r#"
server_url = "http://battle.local:8080"
turn_mode = "ai"
request_timeout_secs = 5
agent2_name = "Bot Beta"
"#,
        );
        let settings = load_settings_from(&path);
        fs::remove_file(&path).expect("cleanup");

        assert_eq!(settings.server_url, "http://battle.local:8080");
        assert_eq!(settings.turn_mode, TurnMode::AiAssisted);
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(settings.agent1_name, DEFAULT_AGENT1_NAME);
        assert_eq!(settings.agent2_name, "Bot Beta");
    }

    #[test]
    fn malformed_file_is_ignored() {
        let path = temp_config("server_url = [");
        let settings = load_settings_from(&path);
        fs::remove_file(&path).expect("cleanup");
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn env_overrides_win_and_app_prefix_beats_legacy_name() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("BATTLE_SERVER_URL", "http://legacy:1"),
            ("APP__SERVER_URL", "http://app:2"),
            ("APP__TURN_MODE", "dual"),
            ("APP__REQUEST_TIMEOUT_SECS", "0"),
        ]);
        let mut settings = ClientSettings {
            request_timeout: Some(Duration::from_secs(9)),
            ..ClientSettings::default()
        };
        apply_env_overrides(&mut settings, |name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(settings.server_url, "http://app:2");
        assert_eq!(settings.turn_mode, TurnMode::AiAssisted);
        assert_eq!(settings.request_timeout, None);
    }

    #[test]
    fn invalid_turn_mode_keeps_previous_value() {
        let mut settings = ClientSettings::default();
        apply_env_overrides(&mut settings, |name| {
            (name == "APP__TURN_MODE").then(|| "sideways".to_string())
        });
        assert_eq!(settings.turn_mode, TurnMode::ServerDecides);
    }

    #[test]
    fn unparsable_timeout_keeps_previous_value() {
        let mut settings = ClientSettings {
            request_timeout: Some(Duration::from_secs(3)),
            ..ClientSettings::default()
        };
        apply_env_overrides(&mut settings, |name| {
            (name == "APP__REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(3)));
    }
}
