use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{ActionDescriptor, ActionId, BattleId, BotDescriptor, BotId},
    error::ApiError,
    protocol::{
        AiActionRequest, AiActionResponse, HealthResponse, StartBattleRequest,
        StartBattleResponse, TurnRequest, TurnResult,
    },
};
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod error;
pub mod playback;

pub use config::{load_settings, ClientSettings, TurnMode};
pub use error::ClientError;

/// The battle server's HTTP contract. The server owns every rule; the
/// client only reads catalogs and forwards choices.
#[async_trait]
pub trait BattleApi: Send + Sync {
    async fn fetch_bots(&self) -> Result<Vec<BotDescriptor>, ClientError>;
    async fn fetch_actions(&self) -> Result<Vec<ActionDescriptor>, ClientError>;
    async fn start_battle(
        &self,
        request: &StartBattleRequest,
    ) -> Result<StartBattleResponse, ClientError>;
    async fn ai_action(&self, battle_id: &BattleId) -> Result<ActionId, ClientError>;
    async fn submit_turn(&self, request: &TurnRequest) -> Result<TurnResult, ClientError>;
    async fn battle_summary(&self, battle_id: &BattleId)
        -> Result<serde_json::Value, ClientError>;
    /// Every skin the bot has, locked or not. Shape is server-defined.
    async fn fetch_skins(&self, bot_id: &BotId) -> Result<serde_json::Value, ClientError>;
    async fn unlocked_skins(
        &self,
        bot_id: &BotId,
        level: u32,
    ) -> Result<serde_json::Value, ClientError>;
    async fn health(&self) -> Result<HealthResponse, ClientError>;
}

pub struct BattleClient {
    http: Client,
    base_url: Url,
}

impl BattleClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_http(server_url, Client::new())
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::HttpClient)?;
        Self::with_http(&settings.server_url, http)
    }

    fn with_http(server_url: &str, http: Client) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(server_url.trim()).map_err(|source| {
            ClientError::InvalidUrl {
                url: server_url.to_string(),
                source,
            }
        })?;
        // Endpoints are joined as relative paths, so the base must end in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|source| ClientError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                path: path.to_string(),
                source,
            })?;
        decode_response(path, res).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let res = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                path: path.to_string(),
                source,
            })?;
        decode_response(path, res).await
    }
}

async fn decode_response<T: DeserializeOwned>(path: &str, res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if !status.is_success() {
        // Error bodies are best-effort; a non-JSON body still yields the status.
        let body = res.json::<ApiError>().await.ok();
        return Err(ClientError::from_status(path, status.as_u16(), body));
    }
    res.json::<T>().await.map_err(|source| ClientError::Decode {
        path: path.to_string(),
        source,
    })
}

#[async_trait]
impl BattleApi for BattleClient {
    async fn fetch_bots(&self) -> Result<Vec<BotDescriptor>, ClientError> {
        self.get_json("api/bots").await
    }

    async fn fetch_actions(&self) -> Result<Vec<ActionDescriptor>, ClientError> {
        self.get_json("api/actions").await
    }

    async fn start_battle(
        &self,
        request: &StartBattleRequest,
    ) -> Result<StartBattleResponse, ClientError> {
        let started: StartBattleResponse = self.post_json("api/battle/start", request).await?;
        info!(
            battle_id = %started.battle_id,
            agent1 = %started.agent1.name,
            agent2 = %started.agent2.name,
            "battle started"
        );
        Ok(started)
    }

    async fn ai_action(&self, battle_id: &BattleId) -> Result<ActionId, ClientError> {
        let res: AiActionResponse = self
            .post_json(
                "api/battle/ai-action",
                &AiActionRequest {
                    battle_id: battle_id.clone(),
                },
            )
            .await?;
        Ok(res.action_id)
    }

    async fn submit_turn(&self, request: &TurnRequest) -> Result<TurnResult, ClientError> {
        self.post_json("api/battle/turn", request).await
    }

    async fn battle_summary(
        &self,
        battle_id: &BattleId,
    ) -> Result<serde_json::Value, ClientError> {
        self.get_json(&format!("api/battle/summary/{battle_id}"))
            .await
    }

    async fn fetch_skins(&self, bot_id: &BotId) -> Result<serde_json::Value, ClientError> {
        self.get_json(&format!("api/bots/{bot_id}/skins")).await
    }

    async fn unlocked_skins(
        &self,
        bot_id: &BotId,
        level: u32,
    ) -> Result<serde_json::Value, ClientError> {
        self.get_json(&format!("api/bots/{bot_id}/unlocked-skins/{level}"))
            .await
    }

    async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get_json("health").await
    }
}

/// Bot roster and action list, fetched once per client session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub bots: Vec<BotDescriptor>,
    pub actions: Vec<ActionDescriptor>,
}

impl Catalog {
    pub fn bot(&self, id: &BotId) -> Option<&BotDescriptor> {
        self.bots.iter().find(|bot| &bot.id == id)
    }

    pub fn action(&self, id: ActionId) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|action| action.id == id)
    }
}

/// Fetches both catalogs. A failing catalog is logged and left empty; the
/// other one still loads.
pub async fn load_catalog<A: BattleApi + ?Sized>(api: &A) -> Catalog {
    let (bots, actions) = futures::join!(api.fetch_bots(), api.fetch_actions());

    let bots = bots.unwrap_or_else(|err| {
        warn!("failed to load bot catalog: {err}");
        Vec::new()
    });
    let actions = actions.unwrap_or_else(|err| {
        warn!("failed to load action catalog: {err}");
        Vec::new()
    });
    info!(bots = bots.len(), actions = actions.len(), "catalog loaded");

    Catalog { bots, actions }
}

/// Submits one turn in the given mode. In [`TurnMode::AiAssisted`] the
/// opponent's action is requested from the server first.
pub async fn play_turn<A: BattleApi + ?Sized>(
    api: &A,
    mode: TurnMode,
    battle_id: &BattleId,
    action_id: ActionId,
) -> Result<TurnResult, ClientError> {
    let request = match mode {
        TurnMode::ServerDecides => TurnRequest::Single {
            battle_id: battle_id.clone(),
            action_id,
        },
        TurnMode::AiAssisted => {
            let opponent_action = api.ai_action(battle_id).await?;
            debug!(%battle_id, %opponent_action, "ai picked opponent action");
            TurnRequest::Dual {
                battle_id: battle_id.clone(),
                action1_id: action_id,
                action2_id: opponent_action,
            }
        }
    };

    let result = api.submit_turn(&request).await?;
    info!(
        %battle_id,
        round = result.round,
        outcomes = result.outcomes.len(),
        over = result.is_over(),
        "turn resolved"
    );
    Ok(result)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
