use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("battle not found: {message}")]
    BattleNotFound { message: String },
    #[error("battle expired: {message}")]
    BattleExpired { message: String },
    #[error("{path} returned HTTP {status}")]
    Status {
        path: String,
        status: u16,
        body: Option<ApiError>,
    },
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// Maps a non-success response onto the most specific variant.
    pub(crate) fn from_status(path: &str, status: u16, body: Option<ApiError>) -> Self {
        let code = body.as_ref().and_then(|b| b.code);
        let message = body
            .as_ref()
            .map(|b| b.error.clone())
            .unwrap_or_else(|| format!("{path} returned HTTP {status}"));
        match (status, code) {
            (410, _) | (_, Some(ErrorCode::BattleExpired)) => Self::BattleExpired { message },
            (404, _) | (_, Some(ErrorCode::BattleNotFound)) => Self::BattleNotFound { message },
            _ => Self::Status {
                path: path.to_string(),
                status,
                body,
            },
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown turn mode '{0}' (expected 'server' or 'ai')")]
pub struct ParseTurnModeError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gone_maps_to_expired_even_without_body() {
        let err = ClientError::from_status("api/battle/turn", 410, None);
        assert!(matches!(err, ClientError::BattleExpired { .. }));
    }

    #[test]
    fn not_found_keeps_server_message() {
        let body = ApiError::new(ErrorCode::BattleNotFound, "Battle abgelaufen oder nicht gefunden");
        let err = ClientError::from_status("api/battle/turn", 404, Some(body));
        assert_eq!(
            err.to_string(),
            "battle not found: Battle abgelaufen oder nicht gefunden"
        );
    }

    #[test]
    fn other_statuses_keep_path_and_code() {
        let err = ClientError::from_status("api/battle/start", 500, None);
        match err {
            ClientError::Status { path, status, body } => {
                assert_eq!(path, "api/battle/start");
                assert_eq!(status, 500);
                assert!(body.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
