//! HTTP client for the leaderboard server.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use derive_more::{Display, Error, From};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::{
    ErrorResponse, LeaderboardResponse, PlayerResponse, RegisterPlayerRequest, SubmitScoreRequest,
    SubmitScoreResponse,
};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure talking to the leaderboard server.
#[derive(Debug, Display, Error, From)]
pub enum ClientError {
    /// The request could not be sent or the reply not decoded.
    #[display("Transport error: {_0}")]
    Transport(reqwest::Error),
    /// The server answered with a non-success status.
    #[display("Server rejected request ({status}): {message}")]
    #[from(ignore)]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error text from the body.
        message: String,
    },
}

/// Operations the game needs from the leaderboard.
#[async_trait]
pub trait LeaderboardApi: Send + Sync + Debug {
    /// Registers the player, or returns the existing registration.
    async fn register_player(
        &self,
        name: &str,
        employee_id: &str,
    ) -> Result<PlayerResponse, ClientError>;

    /// Submits a finished game.
    async fn submit_score(
        &self,
        request: &SubmitScoreRequest,
    ) -> Result<SubmitScoreResponse, ClientError>;
}

/// Leaderboard client over HTTP.
#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    base_url: String,
    client: reqwest::Client,
}

impl LeaderboardClient {
    /// Creates a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    #[instrument(skip(base_url))]
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        info!(base_url = %base_url, "Leaderboard client created");
        Ok(Self { base_url, client })
    }

    /// Server base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the current leaderboard.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn leaderboard(&self, limit: usize) -> Result<LeaderboardResponse, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/leaderboard?limit={}", self.base_url, limit))
            .send()
            .await?;
        decode(response).await
    }
}

/// Turns a response into `T`, or a [`ClientError::Rejected`] with the server's message.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        debug!(%status, "Request succeeded");
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    warn!(%status, message = %message, "Request rejected");
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl LeaderboardApi for LeaderboardClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn register_player(
        &self,
        name: &str,
        employee_id: &str,
    ) -> Result<PlayerResponse, ClientError> {
        let body = RegisterPlayerRequest {
            name: name.to_string(),
            employee_id: employee_id.to_string(),
        };
        let response = self
            .client
            .post(format!("{}/api/players", self.base_url))
            .json(&body)
            .send()
            .await?;
        let player: PlayerResponse = decode(response).await?;
        info!(player_id = player.id, "Player registered");
        Ok(player)
    }

    #[instrument(skip(self, request), fields(base_url = %self.base_url, player_id = request.player_id, score = request.score))]
    async fn submit_score(
        &self,
        request: &SubmitScoreRequest,
    ) -> Result<SubmitScoreResponse, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/scores", self.base_url))
            .json(request)
            .send()
            .await?;
        let reply: SubmitScoreResponse = decode(response).await?;
        info!(game_record_id = reply.game_record_id, "Score recorded");
        Ok(reply)
    }
}
