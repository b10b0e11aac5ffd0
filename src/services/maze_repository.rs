use crate::constants::{MAZE_LOOKUP_PATH, RESULT_SUBMIT_PATH};
use crate::error::{AppError, Result};
use crate::models::{MazeDefinition, MazeDocument, PlayResult};
use crate::services::secure_channel::{
    ChannelFailure, ChannelRequest, ChannelResponse, CredentialSource, ReqwestTransport,
    SecureChannel, Transport,
};
use std::sync::Arc;

/// Fetches maze geometry and reports play results through the secure channel.
pub struct MazeRepository<T = ReqwestTransport> {
    channel: Arc<SecureChannel<T>>,
    credentials: Arc<dyn CredentialSource>,
}

impl<T: Transport> MazeRepository<T> {
    pub fn new(channel: Arc<SecureChannel<T>>, credentials: Arc<dyn CredentialSource>) -> Self {
        MazeRepository {
            channel,
            credentials,
        }
    }

    /// `GET maps?name=<name>`
    pub async fn fetch_maze(&self, name: &str) -> Result<MazeDefinition> {
        let path = format!("{}?name={}", MAZE_LOOKUP_PATH, urlencoding::encode(name));
        let credentials = self.credentials.load().await;

        let response = self
            .channel
            .send(&ChannelRequest::get(path), &credentials)
            .await?;
        let body = require_success(response)?;

        let document: MazeDocument = serde_json::from_str(&body)?;
        let maze = MazeDefinition::try_from(document)?;

        tracing::info!(
            maze = %maze.name,
            corridors = maze.corridors.len(),
            "Fetched maze '{}' with {} corridors",
            maze.name,
            maze.corridors.len()
        );
        Ok(maze)
    }

    /// `POST results` with the JSON-encoded result. Returns the status code.
    pub async fn submit_result(&self, result: &PlayResult) -> Result<u16> {
        let body = serde_json::to_string(result)?;
        let credentials = self.credentials.load().await;

        let response = self
            .channel
            .send(&ChannelRequest::post(RESULT_SUBMIT_PATH, body), &credentials)
            .await?;
        let status = response.status;
        require_success(response)?;

        tracing::info!(
            session_id = %result.session_id,
            status,
            "Submitted result for maze '{}'",
            result.maze_name
        );
        Ok(status)
    }
}

/// Unwrap the body of a 2xx response
fn require_success(response: ChannelResponse) -> Result<String> {
    if !response.is_success() {
        return Err(AppError::Backend {
            status: response.status,
            message: response.body.unwrap_or_default(),
        });
    }
    response.body.ok_or_else(|| {
        AppError::Channel(ChannelFailure::ProtocolDecode(format!(
            "HTTP {} without a readable body",
            response.status
        )))
    })
}
