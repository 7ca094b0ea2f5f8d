use crate::config::ClientConfig;
use crate::errors::{ApiError, Error, Result};
use crate::livekit::{SessionCredentials, TokenRequest, TokenResponse, VoiceModeConfig};
use log::{debug, error};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

pub const TOKEN_PATH: &str = "/api/v1/voicemode/token";
pub const CONFIG_PATH: &str = "/api/v1/voicemode/config";

const JSON: &str = "application/json";

/// Simple API client for the VoiceMode endpoints of a web UI server.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct APIClient {
    pub url: String,
    client: reqwest::Client,
}

impl APIClient {
    /// Create a new API client pointing at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from a validated [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            url: config.base_url.clone(),
            client,
        })
    }

    /// Ask the server for a LiveKit token that lets `identity` join `room`.
    ///
    /// A non-success status is returned as [`Error::Api`] carrying the
    /// response body; transport failures come back as [`Error::Http`].
    /// Every failure is logged before it is returned.
    pub async fn get_livekit_token(
        &self,
        token: &str,
        identity: impl Into<String>,
        room: impl Into<String>,
    ) -> Result<TokenResponse> {
        let body = TokenRequest::new(identity, room);
        debug!("requesting LiveKit token for {} in {}", body.identity, body.room);

        let result: Result<TokenResponse> = async {
            let res = self
                .request(Method::POST, TOKEN_PATH, token)
                .json(&body)
                .send()
                .await?;
            read_json(res).await
        }
        .await;

        result.inspect_err(|e| error!("Failed to get LiveKit token: {}", e))
    }

    /// Fetch the server's VoiceMode configuration.
    pub async fn get_voicemode_config(&self, token: &str) -> Result<VoiceModeConfig> {
        let result: Result<VoiceModeConfig> = async {
            let res = self.request(Method::GET, CONFIG_PATH, token).send().await?;
            read_json(res).await
        }
        .await;

        result.inspect_err(|e| error!("Failed to get VoiceMode config: {}", e))
    }

    /// Fetch the config, refuse if VoiceMode is off, then fetch a token.
    ///
    /// The returned url is the token's own url, or the configured
    /// `livekit_url` when the server did not send one.
    pub async fn join_session(
        &self,
        token: &str,
        identity: impl Into<String>,
        room: impl Into<String>,
    ) -> Result<SessionCredentials> {
        let request = TokenRequest::new(identity, room);

        let config = self.get_voicemode_config(token).await?;
        if !config.enabled {
            let err = Error::Disabled(self.url.clone());
            error!("Failed to join {}: {}", request.room, err);
            return Err(err);
        }

        let lk_token = self
            .get_livekit_token(token, request.identity.as_str(), request.room.as_str())
            .await?;
        Ok(SessionCredentials::new(request, lk_token, &config))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(path))
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .bearer_auth(token)
    }
}

/// Turn a response into `T`, or into an [`ApiError`] built from the body
/// when the status is not a success.
async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status();
    let raw = res.bytes().await?;

    if !status.is_success() {
        return Err(ApiError::from_body(status, &raw).into());
    }

    Ok(serde_json::from_slice(&raw)?)
}
