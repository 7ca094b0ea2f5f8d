use crate::api::APIClient;
use crate::errors::Error;
use crate::livekit::{SessionCredentials, TokenRequest, TokenResponse, VoiceModeConfig};
use log::{debug, warn};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoiceModeCmd {
    FetchConfig(Uuid),
    FetchToken(Uuid, TokenRequest),
    /// config check followed by a token request, see [`APIClient::join_session`]
    Join(Uuid, TokenRequest),
}

impl VoiceModeCmd {
    pub fn id(&self) -> Uuid {
        match self {
            VoiceModeCmd::FetchConfig(id)
            | VoiceModeCmd::FetchToken(id, _)
            | VoiceModeCmd::Join(id, _) => *id,
        }
    }
}

/// Why a command failed. `status` and `body` are set when the server
/// answered with a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Failure {
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<Value>,
}

impl From<Error> for Failure {
    fn from(e: Error) -> Self {
        let message = e.to_string();
        match e {
            Error::Api(api) => Self {
                message,
                status: Some(api.status.as_u16()),
                body: Some(api.body),
            },
            _ => Self {
                message,
                status: None,
                body: None,
            },
        }
    }
}

/// Outcome of a [`VoiceModeCmd`], tagged with the id of the command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VoiceModeEvent {
    Config(Uuid, VoiceModeConfig),
    Token(Uuid, TokenResponse),
    Joined(Uuid, SessionCredentials),
    Failed(Uuid, Failure),
}

impl VoiceModeEvent {
    pub fn id(&self) -> Uuid {
        match self {
            VoiceModeEvent::Config(id, _)
            | VoiceModeEvent::Token(id, _)
            | VoiceModeEvent::Joined(id, _)
            | VoiceModeEvent::Failed(id, _) => *id,
        }
    }

    fn from_result<T>(id: Uuid, result: Result<T, Error>, ok: fn(Uuid, T) -> Self) -> Self {
        match result {
            Ok(value) => ok(id, value),
            Err(e) => VoiceModeEvent::Failed(id, e.into()),
        }
    }
}

/// Runs VoiceMode requests in the background on a tokio runtime.
///
/// Each command is handled on its own task, so events can arrive in a
/// different order than the commands were sent; match them up by id.
pub struct VoiceModeService {
    service_handle: tokio::task::JoinHandle<()>,
    cmd_tx: UnboundedSender<VoiceModeCmd>,
    event_rx: UnboundedReceiver<VoiceModeEvent>,
}

impl VoiceModeService {
    pub fn new(handle: &tokio::runtime::Handle, client: APIClient, token: impl Into<String>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let token = token.into();
        let service_handle = handle.spawn(voicemode_service(cmd_rx, event_tx, client, token));
        Self {
            service_handle,
            cmd_tx,
            event_rx,
        }
    }

    pub fn fetch_config(&self) -> Result<Uuid, mpsc::error::SendError<VoiceModeCmd>> {
        self.send(VoiceModeCmd::FetchConfig(Uuid::new_v4()))
    }

    pub fn fetch_token(
        &self,
        identity: impl Into<String>,
        room: impl Into<String>,
    ) -> Result<Uuid, mpsc::error::SendError<VoiceModeCmd>> {
        self.send(VoiceModeCmd::FetchToken(
            Uuid::new_v4(),
            TokenRequest::new(identity, room),
        ))
    }

    pub fn join(
        &self,
        identity: impl Into<String>,
        room: impl Into<String>,
    ) -> Result<Uuid, mpsc::error::SendError<VoiceModeCmd>> {
        self.send(VoiceModeCmd::Join(Uuid::new_v4(), TokenRequest::new(identity, room)))
    }

    fn send(&self, cmd: VoiceModeCmd) -> Result<Uuid, mpsc::error::SendError<VoiceModeCmd>> {
        let id = cmd.id();
        self.cmd_tx.send(cmd)?;
        Ok(id)
    }

    pub fn try_recv(&mut self) -> Option<VoiceModeEvent> {
        self.event_rx.try_recv().ok()
    }

    pub async fn recv(&mut self) -> Option<VoiceModeEvent> {
        self.event_rx.recv().await
    }
}

impl Drop for VoiceModeService {
    fn drop(&mut self) {
        self.service_handle.abort();
    }
}

async fn voicemode_service(
    mut cmd_rx: UnboundedReceiver<VoiceModeCmd>,
    event_tx: UnboundedSender<VoiceModeEvent>,
    client: APIClient,
    token: String,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        debug!("voicemode command {:?}", cmd);
        let client = client.clone();
        let token = token.clone();
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            let event = handle_cmd(&client, &token, cmd).await;
            if let Err(e) = event_tx.send(event) {
                warn!("dropping voicemode event, receiver is gone: {:?}", e.0);
            }
        });
    }
}

async fn handle_cmd(client: &APIClient, token: &str, cmd: VoiceModeCmd) -> VoiceModeEvent {
    match cmd {
        VoiceModeCmd::FetchConfig(id) => VoiceModeEvent::from_result(
            id,
            client.get_voicemode_config(token).await,
            VoiceModeEvent::Config,
        ),
        VoiceModeCmd::FetchToken(id, request) => VoiceModeEvent::from_result(
            id,
            client
                .get_livekit_token(token, request.identity, request.room)
                .await,
            VoiceModeEvent::Token,
        ),
        VoiceModeCmd::Join(id, request) => VoiceModeEvent::from_result(
            id,
            client.join_session(token, request.identity, request.room).await,
            VoiceModeEvent::Joined,
        ),
    }
}
