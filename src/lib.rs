//! Client for the VoiceMode endpoints of a web UI server: fetch a LiveKit
//! session token and the VoiceMode configuration.

pub mod api;
pub mod config;
pub mod errors;
pub mod livekit;
pub mod services;

pub use api::APIClient;
pub use config::ClientConfig;
pub use errors::{ApiError, Error, Result};
pub use livekit::{SessionCredentials, TokenRequest, TokenResponse, VoiceModeConfig};
pub use services::{Failure, VoiceModeCmd, VoiceModeEvent, VoiceModeService};
