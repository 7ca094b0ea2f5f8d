use serde_derive::{Serialize, Deserialize};

/// Body of `POST /api/v1/voicemode/token`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenRequest {
    pub identity: String,
    pub room: String,
}

impl TokenRequest {
    pub fn new(identity: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            room: room.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenResponse {
    pub token: String,
    /// empty when the server left the url out
    #[serde(default)]
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VoiceModeConfig {
    pub enabled: bool,
    pub livekit_url: String,
}

/// Everything a caller needs to connect to a LiveKit room.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionCredentials {
    pub identity: String,
    pub room: String,
    pub token: String,
    pub url: String,
}

impl SessionCredentials {
    /// Combine a token with the request that produced it, using the
    /// config's `livekit_url` when the token response carried no url.
    pub fn new(request: TokenRequest, token: TokenResponse, config: &VoiceModeConfig) -> Self {
        let url = if token.url.is_empty() {
            config.livekit_url.clone()
        } else {
            token.url
        };
        Self {
            identity: request.identity,
            room: request.room,
            token: token.token,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VoiceModeConfig {
        VoiceModeConfig {
            enabled: true,
            livekit_url: "wss://livekit.example.com".to_string(),
        }
    }

    #[test]
    fn token_request_serializes_identity_and_room() -> Result<(), serde_json::Error> {
        let request = TokenRequest::new("alice", "lobby");
        let value = serde_json::to_value(&request)?;
        assert_eq!(value, serde_json::json!({ "identity": "alice", "room": "lobby" }));
        Ok(())
    }

    #[test]
    fn token_response_without_url_defaults_to_empty() -> Result<(), serde_json::Error> {
        let response: TokenResponse = serde_json::from_str(r#"{"token":"abc"}"#)?;
        assert_eq!(response.token, "abc");
        assert!(response.url.is_empty());
        Ok(())
    }

    #[test]
    fn config_requires_both_fields() {
        let parsed = serde_json::from_str::<VoiceModeConfig>(r#"{"enabled":true}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn credentials_prefer_token_url() {
        let token = TokenResponse {
            token: "jwt".to_string(),
            url: "wss://edge.example.com".to_string(),
        };
        let creds = SessionCredentials::new(TokenRequest::new("bob", "r1"), token, &config());
        assert_eq!(creds.url, "wss://edge.example.com");
        assert_eq!(creds.identity, "bob");
        assert_eq!(creds.room, "r1");
        assert_eq!(creds.token, "jwt");
    }

    #[test]
    fn credentials_fall_back_to_config_url() {
        let token = TokenResponse {
            token: "jwt".to_string(),
            url: String::new(),
        };
        let creds = SessionCredentials::new(TokenRequest::new("bob", "r1"), token, &config());
        assert_eq!(creds.url, "wss://livekit.example.com");
    }
}
