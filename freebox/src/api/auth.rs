//! Login challenge/response and app authorization
//!
//! A session is opened by signing the challenge from `GET /login/` with the
//! app token (HMAC-SHA1, hex encoded) and posting it to `/login/session/`.
//! The app token itself comes from `POST /login/authorize/`, once the user
//! has confirmed the request on the router's front panel.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use super::{ApiError, Client};

type HmacSha1 = Hmac<Sha1>;

/// Lowercase hex HMAC-SHA1 of `challenge`, keyed by the app token
pub fn session_password(app_token: &str, challenge: &str) -> Result<String, ApiError> {
    let mut mac = HmacSha1::new_from_slice(app_token.as_bytes())
        .map_err(|e| ApiError::Auth(format!("invalid app token: {}", e)))?;
    mac.update(challenge.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Deserialize)]
struct LoginChallenge {
    #[serde(default)]
    challenge: String,
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    app_id: &'a str,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SessionResult {
    #[serde(default)]
    session_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizationRequest {
    pub app_id: String,
    pub app_name: String,
    pub app_version: String,
    pub device_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationGrant {
    pub app_token: String,
    pub track_id: i64,
}

/// State of a pending authorization request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Unknown,
    Pending,
    Timeout,
    Granted,
    Denied,
}

impl AuthorizationStatus {
    pub fn is_final(self) -> bool {
        !matches!(self, AuthorizationStatus::Pending)
    }
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            AuthorizationStatus::Unknown => "unknown",
            AuthorizationStatus::Pending => "pending",
            AuthorizationStatus::Timeout => "timeout",
            AuthorizationStatus::Granted => "granted",
            AuthorizationStatus::Denied => "denied",
        };
        f.write_str(status)
    }
}

#[derive(Debug, Deserialize)]
struct AuthorizationProgress {
    status: AuthorizationStatus,
}

pub struct AuthApi<'a> {
    client: &'a Client,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Runs the challenge/response login and stores the session token on
    /// the client.
    pub async fn open_session(&self) -> Result<(), ApiError> {
        let login: LoginChallenge = self.client.get("/login/").await?;
        if login.challenge.is_empty() {
            return Err(ApiError::Auth("empty login challenge".to_string()));
        }

        let request = SessionRequest {
            app_id: self.client.app_id(),
            password: session_password(self.client.app_token(), &login.challenge)?,
        };

        let session: SessionResult = match self.client.post("/login/session/", &request).await {
            Ok(session) => session,
            Err(ApiError::Status {
                message,
                error_code,
                ..
            }) => {
                return Err(ApiError::Auth(format!(
                    "no session token returned (msg={}, error_code={})",
                    message,
                    error_code.unwrap_or_default()
                )))
            }
            Err(e) => return Err(e),
        };

        match session.session_token {
            Some(token) if !token.is_empty() => {
                self.client.set_session_token(token).await;
                tracing::debug!("Opened Freebox session for {}", self.client.app_id());
                Ok(())
            }
            _ => Err(ApiError::Auth("no session token returned".to_string())),
        }
    }

    /// Asks the router for a new app token; the user must confirm it on the
    /// front panel before it can open sessions.
    pub async fn request_authorization(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationGrant, ApiError> {
        self.client.post("/login/authorize/", request).await
    }

    pub async fn authorization_status(
        &self,
        track_id: i64,
    ) -> Result<AuthorizationStatus, ApiError> {
        let progress: AuthorizationProgress = self
            .client
            .get(&format!("/login/authorize/{}", track_id))
            .await?;
        Ok(progress.status)
    }
}
