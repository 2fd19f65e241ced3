use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::error::ApiError;
use super::response::Envelope;

/// Header carrying the session token on authenticated calls
pub const AUTH_HEADER: &str = "X-Fbx-App-Auth";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Freebox OS API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    app_id: String,
    app_token: String,
    session_token: RwLock<Option<String>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("app_id", &self.inner.app_id)
            .field("app_token", &"<redacted>")
            .finish()
    }
}

impl Client {
    /// Create a client for `base_url`, e.g. `http://mafreebox.freebox.fr/api/v8`.
    /// No request is made until a session is opened.
    pub fn new(base_url: &str, app_id: &str, app_token: &str) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ApiError::InvalidUrl(format!(
                "{}: expected an absolute http(s) URL",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!("Configured Freebox client for {} (app_id={})", base_url, app_id);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                app_id: app_id.to_string(),
                app_token: app_token.to_string(),
                session_token: RwLock::new(None),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn app_id(&self) -> &str {
        &self.inner.app_id
    }

    pub(crate) fn app_token(&self) -> &str {
        &self.inner.app_token
    }

    pub async fn has_session(&self) -> bool {
        self.inner.session_token.read().await.is_some()
    }

    pub(crate) async fn set_session_token(&self, token: String) {
        *self.inner.session_token.write().await = Some(token);
    }

    /// Login and authorization operations
    pub fn auth(&self) -> crate::api::auth::AuthApi<'_> {
        crate::api::auth::AuthApi::new(self)
    }

    /// DHCP server configuration
    pub fn dhcp(&self) -> crate::api::dhcp::DhcpApi<'_> {
        crate::api::dhcp::DhcpApi::new(self)
    }

    /// DHCP static leases
    pub fn static_leases(&self) -> crate::api::static_lease::StaticLeaseApi<'_> {
        crate::api::static_lease::StaticLeaseApi::new(self)
    }

    /// Port forwarding rules
    pub fn port_forwards(&self) -> crate::api::port_forward::PortForwardApi<'_> {
        crate::api::port_forward::PortForwardApi::new(self)
    }

    /// Execute a GET request and unwrap the envelope result
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (status, body) = self
            .execute(Method::GET, path, None::<&()>, &[StatusCode::OK])
            .await?;
        decode::<T>(&body)?.into_result(status.as_u16())
    }

    /// Execute a GET request on a list endpoint; no result means no items
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let (status, body) = self
            .execute(Method::GET, path, None::<&()>, &[StatusCode::OK])
            .await?;
        decode::<Vec<T>>(&body)?.into_list(status.as_u16())
    }

    /// Execute a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let (status, body) = self
            .execute(
                Method::POST,
                path,
                Some(body),
                &[StatusCode::OK, StatusCode::CREATED],
            )
            .await?;
        decode::<T>(&body)?.into_result(status.as_u16())
    }

    /// Execute a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let (status, body) = self
            .execute(Method::PUT, path, Some(body), &[StatusCode::OK])
            .await?;
        decode::<T>(&body)?.into_result(status.as_u16())
    }

    /// Execute a DELETE request. An empty 204 answer counts as success.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let (status, body) = self
            .execute(
                Method::DELETE,
                path,
                None::<&()>,
                &[StatusCode::OK, StatusCode::NO_CONTENT],
            )
            .await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        decode::<serde_json::Value>(&body)?.into_empty(status.as_u16())
    }

    async fn execute<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        accepted: &[StatusCode],
    ) -> Result<(StatusCode, String), ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);

        tracing::debug!("{} request to: {}", method, url);

        let mut request = self.inner.http_client.request(method, &url);
        let session_token = self.inner.session_token.read().await.clone();
        if let Some(token) = session_token {
            request = request.header(AUTH_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !accepted.contains(&status) {
            return Err(status_error(status, &text));
        }

        Ok((status, text))
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!("Failed to deserialize response: {}", e);
        ApiError::Parse(e.to_string())
    })
}

/// Builds the error for an unexpected HTTP status, keeping the envelope's
/// msg and error_code when the body has one.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let envelope = serde_json::from_str::<Envelope<serde_json::Value>>(body).ok();

    match envelope {
        Some(envelope) if envelope.msg.is_some() || envelope.error_code.is_some() => {
            envelope.into_error(status.as_u16())
        }
        _ if status == StatusCode::NOT_FOUND => ApiError::NotFound {
            status: status.as_u16(),
            message: body.trim().to_string(),
            error_code: None,
        },
        _ => ApiError::Status {
            status: status.as_u16(),
            message: body.trim().to_string(),
            error_code: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Item {
        id: i64,
    }

    #[test]
    fn client_rejects_invalid_base_urls() {
        for url in ["not a url", "ftp://mafreebox.freebox.fr/api/v8", "/api/v8"] {
            assert!(
                matches!(Client::new(url, "app", "token"), Err(ApiError::InvalidUrl(_))),
                "{} accepted",
                url
            );
        }
    }

    #[test]
    fn client_debug_redacts_app_token() {
        let client = Client::new("http://mafreebox.freebox.fr/api/v8", "app", "s3cr3t").unwrap();
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("mafreebox.freebox.fr"));
    }

    #[tokio::test]
    async fn client_strips_trailing_slash_from_base_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v8/fw/redir/")
            .with_body(r#"{"success":true,"result":[]}"#)
            .create_async()
            .await;

        let client = Client::new(&format!("{}/api/v8/", server.url()), "app", "token").unwrap();
        assert_eq!(client.base_url(), format!("{}/api/v8", server.url()));

        let items: Vec<Item> = client.get_list("/fw/redir/").await.unwrap();
        assert!(items.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn session_header_is_sent_once_a_session_exists() {
        let mut server = Server::new_async().await;
        let anonymous = server
            .mock("GET", "/fw/redir/1")
            .match_header(AUTH_HEADER, Matcher::Missing)
            .with_body(r#"{"success":true,"result":{"id":1}}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let item: Item = client.get("/fw/redir/1").await.unwrap();
        assert_eq!(item.id, 1);
        anonymous.assert_async().await;

        let authenticated = server
            .mock("GET", "/fw/redir/1")
            .match_header(AUTH_HEADER, "session-42")
            .with_body(r#"{"success":true,"result":{"id":1}}"#)
            .create_async()
            .await;

        client.set_session_token("session-42".to_string()).await;
        assert!(client.has_session().await);
        let _: Item = client.get("/fw/redir/1").await.unwrap();
        authenticated.assert_async().await;
    }

    #[tokio::test]
    async fn post_accepts_created() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/fw/redir/")
            .match_body(Matcher::Json(serde_json::json!({"lan_port": 22})))
            .with_status(201)
            .with_body(r#"{"success":true,"result":{"id":7}}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let item: Item = client
            .post("/fw/redir/", &serde_json::json!({"lan_port": 22}))
            .await
            .unwrap();

        assert_eq!(item.id, 7);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_accepts_empty_no_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/fw/redir/7")
            .with_status(204)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        tokio_test::assert_ok!(client.delete("/fw/redir/7").await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_keeps_envelope_details() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/dhcp/config/")
            .with_status(400)
            .with_body(r#"{"success":false,"msg":"Plage invalide","error_code":"inval_ip_range"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let err = client
            .put::<serde_json::Value, _>("/dhcp/config/", &serde_json::json!({}))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "status 400: Plage invalide (error_code=inval_ip_range: invalid IP range)"
        );
    }

    #[tokio::test]
    async fn http_error_without_envelope_uses_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/dhcp/config/")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let err = client
            .get::<serde_json::Value>("/dhcp/config/")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "status 502: Bad Gateway");
    }

    #[tokio::test]
    async fn missing_entries_are_not_found() {
        let mut server = Server::new_async().await;
        let _gone = server
            .mock("GET", "/fw/redir/9")
            .with_status(404)
            .create_async()
            .await;
        let _noent = server
            .mock("GET", "/fw/redir/10")
            .with_body(r#"{"success":false,"msg":"Entrée introuvable","error_code":"noent"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        assert!(client.get::<Item>("/fw/redir/9").await.unwrap_err().is_not_found());
        assert!(client.get::<Item>("/fw/redir/10").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn not_found_on_put_reports_status_and_code() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/fw/redir/9")
            .with_status(404)
            .with_body(r#"{"success":false,"msg":"Redirection introuvable","error_code":"noent"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let err = client
            .put::<Item, _>("/fw/redir/9", &serde_json::json!({"enabled": false}))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "status 404: Redirection introuvable (error_code=noent: no such entry)"
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/dhcp/config/")
            .with_body("<html>")
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let result = client.get::<serde_json::Value>("/dhcp/config/").await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn client_handles_network_errors() {
        let client = Client::new("http://127.0.0.1:1", "app", "token").unwrap();

        let result = client.get::<serde_json::Value>("/login/").await;
        assert!(matches!(result, Err(ApiError::Request(_))));
    }
}
