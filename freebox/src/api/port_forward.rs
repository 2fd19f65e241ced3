//! Port forwarding rules (`/fw/redir/`)

use serde::{Deserialize, Serialize};

use super::{ApiError, Client};

/// A WAN to LAN redirection. The same shape is used for requests and
/// answers; `hostname` and `host` are filled in by the router.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortForward {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub ip_proto: String,
    #[serde(default)]
    pub wan_port_start: i64,
    #[serde(default)]
    pub wan_port_end: i64,
    #[serde(default)]
    pub lan_ip: String,
    #[serde(default)]
    pub lan_port: i64,
    #[serde(default)]
    pub src_ip: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<serde_json::Value>,
}

pub struct PortForwardApi<'a> {
    client: &'a Client,
}

impl<'a> PortForwardApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<PortForward>, ApiError> {
        self.client.get_list("/fw/redir/").await
    }

    pub async fn get(&self, id: i64) -> Result<PortForward, ApiError> {
        self.client.get(&format!("/fw/redir/{}", id)).await
    }

    pub async fn create(&self, rule: &PortForward) -> Result<PortForward, ApiError> {
        let rule = PortForward {
            id: None,
            ..rule.clone()
        };
        self.client.post("/fw/redir/", &rule).await
    }

    /// The router checks that the payload id matches the URL, so it is
    /// always sent.
    pub async fn update(&self, id: i64, rule: &PortForward) -> Result<PortForward, ApiError> {
        let rule = PortForward {
            id: Some(id),
            ..rule.clone()
        };
        self.client.put(&format!("/fw/redir/{}", id), &rule).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/fw/redir/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn ssh_rule() -> PortForward {
        PortForward {
            enabled: true,
            ip_proto: "tcp".to_string(),
            wan_port_start: 2222,
            wan_port_end: 2222,
            lan_ip: "192.168.1.30".to_string(),
            lan_port: 22,
            src_ip: "0.0.0.0".to_string(),
            comment: "ssh".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_does_not_send_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/fw/redir/")
            .match_body(Matcher::Json(serde_json::json!({
                "enabled": true,
                "ip_proto": "tcp",
                "wan_port_start": 2222,
                "wan_port_end": 2222,
                "lan_ip": "192.168.1.30",
                "lan_port": 22,
                "src_ip": "0.0.0.0",
                "comment": "ssh"
            })))
            .with_body(r#"{"success":true,"result":{"id":3,"enabled":true,"ip_proto":"tcp","wan_port_start":2222,"wan_port_end":2222,"lan_ip":"192.168.1.30","lan_port":22,"src_ip":"0.0.0.0","comment":"ssh","hostname":"nas","host":{"l2ident":{"id":"70:85:c2:11:22:33"}}}}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let rule = PortForward {
            id: Some(99),
            ..ssh_rule()
        };
        let created = client.port_forwards().create(&rule).await.unwrap();

        assert_eq!(created.id, Some(3));
        assert_eq!(created.hostname, "nas");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_carries_id_in_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/fw/redir/3")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "id": 3,
                "lan_port": 2022
            })))
            .with_body(r#"{"success":true,"result":{"id":3,"enabled":true,"ip_proto":"tcp","wan_port_start":2222,"wan_port_end":2222,"lan_ip":"192.168.1.30","lan_port":2022,"src_ip":"0.0.0.0"}}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let rule = PortForward {
            lan_port: 2022,
            ..ssh_rule()
        };
        let updated = client.port_forwards().update(3, &rule).await.unwrap();

        assert_eq!(updated.lan_port, 2022);
        assert!(updated.comment.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_missing_rule_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/fw/redir/404")
            .with_status(404)
            .with_body(r#"{"success":false,"msg":"Redirection introuvable","error_code":"noent"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let err = client.port_forwards().get(404).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_rule() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/fw/redir/3")
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        client.port_forwards().delete(3).await.unwrap();
        mock.assert_async().await;
    }
}
