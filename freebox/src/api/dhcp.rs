//! DHCP server configuration (`/dhcp/config/`)

use serde::{Deserialize, Serialize};

use super::{ApiError, Client};

/// DHCP server configuration as returned by the router
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DhcpConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub sticky_assign: bool,
    #[serde(default)]
    pub gateway: String,
    #[serde(default)]
    pub netmask: String,
    #[serde(default)]
    pub ip_range_start: String,
    #[serde(default)]
    pub ip_range_end: String,
    #[serde(default)]
    pub always_broadcast: bool,
    #[serde(default)]
    pub ignore_out_of_range_hint: bool,
    #[serde(default)]
    pub dns: Vec<String>,
}

/// Request body for `PUT /dhcp/config/`; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DhcpConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticky_assign: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_range_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_range_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_broadcast: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_out_of_range_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<Vec<String>>,
}

pub struct DhcpApi<'a> {
    client: &'a Client,
}

impl<'a> DhcpApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get_config(&self) -> Result<DhcpConfig, ApiError> {
        self.client.get("/dhcp/config/").await
    }

    /// Applies `update` and returns the configuration the router now uses
    pub async fn update_config(&self, update: &DhcpConfigUpdate) -> Result<DhcpConfig, ApiError> {
        self.client.put("/dhcp/config/", update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const CONFIG_BODY: &str = r#"{
        "success": true,
        "result": {
            "enabled": true,
            "sticky_assign": true,
            "gateway": "192.168.1.254",
            "netmask": "255.255.255.0",
            "ip_range_start": "192.168.1.10",
            "ip_range_end": "192.168.1.50",
            "always_broadcast": false,
            "ignore_out_of_range_hint": false,
            "dns": ["192.168.1.254", "", "", "", ""]
        }
    }"#;

    #[tokio::test]
    async fn get_config_decodes_result() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/dhcp/config/")
            .with_header("content-type", "application/json")
            .with_body(CONFIG_BODY)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let config = client.dhcp().get_config().await.unwrap();

        assert!(config.enabled);
        assert_eq!(config.gateway, "192.168.1.254");
        assert_eq!(config.ip_range_end, "192.168.1.50");
        assert_eq!(config.dns.len(), 5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_config_sends_only_set_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/dhcp/config/")
            .match_body(Matcher::Json(serde_json::json!({
                "enabled": true,
                "dns": ["1.1.1.1", "9.9.9.9"]
            })))
            .with_body(CONFIG_BODY)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let update = DhcpConfigUpdate {
            enabled: Some(true),
            dns: Some(vec!["1.1.1.1".to_string(), "9.9.9.9".to_string()]),
            ..Default::default()
        };

        let config = client.dhcp().update_config(&update).await.unwrap();
        assert_eq!(config.netmask, "255.255.255.0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_config_reports_invalid_range() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/dhcp/config/")
            .with_body(r#"{"success":false,"msg":"Plage d'adresses invalide","error_code":"inval_ip_range"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let err = client
            .dhcp()
            .update_config(&DhcpConfigUpdate::default())
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), Some("inval_ip_range"));
        assert!(err.to_string().contains("invalid IP range"));
    }
}
