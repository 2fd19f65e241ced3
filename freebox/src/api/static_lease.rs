//! DHCP static leases (`/dhcp/static_lease/`)

use serde::{Deserialize, Serialize};

use super::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StaticLease {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub hostname: String,
    /// LAN host object the router attached to this lease, kept verbatim
    #[serde(default)]
    pub host: Option<serde_json::Value>,
}

impl StaticLease {
    /// Lease identifier, the MAC address when the router sends no id
    pub fn lease_id(&self) -> &str {
        if self.id.is_empty() {
            &self.mac
        } else {
            &self.id
        }
    }

    /// The `host` object re-encoded as a JSON string
    pub fn host_json(&self) -> Option<String> {
        match &self.host {
            None | Some(serde_json::Value::Null) => None,
            Some(host) => Some(host.to_string()),
        }
    }

    fn has_mac(&self, mac: &str) -> bool {
        !mac.is_empty() && self.mac.eq_ignore_ascii_case(mac)
    }

    fn has_ip(&self, ip: &str) -> bool {
        !ip.is_empty() && self.ip == ip
    }
}

/// Request body for creating a static lease
#[derive(Debug, Clone, Serialize)]
pub struct CreateStaticLeaseRequest {
    pub mac: String,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Request body for updating a static lease; only changed fields are set
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateStaticLeaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl UpdateStaticLeaseRequest {
    pub fn is_empty(&self) -> bool {
        self.ip.is_none() && self.comment.is_none()
    }
}

pub struct StaticLeaseApi<'a> {
    client: &'a Client,
}

impl<'a> StaticLeaseApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<StaticLease>, ApiError> {
        self.client.get_list("/dhcp/static_lease/").await
    }

    pub async fn get(&self, id: &str) -> Result<StaticLease, ApiError> {
        self.client
            .get(&format!("/dhcp/static_lease/{}", id))
            .await
    }

    pub async fn create(&self, request: &CreateStaticLeaseRequest) -> Result<StaticLease, ApiError> {
        self.client.post("/dhcp/static_lease/", request).await
    }

    pub async fn update(
        &self,
        id: &str,
        request: &UpdateStaticLeaseRequest,
    ) -> Result<StaticLease, ApiError> {
        self.client
            .put(&format!("/dhcp/static_lease/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/dhcp/static_lease/{}", id))
            .await
    }

    /// Lease bound to `mac` (case-insensitive), else the lease bound to `ip`
    pub async fn find_by_mac_or_ip(
        &self,
        mac: &str,
        ip: &str,
    ) -> Result<Option<StaticLease>, ApiError> {
        let mut leases = self.list().await?;
        let index = leases
            .iter()
            .position(|lease| lease.has_mac(mac))
            .or_else(|| leases.iter().position(|lease| lease.has_ip(ip)));
        Ok(index.map(|index| leases.swap_remove(index)))
    }
}
