//! DHCP static lease resource

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use super::validators::{Ipv4AddressValidator, MacAddressValidator};
use super::{known_string, string_or_null};
use crate::api::static_lease::{CreateStaticLeaseRequest, StaticLease, UpdateStaticLeaseRequest};
use crate::api::ApiError;
use crate::provider_data::{not_configured, FreeboxProviderData};

/// Error codes meaning a lease for this MAC or IP already exists
const ALREADY_EXISTS_CODES: [&str; 3] = ["already_exists", "exist", "conflict"];

#[derive(Default)]
pub struct DhcpLeaseResource {
    provider_data: Option<FreeboxProviderData>,
}

impl DhcpLeaseResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_data(&self) -> Result<&FreeboxProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(not_configured)
    }

    /// Creates the lease, or adopts the existing one when the router says
    /// the MAC or IP is already bound.
    async fn create_or_adopt(
        &self,
        request: &CreateStaticLeaseRequest,
    ) -> Result<StaticLease, Diagnostic> {
        let leases = self.provider_data()?.client.static_leases();

        let err = match leases.create(request).await {
            Ok(lease) => return Ok(lease),
            Err(e) => e,
        };

        if !err
            .error_code()
            .is_some_and(|code| ALREADY_EXISTS_CODES.contains(&code))
        {
            return Err(api_error("Failed to create DHCP lease", &err));
        }

        let lease = match leases.find_by_mac_or_ip(&request.mac, &request.ip).await {
            Ok(Some(lease)) => lease,
            Ok(None) => return Err(api_error("Failed to create DHCP lease", &err)),
            Err(list_err) => return Err(api_error("Failed to list DHCP leases", &list_err)),
        };

        if !lease.mac.eq_ignore_ascii_case(&request.mac) {
            return Err(Diagnostic::error(
                "DHCP lease conflict",
                format!("{} is already leased to {}", request.ip, lease.mac),
            )
            .with_attribute(AttributePath::new("ip")));
        }

        tracing::info!(id = lease.lease_id(), "Adopted existing DHCP lease");

        // The adopted lease must end up matching the plan
        let patch = UpdateStaticLeaseRequest {
            ip: Some(request.ip.clone()).filter(|ip| *ip != lease.ip),
            comment: request
                .comment
                .clone()
                .filter(|comment| *comment != lease.comment),
        };
        if patch.is_empty() {
            return Ok(lease);
        }
        leases
            .update(lease.lease_id(), &patch)
            .await
            .map_err(|e| api_error("Failed to update adopted DHCP lease", &e))
    }
}

fn api_error(summary: &str, err: &ApiError) -> Diagnostic {
    Diagnostic::error(summary, format!("API error: {}", err))
}

/// Lease id from state, falling back to the MAC address
fn lease_id(state: &DynamicValue) -> Option<String> {
    known_string(state, "id")
        .filter(|id| !id.is_empty())
        .or_else(|| known_string(state, "mac"))
        .filter(|id| !id.is_empty())
}

/// Builds state from the router's answer. `known_mac` keeps the spelling
/// the user wrote when the router only changed its case.
pub(crate) fn lease_to_state(lease: &StaticLease, known_mac: Option<&str>) -> DynamicValue {
    let mac = match known_mac {
        Some(mac) if mac.eq_ignore_ascii_case(&lease.mac) => mac.to_string(),
        _ => lease.mac.clone(),
    };

    let mut state = DynamicValue::object();
    let fields = [
        ("id", Dynamic::String(lease.lease_id().to_string())),
        ("mac", Dynamic::String(mac)),
        ("ip", Dynamic::String(lease.ip.clone())),
        ("comment", string_or_null(&lease.comment)),
        ("hostname", string_or_null(&lease.hostname)),
        ("host", lease.host_json().into()),
    ];
    for (name, value) in fields {
        let _ = state.set(&AttributePath::new(name), value);
    }
    state
}

#[async_trait]
impl Resource for DhcpLeaseResource {
    fn type_name(&self) -> &str {
        "freebox_dhcp_lease"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages a DHCP static lease (MAC to IP binding)")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Lease identifier, the MAC address")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("mac", AttributeType::String)
                    .description("MAC address of the host")
                    .required()
                    .validator(MacAddressValidator)
                    .plan_modifier(RequiresReplace)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("ip", AttributeType::String)
                    .description("IPv4 address to assign")
                    .required()
                    .validator(Ipv4AddressValidator)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("comment", AttributeType::String)
                    .description("Free-form comment")
                    .optional()
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("hostname", AttributeType::String)
                    .description("Hostname reported by the router")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("host", AttributeType::String)
                    .description("LAN host object reported by the router, as JSON")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let plan = &request.planned_state;
        let (Some(mac), Some(ip)) = (known_string(plan, "mac"), known_string(plan, "ip")) else {
            return CreateResourceResponse {
                new_state: request.planned_state,
                private: vec![],
                diagnostics: vec![Diagnostic::error(
                    "Invalid plan",
                    "mac and ip must be known to create a DHCP lease",
                )],
            };
        };

        let create = CreateStaticLeaseRequest {
            mac,
            ip,
            comment: known_string(plan, "comment"),
        };

        match self.create_or_adopt(&create).await {
            Ok(lease) => CreateResourceResponse {
                new_state: lease_to_state(&lease, Some(&create.mac)),
                private: vec![],
                diagnostics: vec![],
            },
            Err(diag) => CreateResourceResponse {
                new_state: request.planned_state,
                private: vec![],
                diagnostics: vec![diag],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let Some(id) = lease_id(&request.current_state) else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
                private: request.private,
                deferred: None,
            };
        };

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                    private: request.private,
                    deferred: None,
                }
            }
        };

        match provider_data.client.static_leases().get(&id).await {
            Ok(lease) => {
                let known_mac = known_string(&request.current_state, "mac");
                ReadResourceResponse {
                    new_state: Some(lease_to_state(&lease, known_mac.as_deref())),
                    diagnostics: vec![],
                    private: request.private,
                    deferred: None,
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(id = %id, "DHCP lease no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                    private: request.private,
                    deferred: None,
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![api_error("Failed to read DHCP lease", &e)],
                private: request.private,
                deferred: None,
            },
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        let plan = &request.planned_state;
        let prior = &request.prior_state;

        let changed = |name: &str| {
            known_string(plan, name).filter(|value| Some(value) != known_string(prior, name).as_ref())
        };
        let patch = UpdateStaticLeaseRequest {
            ip: changed("ip"),
            comment: changed("comment"),
        };

        if patch.is_empty() {
            return UpdateResourceResponse {
                new_state: request.planned_state,
                private: vec![],
                diagnostics: vec![],
            };
        }

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    private: vec![],
                    diagnostics: vec![diag],
                }
            }
        };

        let Some(id) = lease_id(prior) else {
            return UpdateResourceResponse {
                new_state: request.prior_state,
                private: vec![],
                diagnostics: vec![Diagnostic::error(
                    "Failed to update DHCP lease",
                    "State has neither id nor mac",
                )],
            };
        };

        match provider_data.client.static_leases().update(&id, &patch).await {
            Ok(lease) => {
                let known_mac = known_string(plan, "mac");
                UpdateResourceResponse {
                    new_state: lease_to_state(&lease, known_mac.as_deref()),
                    private: vec![],
                    diagnostics: vec![],
                }
            }
            Err(e) => UpdateResourceResponse {
                new_state: request.prior_state,
                private: vec![],
                diagnostics: vec![api_error("Failed to update DHCP lease", &e)],
            },
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let Some(id) = lease_id(&request.prior_state) else {
            return DeleteResourceResponse {
                diagnostics: vec![],
            };
        };

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                return DeleteResourceResponse {
                    diagnostics: vec![diag],
                }
            }
        };

        let mut diagnostics = vec![];
        match provider_data.client.static_leases().delete(&id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(id = %id, "DHCP lease already deleted");
            }
            Err(e) => diagnostics.push(api_error("Failed to delete DHCP lease", &e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
            deferred: None,
        };
        tfplug::import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);

        // The id is the MAC address
        for imported in &mut response.imported_resources {
            if let Err(e) = imported
                .state
                .set_string(&AttributePath::new("mac"), request.id.clone())
            {
                response
                    .diagnostics
                    .push(Diagnostic::error("Failed to set import MAC", e.to_string()));
            }
        }
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for DhcpLeaseResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let (provider_data, diagnostics) = FreeboxProviderData::from_configure(request.provider_data);
        self.provider_data = provider_data;
        ConfigureResourceResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Client;
    use mockito::{Matcher, Server, ServerGuard};
    use std::sync::Arc;

    const LEASE_BODY: &str = r#"{"success":true,"result":{"id":"70:85:c2:11:22:33","mac":"70:85:c2:11:22:33","ip":"192.168.1.30","comment":"nas","hostname":"nas","host":{"primary_name":"nas","active":true}}}"#;

    async fn configured(server: &ServerGuard) -> DhcpLeaseResource {
        let client = Client::new(&server.url(), "app", "token").unwrap();
        let mut resource = DhcpLeaseResource::new();
        resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(Arc::new(FreeboxProviderData::new(client))),
                },
            )
            .await;
        resource
    }

    fn lease_state(mac: &str, ip: &str, comment: Option<&str>) -> DynamicValue {
        let mut state = DynamicValue::object();
        state
            .set_string(&AttributePath::new("id"), mac.to_lowercase())
            .unwrap();
        state
            .set_string(&AttributePath::new("mac"), mac.to_string())
            .unwrap();
        state
            .set_string(&AttributePath::new("ip"), ip.to_string())
            .unwrap();
        state
            .set(&AttributePath::new("comment"), comment.into())
            .unwrap();
        state.set_null(&AttributePath::new("hostname")).unwrap();
        state.set_null(&AttributePath::new("host")).unwrap();
        state
    }

    fn create_request(planned_state: DynamicValue) -> CreateResourceRequest {
        CreateResourceRequest {
            type_name: "freebox_dhcp_lease".to_string(),
            planned_state,
            config: DynamicValue::object(),
            planned_private: vec![],
            provider_meta: None,
        }
    }

    fn update_request(prior_state: DynamicValue, planned_state: DynamicValue) -> UpdateResourceRequest {
        UpdateResourceRequest {
            type_name: "freebox_dhcp_lease".to_string(),
            prior_state,
            planned_state,
            config: DynamicValue::object(),
            planned_private: vec![],
            provider_meta: None,
        }
    }

    #[tokio::test]
    async fn create_keeps_user_mac_spelling() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/dhcp/static_lease/")
            .match_body(Matcher::Json(serde_json::json!({
                "mac": "70:85:C2:11:22:33",
                "ip": "192.168.1.30",
                "comment": "nas"
            })))
            .with_body(LEASE_BODY)
            .create_async()
            .await;

        let mut plan = lease_state("70:85:C2:11:22:33", "192.168.1.30", Some("nas"));
        plan.mark_unknown(&AttributePath::new("id")).unwrap();
        plan.mark_unknown(&AttributePath::new("hostname")).unwrap();

        let resource = configured(&server).await;
        let response = resource.create(Context::new(), create_request(plan)).await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state;
        assert_eq!(
            state.get_string(&AttributePath::new("id")).unwrap(),
            "70:85:c2:11:22:33"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("mac")).unwrap(),
            "70:85:C2:11:22:33"
        );
        let host: serde_json::Value =
            serde_json::from_str(&state.get_string(&AttributePath::new("host")).unwrap()).unwrap();
        assert_eq!(host, serde_json::json!({"primary_name": "nas", "active": true}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_adopts_existing_lease() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", "/dhcp/static_lease/")
            .with_body(r#"{"success":false,"msg":"Un bail existe déjà","error_code":"exist"}"#)
            .create_async()
            .await;
        let list = server
            .mock("GET", "/dhcp/static_lease/")
            .with_body(r#"{"success":true,"result":[{"id":"70:85:c2:11:22:33","mac":"70:85:c2:11:22:33","ip":"192.168.1.30","comment":"","hostname":"nas"}]}"#)
            .create_async()
            .await;

        let mut plan = lease_state("70:85:c2:11:22:33", "192.168.1.30", None);
        plan.mark_unknown(&AttributePath::new("comment")).unwrap();

        let resource = configured(&server).await;
        let response = resource.create(Context::new(), create_request(plan)).await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("hostname"))
                .unwrap(),
            "nas"
        );
        assert_eq!(
            response.new_state.get(&AttributePath::new("comment")),
            Dynamic::Null
        );
        list.assert_async().await;
    }

    #[tokio::test]
    async fn adopted_lease_is_updated_to_the_plan() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", "/dhcp/static_lease/")
            .with_body(r#"{"success":false,"msg":"Un bail existe déjà","error_code":"exist"}"#)
            .create_async()
            .await;
        let _list = server
            .mock("GET", "/dhcp/static_lease/")
            .with_body(r#"{"success":true,"result":[{"id":"70:85:c2:11:22:33","mac":"70:85:c2:11:22:33","ip":"192.168.1.99","comment":"old","hostname":"nas"}]}"#)
            .create_async()
            .await;
        let put = server
            .mock("PUT", "/dhcp/static_lease/70:85:c2:11:22:33")
            .match_body(Matcher::Json(serde_json::json!({
                "ip": "192.168.1.30",
                "comment": "nas"
            })))
            .with_body(LEASE_BODY)
            .create_async()
            .await;

        let resource = configured(&server).await;
        let response = resource
            .create(
                Context::new(),
                create_request(lease_state("70:85:c2:11:22:33", "192.168.1.30", Some("nas"))),
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response.new_state.get_string(&AttributePath::new("ip")).unwrap(),
            "192.168.1.30"
        );
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("comment"))
                .unwrap(),
            "nas"
        );
        put.assert_async().await;
    }

    #[tokio::test]
    async fn ip_bound_to_another_mac_is_a_conflict() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", "/dhcp/static_lease/")
            .with_body(r#"{"success":false,"msg":"Un bail existe déjà","error_code":"exist"}"#)
            .create_async()
            .await;
        let _list = server
            .mock("GET", "/dhcp/static_lease/")
            .with_body(r#"{"success":true,"result":[{"id":"00:24:d4:7e:00:4c","mac":"00:24:d4:7e:00:4c","ip":"192.168.1.30","comment":""}]}"#)
            .create_async()
            .await;
        let put = server
            .mock("PUT", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let resource = configured(&server).await;
        let response = resource
            .create(
                Context::new(),
                create_request(lease_state("70:85:c2:11:22:33", "192.168.1.30", None)),
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "DHCP lease conflict");
        assert!(response.diagnostics[0].detail.contains("00:24:d4:7e:00:4c"));
        put.assert_async().await;
    }

    #[tokio::test]
    async fn create_conflict_without_match_fails() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", "/dhcp/static_lease/")
            .with_body(r#"{"success":false,"msg":"conflit","error_code":"conflict"}"#)
            .create_async()
            .await;
        let _list = server
            .mock("GET", "/dhcp/static_lease/")
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let resource = configured(&server).await;
        let response = resource
            .create(
                Context::new(),
                create_request(lease_state("70:85:c2:11:22:33", "192.168.1.30", None)),
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Failed to create DHCP lease");
        assert!(response.diagnostics[0].detail.contains("conflict"));
    }

    #[tokio::test]
    async fn create_other_errors_do_not_adopt() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", "/dhcp/static_lease/")
            .with_body(r#"{"success":false,"msg":"Adresse invalide","error_code":"inval"}"#)
            .create_async()
            .await;
        let list = server
            .mock("GET", "/dhcp/static_lease/")
            .expect(0)
            .create_async()
            .await;

        let resource = configured(&server).await;
        let response = resource
            .create(
                Context::new(),
                create_request(lease_state("70:85:c2:11:22:33", "192.168.1.30", None)),
            )
            .await;

        assert!(response.diagnostics[0]
            .detail
            .contains("error_code=inval: invalid argument"));
        list.assert_async().await;
    }

    #[tokio::test]
    async fn read_missing_lease_removes_it() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/dhcp/static_lease/70:85:c2:11:22:33")
            .with_status(404)
            .create_async()
            .await;

        let resource = configured(&server).await;
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "freebox_dhcp_lease".to_string(),
                    current_state: lease_state("70:85:c2:11:22:33", "192.168.1.30", None),
                    private: vec![],
                    provider_meta: None,
                    client_capabilities: Default::default(),
                },
            )
            .await;

        assert!(response.new_state.is_none());
        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn update_sends_only_changed_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/dhcp/static_lease/70:85:c2:11:22:33")
            .match_body(Matcher::Json(serde_json::json!({"comment": "nas"})))
            .with_body(LEASE_BODY)
            .create_async()
            .await;

        let prior = lease_state("70:85:c2:11:22:33", "192.168.1.30", None);
        let plan = lease_state("70:85:c2:11:22:33", "192.168.1.30", Some("nas"));

        let resource = configured(&server).await;
        let response = resource
            .update(Context::new(), update_request(prior, plan))
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("comment"))
                .unwrap(),
            "nas"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_without_changes_returns_plan() {
        let server = Server::new_async().await;
        let state = lease_state("70:85:c2:11:22:33", "192.168.1.30", Some("nas"));

        let resource = configured(&server).await;
        let response = resource
            .update(Context::new(), update_request(state.clone(), state.clone()))
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.new_state, state);
    }

    #[tokio::test]
    async fn delete_tolerates_missing_lease() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/dhcp/static_lease/70:85:c2:11:22:33")
            .with_status(404)
            .with_body(r#"{"success":false,"msg":"Bail introuvable","error_code":"noent"}"#)
            .create_async()
            .await;

        let resource = configured(&server).await;
        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "freebox_dhcp_lease".to_string(),
                    prior_state: lease_state("70:85:c2:11:22:33", "192.168.1.30", None),
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn import_fills_id_and_mac() {
        let resource = DhcpLeaseResource::new();
        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "freebox_dhcp_lease".to_string(),
                    id: "70:85:c2:11:22:33".to_string(),
                    client_capabilities: Default::default(),
                },
            )
            .await;

        let state = &response.imported_resources[0].state;
        assert_eq!(
            state.get_string(&AttributePath::new("id")).unwrap(),
            "70:85:c2:11:22:33"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("mac")).unwrap(),
            "70:85:c2:11:22:33"
        );
    }
}
