//! DHCP server configuration resource
//!
//! The router has exactly one DHCP configuration, so this resource never
//! creates or deletes anything: create and update push the planned
//! settings, delete only drops the resource from state.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::UseStateForUnknown;
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
use tfplug::validator::ListLengthValidator;

use super::validators::Ipv4AddressValidator;
use super::{
    dns_after_apply, dns_to_state, known_bool, known_string, known_string_list, string_or_null,
};
use crate::api::dhcp::{DhcpConfig, DhcpConfigUpdate};
use crate::provider_data::{not_configured, FreeboxProviderData};

/// Value of `id`; there is only one configuration
pub const DHCP_CONFIG_ID: &str = "dhcp_config";

/// Number of DNS slots the router keeps
const DNS_SLOTS: usize = 5;

#[derive(Default)]
pub struct DhcpConfigResource {
    provider_data: Option<FreeboxProviderData>,
}

impl DhcpConfigResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings to push: every known planned value, nothing else
    fn update_from_plan(plan: &DynamicValue) -> DhcpConfigUpdate {
        DhcpConfigUpdate {
            enabled: known_bool(plan, "enabled"),
            sticky_assign: known_bool(plan, "sticky_assign"),
            ip_range_start: known_string(plan, "ip_range_start"),
            ip_range_end: known_string(plan, "ip_range_end"),
            always_broadcast: known_bool(plan, "always_broadcast"),
            ignore_out_of_range_hint: known_bool(plan, "ignore_out_of_range_hint"),
            dns: known_string_list(plan, "dns"),
        }
    }

    async fn apply(&self, plan: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let provider_data = self.provider_data.as_ref().ok_or_else(not_configured)?;

        let config = provider_data
            .client
            .dhcp()
            .update_config(&Self::update_from_plan(plan))
            .await
            .map_err(|e| {
                Diagnostic::error(
                    "Failed to update DHCP configuration",
                    format!("API error: {}", e),
                )
            })?;

        let mut state = config_to_state(&config);
        // Empty slots in the configured list must survive the read-back
        if let Ok(planned_dns) = plan.get_list(&AttributePath::new("dns")) {
            let _ = state.set(
                &AttributePath::new("dns"),
                dns_after_apply(&config.dns, &planned_dns),
            );
        }
        Ok(state)
    }
}

/// State for both the resource and the data source
pub(crate) fn config_to_state(config: &DhcpConfig) -> DynamicValue {
    let mut state = DynamicValue::object();
    let fields = [
        ("id", Dynamic::String(DHCP_CONFIG_ID.to_string())),
        ("enabled", Dynamic::Bool(config.enabled)),
        ("sticky_assign", Dynamic::Bool(config.sticky_assign)),
        ("gateway", string_or_null(&config.gateway)),
        ("netmask", string_or_null(&config.netmask)),
        ("ip_range_start", string_or_null(&config.ip_range_start)),
        ("ip_range_end", string_or_null(&config.ip_range_end)),
        ("always_broadcast", Dynamic::Bool(config.always_broadcast)),
        (
            "ignore_out_of_range_hint",
            Dynamic::Bool(config.ignore_out_of_range_hint),
        ),
        ("dns", dns_to_state(&config.dns)),
    ];
    for (name, value) in fields {
        // Setting a top-level attribute on an object cannot fail
        let _ = state.set(&AttributePath::new(name), value);
    }
    state
}

#[async_trait]
impl Resource for DhcpConfigResource {
    fn type_name(&self) -> &str {
        "freebox_dhcp_config"
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
            .description("Manages the Freebox DHCP server configuration (singleton)")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Always \"dhcp_config\"")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enabled", AttributeType::Bool)
                    .description("Enable the DHCP server")
                    .default(StaticDefault::bool(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("sticky_assign", AttributeType::Bool)
                    .description("Always give a host the same address")
                    .default(StaticDefault::bool(true))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("always_broadcast", AttributeType::Bool)
                    .description("Always broadcast DHCP replies")
                    .default(StaticDefault::bool(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("ignore_out_of_range_hint", AttributeType::Bool)
                    .description("Ignore requests for addresses outside the pool")
                    .default(StaticDefault::bool(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("ip_range_start", AttributeType::String)
                    .description("First address of the DHCP pool")
                    .optional()
                    .computed()
                    .validator(Ipv4AddressValidator)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("ip_range_end", AttributeType::String)
                    .description("Last address of the DHCP pool")
                    .optional()
                    .computed()
                    .validator(Ipv4AddressValidator)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("dns", AttributeType::list_of(AttributeType::String))
                    .description("DNS servers announced to DHCP clients (at most 5)")
                    .optional()
                    .computed()
                    .validator(ListLengthValidator::at_most(DNS_SLOTS))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("gateway", AttributeType::String)
                    .description("Gateway announced to DHCP clients")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("netmask", AttributeType::String)
                    .description("Netmask announced to DHCP clients")
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
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        if let Some(dns) = known_string_list(&request.config, "dns") {
            for (index, server) in dns.iter().enumerate() {
                if !server.is_empty() && server.parse::<std::net::Ipv4Addr>().is_err() {
                    diagnostics.push(
                        Diagnostic::error(
                            "Invalid DNS server",
                            format!("{:?} is not an IPv4 address", server),
                        )
                        .with_attribute(AttributePath::new("dns").index(index as i64)),
                    );
                }
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let result = self.apply(&request.planned_state).await;
        match result {
            Ok(new_state) => CreateResourceResponse {
                new_state,
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
        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![not_configured()],
                    private: request.private,
                    deferred: None,
                };
            }
        };

        match provider_data.client.dhcp().get_config().await {
            Ok(config) => ReadResourceResponse {
                new_state: Some(config_to_state(&config)),
                diagnostics: vec![],
                private: request.private,
                deferred: None,
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![Diagnostic::error(
                    "Failed to read DHCP configuration",
                    format!("API error: {}", e),
                )],
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
        let result = self.apply(&request.planned_state).await;
        match result {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                private: vec![],
                diagnostics: vec![],
            },
            Err(diag) => UpdateResourceResponse {
                new_state: request.prior_state,
                private: vec![],
                diagnostics: vec![diag],
            },
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        _request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        tracing::debug!("Removing DHCP configuration from state, router settings are kept");
        DeleteResourceResponse {
            diagnostics: vec![],
        }
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
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for DhcpConfigResource {
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
    use mockito::{Matcher, Server};
    use std::sync::Arc;

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
            "dns": ["1.1.1.1", "9.9.9.9", "", "", ""]
        }
    }"#;

    async fn configured(server: &mockito::ServerGuard) -> DhcpConfigResource {
        let client = Client::new(&server.url(), "app", "token").unwrap();
        let mut resource = DhcpConfigResource::new();
        let response = resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(Arc::new(FreeboxProviderData::new(client))),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
        resource
    }

    fn plan() -> DynamicValue {
        let mut plan = DynamicValue::object();
        plan.mark_unknown(&AttributePath::new("id")).unwrap();
        plan.set_bool(&AttributePath::new("enabled"), true).unwrap();
        plan.set_bool(&AttributePath::new("sticky_assign"), true)
            .unwrap();
        plan.set_bool(&AttributePath::new("always_broadcast"), false)
            .unwrap();
        plan.set_bool(&AttributePath::new("ignore_out_of_range_hint"), false)
            .unwrap();
        plan.set_string(
            &AttributePath::new("ip_range_start"),
            "192.168.1.10".to_string(),
        )
        .unwrap();
        plan.mark_unknown(&AttributePath::new("ip_range_end"))
            .unwrap();
        plan.set_list(
            &AttributePath::new("dns"),
            vec!["1.1.1.1".into(), "9.9.9.9".into()],
        )
        .unwrap();
        plan.mark_unknown(&AttributePath::new("gateway")).unwrap();
        plan.mark_unknown(&AttributePath::new("netmask")).unwrap();
        plan
    }

    #[tokio::test]
    async fn create_pushes_known_values_and_stores_answer() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/dhcp/config/")
            .match_body(Matcher::Json(serde_json::json!({
                "enabled": true,
                "sticky_assign": true,
                "always_broadcast": false,
                "ignore_out_of_range_hint": false,
                "ip_range_start": "192.168.1.10",
                "dns": ["1.1.1.1", "9.9.9.9"]
            })))
            .with_body(CONFIG_BODY)
            .create_async()
            .await;

        let resource = configured(&server).await;
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "freebox_dhcp_config".to_string(),
                    planned_state: plan(),
                    config: DynamicValue::object(),
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state;
        assert_eq!(
            state.get_string(&AttributePath::new("id")).unwrap(),
            "dhcp_config"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("ip_range_end")).unwrap(),
            "192.168.1.50"
        );
        assert_eq!(
            state.get_string(&AttributePath::new("gateway")).unwrap(),
            "192.168.1.254"
        );
        assert_eq!(
            state.get_list(&AttributePath::new("dns")).unwrap(),
            vec![Dynamic::from("1.1.1.1"), Dynamic::from("9.9.9.9")]
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_keeps_trailing_empty_dns_entry() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/dhcp/config/")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "dns": ["1.1.1.1", "9.9.9.9", ""]
            })))
            .with_body(CONFIG_BODY)
            .create_async()
            .await;

        let mut planned = plan();
        planned
            .set_list(
                &AttributePath::new("dns"),
                vec!["1.1.1.1".into(), "9.9.9.9".into(), "".into()],
            )
            .unwrap();

        let resource = configured(&server).await;
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "freebox_dhcp_config".to_string(),
                    planned_state: planned.clone(),
                    config: DynamicValue::object(),
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response.new_state.get(&AttributePath::new("dns")),
            planned.get(&AttributePath::new("dns"))
        );
    }

    #[tokio::test]
    async fn update_failure_keeps_prior_state() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/dhcp/config/")
            .with_body(r#"{"success":false,"msg":"Plage invalide","error_code":"inval_ip_range"}"#)
            .create_async()
            .await;

        let mut prior = plan();
        prior
            .set_string(&AttributePath::new("id"), DHCP_CONFIG_ID.to_string())
            .unwrap();

        let resource = configured(&server).await;
        let response = resource
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "freebox_dhcp_config".to_string(),
                    prior_state: prior.clone(),
                    planned_state: plan(),
                    config: DynamicValue::object(),
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "Failed to update DHCP configuration"
        );
        assert!(response.diagnostics[0].detail.contains("invalid IP range"));
        assert_eq!(response.new_state, prior);
    }

    #[tokio::test]
    async fn read_maps_empty_strings_to_null() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/dhcp/config/")
            .with_body(r#"{"success":true,"result":{"enabled":false,"sticky_assign":true,"gateway":"","netmask":"","ip_range_start":"","ip_range_end":"","dns":["","","","",""]}}"#)
            .create_async()
            .await;

        let resource = configured(&server).await;
        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "freebox_dhcp_config".to_string(),
                    current_state: DynamicValue::object(),
                    private: vec![],
                    provider_meta: None,
                    client_capabilities: Default::default(),
                },
            )
            .await;

        let state = response.new_state.unwrap();
        assert_eq!(state.get(&AttributePath::new("gateway")), Dynamic::Null);
        assert_eq!(state.get(&AttributePath::new("ip_range_start")), Dynamic::Null);
        assert_eq!(state.get(&AttributePath::new("dns")), Dynamic::List(vec![]));
    }

    #[tokio::test]
    async fn delete_only_forgets() {
        let resource = DhcpConfigResource::new();
        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "freebox_dhcp_config".to_string(),
                    prior_state: plan(),
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn create_without_provider_data_fails() {
        let resource = DhcpConfigResource::new();
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "freebox_dhcp_config".to_string(),
                    planned_state: plan(),
                    config: DynamicValue::object(),
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }

    #[tokio::test]
    async fn validate_rejects_bad_dns_entries() {
        let resource = DhcpConfigResource::new();
        let mut config = DynamicValue::object();
        config
            .set_list(
                &AttributePath::new("dns"),
                vec!["1.1.1.1".into(), "dns.google".into()],
            )
            .unwrap();

        let response = resource
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "freebox_dhcp_config".to_string(),
                    config,
                    client_capabilities: Default::default(),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("dns").index(1))
        );
    }

    #[tokio::test]
    async fn import_accepts_any_id() {
        let resource = DhcpConfigResource::new();
        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: "freebox_dhcp_config".to_string(),
                    id: "dhcp_config".to_string(),
                    client_capabilities: Default::default(),
                },
            )
            .await;

        assert_eq!(response.imported_resources.len(), 1);
        assert_eq!(
            response.imported_resources[0]
                .state
                .get_string(&AttributePath::new("id"))
                .unwrap(),
            "dhcp_config"
        );
    }
}
