//! Port forwarding (WAN to LAN redirection) resource

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource,
    ReadResourceRequest, ReadResourceResponse, Resource, ResourceMetadataRequest,
    ResourceMetadataResponse, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{NumberRangeValidator, StringOneOfValidator};

use super::validators::Ipv4AddressValidator;
use super::{known_bool, known_int, known_string, string_or_null};
use crate::api::port_forward::PortForward;
use crate::provider_data::{not_configured, FreeboxProviderData};

#[derive(Default)]
pub struct PortForwardResource {
    provider_data: Option<FreeboxProviderData>,
}

impl PortForwardResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_data(&self) -> Result<&FreeboxProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(not_configured)
    }

    async fn create_rule(&self, plan: &DynamicValue) -> Result<PortForward, Diagnostic> {
        let rule = rule_from_plan(plan)?;
        self.provider_data()?
            .client
            .port_forwards()
            .create(&rule)
            .await
            .map_err(|e| {
                Diagnostic::error("Failed to create port forwarding", format!("API error: {}", e))
            })
    }

    /// PUTs the planned rule under the id kept in state
    async fn update_rule(
        &self,
        prior: &DynamicValue,
        plan: &DynamicValue,
    ) -> Result<PortForward, Diagnostic> {
        let id = known_int(prior, "id").ok_or_else(|| {
            Diagnostic::error("Failed to update port forwarding", "State has no id")
        })?;
        let rule = rule_from_plan(plan)?;
        self.provider_data()?
            .client
            .port_forwards()
            .update(id, &rule)
            .await
            .map_err(|e| {
                Diagnostic::error("Failed to update port forwarding", format!("API error: {}", e))
            })
    }
}

const PORT_ATTRIBUTES: [&str; 3] = ["wan_port_start", "wan_port_end", "lan_port"];

fn port_attribute(name: &str, description: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, AttributeType::Number)
        .description(description)
        .required()
        .validator(NumberRangeValidator::between(1.0, 65535.0))
        .build()
}

/// Rule to send for a plan. Every user-facing attribute must be known.
fn rule_from_plan(plan: &DynamicValue) -> Result<PortForward, Diagnostic> {
    let missing = |name: &str| {
        Diagnostic::error(
            "Invalid plan",
            format!("{} must be known to apply a port forwarding", name),
        )
        .with_attribute(AttributePath::new(name))
    };

    Ok(PortForward {
        id: None,
        enabled: known_bool(plan, "enabled").ok_or_else(|| missing("enabled"))?,
        ip_proto: known_string(plan, "ip_proto").ok_or_else(|| missing("ip_proto"))?,
        wan_port_start: known_int(plan, "wan_port_start")
            .ok_or_else(|| missing("wan_port_start"))?,
        wan_port_end: known_int(plan, "wan_port_end").ok_or_else(|| missing("wan_port_end"))?,
        lan_ip: known_string(plan, "lan_ip").ok_or_else(|| missing("lan_ip"))?,
        lan_port: known_int(plan, "lan_port").ok_or_else(|| missing("lan_port"))?,
        src_ip: known_string(plan, "src_ip").unwrap_or_default(),
        comment: known_string(plan, "comment").unwrap_or_default(),
        hostname: String::new(),
        host: None,
    })
}

pub(crate) fn forward_to_state(rule: &PortForward) -> DynamicValue {
    let mut state = DynamicValue::object();
    let fields = [
        ("id", rule.id.into()),
        ("enabled", Dynamic::Bool(rule.enabled)),
        ("ip_proto", Dynamic::String(rule.ip_proto.clone())),
        ("wan_port_start", rule.wan_port_start.into()),
        ("wan_port_end", rule.wan_port_end.into()),
        ("lan_ip", Dynamic::String(rule.lan_ip.clone())),
        ("lan_port", rule.lan_port.into()),
        ("src_ip", string_or_null(&rule.src_ip)),
        ("comment", string_or_null(&rule.comment)),
        ("hostname", string_or_null(&rule.hostname)),
    ];
    for (name, value) in fields {
        let _ = state.set(&AttributePath::new(name), value);
    }
    state
}

#[async_trait]
impl Resource for PortForwardResource {
    fn type_name(&self) -> &str {
        "freebox_port_forward"
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
            .description("Manages a port forwarding rule from the WAN to a LAN host")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .description("Rule identifier assigned by the router")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enabled", AttributeType::Bool)
                    .description("Whether the rule is active")
                    .default(StaticDefault::bool(true))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("ip_proto", AttributeType::String)
                    .description("Protocol to forward, tcp or udp")
                    .default(StaticDefault::string("tcp"))
                    .validator(StringOneOfValidator::new(["tcp", "udp"]))
                    .build(),
            )
            .attribute(port_attribute("wan_port_start", "First WAN port"))
            .attribute(port_attribute("wan_port_end", "Last WAN port"))
            .attribute(
                AttributeBuilder::new("lan_ip", AttributeType::String)
                    .description("LAN host receiving the traffic")
                    .required()
                    .validator(Ipv4AddressValidator)
                    .build(),
            )
            .attribute(port_attribute("lan_port", "First LAN port"))
            .attribute(
                AttributeBuilder::new("src_ip", AttributeType::String)
                    .description("Only forward traffic from this address, 0.0.0.0 for any")
                    .default(StaticDefault::string("0.0.0.0"))
                    .validator(Ipv4AddressValidator)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("comment", AttributeType::String)
                    .description("Free-form comment")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("hostname", AttributeType::String)
                    .description("Name of the LAN host, as reported by the router")
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

        for name in PORT_ATTRIBUTES {
            let path = AttributePath::new(name);
            if let Ok(port) = request.config.get_number(&path) {
                if port.fract() != 0.0 {
                    diagnostics.push(
                        Diagnostic::error(
                            "Invalid port",
                            format!("{} must be a whole number, got {}", name, port),
                        )
                        .with_attribute(path),
                    );
                }
            }
        }

        let start = known_int(&request.config, "wan_port_start");
        let end = known_int(&request.config, "wan_port_end");
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid WAN port range",
                        format!(
                            "wan_port_end ({}) must be greater than or equal to wan_port_start ({})",
                            end, start
                        ),
                    )
                    .with_attribute(AttributePath::new("wan_port_end")),
                );
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let result = self.create_rule(&request.planned_state).await;
        match result {
            Ok(rule) => {
                tracing::debug!(id = ?rule.id, "Created port forwarding");
                CreateResourceResponse {
                    new_state: forward_to_state(&rule),
                    private: vec![],
                    diagnostics: vec![],
                }
            }
            Err(diag) => CreateResourceResponse {
                new_state: request.planned_state,
                private: vec![],
                diagnostics: vec![diag],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let Some(id) = known_int(&request.current_state, "id") else {
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

        match provider_data.client.port_forwards().get(id).await {
            Ok(rule) => ReadResourceResponse {
                new_state: Some(forward_to_state(&rule)),
                diagnostics: vec![],
                private: request.private,
                deferred: None,
            },
            Err(e) if e.is_not_found() => {
                tracing::warn!(id, "Port forwarding no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                    private: request.private,
                    deferred: None,
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![Diagnostic::error(
                    "Failed to read port forwarding",
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
        let result = self
            .update_rule(&request.prior_state, &request.planned_state)
            .await;
        match result {
            Ok(rule) => UpdateResourceResponse {
                new_state: forward_to_state(&rule),
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
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let Some(id) = known_int(&request.prior_state, "id") else {
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
        match provider_data.client.port_forwards().delete(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(id, "Port forwarding already deleted");
            }
            Err(e) => diagnostics.push(Diagnostic::error(
                "Failed to delete port forwarding",
                format!("API error: {}", e),
            )),
        }

        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
            deferred: None,
        };

        let id = match request.id.trim().parse::<i64>() {
            Ok(id) => id,
            Err(_) => {
                response.diagnostics.push(Diagnostic::error(
                    "Invalid import ID",
                    format!(
                        "Expected the numeric id of a port forwarding, got {:?}",
                        request.id
                    ),
                ));
                return response;
            }
        };

        let mut state = DynamicValue::object();
        if let Err(e) = state.set(&AttributePath::new("id"), id.into()) {
            response
                .diagnostics
                .push(Diagnostic::error("Failed to set import ID", e.to_string()));
            return response;
        }

        response.imported_resources.push(ImportedResource {
            type_name: request.type_name,
            state,
            private: vec![],
        });
        response
    }
}

#[async_trait]
impl ResourceWithConfigure for PortForwardResource {
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
