use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::provider_data::{not_configured, FreeboxProviderData};
use crate::resources::port_forward::forward_to_state;

pub const PORT_FORWARDINGS_ID: &str = "port_forwardings";

#[derive(Default)]
pub struct PortForwardingsDataSource {
    provider_data: Option<FreeboxProviderData>,
}

impl PortForwardingsDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn forward_type() -> AttributeType {
    AttributeType::object([
        ("id", AttributeType::Number),
        ("enabled", AttributeType::Bool),
        ("ip_proto", AttributeType::String),
        ("wan_port_start", AttributeType::Number),
        ("wan_port_end", AttributeType::Number),
        ("lan_ip", AttributeType::String),
        ("lan_port", AttributeType::Number),
        ("src_ip", AttributeType::String),
        ("comment", AttributeType::String),
        ("hostname", AttributeType::String),
    ])
}

#[async_trait]
impl DataSource for PortForwardingsDataSource {
    fn type_name(&self) -> &str {
        "freebox_port_forwardings"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Lists the port forwarding rules of the Freebox")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Always \"port_forwardings\"")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("forwards", AttributeType::list_of(forward_type()))
                    .description("Port forwarding rules")
                    .computed()
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let Some(provider_data) = &self.provider_data else {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![not_configured()],
                deferred: None,
            };
        };

        match provider_data.client.port_forwards().list().await {
            Ok(rules) => {
                let mut state = DynamicValue::object();
                let _ = state.set_string(&AttributePath::new("id"), PORT_FORWARDINGS_ID.to_string());
                let _ = state.set_list(
                    &AttributePath::new("forwards"),
                    rules.iter().map(|rule| forward_to_state(rule).value).collect(),
                );
                ReadDataSourceResponse {
                    state,
                    diagnostics: vec![],
                    deferred: None,
                }
            }
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Failed to list port forwardings",
                    format!("API error: {}", e),
                )],
                deferred: None,
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for PortForwardingsDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let (provider_data, diagnostics) = FreeboxProviderData::from_configure(request.provider_data);
        self.provider_data = provider_data;
        ConfigureDataSourceResponse { diagnostics }
    }
}
