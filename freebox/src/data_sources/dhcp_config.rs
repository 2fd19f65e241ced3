//! Read-only view of the DHCP server configuration

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{Diagnostic, DynamicValue};

use crate::provider_data::{not_configured, FreeboxProviderData};
use crate::resources::dhcp_config::config_to_state;

#[derive(Default)]
pub struct DhcpConfigDataSource {
    provider_data: Option<FreeboxProviderData>,
}

impl DhcpConfigDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn computed(name: &str, kind: AttributeType, description: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, kind)
        .description(description)
        .computed()
        .build()
}

#[async_trait]
impl DataSource for DhcpConfigDataSource {
    fn type_name(&self) -> &str {
        "freebox_dhcp_config"
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
            .description("Gets the DHCP server configuration of the Freebox")
            .attribute(computed("id", AttributeType::String, "Always \"dhcp_config\""))
            .attribute(computed("enabled", AttributeType::Bool, "DHCP server enabled"))
            .attribute(computed(
                "sticky_assign",
                AttributeType::Bool,
                "Hosts always get the same address",
            ))
            .attribute(computed(
                "always_broadcast",
                AttributeType::Bool,
                "DHCP replies are always broadcast",
            ))
            .attribute(computed(
                "ignore_out_of_range_hint",
                AttributeType::Bool,
                "Requests outside the pool are ignored",
            ))
            .attribute(computed(
                "ip_range_start",
                AttributeType::String,
                "First address of the DHCP pool",
            ))
            .attribute(computed(
                "ip_range_end",
                AttributeType::String,
                "Last address of the DHCP pool",
            ))
            .attribute(computed(
                "dns",
                AttributeType::list_of(AttributeType::String),
                "DNS servers announced to DHCP clients",
            ))
            .attribute(computed("gateway", AttributeType::String, "Announced gateway"))
            .attribute(computed("netmask", AttributeType::String, "Announced netmask"))
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

        match provider_data.client.dhcp().get_config().await {
            Ok(config) => ReadDataSourceResponse {
                state: config_to_state(&config),
                diagnostics: vec![],
                deferred: None,
            },
            Err(e) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Failed to read DHCP configuration",
                    format!("API error: {}", e),
                )],
                deferred: None,
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for DhcpConfigDataSource {
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
