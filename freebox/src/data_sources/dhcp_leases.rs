//! Every DHCP static lease configured on the router

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::provider_data::{not_configured, FreeboxProviderData};
use crate::resources::dhcp_lease::lease_to_state;

pub const DHCP_LEASES_ID: &str = "dhcp_leases";

#[derive(Default)]
pub struct DhcpLeasesDataSource {
    provider_data: Option<FreeboxProviderData>,
}

impl DhcpLeasesDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lease_type() -> AttributeType {
    AttributeType::object(
        ["id", "mac", "ip", "comment", "hostname", "host"].map(|name| (name, AttributeType::String)),
    )
}

#[async_trait]
impl DataSource for DhcpLeasesDataSource {
    fn type_name(&self) -> &str {
        "freebox_dhcp_leases"
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
            .description("Lists the DHCP static leases of the Freebox")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Always \"dhcp_leases\"")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("leases", AttributeType::list_of(lease_type()))
                    .description("Static leases; host is the router's LAN host object as JSON")
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

        let leases = match provider_data.client.static_leases().list().await {
            Ok(leases) => leases,
            Err(e) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error(
                        "Failed to list DHCP leases",
                        format!("API error: {}", e),
                    )],
                    deferred: None,
                }
            }
        };

        tracing::debug!("Read {} DHCP static leases", leases.len());

        let items = leases
            .iter()
            .map(|lease| lease_to_state(lease, None).value)
            .collect::<Vec<Dynamic>>();

        let mut state = DynamicValue::object();
        let _ = state.set_string(&AttributePath::new("id"), DHCP_LEASES_ID.to_string());
        let _ = state.set_list(&AttributePath::new("leases"), items);

        ReadDataSourceResponse {
            state,
            diagnostics: vec![],
            deferred: None,
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for DhcpLeasesDataSource {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Client;
    use mockito::Server;
    use std::sync::Arc;

    async fn read_with(body: &str) -> ReadDataSourceResponse {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/dhcp/static_lease/")
            .with_body(body)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "app", "token").unwrap();
        let mut data_source = DhcpLeasesDataSource::new();
        data_source
            .configure(
                Context::new(),
                ConfigureDataSourceRequest {
                    provider_data: Some(Arc::new(FreeboxProviderData::new(client))),
                },
            )
            .await;

        data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "freebox_dhcp_leases".to_string(),
                    config: DynamicValue::object(),
                    provider_meta: None,
                    client_capabilities: Default::default(),
                },
            )
            .await
    }

    #[tokio::test]
    async fn lists_leases() {
        let response = read_with(
            r#"{"success":true,"result":[{"id":"00:24:d4:7e:00:4c","mac":"00:24:d4:7e:00:4c","ip":"192.168.1.20","comment":"","hostname":"player","host":{"primary_name":"player"}}]}"#,
        )
        .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = &response.state;
        assert_eq!(
            state.get_string(&AttributePath::new("id")).unwrap(),
            DHCP_LEASES_ID
        );
        let first = AttributePath::new("leases").index(0);
        assert_eq!(
            state.get_string(&first.clone().attribute("ip")).unwrap(),
            "192.168.1.20"
        );
        assert_eq!(state.get(&first.clone().attribute("comment")), Dynamic::Null);
        assert_eq!(
            state.get_string(&first.attribute("host")).unwrap(),
            r#"{"primary_name":"player"}"#
        );
    }

    #[tokio::test]
    async fn missing_result_is_an_empty_list() {
        let response = read_with(r#"{"success":true}"#).await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response.state.get_list(&AttributePath::new("leases")).unwrap(),
            Vec::<Dynamic>::new()
        );
    }
}
