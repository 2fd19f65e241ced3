pub mod api;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

pub use provider_data::FreeboxProviderData;

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, ValidateProviderConfigRequest,
    ValidateProviderConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue, ServerCapabilities};
use tfplug::{DataSourceWithConfigure, ResourceWithConfigure};

pub const DEFAULT_BASE_URL: &str = "http://mafreebox.freebox.fr/api/v8";
pub const DEFAULT_APP_ID: &str = "fr.freebox.terraform";

#[derive(Default)]
pub struct FreeboxProvider;

impl FreeboxProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Non-empty, known string from the provider block
fn config_string(config: &DynamicValue, name: &str) -> Option<String> {
    config
        .get_string(&AttributePath::new(name))
        .ok()
        .filter(|value| !value.is_empty())
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[async_trait]
impl Provider for FreeboxProvider {
    fn type_name(&self) -> &str {
        "freebox"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            server_capabilities: ServerCapabilities::default(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .description("Manages a Freebox router through the Freebox OS API")
            .attribute(
                AttributeBuilder::new("app_token", AttributeType::String)
                    .description(
                        "Application token granted on the Freebox front panel. \
                         Falls back to FREEBOX_APP_TOKEN.",
                    )
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("base_url", AttributeType::String)
                    .description(
                        "Freebox API base URL. Falls back to FREEBOX_BASE_URL, \
                         defaults to http://mafreebox.freebox.fr/api/v8",
                    )
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("app_id", AttributeType::String)
                    .description(
                        "Application id the token was granted to. Falls back to \
                         FREEBOX_APP_ID, defaults to fr.freebox.terraform",
                    )
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        let mut diagnostics = vec![];

        if let Some(base_url) = config_string(&request.config, "base_url") {
            if let Err(e) = api::Client::new(&base_url, DEFAULT_APP_ID, "") {
                diagnostics.push(
                    Diagnostic::error("Invalid Freebox base URL", e.to_string())
                        .with_attribute(AttributePath::new("base_url")),
                );
            }
        }

        ValidateProviderConfigResponse { diagnostics }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];

        let app_token = config_string(&request.config, "app_token")
            .or_else(|| env_string("FREEBOX_APP_TOKEN"));
        let base_url = config_string(&request.config, "base_url")
            .or_else(|| env_string("FREEBOX_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let app_id = config_string(&request.config, "app_id")
            .or_else(|| env_string("FREEBOX_APP_ID"))
            .unwrap_or_else(|| DEFAULT_APP_ID.to_string());

        let Some(app_token) = app_token else {
            diagnostics.push(
                Diagnostic::error(
                    "app_token is required",
                    "Set app_token in the provider block or the FREEBOX_APP_TOKEN \
                     environment variable. Run freebox-authorize to obtain one.",
                )
                .with_attribute(AttributePath::new("app_token")),
            );
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        };

        let client = match api::Client::new(&base_url, &app_id, &app_token) {
            Ok(client) => client,
            Err(e) => {
                diagnostics.push(
                    Diagnostic::error("Failed to create API client", e.to_string())
                        .with_attribute(AttributePath::new("base_url")),
                );
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        if let Err(e) = client.auth().open_session().await {
            diagnostics.push(Diagnostic::error(
                "Failed to authenticate to Freebox",
                e.to_string(),
            ));
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        tracing::debug!(
            base_url = client.base_url(),
            app_id = client.app_id(),
            "Freebox client configured"
        );

        let provider_data = FreeboxProviderData::new(client);

        ConfigureProviderResponse {
            diagnostics,
            provider_data: Some(Arc::new(provider_data) as Arc<dyn Any + Send + Sync>),
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "freebox_dhcp_config".to_string(),
            Box::new(|| {
                Box::new(resources::DhcpConfigResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "freebox_dhcp_lease".to_string(),
            Box::new(|| {
                Box::new(resources::DhcpLeaseResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "freebox_port_forward".to_string(),
            Box::new(|| {
                Box::new(resources::PortForwardResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            "freebox_dhcp_config".to_string(),
            Box::new(|| {
                Box::new(data_sources::DhcpConfigDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories.insert(
            "freebox_dhcp_leases".to_string(),
            Box::new(|| {
                Box::new(data_sources::DhcpLeasesDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories.insert(
            "freebox_port_forwardings".to_string(),
            Box::new(|| {
                Box::new(data_sources::PortForwardingsDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories
    }
}
