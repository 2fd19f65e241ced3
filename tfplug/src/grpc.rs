//! gRPC service implementation
//!
//! `GrpcProviderServer` adapts a [`Provider`] to the generated tfplugin6
//! service. Resources and data sources are built from the provider's
//! factories on every RPC and configured with the data returned by the last
//! ConfigureProvider call, so no resource instance outlives a request.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::error::TfplugError;
use crate::proto;
use crate::provider::{
    ConfigureProviderRequest, DataSourceFactory, Provider, ProviderMetadataRequest,
    ProviderSchemaRequest, ResourceFactory, StopProviderRequest, ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ModifyPlanRequest, ReadResourceRequest, ResourceSchemaRequest,
    ResourceWithConfigure, UpdateResourceRequest, UpgradeResourceStateRequest,
    ValidateResourceConfigRequest,
};
use crate::schema::{DefaultRequest, PlanModifierRequest, Schema, ValidatorRequest};
use crate::types::{
    has_errors, AttributePath, AttributePathStep, ClientCapabilities, Deferred, DeferredReason,
    Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue, RawState, ServerCapabilities,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Request, Response, Status};
use tracing::{debug, warn};

type ProviderData = Option<Arc<dyn Any + Send + Sync>>;

pub struct GrpcProviderServer<P: Provider> {
    provider: Arc<RwLock<P>>,
    provider_data: RwLock<ProviderData>,
    resources: HashMap<String, ResourceFactory>,
    data_sources: HashMap<String, DataSourceFactory>,
}

impl<P: Provider + 'static> GrpcProviderServer<P> {
    pub fn new(provider: P) -> Self {
        let resources = provider.resources();
        let data_sources = provider.data_sources();

        Self {
            provider: Arc::new(RwLock::new(provider)),
            provider_data: RwLock::new(None),
            resources,
            data_sources,
        }
    }

    fn new_resource(&self, type_name: &str) -> Result<Box<dyn ResourceWithConfigure>, Status> {
        self.resources
            .get(type_name)
            .map(|factory| factory())
            .ok_or_else(|| TfplugError::ResourceNotFound(type_name.to_string()).into())
    }

    fn new_data_source(
        &self,
        type_name: &str,
    ) -> Result<Box<dyn DataSourceWithConfigure>, Status> {
        self.data_sources
            .get(type_name)
            .map(|factory| factory())
            .ok_or_else(|| TfplugError::DataSourceNotFound(type_name.to_string()).into())
    }

    async fn configured_resource(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<(Box<dyn ResourceWithConfigure>, Vec<Diagnostic>), Status> {
        let mut resource = self.new_resource(type_name)?;
        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(ctx.clone(), ConfigureResourceRequest { provider_data })
            .await;
        Ok((resource, response.diagnostics))
    }

    async fn configured_data_source(
        &self,
        ctx: &Context,
        type_name: &str,
    ) -> Result<(Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>), Status> {
        let mut data_source = self.new_data_source(type_name)?;
        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;
        Ok((data_source, response.diagnostics))
    }
}

#[tonic::async_trait]
impl<P: Provider + 'static> proto::ProviderService for GrpcProviderServer<P> {
    async fn get_metadata(
        &self,
        _request: Request<proto::get_metadata::Request>,
    ) -> Result<Response<proto::get_metadata::Response>, Status> {
        let ctx = Context::for_rpc("GetMetadata", "");
        let provider = self.provider.read().await;
        let metadata = provider.metadata(ctx, ProviderMetadataRequest).await;

        let mut resources: Vec<_> = self.resources.keys().cloned().collect();
        resources.sort();
        let mut data_sources: Vec<_> = self.data_sources.keys().cloned().collect();
        data_sources.sort();

        Ok(Response::new(proto::get_metadata::Response {
            server_capabilities: Some(server_capabilities_to_proto(
                &metadata.server_capabilities,
            )),
            diagnostics: vec![],
            data_sources: data_sources
                .into_iter()
                .map(|type_name| proto::get_metadata::DataSourceMetadata { type_name })
                .collect(),
            resources: resources
                .into_iter()
                .map(|type_name| proto::get_metadata::ResourceMetadata { type_name })
                .collect(),
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<proto::get_provider_schema::Request>,
    ) -> Result<Response<proto::get_provider_schema::Response>, Status> {
        let ctx = Context::for_rpc("GetProviderSchema", "");
        let provider = self.provider.read().await;
        let metadata = provider
            .metadata(ctx.clone(), ProviderMetadataRequest)
            .await;
        let provider_schema = provider.schema(ctx.clone(), ProviderSchemaRequest).await;
        let mut diagnostics = provider_schema.diagnostics;

        let mut resource_schemas = HashMap::new();
        for (type_name, factory) in &self.resources {
            let response = factory().schema(ctx.clone(), ResourceSchemaRequest).await;
            diagnostics.extend(response.diagnostics);
            resource_schemas.insert(type_name.clone(), schema_to_proto(&response.schema));
        }

        let mut data_source_schemas = HashMap::new();
        for (type_name, factory) in &self.data_sources {
            let response = factory().schema(ctx.clone(), DataSourceSchemaRequest).await;
            diagnostics.extend(response.diagnostics);
            data_source_schemas.insert(type_name.clone(), schema_to_proto(&response.schema));
        }

        debug!(
            resources = resource_schemas.len(),
            data_sources = data_source_schemas.len(),
            "serving provider schema"
        );

        Ok(Response::new(proto::get_provider_schema::Response {
            provider: Some(schema_to_proto(&provider_schema.schema)),
            resource_schemas,
            data_source_schemas,
            diagnostics: diagnostics_to_proto(diagnostics),
            provider_meta: None,
            server_capabilities: Some(server_capabilities_to_proto(
                &metadata.server_capabilities,
            )),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<proto::validate_provider_config::Request>,
    ) -> Result<Response<proto::validate_provider_config::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::for_rpc("ValidateProviderConfig", "");
        let config = decode_dynamic_value(req.config.as_ref())?;

        let provider = self.provider.read().await;
        let schema = provider
            .schema(ctx.clone(), ProviderSchemaRequest)
            .await
            .schema;
        let mut diagnostics = validate_against_schema(&schema, &config);
        if !has_errors(&diagnostics) {
            let response = provider
                .validate(ctx, ValidateProviderConfigRequest { config })
                .await;
            diagnostics.extend(response.diagnostics);
        }

        Ok(Response::new(proto::validate_provider_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<proto::validate_resource_config::Request>,
    ) -> Result<Response<proto::validate_resource_config::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::for_rpc("ValidateResourceConfig", &req.type_name);
        let resource = self.new_resource(&req.type_name)?;
        let config = decode_dynamic_value(req.config.as_ref())?;

        let schema = resource
            .schema(ctx.clone(), ResourceSchemaRequest)
            .await
            .schema;
        let mut diagnostics = validate_against_schema(&schema, &config);
        if !has_errors(&diagnostics) {
            let response = resource
                .validate(
                    ctx,
                    ValidateResourceConfigRequest {
                        type_name: req.type_name,
                        config,
                        client_capabilities: client_capabilities_from_proto(
                            req.client_capabilities.as_ref(),
                        ),
                    },
                )
                .await;
            diagnostics.extend(response.diagnostics);
        }

        Ok(Response::new(proto::validate_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<proto::validate_data_resource_config::Request>,
    ) -> Result<Response<proto::validate_data_resource_config::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::for_rpc("ValidateDataResourceConfig", &req.type_name);
        let data_source = self.new_data_source(&req.type_name)?;
        let config = decode_dynamic_value(req.config.as_ref())?;

        let schema = data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await
            .schema;
        let mut diagnostics = validate_against_schema(&schema, &config);
        if !has_errors(&diagnostics) {
            let response = data_source
                .validate(
                    ctx,
                    ValidateDataSourceConfigRequest {
                        type_name: req.type_name,
                        config,
                    },
                )
                .await;
            diagnostics.extend(response.diagnostics);
        }

        Ok(Response::new(proto::validate_data_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<proto::upgrade_resource_state::Request>,
    ) -> Result<Response<proto::upgrade_resource_state::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::for_rpc("UpgradeResourceState", &req.type_name);
        let resource = self.new_resource(&req.type_name)?;
        let schema = resource
            .schema(ctx.clone(), ResourceSchemaRequest)
            .await
            .schema;

        let raw_state = req
            .raw_state
            .map(|raw| RawState {
                json: (!raw.json.is_empty()).then_some(raw.json),
                flatmap: (!raw.flatmap.is_empty()).then_some(raw.flatmap),
            })
            .unwrap_or(RawState {
                json: None,
                flatmap: None,
            });

        let response = resource
            .upgrade_state(
                ctx,
                UpgradeResourceStateRequest {
                    type_name: req.type_name,
                    version: req.version,
                    raw_state,
                },
            )
            .await;

        let upgraded_state = schema.conform(response.upgraded_state);

        Ok(Response::new(proto::upgrade_resource_state::Response {
            upgraded_state: Some(encode_dynamic_value(&upgraded_state)?),
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<proto::configure_provider::Request>,
    ) -> Result<Response<proto::configure_provider::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::for_rpc("ConfigureProvider", "");
        let config = decode_dynamic_value(req.config.as_ref())?;

        debug!(terraform_version = %req.terraform_version, "configuring provider");

        let mut provider = self.provider.write().await;
        let response = provider
            .configure(
                ctx,
                ConfigureProviderRequest {
                    terraform_version: req.terraform_version,
                    config,
                    client_capabilities: client_capabilities_from_proto(
                        req.client_capabilities.as_ref(),
                    ),
                },
            )
            .await;

        if has_errors(&response.diagnostics) {
            warn!("provider configuration failed");
        }
        *self.provider_data.write().await = response.provider_data;

        Ok(Response::new(proto::configure_provider::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<proto::read_resource::Request>,
    ) -> Result<Response<proto::read_resource::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::for_rpc("ReadResource", &req.type_name);
        let current_state = decode_dynamic_value(req.current_state.as_ref())?;
        let provider_meta = decode_optional(req.provider_meta.as_ref())?;

        let (resource, diagnostics) = self.configured_resource(&ctx, &req.type_name).await?;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::read_resource::Response {
                new_state: Some(encode_dynamic_value(&current_state)?),
                diagnostics: diagnostics_to_proto(diagnostics),
                private: req.private,
                deferred: None,
            }));
        }

        let schema = resource
            .schema(ctx.clone(), ResourceSchemaRequest)
            .await
            .schema;
        let response = resource
            .read(
                ctx,
                ReadResourceRequest {
                    type_name: req.type_name,
                    current_state,
                    private: req.private,
                    provider_meta,
                    client_capabilities: client_capabilities_from_proto(
                        req.client_capabilities.as_ref(),
                    ),
                },
            )
            .await;

        // None means the remote object is gone; a null state tells
        // Terraform to drop it
        let new_state = match response.new_state {
            Some(state) => schema.conform(state),
            None => DynamicValue::null(),
        };

        Ok(Response::new(proto::read_resource::Response {
            new_state: Some(encode_dynamic_value(&new_state)?),
            diagnostics: diagnostics_to_proto(response.diagnostics),
            private: response.private,
            deferred: response.deferred.as_ref().map(deferred_to_proto),
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<proto::plan_resource_change::Request>,
    ) -> Result<Response<proto::plan_resource_change::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::for_rpc("PlanResourceChange", &req.type_name);
        let prior_state = decode_dynamic_value(req.prior_state.as_ref())?;
        let proposed_new_state = decode_dynamic_value(req.proposed_new_state.as_ref())?;
        let config = decode_dynamic_value(req.config.as_ref())?;
        let provider_meta = decode_optional(req.provider_meta.as_ref())?;

        // Destroy plans pass through untouched
        if proposed_new_state.is_null() {
            return Ok(Response::new(proto::plan_resource_change::Response {
                planned_state: Some(encode_dynamic_value(&proposed_new_state)?),
                requires_replace: vec![],
                planned_private: req.prior_private,
                diagnostics: vec![],
                legacy_type_system: false,
                deferred: None,
            }));
        }

        let (resource, mut diagnostics) = self.configured_resource(&ctx, &req.type_name).await?;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::plan_resource_change::Response {
                planned_state: Some(encode_dynamic_value(&proposed_new_state)?),
                requires_replace: vec![],
                planned_private: req.prior_private,
                diagnostics: diagnostics_to_proto(diagnostics),
                legacy_type_system: false,
                deferred: None,
            }));
        }

        let schema = resource
            .schema(ctx.clone(), ResourceSchemaRequest)
            .await
            .schema;
        let plan = plan_attributes(&schema, &prior_state, proposed_new_state, &config);
        diagnostics.extend(plan.diagnostics);
        let mut requires_replace = plan.requires_replace;

        let response = resource
            .modify_plan(
                ctx,
                ModifyPlanRequest {
                    type_name: req.type_name,
                    config,
                    prior_state,
                    planned_state: plan.planned_state,
                    prior_private: req.prior_private,
                    provider_meta,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);
        for path in response.requires_replace {
            if !requires_replace.contains(&path) {
                requires_replace.push(path);
            }
        }

        Ok(Response::new(proto::plan_resource_change::Response {
            planned_state: Some(encode_dynamic_value(&response.planned_state)?),
            requires_replace: requires_replace.iter().map(path_to_proto).collect(),
            planned_private: response.planned_private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
            deferred: None,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<proto::apply_resource_change::Request>,
    ) -> Result<Response<proto::apply_resource_change::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::for_rpc("ApplyResourceChange", &req.type_name);
        let prior_state = decode_dynamic_value(req.prior_state.as_ref())?;
        let planned_state = decode_dynamic_value(req.planned_state.as_ref())?;
        let config = decode_dynamic_value(req.config.as_ref())?;
        let provider_meta = decode_optional(req.provider_meta.as_ref())?;

        let (resource, diagnostics) = self.configured_resource(&ctx, &req.type_name).await?;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::apply_resource_change::Response {
                new_state: Some(encode_dynamic_value(&prior_state)?),
                private: vec![],
                diagnostics: diagnostics_to_proto(diagnostics),
                legacy_type_system: false,
            }));
        }

        let schema = resource
            .schema(ctx.clone(), ResourceSchemaRequest)
            .await
            .schema;

        let (new_state, private, diagnostics) = match (prior_state.is_null(), planned_state.is_null())
        {
            (true, false) => {
                debug!(type_name = %req.type_name, "creating resource");
                let response = resource
                    .create(
                        ctx,
                        CreateResourceRequest {
                            type_name: req.type_name,
                            planned_state,
                            config,
                            planned_private: req.planned_private,
                            provider_meta,
                        },
                    )
                    .await;
                (response.new_state, response.private, response.diagnostics)
            }
            (false, false) => {
                debug!(type_name = %req.type_name, "updating resource");
                let response = resource
                    .update(
                        ctx,
                        UpdateResourceRequest {
                            type_name: req.type_name,
                            prior_state,
                            planned_state,
                            config,
                            planned_private: req.planned_private,
                            provider_meta,
                        },
                    )
                    .await;
                (response.new_state, response.private, response.diagnostics)
            }
            (false, true) => {
                debug!(type_name = %req.type_name, "deleting resource");
                let response = resource
                    .delete(
                        ctx,
                        DeleteResourceRequest {
                            type_name: req.type_name,
                            prior_state: prior_state.clone(),
                            planned_private: req.planned_private,
                            provider_meta,
                        },
                    )
                    .await;
                // A failed delete leaves the object in place
                let new_state = if has_errors(&response.diagnostics) {
                    prior_state
                } else {
                    DynamicValue::null()
                };
                (new_state, vec![], response.diagnostics)
            }
            (true, true) => (DynamicValue::null(), vec![], vec![]),
        };

        let new_state = DynamicValue::new(schema.conform(new_state).value.unknowns_to_null());

        Ok(Response::new(proto::apply_resource_change::Response {
            new_state: Some(encode_dynamic_value(&new_state)?),
            private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<proto::import_resource_state::Request>,
    ) -> Result<Response<proto::import_resource_state::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::for_rpc("ImportResourceState", &req.type_name);

        let (resource, diagnostics) = self.configured_resource(&ctx, &req.type_name).await?;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::import_resource_state::Response {
                imported_resources: vec![],
                diagnostics: diagnostics_to_proto(diagnostics),
                deferred: None,
            }));
        }

        let schema = resource
            .schema(ctx.clone(), ResourceSchemaRequest)
            .await
            .schema;
        let response = resource
            .import_state(
                ctx,
                ImportResourceStateRequest {
                    type_name: req.type_name,
                    id: req.id,
                    client_capabilities: client_capabilities_from_proto(
                        req.client_capabilities.as_ref(),
                    ),
                },
            )
            .await;

        let mut imported_resources = Vec::with_capacity(response.imported_resources.len());
        for imported in response.imported_resources {
            let state = schema.conform(imported.state);
            imported_resources.push(proto::import_resource_state::ImportedResource {
                type_name: imported.type_name,
                state: Some(encode_dynamic_value(&state)?),
                private: imported.private,
            });
        }

        Ok(Response::new(proto::import_resource_state::Response {
            imported_resources,
            diagnostics: diagnostics_to_proto(response.diagnostics),
            deferred: response.deferred.as_ref().map(deferred_to_proto),
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<proto::read_data_source::Request>,
    ) -> Result<Response<proto::read_data_source::Response>, Status> {
        let req = request.into_inner();
        let ctx = Context::for_rpc("ReadDataSource", &req.type_name);
        let config = decode_dynamic_value(req.config.as_ref())?;
        let provider_meta = decode_optional(req.provider_meta.as_ref())?;

        let (data_source, diagnostics) =
            self.configured_data_source(&ctx, &req.type_name).await?;
        if has_errors(&diagnostics) {
            return Ok(Response::new(proto::read_data_source::Response {
                state: Some(encode_dynamic_value(&config)?),
                diagnostics: diagnostics_to_proto(diagnostics),
                deferred: None,
            }));
        }

        let schema = data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await
            .schema;
        let response = data_source
            .read(
                ctx,
                ReadDataSourceRequest {
                    type_name: req.type_name,
                    config,
                    provider_meta,
                    client_capabilities: client_capabilities_from_proto(
                        req.client_capabilities.as_ref(),
                    ),
                },
            )
            .await;

        let state = DynamicValue::new(schema.conform(response.state).value.unknowns_to_null());

        Ok(Response::new(proto::read_data_source::Response {
            state: Some(encode_dynamic_value(&state)?),
            diagnostics: diagnostics_to_proto(response.diagnostics),
            deferred: response.deferred.as_ref().map(deferred_to_proto),
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<proto::stop_provider::Request>,
    ) -> Result<Response<proto::stop_provider::Response>, Status> {
        let ctx = Context::for_rpc("StopProvider", "");
        let provider = self.provider.read().await;
        let response = provider.stop(ctx, StopProviderRequest).await;

        Ok(Response::new(proto::stop_provider::Response {
            error: response.error.unwrap_or_default(),
        }))
    }
}

/// Result of the framework's attribute-level planning pass
pub(crate) struct AttributePlan {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Applies defaults, marks computed attributes unknown when the resource
/// changes and runs the attribute plan modifiers.
pub(crate) fn plan_attributes(
    schema: &Schema,
    prior_state: &DynamicValue,
    proposed_new_state: DynamicValue,
    config: &DynamicValue,
) -> AttributePlan {
    let is_create = prior_state.is_null();
    let mut planned_state = proposed_new_state;
    let mut diagnostics = vec![];

    for attr in &schema.block.attributes {
        let Some(default) = &attr.default else {
            continue;
        };
        let path = AttributePath::new(&attr.name);
        if config.get(&path) == Dynamic::Null {
            let value = default
                .default_value(DefaultRequest { path: path.clone() })
                .value;
            if let Err(e) = planned_state.set(&path, value.value) {
                diagnostics.push(set_failed(&path, e));
            }
        }
    }

    if is_create || planned_state != *prior_state {
        for attr in &schema.block.attributes {
            if !attr.computed || attr.default.is_some() {
                continue;
            }
            let path = AttributePath::new(&attr.name);
            if config.get(&path) == Dynamic::Null {
                if let Err(e) = planned_state.mark_unknown(&path) {
                    diagnostics.push(set_failed(&path, e));
                }
            }
        }
    }

    let mut requires_replace = vec![];
    for attr in &schema.block.attributes {
        if attr.plan_modifiers.is_empty() {
            continue;
        }
        let path = AttributePath::new(&attr.name);
        let config_value = DynamicValue::new(config.get(&path));
        let state_value = DynamicValue::new(prior_state.get(&path));
        let mut plan_value = DynamicValue::new(planned_state.get(&path));

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifierRequest {
                config_value: config_value.clone(),
                state_value: state_value.clone(),
                plan_value,
                path: path.clone(),
                is_create,
            });
            plan_value = response.plan_value;
            diagnostics.extend(response.diagnostics);
            if response.requires_replace && !requires_replace.contains(&path) {
                requires_replace.push(path.clone());
            }
        }

        if let Err(e) = planned_state.set(&path, plan_value.value) {
            diagnostics.push(set_failed(&path, e));
        }
    }

    AttributePlan {
        planned_state,
        requires_replace,
        diagnostics,
    }
}

fn set_failed(path: &AttributePath, err: TfplugError) -> Diagnostic {
    Diagnostic::error(
        "Failed to plan attribute",
        format!("Could not set {}: {}", path, err),
    )
    .with_attribute(path.clone())
}

/// Checks required, read-only and type constraints, then runs the attribute
/// validators on every known value.
pub(crate) fn validate_against_schema(schema: &Schema, config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    // A wholly unknown config is validated again once it is known
    if config.is_unknown() {
        return diagnostics;
    }

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        let value = config.get(&path);

        match value {
            Dynamic::Null => {
                if attr.required {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!("The argument \"{}\" is required, but no definition was found.", attr.name),
                        )
                        .with_attribute(path),
                    );
                }
                continue;
            }
            _ if attr.computed && !attr.optional && !attr.required => {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid configuration",
                        format!("\"{}\" is read-only and cannot be set", attr.name),
                    )
                    .with_attribute(path),
                );
                continue;
            }
            _ => {}
        }

        if !attr.r#type.accepts(&value) {
            diagnostics.push(
                Diagnostic::error(
                    "Incorrect attribute value type",
                    format!("\"{}\" got a {} value", attr.name, value.type_name()),
                )
                .with_attribute(path),
            );
            continue;
        }

        if !value.is_fully_known() {
            continue;
        }

        for validator in &attr.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: DynamicValue::new(value.clone()),
                path: path.clone(),
            });
            diagnostics.extend(response.diagnostics);
        }
    }

    diagnostics
}

fn decode_dynamic_value(value: Option<&proto::DynamicValue>) -> Result<DynamicValue, Status> {
    let Some(value) = value else {
        return Ok(DynamicValue::null());
    };

    let decoded = if !value.msgpack.is_empty() {
        DynamicValue::decode_msgpack(&value.msgpack)
    } else {
        DynamicValue::decode_json(&value.json)
    };
    decoded.map_err(Status::from)
}

fn decode_optional(value: Option<&proto::DynamicValue>) -> Result<Option<DynamicValue>, Status> {
    value.map(|v| decode_dynamic_value(Some(v))).transpose()
}

fn encode_dynamic_value(value: &DynamicValue) -> Result<proto::DynamicValue, Status> {
    Ok(proto::DynamicValue {
        msgpack: value.encode_msgpack()?,
        json: vec![],
    })
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<proto::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|diag| proto::Diagnostic {
            severity: match diag.severity {
                DiagnosticSeverity::Invalid => proto::diagnostic::Severity::Invalid,
                DiagnosticSeverity::Error => proto::diagnostic::Severity::Error,
                DiagnosticSeverity::Warning => proto::diagnostic::Severity::Warning,
            } as i32,
            summary: diag.summary,
            detail: diag.detail,
            attribute: diag.attribute.as_ref().map(path_to_proto),
        })
        .collect()
}

fn path_to_proto(path: &AttributePath) -> proto::AttributePath {
    use proto::attribute_path::step::Selector;

    proto::AttributePath {
        steps: path
            .steps
            .iter()
            .map(|step| proto::attribute_path::Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name.clone()),
                    AttributePathStep::ElementKeyString(key) => {
                        Selector::ElementKeyString(key.clone())
                    }
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(*idx),
                }),
            })
            .collect(),
    }
}

fn schema_to_proto(schema: &Schema) -> proto::Schema {
    let block = &schema.block;
    let description_kind = |kind: crate::schema::StringKind| match kind {
        crate::schema::StringKind::Plain => proto::StringKind::Plain as i32,
        crate::schema::StringKind::Markdown => proto::StringKind::Markdown as i32,
    };

    proto::Schema {
        version: schema.version,
        block: Some(proto::schema::Block {
            version: block.version,
            attributes: block
                .attributes
                .iter()
                .map(|attr| proto::schema::Attribute {
                    name: attr.name.clone(),
                    r#type: attr.r#type.type_json().to_string().into_bytes(),
                    description: attr.description.clone(),
                    required: attr.required,
                    optional: attr.optional,
                    computed: attr.computed,
                    sensitive: attr.sensitive,
                    description_kind: description_kind(block.description_kind),
                    deprecated: attr.deprecated,
                    write_only: false,
                })
                .collect(),
            block_types: vec![],
            description: block.description.clone(),
            description_kind: description_kind(block.description_kind),
            deprecated: block.deprecated,
        }),
    }
}

fn server_capabilities_to_proto(capabilities: &ServerCapabilities) -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: capabilities.plan_destroy,
        get_provider_schema_optional: capabilities.get_provider_schema_optional,
        move_resource_state: capabilities.move_resource_state,
    }
}

fn client_capabilities_from_proto(
    capabilities: Option<&proto::ClientCapabilities>,
) -> ClientCapabilities {
    capabilities
        .map(|c| ClientCapabilities {
            deferral_allowed: c.deferral_allowed,
            write_only_attributes_allowed: c.write_only_attributes_allowed,
        })
        .unwrap_or_default()
}

fn deferred_to_proto(deferred: &Deferred) -> proto::Deferred {
    let reason = match deferred.reason {
        DeferredReason::Unknown => proto::deferred::Reason::Unknown,
        DeferredReason::ResourceConfigUnknown => proto::deferred::Reason::ResourceConfigUnknown,
        DeferredReason::ProviderConfigUnknown => proto::deferred::Reason::ProviderConfigUnknown,
        DeferredReason::AbsentPrereq => proto::deferred::Reason::AbsentPrereq,
    };
    proto::Deferred {
        reason: reason as i32,
    }
}
