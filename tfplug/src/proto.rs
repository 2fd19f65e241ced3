//! Protocol buffer types for Terraform Plugin Protocol v6
//!
//! Generated at build time from `proto/tfplugin6.proto` by tonic-build.
//! Several generated names collide with framework types (`DynamicValue`,
//! `Diagnostic`, `Schema`, ...), so refer to these through the `proto::`
//! prefix.
//!
//! ```rust,ignore
//! use tfplug::proto;
//!
//! let request = proto::read_resource::Request::default();
//! let wire_value = proto::DynamicValue::default();
//! ```

tonic::include_proto!("tfplugin6");

pub use provider_server::{Provider as ProviderService, ProviderServer};
