//! Freebox OS HTTP API
//!
//! Every endpoint answers with the `{success, result, msg, error_code}`
//! envelope. Calls are authenticated with the `X-Fbx-App-Auth` session
//! header once [`auth::AuthApi::open_session`] has succeeded.

pub mod auth;
pub mod client;
pub mod dhcp;
pub mod error;
pub mod port_forward;
pub mod response;
pub mod static_lease;

pub use client::Client;
pub use error::{describe_error_code, ApiError};
pub use response::Envelope;
