//! Server module for running Terraform providers
//!
//! This module starts the gRPC server and performs the go-plugin handshake
//! Terraform expects on stdout. When Terraform requests AutoMTLS a
//! throwaway certificate is generated for the lifetime of the process.

use crate::error::{Result, TfplugError};
use crate::grpc::GrpcProviderServer;
use crate::proto::ProviderServer;
use crate::provider::Provider;
use base64::Engine;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::{debug, info};

/// Environment variable go-plugin uses to recognise a plugin launch
pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
/// Cookie value Terraform sets for provider plugins
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

const CORE_PROTOCOL_VERSION: u32 = 1;
const PLUGIN_PROTOCOL_VERSION: u32 = 6;

/// Log level for the provider process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Reads `TF_LOG_PROVIDER`, then `TF_LOG`, defaulting to Info
    pub fn from_env() -> Self {
        std::env::var("TF_LOG_PROVIDER")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| std::env::var("TF_LOG").ok())
            .and_then(|v| Self::parse(&v))
            .unwrap_or(LogLevel::Info)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRACE" | "JSON" => Some(LogLevel::Trace),
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Server configuration for running a Terraform provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum message size in bytes
    pub max_message_size: usize,
    /// Log level
    pub log_level: LogLevel,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_message_size: 256 << 20, // 256MB
            log_level: LogLevel::from_env(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum message size
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Set the log level
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

/// Main entry point for running a provider
pub async fn serve<P: Provider + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    check_magic_cookie()?;

    // Already installed when the host process set one up
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let provider_service = ProviderServer::new(GrpcProviderServer::new(provider))
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let mut builder = Server::builder();
    let mut server_cert = None;
    if std::env::var_os("PLUGIN_CLIENT_CERT").is_some() {
        let generated = generate_certificate()?;
        builder = builder.tls_config(ServerTlsConfig::new().identity(generated.identity))?;
        server_cert = Some(generated.der);
    }

    println!("{}", handshake_line(&addr.to_string(), server_cert.as_deref()));
    info!(%addr, tls = server_cert.is_some(), "provider server listening");

    builder
        .add_service(provider_service)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown_signal())
        .await?;

    info!("provider server stopped");
    Ok(())
}

fn check_magic_cookie() -> Result<()> {
    match std::env::var(MAGIC_COOKIE_KEY) {
        Ok(value) if value == MAGIC_COOKIE_VALUE => Ok(()),
        _ => Err(TfplugError::NotAPluginHost(
            "this binary is a Terraform plugin and is not meant to be executed directly; \
             run terraform instead"
                .to_string(),
        )),
    }
}

struct GeneratedCertificate {
    identity: Identity,
    der: Vec<u8>,
}

fn generate_certificate() -> Result<GeneratedCertificate> {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
            .map_err(|e| TfplugError::TlsError(format!("certificate generation failed: {}", e)))?;

    debug!("generated AutoMTLS server certificate");

    Ok(GeneratedCertificate {
        identity: Identity::from_pem(cert.pem(), key_pair.serialize_pem()),
        der: cert.der().to_vec(),
    })
}

/// go-plugin handshake: `CORE|PROTO|NETWORK|ADDR|grpc[|CERT]`
fn handshake_line(addr: &str, server_cert_der: Option<&[u8]>) -> String {
    let mut line = format!(
        "{}|{}|tcp|{}|grpc",
        CORE_PROTOCOL_VERSION, PLUGIN_PROTOCOL_VERSION, addr
    );
    if let Some(der) = server_cert_der {
        line.push('|');
        line.push_str(&base64::engine::general_purpose::STANDARD_NO_PAD.encode(der));
    }
    line
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received interrupt, shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_without_tls() {
        assert_eq!(
            handshake_line("127.0.0.1:41235", None),
            "1|6|tcp|127.0.0.1:41235|grpc"
        );
    }

    #[test]
    fn handshake_appends_unpadded_certificate() {
        let line = handshake_line("127.0.0.1:41235", Some(&[0xde, 0xad, 0xbe, 0xef, 0x01]));
        assert_eq!(line, "1|6|tcp|127.0.0.1:41235|grpc|3q2+7wE");
    }

    #[test]
    fn generated_certificate_is_der() {
        let generated = generate_certificate().unwrap();
        // DER SEQUENCE tag
        assert_eq!(generated.der[0], 0x30);
    }

    #[test]
    fn log_level_parsing() {
        assert_eq!(LogLevel::parse("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("JSON"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("off"), None);
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::new()
            .with_max_message_size(1024)
            .with_log_level(LogLevel::Error);
        assert_eq!(config.max_message_size, 1024);
        assert_eq!(config.log_level, LogLevel::Error);
    }
}
