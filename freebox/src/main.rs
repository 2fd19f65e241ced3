use freebox::FreeboxProvider;
use tfplug::{LogLevel, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let log_level = LogLevel::from_env();

    // stdout carries the plugin handshake; logs go to stderr for Terraform to collect
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(tracing::Level::from(log_level))
        .init();

    let config = ServerConfig::default().with_log_level(log_level);
    tfplug::serve(FreeboxProvider::new(), config).await?;

    Ok(())
}
