//! Requests an app token from a Freebox.
//!
//! The router shows the request on its front panel; once it is accepted the
//! token printed here goes into the provider's `app_token` (or
//! `FREEBOX_APP_TOKEN`).

use clap::Parser;
use freebox::api::auth::{AuthorizationRequest, AuthorizationStatus};
use freebox::api::Client;
use freebox::{DEFAULT_APP_ID, DEFAULT_BASE_URL};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "freebox-authorize")]
#[command(version)]
#[command(about = "Obtain an app token for the Terraform Freebox provider", long_about = None)]
struct Cli {
    /// Freebox API base URL
    #[arg(long, env = "FREEBOX_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Application id to register
    #[arg(long, env = "FREEBOX_APP_ID", default_value = DEFAULT_APP_ID)]
    app_id: String,

    /// Application name shown on the front panel
    #[arg(long, default_value = "Terraform")]
    app_name: String,

    #[arg(long, default_value = "1.0.0")]
    app_version: String,

    /// Device name shown on the front panel
    #[arg(long, default_value = "Terraform")]
    device_name: String,

    /// Seconds between two status checks
    #[arg(long, default_value_t = 2)]
    poll_interval: u64,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let client = Client::new(&cli.base_url, &cli.app_id, "")?;
    let auth = client.auth();

    let grant = auth
        .request_authorization(&AuthorizationRequest {
            app_id: cli.app_id.clone(),
            app_name: cli.app_name,
            app_version: cli.app_version,
            device_name: cli.device_name,
        })
        .await?;
    tracing::info!(track_id = grant.track_id, "Authorization requested");

    eprintln!("Confirm the request on the Freebox front panel...");

    let interval = Duration::from_secs(cli.poll_interval.max(1));
    let status = loop {
        let status = auth.authorization_status(grant.track_id).await?;
        tracing::debug!(%status, "Authorization status");
        if status.is_final() {
            break status;
        }
        tokio::time::sleep(interval).await;
    };

    if status != AuthorizationStatus::Granted {
        return Err(format!("authorization {}", status).into());
    }

    eprintln!("Access granted for app_id {}.", cli.app_id);
    println!("{}", grant.app_token);

    Ok(())
}
