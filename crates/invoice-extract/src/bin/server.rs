//! Invoice extraction server binary
//!
//! Run with: cargo run -p invoice-extract --bin invoice-extract-server
//!
//! Set `INVOICE_EXTRACT_CONFIG` to a TOML file to override the defaults.

use std::path::PathBuf;

use invoice_extract::{config::AppConfig, server::InvoiceServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoice_extract=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                    Invoice Extract                        ║
║        PDF invoices to structured data, XLSX and CSV      ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let config_path = std::env::var_os("INVOICE_EXTRACT_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    if let Some(path) = &config_path {
        tracing::info!("  - Config file: {}", path.display());
    }
    tracing::info!("  - Gemini model: {}", config.gemini.model);
    tracing::info!("  - Max upload: {} bytes", config.server.max_file_size);
    tracing::info!("  - Activity log: {}", config.storage.log_path.display());
    match &config.server.allowed_origin {
        Some(origin) => tracing::info!("  - CORS origin: {}", origin),
        None => tracing::warn!("  - CORS open to any origin (set FRONTEND_URL to restrict)"),
    }

    let mount = config.server.mount_path.trim_end_matches('/').to_string();
    let server = InvoiceServer::new(config)?;

    println!("\nServer starting...");
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST {}/upload        - Extract an invoice PDF (X-API-Key header)", mount);
    println!("  POST {}/export/excel  - Download as XLSX", mount);
    println!("  POST {}/export/csv    - Download as CSV", mount);
    println!("  GET  {}/logs          - Activity log", mount);
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
