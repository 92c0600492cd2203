use intake_server::auth::load_api_keys;
use intake_server::cli::{self, Command};
use intake_server::config::{ServerConfig, SheetsConfig};
use intake_server::error::{IntakeError, Result};
use intake_server::logging::{self, LogConfig};
use intake_server::server::{create_router, AppState};
use intake_server::services::intake::process_payload;
use intake_server::services::output_selection::OutputSelector;
use intake_server::sink::{GoogleSheetsSink, RowSink};
use std::env;
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if it doesn't)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = env::args().collect();

    match cli::parse_args(&args) {
        Command::Help => {
            cli::print_help();
            Ok(())
        }
        Command::Version => {
            cli::print_version();
            Ok(())
        }
        Command::Server { port } => run_server(port).await,
        Command::Normalize { source } => print_normalized_row(&source),
    }
}

async fn run_server(port_override: Option<u16>) -> Result<()> {
    let log_config = LogConfig::from_env();
    let _log_guards = logging::init_logging(&log_config)
        .map_err(|e| IntakeError::Config(format!("failed to initialize logging: {}", e)))?;
    logging::log_platform_info();

    let mut server_config = ServerConfig::from_env();
    if let Some(port) = port_override {
        server_config.port = port;
    }

    let sheets_config = SheetsConfig::from_env()?;
    let sink = GoogleSheetsSink::new(sheets_config)?;
    tracing::info!(sink = %sink.describe(), "Storage sink configured");

    let api_keys = load_api_keys();
    if api_keys.is_enabled() {
        tracing::info!(
            keys = api_keys.count(),
            "Webhook authentication enabled (X-API-Key, Authorization: Bearer or X-Vapi-Secret)"
        );
    }

    tracing::info!(
        preferred_outputs = ?server_config.preferred_output_names,
        request_timeout_secs = server_config.request_timeout.as_secs(),
        "Server configuration loaded"
    );

    let state = AppState {
        sink: Arc::new(sink),
        api_keys,
        selector: OutputSelector::new(server_config.preferred_output_names.clone()),
        request_timeout: server_config.request_timeout,
        slow_request_threshold: log_config.slow_request_threshold(),
        rows_appended: Arc::default(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Intake server v{} listening on http://{}", env!("CARGO_PKG_VERSION"), addr);
    tracing::info!("  POST   /webhook  - Normalize an end-of-call report and append a row");
    tracing::info!("  GET    /health   - Health check");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// CLI mode: print the row a payload would produce, without storing it
fn print_normalized_row(source: &str) -> Result<()> {
    // Diagnostics go to stderr so stdout stays pipeable JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("intake_server=warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let text = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(source)?
    };

    let payload: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| IntakeError::InvalidPayload(format!("{}: {}", source, e)))?;

    let config = ServerConfig::from_env();
    let selector = OutputSelector::new(config.preferred_output_names);
    let row = process_payload(&payload, &selector)?;

    println!("{}", serde_json::to_string_pretty(&row)?);

    Ok(())
}
