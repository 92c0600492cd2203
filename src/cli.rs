//! CLI argument parsing and help text

/// What the binary was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    /// Run the HTTP server; `port` comes from `--port` when given
    Server { port: Option<u16> },
    /// Print the normalized row for a payload file, or stdin for "-"
    Normalize { source: String },
}

/// Parse arguments (including the program name at index 0)
pub fn parse_args(args: &[String]) -> Command {
    let has = |flag: &str| args.iter().skip(1).any(|arg| arg == flag);

    if has("--help") || has("-h") {
        return Command::Help;
    }

    if has("--version") || has("-v") {
        return Command::Version;
    }

    if has("--server") {
        let port = args
            .iter()
            .position(|arg| arg == "--port")
            .and_then(|pos| args.get(pos + 1))
            .and_then(|p| p.parse::<u16>().ok());
        return Command::Server { port };
    }

    match find_source(args) {
        Some(source) => Command::Normalize {
            source: source.clone(),
        },
        None => Command::Help,
    }
}

/// First positional argument; the value after `--port` is not positional
fn find_source(args: &[String]) -> Option<&String> {
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if arg == "--port" {
            rest.next();
        } else if arg == "-" || !arg.starts_with('-') {
            return Some(arg);
        }
    }
    None
}

pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!("Intake Server v{}", version);
    println!("Normalizes voice-assistant intake webhooks and appends them to Google Sheets");
    println!();
    println!("USAGE:");
    println!("    intake_server --server [--port <PORT>]");
    println!("    intake_server <PAYLOAD.json | ->");
    println!();
    println!("OPTIONS:");
    println!("    --server              Start HTTP server mode");
    println!("    --port <PORT>         Server port (default: PORT or 3000)");
    println!("    -h, --help            Print this help message");
    println!("    -v, --version         Print version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Start HTTP server on default port 3000");
    println!("    intake_server --server");
    println!();
    println!("    # Print the row a saved webhook would produce (nothing is stored)");
    println!("    intake_server webhook.json");
    println!("    cat webhook.json | intake_server -");
    println!();
    println!("SERVER ENDPOINTS:");
    println!("    POST   /webhook      - Normalize an end-of-call report and append a row");
    println!("    GET    /health       - Health check");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    SPREADSHEET_ID                   - Target spreadsheet (required for --server)");
    println!("    GOOGLE_CREDENTIALS               - Service-account JSON");
    println!("    GOOGLE_CREDENTIALS_FILE          - Path to service-account JSON");
    println!("    SHEET_RANGE                      - Append range (default: Sheet1!A:J)");
    println!("    SHEET_VALUE_INPUT_OPTION         - USER_ENTERED or RAW (default: USER_ENTERED)");
    println!("    SHEETS_API_BASE                  - Sheets API base URL");
    println!("    STRUCTURED_OUTPUT_NAME           - Preferred structured output names, comma separated");
    println!("    WEBHOOK_API_KEY_FILE             - Path to API keys file (enables auth)");
    println!("    PORT                             - Server port (default: 3000)");
    println!("    REQUEST_TIMEOUT_SECONDS          - Request timeout in seconds (default: 60)");
    println!("    INTAKE_LOG_DIR                   - Directory for access.log and application.log");
    println!("    INTAKE_FILE_LOG_LEVEL            - application.log filter (default: intake_server=info)");
    println!("    LOG_FILES_ENABLED                - Set to false to log to the console only");
    println!("    RUST_LOG                         - Log filter (error/warn/info/debug/trace)");
    println!();
    println!("CONFIGURATION:");
    println!("    Settings can also be placed in a .env file in the working directory.");
}

pub fn print_version() {
    println!("Intake Server v{}", env!("CARGO_PKG_VERSION"));
}
