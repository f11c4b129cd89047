mod app;
mod ui;
mod worker;

use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use claim_core::{dispatch_checked, ConfigError, DropSdk, DropState, Query, SdkError, WidgetConfig, WidgetView};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use drop_rpc::{ClientOptions, DropClient, Snapshot};
use ratatui::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "claim-widget")]
#[command(about = "Terminal widget for claiming ERC1155 drops")]
struct Cli {
    /// Embed URL or bare query string, e.g. "contract=0x...&tokenId=0&network=sepolia"
    embed: String,

    /// Wallet JSON-RPC endpoint (defaults to the chain RPC)
    #[arg(long, global = true)]
    wallet_rpc: Option<String>,

    /// Allow-list snapshot JSON (path or URL) used to build claim proofs
    #[arg(long, global = true)]
    allowlist: Option<String>,

    /// Gateway used for ipfs:// metadata
    #[arg(long, global = true)]
    ipfs_gateway: Option<String>,

    /// Print progress/debug info to stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// Append diagnostics to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand)]
enum Action {
    /// Read-only dump of what the widget would show
    Status,
    /// Connect the wallet and mint
    Claim {
        /// Number of tokens to mint
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
}

// ---------------------------------------------------------------------------
// JSON output types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(tag = "type")]
enum CliOutput {
    #[serde(rename = "success")]
    Success {
        action: String,
        quantity: u32,
        tx_hash: String,
        message: String,
    },
    #[serde(rename = "error")]
    Error { action: String, error: String },
    #[serde(rename = "status")]
    Status {
        #[serde(skip_serializing_if = "Option::is_none")]
        wallet: Option<String>,
        widget: WidgetView,
    },
}

fn emit(output: &CliOutput) {
    match serde_json::to_string(output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_deref(), cli.action.is_none())?;

    let config = WidgetConfig::from_embed(&cli.embed);
    if let Err(e) = &config {
        tracing::warn!(error = %e, "invalid embed configuration");
    }

    match &cli.action {
        Some(action) => {
            if !run_oneshot(&cli, config, action) {
                std::process::exit(1);
            }
            Ok(())
        }
        None => run_interactive(&cli, config),
    }
}

/// Diagnostics go to `--log-file` when given. Without one, one-shot commands
/// log to stderr and the interactive shell keeps tracing off the screen; its
/// `--verbose` echo of the message log still goes to stderr.
fn init_tracing(verbose: bool, log_file: Option<&Path>, interactive: bool) -> io::Result<()> {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else if !interactive {
        builder.with_writer(io::stderr).init();
    }
    Ok(())
}

/// Builds the chain adapter. `None` when there is no contract to talk to.
fn connect_sdk(cli: &Cli, config: &WidgetConfig) -> Result<Option<Box<dyn DropSdk>>, SdkError> {
    if config.contract.is_none() {
        return Ok(None);
    }
    let allowlist = cli.allowlist.as_deref().map(Snapshot::load).transpose()?;
    let options = ClientOptions {
        wallet_rpc: cli.wallet_rpc.clone(),
        allowlist,
        ipfs_gateway: cli.ipfs_gateway.clone(),
    };
    Ok(Some(Box::new(DropClient::new(config, options)?)))
}

/// The interactive shell's state, with any adapter setup failure logged.
fn interactive_app(cli: &Cli, config: Result<WidgetConfig, ConfigError>) -> app::App {
    let (sdk, sdk_error) = match &config {
        Ok(config) => match connect_sdk(cli, config) {
            Ok(sdk) => (sdk, None),
            Err(e) => (None, Some(e)),
        },
        Err(_) => (None, None),
    };
    let mut app = app::App::new(config, sdk, cli.verbose);
    if let Some(e) = sdk_error {
        tracing::error!(error = %e, "failed to set up drop client");
        app.push_log(format!("Could not reach the drop: {}", e));
    }
    app
}

fn run_interactive(cli: &Cli, config: Result<WidgetConfig, ConfigError>) -> io::Result<()> {
    let mut app = interactive_app(cli, config);

    // Panic hook: always restore terminal.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    result
}

/// Returns false when the command failed.
fn run_oneshot(cli: &Cli, config: Result<WidgetConfig, ConfigError>, action: &Action) -> bool {
    let action_name = match action {
        Action::Status => "status",
        Action::Claim { .. } => "claim",
    };
    let fail = |error: String| {
        emit(&CliOutput::Error {
            action: action_name.into(),
            error,
        });
        false
    };

    let config = match (config, action) {
        (Ok(config), _) => config,
        (Err(e), Action::Status) => {
            emit(&CliOutput::Status {
                wallet: None,
                widget: WidgetView::config_error(&e),
            });
            return true;
        }
        (Err(e), Action::Claim { .. }) => return fail(e.to_string()),
    };

    let mut sdk = match connect_sdk(cli, &config) {
        Ok(Some(sdk)) => sdk,
        Ok(None) if matches!(action, Action::Status) => {
            emit(&CliOutput::Status {
                wallet: None,
                widget: WidgetView::derive(&config, &DropState::default(), 1, app::unix_now()),
            });
            return true;
        }
        Ok(None) => return fail("No contract address provided".into()),
        Err(e) => return fail(e.to_string()),
    };

    match action {
        Action::Status => {
            let state = load(&*sdk, &config, 1, cli.verbose);
            emit(&CliOutput::Status {
                wallet: state.wallet.clone(),
                widget: WidgetView::derive(&config, &state, 1, app::unix_now()),
            });
            true
        }
        Action::Claim { quantity } => {
            let quantity = *quantity;
            if let Err(e) = sdk.connect_wallet() {
                return fail(format!("Wallet connection failed: {}", e));
            }
            let state = load(&*sdk, &config, quantity, cli.verbose);
            let eligibility = state.eligibility(quantity, app::unix_now());
            match dispatch_checked(&mut sdk, &config.token_id, quantity, &eligibility) {
                None => fail(format!("Cannot mint {}: {}", quantity, eligibility.button_text)),
                Some(n) if n.is_success() => {
                    emit(&CliOutput::Success {
                        action: action_name.into(),
                        quantity,
                        tx_hash: n.tx_hash.unwrap_or_default(),
                        message: n.description,
                    });
                    true
                }
                Some(n) if n.description.is_empty() => fail(n.title),
                Some(n) => fail(format!("{}: {}", n.title, n.description)),
            }
        }
    }
}

/// Runs every widget query in turn on the calling thread.
fn load(sdk: &dyn DropSdk, config: &WidgetConfig, quantity: u32, verbose: bool) -> DropState {
    let mut state = DropState::default();
    state.wallet = sdk.wallet_address();
    for query in Query::initial(state.wallet_connected(), quantity) {
        if verbose {
            eprintln!("[INFO] {:?}", query);
        }
        state.begin(query);
        let update = query.execute(sdk, &config.token_id, state.wallet.as_deref());
        state.apply(update);
    }
    state
}
