use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use chainpeek::app::App;
use chainpeek::config::{self, node, Config};
use chainpeek::core::{Key, WindowSize};
use chainpeek::infrastructure::rpc::{HttpRpcClient, RpcAuth, RpcClient};
use chainpeek::infrastructure::runtime::{
    default_schedule, detect_wallet, spawn_ticker, NodeFeed, PollingScheduler, RuntimeEvent,
    TICK_PERIOD,
};
use chainpeek::logging;
use chainpeek::store::{BlockStore, TransactionStore};
use chainpeek::ui;

/// How long background tasks get to stop after quit
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Parser)]
#[command(
    name = "chainpeek",
    version,
    about = "chainpeek: a terminal dashboard for a bitcoind node"
)]
struct Args {
    /// Node data directory holding bitcoin.conf and the auth cookie
    #[arg(long)]
    datadir: Option<PathBuf>,

    /// JSON-RPC endpoint (e.g. http://localhost:8332)
    #[arg(long)]
    rpc_url: Option<String>,

    #[arg(long)]
    rpc_user: Option<String>,

    #[arg(long)]
    rpc_password: Option<String>,

    /// Config file, instead of the default lookup
    #[arg(long)]
    config: Option<PathBuf>,
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::parse(
            &std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
        ),
        None => config::load(),
    };

    let log_dir = config
        .log_dir()
        .context("no log directory; set log_dir in the config file")?;
    let _logging = logging::init_logging(&log_dir)
        .with_context(|| format!("initializing logging in {}", log_dir.display()))?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "chainpeek starting");

    let (url, auth) = endpoint(&args, &config)?;
    tracing::info!(%url, "node endpoint");
    let client: Arc<dyn RpcClient> =
        Arc::new(HttpRpcClient::new(url, &auth).context("building the RPC client")?);

    let (cols, rows) = crossterm::terminal::size().context("reading the terminal size")?;
    if rows < ui::MIN_WINDOW.rows || cols < ui::MIN_WINDOW.cols {
        bail!(
            "terminal is {cols}x{rows}; chainpeek needs at least {}x{}",
            ui::MIN_WINDOW.cols,
            ui::MIN_WINDOW.rows
        );
    }

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, client, &config, WindowSize::new(rows, cols)).await;
    restore_terminal(&mut terminal)?;

    match res {
        Ok(app) => match app.fatal {
            Some(err) => {
                eprintln!("chainpeek stopped: {err}");
                eprintln!("restart to rebuild the block cache against the new chain");
                Ok(ExitCode::FAILURE)
            }
            None => Ok(ExitCode::SUCCESS),
        },
        Err(err) => {
            tracing::error!(error = %err, "main loop failed");
            Err(err)
        }
    }
}

/// Command-line overrides first, then the config file, then discovery in
/// the node's data directory.
fn endpoint(args: &Args, config: &Config) -> Result<(String, RpcAuth)> {
    let datadir = args
        .datadir
        .clone()
        .or_else(|| config.datadir.clone())
        .unwrap_or_else(node::default_datadir);

    let url = args
        .rpc_url
        .clone()
        .or_else(|| config.rpc_url.clone())
        .unwrap_or_else(|| node::discover_url(&datadir));

    let user = args.rpc_user.clone().or_else(|| config.rpc_user.clone());
    let password = args
        .rpc_password
        .clone()
        .or_else(|| config.rpc_password.clone());
    let auth = match (user, password) {
        (Some(user), Some(password)) => RpcAuth::UserPass { user, password },
        _ => node::discover_auth(&datadir)?,
    };
    Ok((url, auth))
}

fn setup_terminal() -> Result<Tui> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run(
    terminal: &mut Tui,
    client: Arc<dyn RpcClient>,
    config: &Config,
    size: WindowSize,
) -> Result<App> {
    let blocks = BlockStore::new(Arc::clone(&client));
    let transactions = TransactionStore::new(Arc::clone(&client));
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let wallet_enabled = detect_wallet(client.as_ref()).await;
    let feed = Arc::new(NodeFeed::new(
        Arc::clone(&client),
        blocks.clone(),
        transactions.clone(),
        events_tx.clone(),
    ));
    let mut scheduler = PollingScheduler::new(Arc::clone(&client), feed);
    scheduler.spawn_all(default_schedule(config, wallet_enabled));
    let ticker = spawn_ticker(events_tx, TICK_PERIOD, scheduler.shutdown_signal());
    tracing::info!(pollers = scheduler.len(), wallet_enabled, "background tasks started");

    let mut app = App::with_stores(client, blocks, transactions);
    app.on_resize(size);
    let res = event_loop(terminal, &mut app, &mut events_rx).await;

    scheduler.shutdown(SHUTDOWN_GRACE).await;
    if tokio::time::timeout(SHUTDOWN_GRACE, ticker).await.is_err() {
        tracing::warn!("ticker did not stop in time");
    }
    tracing::info!("background tasks stopped");
    res.map(|()| app)
}

async fn event_loop(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut mpsc::UnboundedReceiver<RuntimeEvent>,
) -> Result<()> {
    let mut input = EventStream::new();
    terminal.draw(|f| ui::draw(f, &app.dispatcher))?;

    while !app.should_quit {
        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(event))) => {
                    if let Some(key) = Key::from_event(event) {
                        app.on_key(key).await;
                    }
                }
                Some(Ok(Event::Resize(cols, rows))) => {
                    app.on_resize(WindowSize::new(rows, cols));
                    terminal.autoresize()?;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => {
                    tracing::info!("input stream closed");
                    app.should_quit = true;
                }
            },
            Some(event) = events.recv() => app.apply(event),
        }

        if app.dispatcher.take_redraw() {
            terminal.draw(|f| ui::draw(f, &app.dispatcher))?;
        }
    }
    Ok(())
}
