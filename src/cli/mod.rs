mod repl;


use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use crate::api;
use crate::core::config::{load_config, ChatConfig};
use crate::core::store::{MemoryStore, SessionStore};
use crate::session::SessionManager;

#[derive(Parser)]
#[command(name = "talu", version, about = "Terminal chat client for a streaming session backend")]
struct Cli {
    /// Backend base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, env = "TALU_API_TOKEN")]
    token: Option<String>,

    /// Send a single message to the current session and exit
    #[arg(short, long)]
    message: Option<String>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

pub struct App {
    pub manager: SessionManager,
    pub store: Arc<MemoryStore>,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config()?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    if let Some(token) = cli.token {
        config.api_token = Some(token);
    }
    if cli.debug {
        config.debug = true;
    }

    init_tracing(&config);

    let store = Arc::new(MemoryStore::new());
    install_delta_printer(&store);

    let backend = api::create_backend(&config);
    let manager = SessionManager::new(backend, store.clone());

    manager.refresh_sessions().await;

    let app = App { manager, store };

    if let Some(message) = cli.message {
        return send_one(&app, &message).await;
    }

    repl::run(app).await
}

fn init_tracing(config: &ChatConfig) {
    let default = if config.debug {
        "talu_chat=debug"
    } else {
        "talu_chat=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print assistant content to stdout as it grows. Content is published as
/// the whole accumulator each time, so only the unseen suffix is written.
fn install_delta_printer(store: &Arc<MemoryStore>) {
    let printed: Arc<Mutex<(String, String)>> = Arc::new(Mutex::new(Default::default()));
    store.set_content_observer(Box::new(move |id, content| {
        let mut state = printed.lock().unwrap();
        if state.0 != id {
            *state = (id.to_string(), String::new());
        }
        print!("{}", render_update(&state.1, content));
        std::io::stdout().flush().ok();
        state.1 = content.to_string();
    }));
}

/// The unseen suffix when `content` extends what was already printed;
/// anything else is a wholesale replacement (error text) and is repainted
/// on a fresh line.
fn render_update(prev: &str, content: &str) -> String {
    match content.strip_prefix(prev) {
        Some(suffix) => suffix.to_string(),
        None => format!("\n{content}"),
    }
}

async fn send_one(app: &App, message: &str) -> Result<()> {
    if app.store.current_session().is_none() {
        app.manager.create_session().await?;
    }
    repl::send_message(app, message).await;
    Ok(())
}
