use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod conversation;
mod error;
mod handler;
mod openai;
mod tui;
mod ui;

use app::App;
use config::Config;
use openai::OpenAIClient;

#[derive(Parser)]
#[command(name = "copilot")]
#[command(about = "Terminal chat for the OpenAI chat-completions API")]
struct Cli {
    /// Model identifier to request
    #[arg(short, long)]
    model: Option<String>,

    /// Override the API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Verbose logging (written to the log file, not the screen)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = Config::load().unwrap_or_default();
    let api_key = config.api_key();
    let model = cli
        .model
        .or(config.model)
        .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string());
    let base_url = cli
        .base_url
        .or(config.base_url)
        .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string());

    let client = OpenAIClient::new(api_key, &base_url, &model);
    let mut app = App::new(client);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    info!(model = %app.client.model(), "session started");

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event).await?;
        }

        app.poll_completion().await;
    }

    tui::restore()?;
    Ok(())
}

/// Log to a file under the config directory; the alternate screen owns
/// stderr while the app runs.
fn init_logging(verbose: bool) -> Result<()> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(());
    };
    let log_dir = config_dir.join("copilot");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("copilot.log"))?;

    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
