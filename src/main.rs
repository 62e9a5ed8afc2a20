use std::path::PathBuf;
use std::sync::Arc;

use eyre::Result;
use log::{LevelFilter, debug, info};

mod cli;

use cli::Cli;
use ytchat::app::App;
use ytchat::config::{self, API_KEY_ENV, Config, FileConfig};
use ytchat::gemini::GeminiProvider;
use ytchat::thumbnail::OEmbedThumbnails;
use ytchat::youtube::YouTubeTranscripts;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytchat.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
    builder.parse_default_env();
    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytchat")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = if config::api_key_from_env().is_some() {
        format!("  \x1b[32m✅\x1b[0m {API_KEY_ENV}  (set, the key field is locked)")
    } else {
        format!("  \x1b[33m⚠\x1b[0m  {API_KEY_ENV}  (not set, enter the key in the page)")
    };

    format!(
        "\nCREDENTIALS:\n{key_line}\n\nConfig file: {}\nLogs are written to: {}",
        config::config_path().display(),
        log_dir().join("ytchat.log").display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    // A local .env may supply the API key; it never overrides the real environment
    let dotenv = dotenvy::dotenv();
    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    setup_logging(cli.verbose)?;
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env loaded: {e}"),
    }

    let file_config = FileConfig::load()?;
    let mut config = Config::from_file(file_config, config::api_key_from_env());

    // CLI flags take priority over the config file
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    debug!("Resolved config: {config:?}");

    let client = reqwest::Client::new();
    let app = App::new(
        Arc::new(config),
        Arc::new(YouTubeTranscripts::new(client.clone())),
        Arc::new(GeminiProvider::new(client.clone())),
        Arc::new(OEmbedThumbnails::new(client)),
    );

    ytchat::web::serve(app).await
}
