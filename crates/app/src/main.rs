use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nowplay_bridge_core::AppConfig;
use nowplay_bridge_engine::{build_snapshot, lane, CommandDispatcher, Teardown, TrackPublisher};
use nowplay_bridge_server::CommandServer;
use nowplay_bridge_source::{
    build_control_surface, build_media_source, liveliness_probe, watch_source,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "nowplay-bridge",
    about = "Now Playing -> local HTTP bridge with playback control"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Run,
    Doctor,
    Status,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cmd = cli.command.unwrap_or(Commands::Run);
    let cfg_path = cli.config.unwrap_or_else(default_config_path);

    match cmd {
        Commands::Config {
            action: ConfigAction::Init,
        } => {
            init_config(&cfg_path)?;
            println!("Initialized config at {}", cfg_path.display());
            Ok(())
        }
        Commands::Doctor => {
            let cfg = load_or_default(&cfg_path)?;
            init_logging(&cfg.log_level);
            doctor(&cfg).await
        }
        Commands::Status => {
            let cfg = load_or_default(&cfg_path)?;
            init_logging(&cfg.log_level);
            status(&cfg).await
        }
        Commands::Run => {
            let cfg = load_or_default(&cfg_path)?;
            init_logging(&cfg.log_level);
            run(cfg).await
        }
    }
}

async fn run(cfg: AppConfig) -> Result<()> {
    let source = build_media_source(&cfg.source_priority);
    let surface = build_control_surface(&cfg.source_priority);
    info!(
        source = source.name(),
        surface = surface.name(),
        "nowplay-bridge started"
    );

    let (track_tx, track_rx) = lane("trackInfo", 16);
    let (command_tx, command_rx) = lane("command", 16);

    let mut server = CommandServer::new(
        cfg.server.host.clone(),
        cfg.server.port,
        command_tx,
        track_rx,
    );
    server
        .start()
        .await
        .context("failed to start command server")?;

    let (event_tx, event_rx) = mpsc::channel(16);
    let watcher = tokio::spawn(watch_source(
        source.clone(),
        Duration::from_millis(cfg.intervals.source_poll_ms),
        event_tx,
    ));
    let publisher = tokio::spawn(
        TrackPublisher::new(source.clone(), track_tx, cfg.cover_size).run(event_rx),
    );
    let dispatcher = tokio::spawn(CommandDispatcher::new(surface).run(command_rx));
    let probe = tokio::spawn(liveliness_probe(
        source.clone(),
        Duration::from_millis(cfg.intervals.liveliness_ms),
    ));

    let mut teardown = Teardown::new();
    teardown.register("probe", move || probe.abort());
    teardown.register("watcher", move || watcher.abort());
    teardown.register("publisher", move || publisher.abort());
    teardown.register("dispatcher", move || dispatcher.abort());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("received ctrl-c; shutting down");

    server.stop().await;
    teardown.run();

    Ok(())
}

async fn doctor(cfg: &AppConfig) -> Result<()> {
    println!("== nowplay-bridge doctor ==");

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    println!(
        "Command endpoint {}: {}",
        addr,
        if port_answering(&addr).await {
            "already answering (a bridge may be running)"
        } else {
            "free"
        }
    );

    let source = build_media_source(&cfg.source_priority);
    println!("Source selected: {}", source.name());

    match source.playback().await {
        Ok(ctx) => println!(
            "Playback: {:?} at {:.1}s",
            ctx.status, ctx.position_seconds
        ),
        Err(err) => println!("Playback read failed: {err}"),
    }

    match source.current_item().await {
        Ok(Some(item)) => println!("Current item: {}", item.id),
        Ok(None) => println!("No active media item"),
        Err(err) => println!("Item read failed: {err}"),
    }

    Ok(())
}

async fn status(cfg: &AppConfig) -> Result<()> {
    let source = build_media_source(&cfg.source_priority);
    println!("source: {}", source.name());

    let item = match source.current_item().await {
        Ok(Some(item)) => item,
        Ok(None) => {
            println!("track: <none>");
            return Ok(());
        }
        Err(err) => {
            println!("error: {err}");
            return Ok(());
        }
    };

    match build_snapshot(source.as_ref(), &item, cfg.cover_size).await {
        Ok((snapshot, context)) => {
            println!("state: {:?}", context.status);
            println!("track: {} - {}", snapshot.artist, snapshot.title);
            if !snapshot.album.is_empty() {
                println!("album: {}", snapshot.album);
            }
            println!(
                "position: {:.1}s / {:.1}s",
                context.position_seconds, snapshot.duration
            );
        }
        Err(err) => println!("error: {err}"),
    }

    Ok(())
}

fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("nowplay-bridge").join("config.toml")
}

fn init_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let cfg = AppConfig::default();
    let toml = toml::to_string_pretty(&cfg)?;
    std::fs::write(path, toml)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    Ok(())
}

fn load_or_default(path: &Path) -> Result<AppConfig> {
    let mut cfg = if !path.exists() {
        AppConfig::default()
    } else {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))?
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}

async fn port_answering(addr: &str) -> bool {
    tokio::time::timeout(
        Duration::from_millis(200),
        tokio::net::TcpStream::connect(addr),
    )
    .await
    .ok()
    .and_then(Result::ok)
    .is_some()
}

fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Ok(v) = std::env::var("NOWPLAY_BRIDGE_PORT") {
        if let Ok(parsed) = v.parse::<u16>() {
            cfg.server.port = parsed;
        }
    }
    if let Ok(v) = std::env::var("NOWPLAY_BRIDGE_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.log_level = v;
        }
    }
    if let Ok(v) = std::env::var("NOWPLAY_BRIDGE_SOURCE") {
        if !v.trim().is_empty() {
            cfg.source_priority = vec![v];
        }
    }
}
