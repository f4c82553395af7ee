use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use legacy_lights::{
    animation::{AnimationDriver, Engine},
    color::ColorSpaceRegistry,
    config::Config,
    input::{ActivityMonitor, ControlBindings},
    output::{http::DEFAULT_URL, HttpSink, NullSink, RenderSink, Ws2801Sink},
    script::ScriptRunner,
    server::{self, AppState},
    strip::{Strip, StripSink},
};

#[derive(Parser)]
#[command(
    name = "legacy-lights",
    version,
    about = "Drive an addressable RGB LED strip",
    long_about = "Legacy Lights composes LED strip frames from game controller input, HTTP requests and recorded images, and serves the strip over HTTP and WebSocket."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Discard frames instead of writing to the SPI device
    #[arg(long, global = true)]
    no_hardware: bool,

    /// Post frames to a remote strip server (default http://localhost:5000/pixels/rgb)
    #[arg(long, global = true, value_name = "URL", num_args = 0..=1, default_missing_value = DEFAULT_URL)]
    remote: Option<String>,

    /// Recording image to play on start
    #[arg(long)]
    play: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the engine, animation thread and HTTP server (default)
    Serve,

    /// Run strip commands directly, e.g. `script red 0.5 3*rainbow`
    Script {
        /// Commands, one per argument
        commands: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Legacy Lights v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    if cli.no_hardware {
        config.output.hardware = false;
    }
    if let Some(url) = cli.remote {
        config.output.url = Some(url);
    }
    config.validate()?;

    match cli.command {
        Some(Command::Script { commands }) => run_script(&config, commands).await,
        Some(Command::Serve) | None => run_server(config, cli.play).await,
    }
}

fn open_sink(config: &Config) -> Result<Box<dyn RenderSink>> {
    if !config.output.hardware {
        info!("Hardware output disabled");
        return Ok(Box::new(NullSink::new()));
    }

    if let Some(url) = &config.output.url {
        let sink = HttpSink::new(url, config.output.timeout());
        info!("Posting frames to {} (timeout {:?})", sink.url(), config.output.timeout());
        return Ok(Box::new(sink));
    }

    let sink = Ws2801Sink::open(
        &config.output.device,
        config.strip.pixel_count,
        config.strip.channel_order,
    )?;
    info!("Writing frames to {:?}", sink.path());
    Ok(Box::new(sink))
}

async fn run_script(config: &Config, commands: Vec<String>) -> Result<()> {
    let (frames, _) = broadcast::channel(config.server.frame_channel_capacity);
    let strip = Strip::new(config.strip.pixel_count, open_sink(config)?, frames);
    let mut runner = ScriptRunner::new(strip);

    tokio::task::spawn_blocking(move || runner.run(commands)).await??;
    Ok(())
}

async fn run_server(config: Config, play: Option<PathBuf>) -> Result<()> {
    let (frames, _) = broadcast::channel(config.server.frame_channel_capacity);
    let strip = Strip::new(config.strip.pixel_count, open_sink(&config)?, frames).into_shared();

    let mut engine = Engine::from_config(&config);
    if let Some(path) = play {
        info!("Playing {:?}", path);
        engine.play_image(&path)?;
    }
    let engine = engine.into_shared();

    let driver = AnimationDriver::new(Arc::clone(&engine), StripSink::new(Arc::clone(&strip))).spawn()?;

    let (events, event_queue) = mpsc::channel(config.server.event_queue_capacity);
    let monitor = ActivityMonitor::new();
    let monitor_task = monitor.spawn(event_queue);

    let state = AppState {
        strip,
        engine,
        bindings: Arc::new(Mutex::new(ControlBindings::new(config.controls.clone()))),
        monitor,
        events,
        spaces: Arc::new(ColorSpaceRegistry::new()),
        recordings_dir: config.playback.recordings_dir.clone(),
    };

    let served = server::serve(&config.server, state).await;
    if let Err(e) = &served {
        warn!("Server failed: {}", e);
    }

    driver.stop();
    monitor_task.abort();
    info!("Stopped");
    Ok(served?)
}
