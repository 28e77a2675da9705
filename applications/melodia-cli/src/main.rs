/// Melodia - terminal music player
use anyhow::Context;
use clap::{Parser, Subcommand};
use melodia_cli::{
    playlist, CliConfig, Command, LogHistorySink, Outcome, PlayerSession, SimulatedMedia,
};
use melodia_playback::{PlaybackController, PlaybackEvent, SharedSession, Track, TrackStreamUrl};
use melodia_server_client::{HttpHistorySink, MelodiaClient, ServerConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "melodia")]
#[command(about = "Melodia terminal player", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./melodia.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a JSON playlist interactively
    Play {
        /// Playlist file (JSON array of tracks)
        playlist: PathBuf,

        /// Start playing this track (1-based) immediately
        #[arg(short, long)]
        track: Option<usize>,
    },
    /// Show the signed-in user's recently played songs from the server
    Recent {
        /// Number of songs to fetch
        #[arg(short, long, default_value_t = 10)]
        limit: u32,

        /// User id (overrides session.user_id)
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so it doesn't mix with player output)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "melodia_cli=info,melodia_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Play { playlist, track } => {
            play(config, &playlist, track).await?;
        }
        Commands::Recent { limit, user } => {
            recent(config, user, limit).await?;
        }
        Commands::Config => {
            show_config(config)?;
        }
    }

    Ok(())
}

fn api_client(config: &CliConfig) -> anyhow::Result<Option<Arc<MelodiaClient>>> {
    let Some(url) = &config.server.url else {
        return Ok(None);
    };
    let client = MelodiaClient::new(ServerConfig {
        url: url.clone(),
        access_token: config.server.access_token.clone(),
    })?;
    Ok(Some(Arc::new(client)))
}

fn build_session(config: &CliConfig, tracks: Vec<Track>) -> anyhow::Result<PlayerSession> {
    let user = SharedSession::new();
    if let Some(user_id) = &config.session.user_id {
        user.sign_in(user_id.clone());
    }

    let (media, simulator) = SimulatedMedia::new(config.simulation.simulator());

    let session = match api_client(config)? {
        Some(client) => {
            tracing::info!(url = %config.server.url.as_deref().unwrap_or_default(), "Using Melodia API");
            let resolver = melodia_server_client::ApiStreamResolver::new(
                config.server.url.clone().unwrap_or_default(),
            );
            let controller = PlaybackController::new(
                config.playback.clone(),
                media,
                HttpHistorySink::current(client),
                user.clone(),
            )
            .with_resolver(resolver.clone());
            PlayerSession::new(controller, simulator, user, tracks, &resolver)
        }
        None => {
            tracing::info!("No server configured; plays are only logged");
            let controller =
                PlaybackController::new(config.playback.clone(), media, LogHistorySink, user.clone());
            PlayerSession::new(controller, simulator, user, tracks, &TrackStreamUrl)
        }
    };

    Ok(session)
}

async fn play(config: CliConfig, playlist_path: &Path, start: Option<usize>) -> anyhow::Result<()> {
    let tracks = playlist::load(playlist_path)?;
    tracing::info!(tracks = tracks.len(), "Loaded playlist {}", playlist_path.display());

    let mut session = build_session(&config, tracks)?;
    let mut stdout = std::io::stdout();

    writeln!(stdout, "{} tracks. Type 'help' for commands.", session.playlist().len())?;
    if let Some(n) = start {
        session.execute(Command::Play(n), &mut stdout)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(config.simulation.tick());
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };

                let outcome = line
                    .parse::<Command>()
                    .and_then(|command| session.execute(command, &mut stdout));
                match outcome {
                    Ok(Outcome::Quit) => break,
                    Ok(Outcome::Continue) => {}
                    Err(e) => writeln!(stdout, "{} (type 'help')", e)?,
                }
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                let events = session.tick(now - last_tick);
                last_tick = now;

                if events
                    .iter()
                    .any(|e| matches!(e, PlaybackEvent::TrackChanged { .. }))
                {
                    writeln!(stdout, "{}", session.status_line())?;
                }
            }
        }
    }

    tracing::info!("Goodbye");
    Ok(())
}

async fn recent(config: CliConfig, user: Option<String>, limit: u32) -> anyhow::Result<()> {
    let client = api_client(&config)?.context("server.url is not configured")?;
    let user_id = user
        .or(config.session.user_id)
        .context("No user id (pass --user or set session.user_id)")?;

    let history = client.history().await;
    let tracks = history.client().recent_plays(&user_id, limit).await?;

    if tracks.is_empty() {
        println!("No recently played songs");
    }
    for (i, track) in tracks.iter().enumerate() {
        println!(
            "{:>3}. {} - {} [{}]",
            i + 1,
            track.title,
            track.artist_display_name,
            track
                .duration_seconds
                .map(melodia_playback::format_time)
                .unwrap_or_else(|| "-:--".to_string())
        );
    }

    Ok(())
}

fn show_config(mut config: CliConfig) -> anyhow::Result<()> {
    if config.server.access_token.is_some() {
        config.server.access_token = Some("********".to_string());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
