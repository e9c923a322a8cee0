use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use deckhand_playback_session::PlaybackSession;
use deckhand_shared_config::CommonConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

#[derive(Parser, Debug)]
#[command(name = "deckhand-remote")]
#[command(about = "Control Spotify playback from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Show the track the player reports
    NowPlaying,
    /// Resume playback
    Play,
    /// Pause playback
    Pause,
    /// Skip to the next track
    Next,
    /// Skip to the previous track
    Previous,
    /// Toggle shuffle
    Shuffle,
    /// Advance repeat (off, context, track)
    Repeat,
    /// Show the mirrored player state
    State,
    /// Poll the player and print track changes
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CommonConfig::load().context("Failed to load configuration")?;
    let plain = config.environment.is_production();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "deckhand_remote={0},deckhand_playback_session={0},deckhand_streaming_http={0}",
                    config.log_level
                )
                .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!plain)
                .with_target(!plain),
        )
        .init();

    tracing::debug!(environment = %config.environment, "Starting Deckhand remote");

    let session = PlaybackSession::connect(&config.spotify, &config.http)
        .await
        .context("Failed to create playback session")?;
    if !session.has_access_token().await {
        bail!(
            "Spotify token exchange failed; check SPOTIFY_CLIENT_ID, \
             SPOTIFY_CLIENT_SECRET and SPOTIFY_REFRESH_TOKEN"
        );
    }

    run(&session, cli.command).await
}

async fn run(session: &PlaybackSession, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::NowPlaying => {
            let now = session
                .get_currently_playing()
                .await
                .context("Failed to read the current track")?;
            println!("{}", output::now_playing(&now, session.play_state()));
        }
        Commands::Play => {
            session.play().await.context("Play failed")?;
            println!("Playing");
        }
        Commands::Pause => {
            session.pause().await.context("Pause failed")?;
            println!("Paused");
        }
        Commands::Next => {
            session.skip_to_next().await.context("Skip failed")?;
            println!("Skipped to next track");
        }
        Commands::Previous => {
            session
                .skip_to_previous()
                .await
                .context("Skip back failed")?;
            println!("Skipped to previous track");
        }
        Commands::Shuffle => {
            let shuffle = session
                .toggle_shuffle()
                .await
                .context("Shuffle toggle failed")?;
            println!("Shuffle {}", output::shuffle(shuffle));
        }
        Commands::Repeat => {
            let repeat = session
                .toggle_repeat()
                .await
                .context("Repeat toggle failed")?;
            println!("Repeat {}", output::repeat(repeat));
        }
        Commands::State => {
            // Play state is the only axis the API reports back
            if let Err(e) = session.get_currently_playing().await {
                tracing::warn!(error = %e, "Could not refresh play state");
            }
            println!("{}", output::state(&session.playback_state()));
        }
        Commands::Watch { interval_secs } => {
            watch(session, Duration::from_secs(interval_secs)).await;
        }
    }
    Ok(())
}

/// Poll until Ctrl-C, printing whenever the reported track or play state changes
async fn watch(session: &PlaybackSession, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last_line: Option<String> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch");
                return;
            }
        }

        match session.get_currently_playing().await {
            Ok(now) => {
                let line = output::now_playing(&now, session.play_state());
                if last_line.as_deref() != Some(line.as_str()) {
                    println!("{}", line);
                    last_line = Some(line);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Currently-playing poll failed");
            }
        }
    }
}
