use mazewalk::config::Config;
use mazewalk::models::{MazeDefinition, MazeDocument, Position};
use mazewalk::services::maze_repository::MazeRepository;
use mazewalk::services::secure_channel::{ReqwestTransport, SecureChannel};
use mazewalk::services::session::{
    LocationSettingsStatus, PermissionStatus, RenderCommand, TrackingSession,
};
use mazewalk::services::tracking::PlayerTrackingStateMachine;
use std::env;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_help() {
    eprintln!(
        "\
Usage: mazewalk [OPTIONS]

Replays a recorded walk against a maze and prints the guidance for each sample.

Options:
  --maze=NAME        Fetch the maze from the backend over the pinned channel
  --maze-file=PATH   Load the maze from a local JSON document instead
  --track=PATH       File with one 'lat,lng' sample per line (required)
  --report           Submit the play result to the backend when done
  --help             Show this help message

Environment variables:
  MAZE_BACKEND_HOST / MAZE_BACKEND_PORT     Backend address
  MAZE_CLIENT_KEYSTORE / MAZE_TRUST_ANCHOR  Credential assets
  MAZE_HOSTNAME_POLICY                      strict | accept-any-pinned-host
  MAZE_PROXIMITY_TOLERANCE_M / MAZE_DRIFT_TOLERANCE_M"
    );
}

fn parse_track(text: &str) -> Result<Vec<Position>, String> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|(i, line)| {
            let (lat, lng) = line
                .split_once(',')
                .ok_or_else(|| format!("line {}: expected 'lat,lng'", i + 1))?;
            let lat: f64 = lat
                .trim()
                .parse()
                .map_err(|_| format!("line {}: invalid latitude", i + 1))?;
            let lng: f64 = lng
                .trim()
                .parse()
                .map_err(|_| format!("line {}: invalid longitude", i + 1))?;
            // Range checks happen in the tracker so bad samples are counted, not fatal
            Ok(Position { lat, lng })
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mazewalk=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let maze_name = args.iter().find_map(|a| a.strip_prefix("--maze="));
    let maze_file = args.iter().find_map(|a| a.strip_prefix("--maze-file="));
    let track_path = args
        .iter()
        .find_map(|a| a.strip_prefix("--track="))
        .ok_or("--track=PATH is required. Run with --help for usage.")?;
    let report = args.iter().any(|a| a == "--report");

    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;
    tracing::info!("Configuration loaded successfully");

    let channel = Arc::new(SecureChannel::with_transport(
        config.endpoint()?,
        config.hostname_policy,
        match config.request_timeout {
            Some(timeout) => ReqwestTransport::with_timeout(timeout),
            None => ReqwestTransport::new(),
        },
    ));
    let repository = MazeRepository::new(channel, Arc::new(config.credential_store()));

    let maze = match (maze_name, maze_file) {
        (Some(name), None) => repository.fetch_maze(name).await?,
        (None, Some(path)) => {
            let text = tokio::fs::read_to_string(path).await?;
            let document: MazeDocument = serde_json::from_str(&text)?;
            MazeDefinition::try_from(document)?
        }
        _ => return Err("Exactly one of --maze=NAME or --maze-file=PATH is required".into()),
    };

    let samples = parse_track(&tokio::fs::read_to_string(track_path).await?)?;
    tracing::info!("Replaying {} samples against maze '{}'", samples.len(), maze.name);

    let tracker = PlayerTrackingStateMachine::new(maze, config.tracking.tolerance()?)
        .with_policy(config.tracking.last_valid_policy);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            if let RenderCommand::Guidance {
                position,
                guidance,
                marker_visible,
            } = command
            {
                println!("{} {:?} marker_visible={}", position, guidance, marker_visible);
            }
        }
    });

    let mut session = TrackingSession::new(tracker, tx);
    session.on_settings_result(LocationSettingsStatus::Satisfied)?;
    session.on_permission(PermissionStatus::Granted);

    for sample in samples {
        if let Err(e) = session.on_position(sample) {
            tracing::warn!("Skipping sample {}: {}", sample, e);
        }
    }

    let result = session.end();
    printer.await?;

    println!(
        "samples={} off_path={} on_path_ratio={:.2} reached_exit={}",
        result.samples,
        result.off_path_samples,
        result.on_path_ratio(),
        result.reached_exit
    );

    if report {
        let status = repository.submit_result(&result).await?;
        tracing::info!("Result accepted with HTTP {}", status);
    }

    Ok(())
}
