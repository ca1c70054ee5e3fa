use std::time::Duration;

use tracing_subscriber::EnvFilter;

use minicade_core::audio::NullSink;
use minicade_core::store::{GameStore, JsonFileStore, MemoryStore};
use minicade_host::config::HostConfig;
use minicade_host::registry::GameRegistry;
use minicade_host::runner::{SessionBroadcast, SessionCommand, spawn_session};
use minicade_host::session::GameSession;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = HostConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let store: Box<dyn GameStore> = match JsonFileStore::open(&config.store_path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(
                path = %config.store_path.display(),
                "Cannot open store: {e}, scores will not be kept"
            );
            Box::new(MemoryStore::new())
        },
    };

    let registry = GameRegistry::new();
    tracing::info!(games = registry.available_games(), game_id = %config.game_id, "minicade starting");

    let viewport = (config.viewport.width, config.viewport.height);
    let session = GameSession::open(&registry, &config.game_id, viewport, store, Box::new(NullSink));
    let handle = spawn_session(session, config.frame_interval(), config.broadcast_capacity);
    let mut events = handle.subscribe();

    for action in &config.cheats {
        handle.send(SessionCommand::Cheat(action.clone()));
    }

    let deadline = tokio::time::sleep(Duration::from_secs(config.run_secs));
    tokio::pin!(deadline);
    let mut stopping = false;
    loop {
        tokio::select! {
            _ = &mut deadline, if !stopping => {
                stopping = true;
                handle.send(SessionCommand::Stop);
            }
            event = events.recv() => match event {
                Ok(SessionBroadcast::ScoreChanged(score)) => tracing::debug!(score, "score"),
                Ok(SessionBroadcast::GameOver(outcome)) => tracing::info!(?outcome, "game over"),
                Ok(SessionBroadcast::Ended(snapshot)) => {
                    match serde_json::to_string_pretty(&snapshot) {
                        Ok(json) => println!("{json}"),
                        Err(e) => tracing::error!("Failed to encode snapshot: {e}"),
                    }
                    break;
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                },
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    if let Err(e) = handle.task.await {
        tracing::error!("Session task failed: {e}");
    }
}
