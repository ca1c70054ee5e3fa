use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use minicade_core::game_trait::{GameSnapshot, Outcome};
use minicade_core::input::{InputPhase, PointerEvent};

use crate::session::{GameSession, SessionEvent};

/// Commands sent from the shell to the session task.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Input { phase: InputPhase, event: PointerEvent },
    Cheat(String),
    Restart,
    Stop,
}

/// Broadcasts sent from the session task to every subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionBroadcast {
    ScoreChanged(u32),
    GameOver(Outcome),
    /// The session was closed and the task is exiting.
    Ended(GameSnapshot),
}

impl From<SessionEvent> for SessionBroadcast {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::ScoreChanged(score) => Self::ScoreChanged(score),
            SessionEvent::GameOver(outcome) => Self::GameOver(outcome),
        }
    }
}

/// Handles onto a running session task.
pub struct SessionHandle {
    pub commands: mpsc::UnboundedSender<SessionCommand>,
    pub events: broadcast::Sender<SessionBroadcast>,
    pub task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<SessionBroadcast> {
        self.events.subscribe()
    }

    pub fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).is_ok()
    }
}

/// Spawn the frame loop as a tokio task that owns `session`.
pub fn spawn_session(session: GameSession, frame_interval: Duration, capacity: usize) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, _) = broadcast::channel(capacity.max(1));

    let loop_tx = event_tx.clone();
    let task = tokio::spawn(async move {
        run_frame_loop(session, frame_interval, cmd_rx, loop_tx).await;
    });

    SessionHandle {
        commands: cmd_tx,
        events: event_tx,
        task,
    }
}

fn publish(tx: &broadcast::Sender<SessionBroadcast>, events: Vec<SessionEvent>) {
    for event in events {
        // No subscribers is not an error.
        let _ = tx.send(event.into());
    }
}

/// Frame loop: advance the session clock by real elapsed time each frame and
/// apply commands between frames. Ticks and input never overlap.
async fn run_frame_loop(
    mut session: GameSession,
    frame_interval: Duration,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionBroadcast>,
) {
    session.start();

    let mut interval = tokio::time::interval(frame_interval.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Instant::now();
                let elapsed = now - last_frame;
                last_frame = now;
                publish(&event_tx, session.advance(elapsed));
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Input { phase, event }) => {
                        publish(&event_tx, session.input(phase, &event));
                    },
                    Some(SessionCommand::Cheat(action)) => {
                        publish(&event_tx, session.cheat(&action));
                    },
                    Some(SessionCommand::Restart) => {
                        publish(&event_tx, session.restart());
                    },
                    Some(SessionCommand::Stop) | None => break,
                }
            }
        }
    }

    let snapshot = session.close();
    tracing::info!(game_id = session.id(), "session task ended");
    let _ = event_tx.send(SessionBroadcast::Ended(snapshot));
}
