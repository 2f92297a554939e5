//! Polling edge watcher for input pins.
//!
//! Best-effort only: the pin is sampled on an interval, so edges shorter
//! than the poll period can be missed. Callers needing guaranteed edge
//! capture must use an interrupt-capable driver stack instead.

use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::handle::InputHandle;
use crate::pin::Signal;

/// Which transitions produce events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Rising,
    Falling,
    Both,
}

impl Edge {
    fn matches(self, previous: Signal, current: Signal) -> bool {
        if previous == current {
            return false;
        }
        match self {
            Edge::Rising => current == Signal::High,
            Edge::Falling => current == Signal::Low,
            Edge::Both => true,
        }
    }
}

/// One observed transition on a watched pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub board_pin: u8,
    pub previous: Signal,
    pub current: Signal,
}

/// Owns an input handle for the duration of a watch; `stop` hands the
/// handle back.
pub struct PinWatcher {
    events: mpsc::Receiver<PinEvent>,
    shutdown: broadcast::Sender<()>,
    task: tokio::task::JoinHandle<InputHandle>,
}

impl PinWatcher {
    pub fn spawn(handle: InputHandle, edge: Edge, interval: Duration) -> Self {
        let (event_tx, event_rx) = mpsc::channel(16);
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let board_pin = handle.board_pin();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut previous = None;
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!("pin {} watcher shutting down", board_pin);
                        break;
                    }
                    _ = ticker.tick() => {
                        let current = match handle.read() {
                            Ok(signal) => signal,
                            Err(err) => {
                                tracing::error!("pin {} read failed: {}", board_pin, err);
                                continue;
                            }
                        };
                        if let Some(previous) = previous {
                            if edge.matches(previous, current) {
                                let event = PinEvent { board_pin, previous, current };
                                if event_tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                        }
                        previous = Some(current);
                    }
                }
            }
            handle
        });

        Self { events: event_rx, shutdown: shutdown_tx, task }
    }

    pub async fn next_event(&mut self) -> Option<PinEvent> {
        self.events.recv().await
    }

    /// Stops the poll loop and returns the input handle to the caller.
    pub async fn stop(self) -> InputHandle {
        let _ = self.shutdown.send(());
        drop(self.events);
        self.task.await.expect("watcher task panicked")
    }
}
