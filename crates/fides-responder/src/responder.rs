//! Polling auto-responder for inbound connection offers.
//!
//! Runs as a background task: each iteration lists offers in state
//! `inbound_offer` and accepts the first one. A failed accept deletes
//! the offer and the loop carries on. The task ends on `stop()` or when
//! the responder is dropped; stopping is observed at iteration
//! boundaries only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use fides_agent::{AgentClient, ConnectionFilter, ConnectionState};

use crate::error::ResponderError;

/// Default wait between polling iterations.
const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

/// Accepts inbound connection offers on behalf of the agent.
pub struct ConnectionResponder {
    agent: Arc<dyn AgentClient>,
    interval_ms: Arc<AtomicU64>,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionResponder {
    /// Create a stopped responder with the default poll interval.
    pub fn new(agent: Arc<dyn AgentClient>) -> Self {
        Self {
            agent,
            interval_ms: Arc::new(AtomicU64::new(DEFAULT_POLL_INTERVAL_MS)),
            stop_tx: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Change the poll interval. Takes effect at the next re-arm.
    pub fn set_interval_ms(&self, ms: i64) -> Result<(), ResponderError> {
        if ms < 0 {
            return Err(ResponderError::InvalidInterval(ms));
        }
        self.interval_ms.store(ms as u64, Ordering::SeqCst);
        Ok(())
    }

    /// Current poll interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms.load(Ordering::SeqCst)
    }

    /// Whether the polling task is live.
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .expect("responder handle lock poisoned")
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Spawn the polling task.
    pub fn start(&self) -> Result<(), ResponderError> {
        let mut handle_slot = self.handle.lock().expect("responder handle lock poisoned");
        if handle_slot.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(ResponderError::AlreadyRunning);
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let agent = self.agent.clone();
        let interval_ms = self.interval_ms.clone();

        let handle = tokio::spawn(async move {
            tracing::info!("connection responder started");
            loop {
                if *stop_rx.borrow() {
                    break;
                }
                respond_once(agent.as_ref()).await;

                let interval = Duration::from_millis(interval_ms.load(Ordering::SeqCst));
                tokio::select! {
                    changed = stop_rx.changed() => {
                        // A closed channel means the responder was dropped
                        // without `stop()`; treat it as a stop signal.
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            tracing::info!("connection responder stopped");
        });

        *handle_slot = Some(handle);
        *self.stop_tx.lock().expect("responder stop lock poisoned") = Some(stop_tx);
        Ok(())
    }

    /// Signal the polling task to stop and wait for it to finish.
    ///
    /// The in-flight iteration completes; no further accept attempts
    /// happen after that.
    pub async fn stop(&self) {
        let stop_tx = self
            .stop_tx
            .lock()
            .expect("responder stop lock poisoned")
            .take();
        if let Some(tx) = stop_tx {
            let _ = tx.send(true);
        }
        let handle = self
            .handle
            .lock()
            .expect("responder handle lock poisoned")
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "responder task join failed");
            }
        }
    }
}

/// One polling iteration: accept the first inbound offer, if any.
///
/// Failures are logged and swallowed so one bad offer never takes the
/// loop down. An offer that cannot be accepted is deleted.
async fn respond_once(agent: &dyn AgentClient) {
    let filter = ConnectionFilter::by_state(ConnectionState::InboundOffer);
    let offers = match agent.get_connections(&filter).await {
        Ok(offers) => offers,
        Err(e) => {
            tracing::error!(error = %e, "failed to list inbound offers");
            return;
        }
    };
    let Some(offer) = offers.into_iter().next() else {
        return;
    };

    match agent.accept_connection(&offer.id).await {
        Ok(connection) => {
            tracing::info!(
                connection = %connection.id,
                remote = ?connection.remote.name,
                "accepted inbound connection offer"
            );
        }
        Err(e) => {
            tracing::error!(connection = %offer.id, error = %e, "offer accept failed, deleting");
            if let Err(e) = agent.delete_connection(&offer.id).await {
                tracing::error!(connection = %offer.id, error = %e, "failed to delete offer");
            }
        }
    }
}
