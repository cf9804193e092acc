use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("{listener} listener failed: {source}")]
    Listener {
        listener: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("web server on {addr} failed: {source}")]
    Web {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("listener task panicked: {0}")]
    Panicked(String),

    #[error("in-flight work did not finish within {0:?}")]
    ShutdownTimeout(Duration),
}

/// Supervises the listener tasks of one process.
///
/// The first listener to fail, or an external cancel, stops every listener.
/// Work spawned on [`tracker`](Self::tracker) is then given `grace` to drain.
pub struct ServerGroup {
    shutdown: CancellationToken,
    tracker: TaskTracker,
    listeners: JoinSet<(&'static str, Result<(), ServerError>)>,
    grace: Duration,
}

impl ServerGroup {
    pub fn new(grace: Duration) -> Self {
        Self {
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
            listeners: JoinSet::new(),
            grace,
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn tracker(&self) -> TaskTracker {
        self.tracker.clone()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn spawn<F>(&mut self, name: &'static str, listener: F)
    where
        F: Future<Output = Result<(), ServerError>> + Send + 'static,
    {
        info!(listener = name, "Listener started");
        self.listeners.spawn(async move { (name, listener.await) });
    }

    /// Runs until cancelled or until a listener fails, then drains.
    pub async fn run(mut self) -> Result<(), ServerError> {
        let mut first_error = None;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                joined = self.listeners.join_next() => match joined {
                    None => break,
                    Some(Ok((name, Ok(())))) => {
                        info!(listener = name, "Listener stopped");
                    }
                    Some(Ok((name, Err(e)))) => {
                        error!(listener = name, error = %e, "Listener failed, shutting down");
                        first_error = Some(e);
                        break;
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "Listener task aborted, shutting down");
                        first_error = Some(ServerError::Panicked(e.to_string()));
                        break;
                    }
                },
            }
        }

        self.shutdown.cancel();
        self.tracker.close();

        let listeners = &mut self.listeners;
        let tracker = &self.tracker;
        let drained = tokio::time::timeout(self.grace, async move {
            while let Some(joined) = listeners.join_next().await {
                if let Ok((name, Err(e))) = joined {
                    warn!(listener = name, error = %e, "Listener failed during shutdown");
                }
            }
            tracker.wait().await;
        })
        .await;

        if let Some(e) = first_error {
            return Err(e);
        }
        if drained.is_err() {
            self.listeners.abort_all();
            warn!(grace = ?self.grace, in_flight = self.tracker.len(), "Shutdown deadline exceeded");
            return Err(ServerError::ShutdownTimeout(self.grace));
        }

        info!("All listeners stopped");
        Ok(())
    }
}
