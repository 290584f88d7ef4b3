//! Background refresh of the session user's pending invitations.
//!
//! The poller fetches immediately and then once per interval. Polls run one
//! at a time on the poller task; ticks that fall due while a poll is still
//! running are skipped rather than queued. Subscribers read the latest
//! [`InvitationSnapshot`] from a watch channel. A failed poll is logged and
//! leaves the previous snapshot in place.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::domain::ports::ConsentStore;
use crate::domain::{Consent, ConsentService, Session};

/// Interval between polls unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Latest view of the invitations awaiting the user's answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationSnapshot {
    /// Pending invitations, in store order.
    pub invitations: Vec<Consent>,
    /// When the snapshot was fetched; `None` before the first successful poll.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl InvitationSnapshot {
    /// Number of invitations awaiting an answer.
    pub fn count(&self) -> usize {
        self.invitations.len()
    }
}

/// Configured, not yet running poller.
pub struct NotificationPoller<S: ?Sized> {
    service: ConsentService<S>,
    session: Session,
    interval: Duration,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<S> NotificationPoller<S>
where
    S: ConsentStore + ?Sized + 'static,
{
    /// Poll `service` on behalf of `session` every [`DEFAULT_POLL_INTERVAL`].
    pub fn new(
        service: ConsentService<S>,
        session: Session,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            service,
            session,
            interval: DEFAULT_POLL_INTERVAL,
            clock,
        }
    }

    /// Override the poll interval. A zero interval falls back to the default.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Start polling on the current tokio runtime.
    pub fn spawn(self) -> PollerHandle {
        let (snapshot_tx, snapshot_rx) = watch::channel(InvitationSnapshot::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(snapshot_tx, shutdown_rx));
        PollerHandle {
            snapshots: snapshot_rx,
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    async fn run(
        self,
        snapshots: watch::Sender<InvitationSnapshot>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let user = self.session.user_id();

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                outcome = self.service.pending_invitations(&self.session) => outcome,
            };

            match outcome {
                Ok(invitations) => {
                    debug!(user_id = %user, count = invitations.len(), "invitations refreshed");
                    let snapshot = InvitationSnapshot {
                        invitations,
                        refreshed_at: Some(self.clock.utc()),
                    };
                    if snapshots.send(snapshot).is_err() {
                        debug!(user_id = %user, "no snapshot subscribers left");
                        break;
                    }
                }
                Err(error) => {
                    warn!(
                        user_id = %user,
                        code = ?error.code(),
                        message = error.message(),
                        "invitation poll failed; keeping previous snapshot"
                    );
                }
            }
        }
        debug!(user_id = %user, "invitation poller stopped");
    }
}

/// Running poller. Dropping the handle stops the task.
pub struct PollerHandle {
    snapshots: watch::Receiver<InvitationSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Receiver notified whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<InvitationSnapshot> {
        self.snapshots.clone()
    }

    /// Most recently published snapshot.
    pub fn latest(&self) -> InvitationSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop polling and wait for the task to finish.
    pub async fn cancel(mut self) {
        if let Some(shutdown) = self.shutdown.take()
            && shutdown.send(()).is_err()
        {
            debug!("invitation poller already stopped");
        }
        if let Err(error) = (&mut self.task).await {
            warn!(%error, "invitation poller ended abnormally");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
