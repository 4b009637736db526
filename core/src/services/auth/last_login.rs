//! Detached last-login updates

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::entities::PrincipalId;
use crate::repositories::user::UserRepository;

/// Records logins on a background task with its own timeout
///
/// The task is never awaited by the request and its failures only bump
/// [`failures`](Self::failures) and emit a warning.
#[derive(Debug, Clone)]
pub struct LastLoginRecorder {
    timeout: Duration,
    failures: Arc<AtomicU64>,
}

impl LastLoginRecorder {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of updates that failed or timed out
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Spawns the update; the handle may be dropped
    pub fn record<U>(&self, users: Arc<U>, principal_id: PrincipalId) -> JoinHandle<()>
    where
        U: UserRepository + ?Sized + 'static,
    {
        let timeout = self.timeout;
        let failures = Arc::clone(&self.failures);

        tokio::spawn(async move {
            match tokio::time::timeout(timeout, users.update_last_login(principal_id)).await {
                Ok(Ok(_)) => {
                    tracing::debug!(principal_id, "Last login recorded");
                }
                Ok(Err(e)) => {
                    failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(principal_id, error = %e, "Failed to record last login");
                }
                Err(_) => {
                    failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        principal_id,
                        timeout_ms = timeout.as_millis() as u64,
                        "Last login update timed out"
                    );
                }
            }
        })
    }
}
