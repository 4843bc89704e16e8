//! Inactivity monitor.
//!
//! `IdleMonitor` runs a background task that logs the session out once no
//! activity has been reported for the configured threshold. Activity is
//! reported with `touch`, from the monitor itself or from any cloned
//! `ActivityHandle`. After firing, the monitor stays idle until the next
//! activity, which re-arms the timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::auth::SessionStore;
use crate::config::ClientConfig;

/// Reports user activity to an `IdleMonitor`. Clone is cheap.
#[derive(Clone, Debug)]
pub struct ActivityHandle {
    notify: Arc<Notify>,
}

impl ActivityHandle {
    /// Record activity, restarting the idle countdown
    pub fn touch(&self) {
        self.notify.notify_one();
    }
}

/// Background idle timer. The task is aborted when the monitor is dropped.
pub struct IdleMonitor {
    activity: ActivityHandle,
    idle_rx: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl IdleMonitor {
    /// Start monitoring. Must be called from within a tokio runtime.
    ///
    /// With `start_idle` the monitor begins in the idle state and does not
    /// fire until activity has been seen and the threshold elapses again.
    pub fn start(session: SessionStore, idle_timeout: Duration, start_idle: bool) -> Self {
        let notify = Arc::new(Notify::new());
        let (idle_tx, idle_rx) = watch::channel(start_idle);

        let task = tokio::spawn(run(session, Arc::clone(&notify), idle_tx, idle_timeout, start_idle));
        debug!(idle_timeout_ms = idle_timeout.as_millis() as u64, start_idle, "Idle monitor started");

        Self {
            activity: ActivityHandle { notify },
            idle_rx,
            task,
        }
    }

    /// Start with the threshold and initial state from `config`
    pub fn from_config(config: &ClientConfig, session: SessionStore) -> Self {
        Self::start(session, config.idle_timeout, config.start_idle)
    }

    pub fn touch(&self) {
        self.activity.touch();
    }

    pub fn activity_handle(&self) -> ActivityHandle {
        self.activity.clone()
    }

    pub fn is_idle(&self) -> bool {
        *self.idle_rx.borrow()
    }

    /// Watch idle/active transitions
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.idle_rx.clone()
    }
}

impl Drop for IdleMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    session: SessionStore,
    notify: Arc<Notify>,
    idle_tx: watch::Sender<bool>,
    idle_timeout: Duration,
    mut idle: bool,
) {
    loop {
        if idle {
            notify.notified().await;
            idle = false;
            idle_tx.send_replace(false);
            debug!("Activity resumed");
        }

        tokio::select! {
            _ = notify.notified() => {}
            _ = tokio::time::sleep(idle_timeout) => {
                info!(idle_secs = idle_timeout.as_secs(), "Idle threshold reached, logging out");
                idle = true;
                idle_tx.send_replace(true);
                session.logout();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    const THIRTY_MINUTES: Duration = Duration::from_millis(1_800_000);

    fn logged_in_store() -> SessionStore {
        let store = SessionStore::new();
        let ticket = store.begin_login();
        store.complete_login(ticket, "tok123".to_string(), "Alice".to_string(), None);
        store
    }

    async fn advance(d: Duration) {
        sleep(d).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_threshold() {
        let store = logged_in_store();
        let monitor = IdleMonitor::start(store.clone(), THIRTY_MINUTES, false);
        assert!(!monitor.is_idle());

        advance(THIRTY_MINUTES - Duration::from_secs(1)).await;
        assert!(store.is_logged_in());

        advance(Duration::from_secs(2)).await;
        assert!(!store.is_logged_in());
        assert_eq!(store.auth_status().as_str(), "");
        assert!(monitor.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_resets_countdown() {
        let store = logged_in_store();
        let monitor = IdleMonitor::start(store.clone(), THIRTY_MINUTES, false);
        let handle = monitor.activity_handle();

        advance(Duration::from_secs(20 * 60)).await;
        handle.touch();
        advance(Duration::from_secs(20 * 60)).await;
        assert!(store.is_logged_in());
        assert!(!monitor.is_idle());

        advance(Duration::from_secs(11 * 60)).await;
        assert!(!store.is_logged_in());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_idle_waits_for_activity() {
        let store = logged_in_store();
        let monitor = IdleMonitor::start(store.clone(), THIRTY_MINUTES, true);
        assert!(monitor.is_idle());

        advance(Duration::from_secs(2 * 60 * 60)).await;
        assert!(store.is_logged_in());

        monitor.touch();
        advance(Duration::from_secs(60)).await;
        assert!(!monitor.is_idle());

        advance(THIRTY_MINUTES).await;
        assert!(!store.is_logged_in());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearms_after_activity() {
        let store = logged_in_store();
        let monitor = IdleMonitor::start(store.clone(), THIRTY_MINUTES, false);

        advance(THIRTY_MINUTES + Duration::from_secs(1)).await;
        assert!(!store.is_logged_in());

        // Stays idle without activity; a new login is not logged out
        let ticket = store.begin_login();
        store.complete_login(ticket, "tok456".to_string(), "Alice".to_string(), None);
        advance(THIRTY_MINUTES * 2).await;
        assert!(store.is_logged_in());

        monitor.touch();
        advance(THIRTY_MINUTES + Duration::from_secs(1)).await;
        assert!(!store.is_logged_in());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_reports_idle() {
        let store = logged_in_store();
        let monitor = IdleMonitor::start(store.clone(), Duration::from_secs(5), false);
        let mut rx = monitor.subscribe();

        advance(Duration::from_secs(6)).await;
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_monitor() {
        let store = logged_in_store();
        let monitor = IdleMonitor::start(store.clone(), THIRTY_MINUTES, false);
        drop(monitor);

        advance(THIRTY_MINUTES * 2).await;
        assert!(store.is_logged_in());
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config() {
        let store = logged_in_store();
        let mut config = ClientConfig::new("http://localhost");
        config.idle_timeout = Duration::from_secs(3);
        let monitor = IdleMonitor::from_config(&config, store.clone());

        advance(Duration::from_secs(4)).await;
        assert!(!store.is_logged_in());
        assert!(monitor.is_idle());
    }
}
