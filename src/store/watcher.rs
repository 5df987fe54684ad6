//! Live subscription to a record store.
//!
//! A [`Subscription`] polls the store path and delivers a fresh snapshot of
//! all records whenever the path changes.

use super::loader::{fingerprint, load_records, Fingerprint};
use crate::models::LogRecord;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// A live stream of record snapshots.
///
/// The first snapshot is delivered immediately. Load failures are yielded
/// as errors and the subscription keeps polling.
pub struct Subscription {
    receiver: mpsc::Receiver<Result<Vec<LogRecord>>>,
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Start polling `path` every `interval`.
    pub fn spawn(path: PathBuf, interval: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(4);
        let handle = tokio::spawn(poll_loop(path, interval, sender));
        Self { receiver, handle }
    }

    /// Wait for the next snapshot. Returns `None` once polling has stopped.
    pub async fn next(&mut self) -> Option<Result<Vec<LogRecord>>> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn poll_loop(
    path: PathBuf,
    interval: Duration,
    sender: mpsc::Sender<Result<Vec<LogRecord>>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // None until the first delivery; then the last fingerprint, or None
    // inside when the path could not be inspected.
    let mut last: Option<Option<Fingerprint>> = None;

    loop {
        ticker.tick().await;

        let current = match fingerprint(&path) {
            Ok(print) => Some(print),
            Err(e) => {
                debug!("Fingerprint failed: {:#}", e);
                None
            }
        };

        if last.as_ref() == Some(&current) {
            continue;
        }
        last = Some(current);

        let load_path = path.clone();
        let snapshot = match tokio::task::spawn_blocking(move || load_records(&load_path)).await {
            Ok(result) => result,
            Err(e) => Err(e.into()),
        };

        if let Err(ref e) = snapshot {
            warn!("Failed to load {}: {:#}", path.display(), e);
        }

        if sender.send(snapshot).await.is_err() {
            debug!("Subscriber dropped, stopping watch on {}", path.display());
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_delivers_initial_and_changed_snapshots() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("logs.jsonl");
        fs::write(&file, "{\"id\": \"a\", \"date\": \"2025-10-14\"}\n").unwrap();

        let mut subscription = Subscription::spawn(file.clone(), Duration::from_millis(20));

        let first = tokio::time::timeout(WAIT, subscription.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(first.len(), 1);

        fs::write(
            &file,
            "{\"id\": \"a\", \"date\": \"2025-10-14\"}\n{\"id\": \"b\", \"date\": \"2025-10-15\"}\n",
        )
        .unwrap();

        let second = tokio::time::timeout(WAIT, subscription.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].id, "b");
    }

    #[tokio::test]
    async fn test_missing_path_yields_error_once() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("absent.json");

        let mut subscription = Subscription::spawn(file, Duration::from_millis(20));

        let first = tokio::time::timeout(WAIT, subscription.next())
            .await
            .unwrap()
            .unwrap();
        assert!(first.is_err());

        // Nothing changes, so nothing more arrives
        let quiet = tokio::time::timeout(Duration::from_millis(150), subscription.next()).await;
        assert!(quiet.is_err());
    }
}
