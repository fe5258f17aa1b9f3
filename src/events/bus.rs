//! Broadcast-backed event bus.

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::events::{SecretsListener, SecretsSaved};

const DEFAULT_CAPACITY: usize = 64;

/// Key delivered to listeners when they fell behind and missed events.
pub const LAGGED_KEY: &str = "*";

/// Fan-out of [`SecretsSaved`] events to subscribed listeners.
#[derive(Clone)]
pub struct SecretsEventBus {
    tx: broadcast::Sender<SecretsSaved>,
}

impl SecretsEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: SecretsSaved) {
        tracing::debug!(key = %event.key, "Publishing secrets saved event");
        let _ = self.tx.send(event);
    }

    /// Deliver every event published from now on to `listener`.
    ///
    /// Must be called within a Tokio runtime: delivery runs on a spawned task.
    pub fn subscribe<L: SecretsListener>(&self, listener: Arc<L>) -> ListenerHandle {
        let mut rx = self.tx.subscribe();

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => listener.on_secrets_saved(&event),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Secrets listener lagged behind, forcing refresh");
                        listener.on_secrets_saved(&SecretsSaved::new(LAGGED_KEY));
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        ListenerHandle { task: Some(task) }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SecretsEventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription. Dropping it also unsubscribes.
pub struct ListenerHandle {
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Stop delivering events to the listener.
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        count: AtomicUsize,
        keys: Mutex<Vec<String>>,
    }

    impl SecretsListener for Recorder {
        fn on_secrets_saved(&self, event: &SecretsSaved) {
            self.keys.lock().unwrap().push(event.key.clone());
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn wait_for(recorder: &Recorder, expected: usize) {
        for _ in 0..100 {
            if recorder.count.load(Ordering::SeqCst) >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_listener_receives_events() {
        let bus = SecretsEventBus::new();
        let recorder = Arc::new(Recorder::default());
        let _handle = bus.subscribe(recorder.clone());

        bus.publish(SecretsSaved::new("headerapp"));
        bus.publish(SecretsSaved::new("other"));
        wait_for(&recorder, 2).await;

        assert_eq!(*recorder.keys.lock().unwrap(), vec!["headerapp", "other"]);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let bus = SecretsEventBus::new();
        let recorder = Arc::new(Recorder::default());
        let handle = bus.subscribe(recorder.clone());

        bus.publish(SecretsSaved::new("first"));
        wait_for(&recorder, 1).await;

        handle.unsubscribe();
        tokio::time::sleep(Duration::from_millis(20)).await;
        bus.publish(SecretsSaved::new("second"));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(recorder.count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = SecretsEventBus::new();
        bus.publish(SecretsSaved::new("nobody-listens"));
        assert_eq!(bus.listener_count(), 0);
    }
}
