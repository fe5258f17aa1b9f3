//! Secrets file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::events::{SecretsEventBus, SecretsSaved};
use crate::secrets::FileSecretStore;

/// Watches the secrets file, reloads the store on change and announces it.
pub struct SecretsWatcher {
    store: Arc<FileSecretStore>,
    bus: SecretsEventBus,
    app_key: String,
}

impl SecretsWatcher {
    pub fn new(store: Arc<FileSecretStore>, bus: SecretsEventBus, app_key: impl Into<String>) -> Self {
        Self {
            store,
            bus,
            app_key: app_key.into(),
        }
    }

    /// Start watching in a background thread. Keep the returned watcher alive.
    ///
    /// The parent directory is watched so that editors replacing the file
    /// (write to temp, rename) are still noticed.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.store.path().to_path_buf();
        let file_name = path.file_name().map(|n| n.to_os_string());
        let watch_dir = watch_directory(&path);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant && ours {
                        tracing::info!("Secrets file change detected, reloading...");
                        self.reload_and_announce();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Secrets watcher started");
        Ok(watcher)
    }

    /// Reload the store; on success publish [`SecretsSaved`].
    /// Returns true if the reload succeeded.
    pub fn reload_and_announce(&self) -> bool {
        match self.store.reload() {
            Ok(_) => {
                self.bus.publish(SecretsSaved::new(self.app_key.clone()));
                true
            }
            Err(e) => {
                tracing::error!("Failed to reload secrets: {}. Keeping current secrets.", e);
                false
            }
        }
    }
}

fn watch_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SecretsListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl SecretsListener for Counter {
        fn on_secrets_saved(&self, _event: &SecretsSaved) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_watch_directory() {
        assert_eq!(watch_directory(Path::new("secrets.toml")), PathBuf::from("."));
        assert_eq!(watch_directory(Path::new("/etc/app/secrets.toml")), PathBuf::from("/etc/app"));
    }

    #[tokio::test]
    async fn test_reload_announces_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "[apps.headerapp.site]\n\"/\" = \"x-a: 1\"\n").unwrap();

        let store = Arc::new(FileSecretStore::load(&path).unwrap());
        let bus = SecretsEventBus::new();
        let counter = Arc::new(Counter::default());
        let _handle = bus.subscribe(counter.clone());
        let watcher = SecretsWatcher::new(store.clone(), bus, "headerapp");

        std::fs::write(&path, "[apps.headerapp.other]\n\"/\" = \"x-a: 2\"\n").unwrap();
        assert!(watcher.reload_and_announce());

        std::fs::write(&path, "[[[ broken").unwrap();
        assert!(!watcher.reload_and_announce());

        for _ in 0..100 {
            if counter.0.load(Ordering::SeqCst) >= 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(store.site_count(), 1);
    }
}
