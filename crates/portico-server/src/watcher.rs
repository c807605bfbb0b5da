//! File watching for rebuild-on-change.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

use crate::server::ServerError;

/// Quiet period that ends a burst of events.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// JSON data file was modified
    DataModified(PathBuf),

    /// Template was modified
    TemplateModified(PathBuf),

    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),

    /// Any other modification
    Modified(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::DataModified(p)
            | Self::TemplateModified(p)
            | Self::Created(p)
            | Self::Deleted(p)
            | Self::Modified(p) => p,
        }
    }

    /// What changed, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataModified(_) => "Data",
            Self::TemplateModified(_) => "Template",
            Self::Created(_) => "File created",
            Self::Deleted(_) => "File deleted",
            Self::Modified(_) => "File",
        }
    }
}

/// File watcher for detecting source changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `paths` recursively, ignoring anything under `ignore`.
    ///
    /// Missing paths are skipped. Returns the watcher and a channel to
    /// receive events; dropping the watcher stops the stream.
    pub fn new(
        paths: &[PathBuf],
        ignore: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), ServerError> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(|e| ServerError::WatchError(e.to_string()))?;

        for path in paths {
            if path.exists() {
                let path = path
                    .canonicalize()
                    .map_err(|e| ServerError::WatchError(format!("{}: {}", path.display(), e)))?;
                watcher
                    .watch(&path, RecursiveMode::Recursive)
                    .map_err(|e| ServerError::WatchError(format!("{}: {}", path.display(), e)))?;
                tracing::debug!("Watching {}", path.display());
            }
        }

        let ignore: Vec<PathBuf> = ignore
            .iter()
            .map(|p| p.canonicalize().unwrap_or_else(|_| p.clone()))
            .collect();

        std::thread::spawn(move || {
            while let Ok(event) = sync_rx.recv() {
                let mut batch = vec![event];

                // Editors write in bursts; wait for a quiet period
                while let Ok(event) = sync_rx.recv_timeout(DEBOUNCE) {
                    batch.push(event);
                }

                for event in batch {
                    for path in &event.paths {
                        if ignore.iter().any(|dir| path.starts_with(dir)) {
                            continue;
                        }
                        if let Some(e) = classify_event(path, &event.kind) {
                            if async_tx.blocking_send(e).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => match ext {
            "json" => Some(WatchEvent::DataModified(path.to_path_buf())),
            "html" | "htm" | "jinja" | "j2" => Some(WatchEvent::TemplateModified(path.to_path_buf())),
            _ => Some(WatchEvent::Modified(path.to_path_buf())),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, ModifyKind};
    use notify::EventKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_by_extension() {
        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));

        assert_eq!(
            classify_event(Path::new("data/site.json"), &modify),
            Some(WatchEvent::DataModified(PathBuf::from("data/site.json")))
        );
        assert_eq!(
            classify_event(Path::new("templates/pages/index.html"), &modify),
            Some(WatchEvent::TemplateModified(PathBuf::from(
                "templates/pages/index.html"
            )))
        );
        assert_eq!(
            classify_event(Path::new("static/js/main.js"), &modify),
            Some(WatchEvent::Modified(PathBuf::from("static/js/main.js")))
        );
        assert_eq!(
            classify_event(Path::new("x.css"), &EventKind::Create(CreateKind::File)),
            Some(WatchEvent::Created(PathBuf::from("x.css")))
        );
        assert_eq!(classify_event(Path::new("x.css"), &EventKind::Any), None);
    }

    #[test]
    fn names_the_kind_of_change() {
        assert_eq!(WatchEvent::DataModified(PathBuf::from("site.json")).kind(), "Data");
        assert_eq!(
            WatchEvent::TemplateModified(PathBuf::from("base.html")).kind(),
            "Template"
        );
        assert_eq!(WatchEvent::Deleted(PathBuf::from("a.js")).kind(), "File deleted");
    }

    #[test]
    fn watch_error_names_the_cause() {
        let err = ServerError::WatchError("inotify limit reached".to_string());
        assert_eq!(err.to_string(), "File watch error: inotify limit reached");
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let test_file = temp.path().join("site.json");

        // Create the watcher first (so it catches file creation)
        let (watcher, mut rx) = FileWatcher::new(&[temp.path().to_path_buf()], &[]).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&test_file, "{}").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        // Keep watcher alive until we're done
        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        let event = event.unwrap().expect("channel should not be closed");
        assert_eq!(event.path().file_name(), test_file.file_name());
    }

    #[tokio::test]
    async fn ignores_output_directory() {
        let temp = tempdir().unwrap();
        let dist = temp.path().join("dist");
        fs::create_dir_all(&dist).unwrap();

        let (watcher, mut rx) =
            FileWatcher::new(&[temp.path().to_path_buf()], &[dist.clone()]).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(dist.join("index.html"), "<html></html>").unwrap();
        let ignored = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
        assert!(ignored.is_err(), "output write was reported: {:?}", ignored);

        let source = temp.path().join("site.json");
        fs::write(&source, "{}").unwrap();
        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("timeout waiting for source change")
            .expect("channel should not be closed");

        drop(watcher);
        assert_eq!(event.path().file_name(), source.file_name());
    }
}
