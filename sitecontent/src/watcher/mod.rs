use crate::document::DocumentFormat;
use crate::error::Result;
use crate::schema::CollectionDefinition;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Quiet period after the last filesystem event before a batch is emitted.
pub const DEBOUNCE: Duration = Duration::from_millis(150);

/// The kind of file change detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// A content file that changed, with the last change seen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Watches collection base directories and reports debounced batches of
/// content file changes.
pub struct ContentWatcher {
    _watcher: RecommendedWatcher,
    _thread: std::thread::JoinHandle<()>,
    batches: mpsc::Receiver<Vec<ContentChange>>,
}

impl ContentWatcher {
    /// Start watching the base directory of every collection under `root`.
    /// Directories that do not exist yet are skipped.
    pub fn start(root: &Path, collections: &[CollectionDefinition]) -> Result<Self> {
        let (raw_tx, raw_rx) = mpsc::channel::<notify::Result<Event>>();
        let (batch_tx, batches) = mpsc::channel::<Vec<ContentChange>>();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = raw_tx.send(res);
            },
            Config::default(),
        )?;

        for collection in collections {
            let dir = collection.loader.base_dir(root);
            if dir.is_dir() {
                watcher.watch(&dir, RecursiveMode::Recursive)?;
                log::debug!("Watching {} for '{}'", dir.display(), collection.name);
            } else {
                log::warn!(
                    "Not watching '{}': {} does not exist",
                    collection.name,
                    dir.display()
                );
            }
        }

        let thread = std::thread::spawn(move || debounce_loop(raw_rx, batch_tx));

        Ok(ContentWatcher {
            _watcher: watcher,
            _thread: thread,
            batches,
        })
    }

    /// Block until the next batch of changes. `None` once the watcher stops.
    pub fn next_batch(&self) -> Option<Vec<ContentChange>> {
        self.batches.recv().ok()
    }
}

fn debounce_loop(
    raw_rx: mpsc::Receiver<notify::Result<Event>>,
    batch_tx: mpsc::Sender<Vec<ContentChange>>,
) {
    let mut pending: BTreeMap<PathBuf, ChangeKind> = BTreeMap::new();
    let mut last_event = Instant::now();

    loop {
        match raw_rx.recv_timeout(DEBOUNCE) {
            Ok(Ok(event)) => {
                if let Some(kind) = change_kind(&event.kind) {
                    for path in event.paths.into_iter().filter(|p| is_content_file(p)) {
                        pending.insert(path, kind);
                    }
                }
                last_event = Instant::now();
            }
            Ok(Err(e)) => {
                log::warn!("File watcher error: {e}");
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if pending.is_empty() || last_event.elapsed() < DEBOUNCE {
                    continue;
                }
                let batch = std::mem::take(&mut pending)
                    .into_iter()
                    .map(|(path, kind)| ContentChange { path, kind })
                    .collect();
                if batch_tx.send(batch).is_err() {
                    return;
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        _ => None,
    }
}

/// Whether a path is a file any collection could load.
pub fn is_content_file(path: &Path) -> bool {
    DocumentFormat::from_path(path).is_some()
}
