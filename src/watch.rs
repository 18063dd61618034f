//! Watch loop: filesystem events in, render operations out.
//!
//! The notify watcher pushes raw events into a channel; this loop owns all
//! timing and policy. Events are debounced per path with kind reconciliation
//! so editor write bursts (write + rename + chmod) collapse into one render.
//!
//! The watcher subscribes before the startup backfill runs, so events raised
//! while pre-existing files render are buffered in the channel, not lost.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver};
use crossbeam::select;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashMap;

use crate::config::Config;
use crate::{debug, log, logger, render};

/// Debounce window for collapsing event bursts.
const DEBOUNCE_MS: u64 = 200;

// =============================================================================
// Watch loop
// =============================================================================

/// Subscribed watcher plus the channel its events arrive on.
pub struct WatchLoop {
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    /// Channel receiving raw notify events (callback -> loop bridge)
    notify_rx: Receiver<notify::Result<notify::Event>>,
}

impl WatchLoop {
    /// Create the watcher and subscribe to the watch directory,
    /// non-recursively. Failure to establish the watch is startup-fatal.
    pub fn new(config: &Config) -> Result<Self> {
        let (notify_tx, notify_rx) = channel::unbounded();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .context("failed to create filesystem watcher")?;

        watcher
            .watch(&config.watch.dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", config.watch.dir.display()))?;

        Ok(Self {
            _watcher: watcher,
            notify_rx,
        })
    }

    /// Backfill existing sources, then consume events until shutdown.
    pub fn run(self, config: &Config, shutdown_rx: &Receiver<()>) {
        match render::render_all(config) {
            Ok(n) => {
                log!("watch"; "rendered {} existing file(s), watching {}",
                    n, config.watch.dir.display());
            }
            Err(e) => log!("watch"; "backfill failed: {e:#}"),
        }

        let mut debouncer = Debouncer::new();
        let notify_rx = &self.notify_rx;

        loop {
            select! {
                recv(notify_rx) -> msg => match msg {
                    Ok(Ok(event)) => debouncer.add_event(&event, config),
                    Ok(Err(e)) => log!("watch"; "notify error: {}", e),
                    Err(_) => return, // watcher dropped
                },
                recv(shutdown_rx) -> _ => return,
                default(debouncer.sleep_duration()) => {}
            }

            if crate::state::is_shutdown() {
                return;
            }

            for (path, kind) in debouncer.take_if_ready() {
                dispatch(&path, kind, config);
            }
        }
    }
}

/// Apply one debounced change.
///
/// Errors here are per-event recoverable: they are reported and the loop
/// keeps going so later events are still processed.
fn dispatch(path: &Path, kind: ChangeKind, config: &Config) {
    debug!("watch"; "{}: {}", kind.label(), path.display());
    match kind {
        ChangeKind::Created | ChangeKind::Modified => match render::render(path, config) {
            Ok(derived) => logger::status_success(&format!(
                "rendered {} -> {}",
                path.display(),
                derived.display()
            )),
            Err(e) => {
                logger::status_error(&format!("render failed: {}", path.display()), &e.to_string());
            }
        },
        ChangeKind::Removed => {
            if let Err(e) = render::remove(path, config) {
                logger::status_error(&format!("delete failed: {}", path.display()), &e.to_string());
            }
        }
    }
}

// =============================================================================
// Change types
// =============================================================================

/// What happened to a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

// =============================================================================
// Debouncer - timing and event deduplication
// =============================================================================

/// Collapses bursts of notify events into one change per path.
struct Debouncer {
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    changes: FxHashMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
        }
    }

    /// Add a notify event, filtering out non-source paths and editor
    /// artifacts, and ignoring metadata-only modifications (mtime/chmod
    /// noise that would otherwise re-render on every touch).
    fn add_event(&mut self, event: &notify::Event, config: &Config) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        for path in &event.paths {
            if render::is_temp_file(path) || !render::is_source(path, config) {
                continue;
            }
            self.insert(path.clone(), kind);
        }
    }

    /// Merge one change into the map, applying dedup rules:
    /// - Removed + Created/Modified → the new event (file was restored)
    /// - Modified + Removed → Removed (file was deleted)
    /// - Created + Removed → dropped entirely (appeared then vanished)
    /// - otherwise the first event wins
    fn insert(&mut self, path: PathBuf, kind: ChangeKind) {
        if let Some(&existing) = self.changes.get(&path) {
            match (existing, kind) {
                (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                    self.changes.insert(path, kind);
                }
                (ChangeKind::Modified, ChangeKind::Removed) => {
                    self.changes.insert(path, ChangeKind::Removed);
                }
                (ChangeKind::Created, ChangeKind::Removed) => {
                    self.changes.remove(&path);
                }
                _ => {}
            }
        } else {
            self.changes.insert(path, kind);
        }
        self.last_event = Some(Instant::now());
    }

    /// Drain changes if the debounce window has closed, reconciled against
    /// the filesystem and with removals ordered first so a rename observed
    /// as delete+create nets out correctly.
    fn take_if_ready(&mut self) -> Vec<(PathBuf, ChangeKind)> {
        if !self.is_ready() {
            return Vec::new();
        }
        self.last_event = None;

        let mut changes: Vec<_> = std::mem::take(&mut self.changes).into_iter().collect();
        reconcile(&mut changes);
        changes.sort_by_key(|(_, kind)| match kind {
            ChangeKind::Removed => 0,
            _ => 1,
        });
        changes
    }

    fn is_ready(&self) -> bool {
        !self.changes.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    /// Sleep until the debounce window can close, or effectively forever
    /// when no events are pending.
    fn sleep_duration(&self) -> Duration {
        match self.last_event {
            Some(t) => Duration::from_millis(DEBOUNCE_MS)
                .saturating_sub(t.elapsed())
                .max(Duration::from_millis(1)),
            None => Duration::from_secs(86400),
        }
    }
}

/// Reconcile event kinds with actual filesystem state.
///
/// The watcher may report stale kinds around atomic saves: a Created for a
/// file already gone, or a Removed for a file that was immediately rewritten.
fn reconcile(changes: &mut [(PathBuf, ChangeKind)]) {
    for (path, kind) in changes.iter_mut() {
        let exists = path.is_file();
        match kind {
            ChangeKind::Created | ChangeKind::Modified if !exists => *kind = ChangeKind::Removed,
            ChangeKind::Removed if exists => *kind = ChangeKind::Modified,
            _ => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
