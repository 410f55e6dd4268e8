use crate::build::{BuildOutcome, BuildRunner};
use crate::debounce::{Debounce, WriteSettle};
use anyhow::Result;
use lectern_context::project::Project;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};

/// Quiet period before a changed file counts as fully written.
const SETTLE_THRESHOLD: Duration = Duration::from_millis(300);
/// How often settling is re-checked.
const SETTLE_POLL: Duration = Duration::from_millis(100);
/// Debounce interval between the last settled change and a rebuild.
const DEBOUNCE: Duration = Duration::from_millis(200);
/// Delay between a successful rebuild and the browser reload signal.
const RELOAD_WAIT: Duration = Duration::from_millis(400);

/// A qualifying filesystem change, as forwarded from the notify callback
/// thread into the async loop.
#[derive(Debug, Clone)]
pub(crate) struct ChangeEvent {
    pub kind: &'static str,
    pub path: PathBuf,
}

/// Start watching `sections/` (recursively) and the project root
/// (non-recursively, for `manifest.json`). Qualifying events are forwarded
/// to `tx`; everything else is dropped in the callback.
///
/// The returned watcher must be kept alive for the subscription to deliver.
pub(crate) fn start(project: &Project, tx: mpsc::Sender<ChangeEvent>) -> Result<impl Watcher> {
    let root = project.root.clone();
    let mut watcher =
        notify::recommended_watcher(move |res: std::result::Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let kind = kind_label(&event.kind);
                for path in event.paths {
                    if is_watched(&root, &path) {
                        let _ = tx.blocking_send(ChangeEvent { kind, path });
                    }
                }
            }
        })?;

    let sections = project.sections_dir();
    if sections.exists() {
        watcher.watch(&sections, RecursiveMode::Recursive)?;
    }
    watcher.watch(&project.root, RecursiveMode::NonRecursive)?;

    Ok(watcher)
}

fn kind_label(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::Create(_) => "add",
        EventKind::Modify(_) => "change",
        EventKind::Remove(_) => "unlink",
        _ => "event",
    }
}

/// True for the paths the dev loop reacts to: `manifest.json` at the project
/// root, and `.html` files anywhere under `sections/`.
fn is_watched(root: &Path, path: &Path) -> bool {
    if path == root.join("manifest.json") {
        return true;
    }
    let Ok(rel) = path.strip_prefix(root) else {
        return false;
    };
    rel.starts_with("sections") && path.extension().is_some_and(|e| e == "html")
}

/// Consume change events until the channel closes: settle in-progress
/// writes, debounce bursts into a single build, run the build command, and
/// signal connected browsers to reload after a successful one.
///
/// The build is awaited in place, so events arriving mid-build queue in the
/// channel and are processed afterwards under the same debounce rule.
pub(crate) async fn watch_loop(
    project: &Project,
    mut rx: mpsc::Receiver<ChangeEvent>,
    reload_tx: broadcast::Sender<()>,
) -> Result<()> {
    let runner = BuildRunner::from_project(project)?;
    let mut settle = WriteSettle::new(SETTLE_THRESHOLD);
    let mut debounce = Debounce::new(DEBOUNCE);
    let mut poll = tokio::time::interval(SETTLE_POLL);

    loop {
        let deadline = debounce.deadline().map(tokio::time::Instant::from_std);

        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    // Watcher dropped; the loop is being shut down.
                    return Ok(());
                };
                let rel = event.path.strip_prefix(&project.root).unwrap_or(&event.path);
                println!("[dev] {}: {}", event.kind, rel.display());
                settle.record(event.path, Instant::now());
            }
            _ = poll.tick() => {
                let now = Instant::now();
                if !settle.take_settled(now).is_empty() {
                    debounce.touch(now);
                }
            }
            _ = debounce_sleep(deadline), if deadline.is_some() => {
                debounce.disarm();
                rebuild(&runner, &reload_tx).await;
            }
        }
    }
}

async fn debounce_sleep(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn rebuild(runner: &BuildRunner, reload_tx: &broadcast::Sender<()>) {
    println!("[dev] Rebuilding...");
    match runner.run().await {
        BuildOutcome::Success => {
            println!("[dev] Build complete.");
            tokio::time::sleep(RELOAD_WAIT).await;
            let _ = reload_tx.send(());
        }
        BuildOutcome::Failed(message) => {
            eprintln!("[dev] Build failed: {message}");
        }
    }
}
