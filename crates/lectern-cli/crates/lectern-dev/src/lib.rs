mod build;
mod debounce;
mod server;
mod watcher;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};

use lectern_context::project::Project;

/// Run the dev server and the watch-rebuild loop until SIGINT or SIGTERM.
///
/// Both signals take the same path: the select below returns, which closes
/// the listener and the event channel, the watcher subscription is dropped,
/// and the caller exits with status 0. An in-flight build child is left to
/// finish on its own.
pub async fn start() -> Result<()> {
    let project = Project::load_cwd().context(
        "Failed to load project. Are you in a Lectern project?\n\
         Run `lectern init <name>` to create a new project.",
    )?;

    let (reload_tx, _) = broadcast::channel::<()>(16);
    let (event_tx, event_rx) = mpsc::channel::<watcher::ChangeEvent>(64);

    // Must keep the watcher alive for the subscription to deliver events
    let _watcher =
        watcher::start(&project, event_tx).context("Failed to start file watcher")?;

    if !project.entry_file().exists() {
        println!(
            "[dev] Note: _build/{} is missing; run `lectern build` or save a watched file",
            project.manifest.build_config.output_filename
        );
    }
    println!("[dev] Watching sections/ and manifest.json for changes");

    tokio::select! {
        res = server::run(project.clone(), reload_tx.clone()) => res,
        res = watcher::watch_loop(&project, event_rx, reload_tx) => res,
        _ = shutdown_signal() => {
            println!("[dev] Shutting down");
            Ok(())
        }
    }
}

/// Resolves on the first SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
