//! File watcher: runs `check` on startup, then re-runs on source changes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands;
use crate::config::Config;
use crate::error::Error;
use crate::paths;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 250;

/// Create a filesystem watcher that sends events on the given channel.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::WatchFailed {
            reason: e.to_string(),
        };
    });
}

/// Entry point for the watch command.
///
/// Runs an initial check, then watches the source roots and re-checks on
/// changes.
///
/// # Errors
///
/// Returns errors from config loading or watcher setup.
pub fn run() -> Result<ExitCode, Error> {
    eprintln!("watch: initial check");
    let mut last_code = run_check();

    let config = Config::load(Path::new("."))?;
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;

    let mut watched = 0_usize;
    for root in &config.roots {
        let dir = if paths::matches_all(root) {
            PathBuf::from(".")
        } else {
            root.clone()
        };
        if dir.exists() && watcher.watch(&dir, RecursiveMode::Recursive).is_ok() {
            watched += 1;
        }
    }

    eprintln!("watch: monitoring {watched} source roots, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-checking...");
        last_code = run_check();
    }

    return Ok(last_code);
}

/// Run check once and print the result. Returns the exit code from check.
fn run_check() -> ExitCode {
    return match commands::check(false) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2_u8)
        },
    };
}
