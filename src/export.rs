//! Diagram export pipeline: produce companion images via an external
//! converter command.
//!
//! One task per diagram, a bounded worker pool, and a cooperative
//! cancellation flag checked before each task starts. A failing export is
//! reported per file and never aborts the remaining tasks.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::ExportConfig;
use crate::project::Project;

/// Result of exporting one diagram.
#[derive(Debug)]
pub struct ExportOutcome {
    /// The diagram that was exported, project-relative.
    pub diagram: PathBuf,
    /// The companion image path, project-relative.
    pub export: PathBuf,
    /// The failure message, or `None` on success.
    pub failure: Option<String>,
}

/// Export every diagram in the project. Returns one outcome per diagram
/// that was started, in path order; cancelled tasks produce no outcome.
pub fn run(project: &Project, config: &ExportConfig, cancel: &AtomicBool) -> Vec<ExportOutcome> {
    let tasks: Vec<(PathBuf, PathBuf)> = project
        .diagrams()
        .map(|d| return (d.clone(), Project::companion_export(d)))
        .collect();

    let (task_tx, task_rx) = crossbeam_channel::unbounded::<(PathBuf, PathBuf)>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<ExportOutcome>();
    for task in tasks {
        let _ = task_tx.send(task);
    }
    drop(task_tx);

    std::thread::scope(|scope| {
        for _ in 0..config.workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok((diagram, export)) = task_rx.recv() {
                    if cancel.load(Ordering::Relaxed) {
                        return;
                    }
                    let failure =
                        run_converter(project.dir(), &config.command, &diagram, &export).err();
                    let _ = result_tx.send(ExportOutcome { diagram, export, failure });
                }
            });
        }
        drop(result_tx);
    });

    let mut outcomes: Vec<ExportOutcome> = result_rx.iter().collect();
    outcomes.sort_by(|a, b| return a.diagram.cmp(&b.diagram));
    return outcomes;
}

/// Run the converter command for one diagram, substituting `{input}` and
/// `{output}` in each argument. The command is split on whitespace; paths
/// with spaces are not supported in the template.
fn run_converter(
    project_dir: &Path,
    template: &str,
    diagram: &Path,
    export: &Path,
) -> Result<(), String> {
    let input = project_dir.join(diagram);
    let output = project_dir.join(export);

    let mut parts = template.split_whitespace().map(|part| {
        return part
            .replace("{input}", &input.to_string_lossy())
            .replace("{output}", &output.to_string_lossy());
    });
    let Some(program) = parts.next() else {
        return Err("empty export command".to_string());
    };

    let result = Command::new(program).args(parts).output();
    let output = match result {
        Ok(o) => o,
        Err(e) => return Err(format!("failed to spawn converter: {e}")),
    };

    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    return Err(format!(
        "converter exited with {}: {}",
        output.status,
        stderr.trim()
    ));
}
