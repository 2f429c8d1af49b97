//! Core CLI commands for diaref: check, refs, the four relocations, export.
//!
//! Every command takes a fresh project snapshot, computes against it, and —
//! for relocations — applies the plan in a fixed order: text edits first
//! (while documents are still at their original paths), file moves second.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use crate::config::Config;
use crate::diagnostics::{self, MissingReference};
use crate::error::Error;
use crate::export;
use crate::paths;
use crate::project::{DIAGRAM_SUFFIX, Project, join_root};
use crate::rewrite::{self, Relocation};
use crate::scanner;
use crate::types::{DocumentEdit, FileMove, RewritePlan};

/// Apply per-document replacement sets. Each document is read once, checked
/// for ordered non-overlapping in-bounds spans, rewritten back-to-front, and
/// written once. A conflicting set leaves the document untouched.
///
/// # Errors
///
/// Returns `Error::EditConflict` on an inconsistent replacement set,
/// or `Error::Io` on read/write failures.
fn apply_edits(project_dir: &Path, edits: &[DocumentEdit]) -> Result<(), Error> {
    for edit in edits {
        let path = project_dir.join(&edit.document);
        let content = std::fs::read_to_string(&path)?;

        let mut applied_up_to = 0_usize;
        for replacement in &edit.replacements {
            let span = &replacement.span;
            if span.start < applied_up_to || span.end < span.start || span.end > content.len() {
                return Err(Error::EditConflict {
                    document: edit.document.clone(),
                    reason: format!("replacement {}..{} out of order or bounds", span.start, span.end),
                });
            }
            applied_up_to = span.end;
        }

        let mut updated = content;
        for replacement in edit.replacements.iter().rev() {
            updated.replace_range(replacement.span.clone(), &replacement.text);
        }
        std::fs::write(&path, updated)?;
    }
    return Ok(());
}

/// Perform file and folder moves, creating destination parents as needed.
///
/// # Errors
///
/// Returns `Error::Io` if a move fails.
fn apply_moves(project_dir: &Path, moves: &[FileMove]) -> Result<(), Error> {
    for file_move in moves {
        let from = project_dir.join(&file_move.from);
        let to = project_dir.join(&file_move.to);
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(&from, &to)?;
    }
    return Ok(());
}

/// Scan every document and report references that resolve to no existing
/// diagram. Exit code 1 when anything is missing, 0 when clean.
///
/// # Errors
///
/// Returns errors from config loading or the project walk.
pub fn check(json: bool) -> Result<ExitCode, Error> {
    let (_, project) = load_project()?;
    let (missing, total) = collect_missing(&project);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&missing).expect("report serializes")
        );
    } else if missing.is_empty() {
        println!("All {total} references resolved");
    } else {
        diagnostics::print_missing(&missing);
        println!();
        print!("{}", diagnostics::render_missing_summary(&missing));
    }

    if missing.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    return Ok(ExitCode::from(1));
}

/// Resolve every reference in the project; collect the unresolved ones and
/// the total reference count. Documents that cannot be read or parsed are
/// skipped — they are a build concern, not a reference concern.
fn collect_missing(project: &Project) -> (Vec<MissingReference>, usize) {
    let mut missing = Vec::new();
    let mut total = 0_usize;

    for document in project.documents() {
        let Ok(refs) = scanner::scan_document(project, document) else {
            continue;
        };
        let folder = project.source_root_relative(document.parent().unwrap_or(Path::new("")));
        total += refs.len();
        for reference in refs {
            let image = paths::resolve(&folder, &reference.src.text);
            if project.find_diagram(&image).is_none() {
                missing.push(MissingReference {
                    document: reference.document,
                    line: reference.line,
                    reference: reference.src.text,
                    resolved: image,
                });
            }
        }
    }

    return (missing, total);
}

/// Export every diagram's companion image through the configured converter.
///
/// # Errors
///
/// Returns `Error::ExportNotConfigured` without an `[export]` table,
/// or `Error::ExportFailed` when any diagram failed to convert.
pub fn run_export() -> Result<(), Error> {
    let (config, project) = load_project()?;
    let Some(export_config) = config.export else {
        return Err(Error::ExportNotConfigured);
    };

    let cancel = AtomicBool::new(false);
    let outcomes = export::run(&project, &export_config, &cancel);

    let mut failed = 0_usize;
    for outcome in &outcomes {
        match &outcome.failure {
            None => println!(
                "OK      {} -> {}",
                outcome.diagram.display(),
                outcome.export.display()
            ),
            Some(reason) => {
                failed += 1;
                println!("FAILED  {}: {reason}", outcome.diagram.display());
            },
        }
    }

    let total = outcomes.len();
    if failed > 0 {
        return Err(Error::ExportFailed { failed, total });
    }
    eprintln!("Exported {total} diagrams");
    return Ok(());
}

/// Load the config and take a fresh project snapshot of the working
/// directory.
///
/// # Errors
///
/// Returns errors from config loading or the directory walk.
fn load_project() -> Result<(Config, Project), Error> {
    let project_dir = PathBuf::from(".");
    let config = Config::load(&project_dir)?;
    let project = Project::scan(&project_dir, &config)?;
    return Ok((config, project));
}

/// Move a diagram to another folder, updating every reference to it.
///
/// # Errors
///
/// Returns `Error::DiagramNotFound` for a path that is not an existing
/// diagram, or `Error::OutsideSourceRoots` for a destination no root
/// contains.
pub fn move_diagram(diagram: &str, dest_folder: &str, dry_run: bool) -> Result<(), Error> {
    let (_, project) = load_project()?;
    let diagram = require_diagram(&project, diagram)?;
    let dest_folder = paths::normalize(Path::new(dest_folder));

    let name = diagram.file_name().unwrap_or_default();
    if !project.in_source_root(&dest_folder.join(name)) {
        return Err(Error::OutsideSourceRoots { path: dest_folder });
    }

    return relocate(&project, &Relocation::MoveDiagram { diagram, dest_folder }, dry_run);
}

/// The root-relative folder of a dot-separated package name.
fn package_folder(name: &str) -> PathBuf {
    return PathBuf::from(name.replace('.', "/"));
}

/// Print the planned edits and moves of a relocation.
fn print_plan(project: &Project, plan: &RewritePlan) {
    for edit in &plan.edits {
        let content = std::fs::read_to_string(project.dir().join(&edit.document))
            .unwrap_or_default();
        for replacement in &edit.replacements {
            let old = content.get(replacement.span.clone()).unwrap_or("?");
            eprintln!(
                "edit  {}:{}  {old} -> {}",
                edit.document.display(),
                scanner::line_of(&content, replacement.span.start),
                replacement.text
            );
        }
    }
    for file_move in &plan.moves {
        eprintln!(
            "move  {} -> {}",
            file_move.from.display(),
            file_move.to.display()
        );
    }
}

/// List every image reference in the project with its resolution.
///
/// # Errors
///
/// Returns errors from config loading or the project walk.
pub fn refs(json: bool) -> Result<(), Error> {
    let (_, project) = load_project()?;

    let mut rows = Vec::new();
    for document in project.documents() {
        let Ok(references) = scanner::scan_document(&project, document) else {
            continue;
        };
        let folder = project.source_root_relative(document.parent().unwrap_or(Path::new("")));
        for reference in references {
            let image = paths::resolve(&folder, &reference.src.text);
            let diagram = project.find_diagram(&image);
            rows.push((reference, image, diagram));
        }
    }

    if json {
        let report: Vec<serde_json::Value> = rows
            .iter()
            .map(|(reference, image, diagram)| {
                return serde_json::json!({
                    "diagram": diagram,
                    "document": &reference.document,
                    "line": reference.line,
                    "reference": &reference.src.text,
                    "resolved": image,
                });
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("report serializes")
        );
        return Ok(());
    }

    for (reference, _, diagram) in &rows {
        let target = diagram
            .as_ref()
            .map_or_else(|| return "MISSING".to_string(), |d| return d.display().to_string());
        println!(
            "{}:{}  {} -> {target}",
            reference.document.display(),
            reference.line,
            reference.src.text
        );
    }
    return Ok(());
}

/// Compute and carry out one relocation: plan, report, then apply the text
/// edits before the file moves so edit offsets stay valid.
fn relocate(project: &Project, relocation: &Relocation, dry_run: bool) -> Result<(), Error> {
    let plan = rewrite::compute_updates(project, relocation);
    if plan.is_empty() {
        eprintln!("Nothing to update.");
        return Ok(());
    }

    print_plan(project, &plan);
    if dry_run {
        eprintln!("Dry run, nothing changed.");
        return Ok(());
    }

    apply_edits(project.dir(), &plan.edits)?;
    apply_moves(project.dir(), &plan.moves)?;
    eprintln!(
        "Updated {} reference(s) in {} document(s), moved {} path(s).",
        plan.replacement_count(),
        plan.edits.len(),
        plan.moves.len()
    );
    return Ok(());
}

/// Rename a diagram file in place, updating every reference to it.
///
/// # Errors
///
/// Returns `Error::DiagramNotFound` for a path that is not an existing
/// diagram, or `Error::InvalidName` for an unusable new name.
pub fn rename_diagram(diagram: &str, new_name: &str, dry_run: bool) -> Result<(), Error> {
    let (_, project) = load_project()?;
    let diagram = require_diagram(&project, diagram)?;

    validate_segment(new_name)?;
    if Path::new(new_name).extension().is_none_or(|e| return e != DIAGRAM_SUFFIX) {
        return Err(Error::InvalidName {
            name: new_name.to_string(),
        });
    }

    return relocate(
        &project,
        &Relocation::RenameDiagram { diagram, new_name: new_name.to_string() },
        dry_run,
    );
}

/// Rename a folder, updating references and moving the folder itself.
///
/// # Errors
///
/// Returns `Error::FolderNotFound` when nothing exists under the folder,
/// or `Error::InvalidName` for an unusable new name.
pub fn rename_folder(folder: &str, new_name: &str, dry_run: bool) -> Result<(), Error> {
    let (_, project) = load_project()?;
    let folder = paths::normalize(Path::new(folder));

    if !project.has_files_under(&folder) {
        return Err(Error::FolderNotFound { path: folder });
    }
    validate_segment(new_name)?;

    return relocate(
        &project,
        &Relocation::RenameFolder { folder, new_name: new_name.to_string() },
        dry_run,
    );
}

/// Rename a package across every source root containing it.
///
/// # Errors
///
/// Returns `Error::InvalidPackageName` for malformed names,
/// or `Error::PackageNotFound` when no root contains the old package.
pub fn rename_package(old: &str, new: &str, dry_run: bool) -> Result<(), Error> {
    validate_package_name(old)?;
    validate_package_name(new)?;

    let (_, project) = load_project()?;
    let old_folder = package_folder(old);
    let new_folder = package_folder(new);

    let exists = project
        .roots()
        .iter()
        .any(|root| return project.has_files_under(&join_root(root, &old_folder)));
    if !exists {
        return Err(Error::PackageNotFound {
            name: old.to_string(),
        });
    }

    return relocate(
        &project,
        &Relocation::RenamePackage { new: new_folder, old: old_folder },
        dry_run,
    );
}

/// Normalize and validate a diagram path argument.
///
/// # Errors
///
/// Returns `Error::DiagramNotFound` unless the path names an existing
/// diagram file in the snapshot.
fn require_diagram(project: &Project, diagram: &str) -> Result<PathBuf, Error> {
    let path = paths::normalize(Path::new(diagram));
    let is_diagram = path.extension().is_some_and(|e| return e == DIAGRAM_SUFFIX);
    if !is_diagram || !project.contains(&path) {
        return Err(Error::DiagramNotFound { path });
    }
    return Ok(path);
}

/// Validate a dot-separated package name.
///
/// # Errors
///
/// Returns `Error::InvalidPackageName` when the name does not match
/// `ident(.ident)*`.
///
/// # Panics
///
/// Panics if the hardcoded package-name regex is invalid (compile-time
/// invariant).
fn validate_package_name(name: &str) -> Result<(), Error> {
    let pattern = regex::Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("valid regex");
    if !pattern.is_match(name) {
        return Err(Error::InvalidPackageName {
            name: name.to_string(),
        });
    }
    return Ok(());
}

/// Validate a new file or folder name: one non-empty path segment.
///
/// # Errors
///
/// Returns `Error::InvalidName` for empty names or names with separators.
fn validate_segment(name: &str) -> Result<(), Error> {
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }
    return Ok(());
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{apply_edits, validate_package_name, validate_segment};
    use crate::types::{DocumentEdit, Replacement};

    #[test]
    fn edits_apply_back_to_front_against_original_offsets() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Doc.java"), "aa BBBB cc DD ee").expect("write");

        let edit = DocumentEdit {
            document: PathBuf::from("Doc.java"),
            replacements: vec![
                Replacement { span: 3..7, text: "x".to_string() },
                Replacement { span: 11..13, text: "longer".to_string() },
            ],
        };
        apply_edits(dir.path(), &[edit]).expect("apply");

        let updated = std::fs::read_to_string(dir.path().join("Doc.java")).expect("read");
        assert_eq!(updated, "aa x cc longer ee");
    }

    #[test]
    fn overlapping_edits_are_rejected_and_nothing_is_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Doc.java"), "0123456789").expect("write");

        let edit = DocumentEdit {
            document: PathBuf::from("Doc.java"),
            replacements: vec![
                Replacement { span: 2..6, text: "x".to_string() },
                Replacement { span: 4..8, text: "y".to_string() },
            ],
        };
        assert!(apply_edits(dir.path(), &[edit]).is_err());

        let content = std::fs::read_to_string(dir.path().join("Doc.java")).expect("read");
        assert_eq!(content, "0123456789");
    }

    #[test]
    fn package_names_are_validated() {
        assert!(validate_package_name("com.example.diagrams").is_ok());
        assert!(validate_package_name("pkg").is_ok());
        assert!(validate_package_name("com..foo").is_err());
        assert!(validate_package_name(".com").is_err());
        assert!(validate_package_name("com/foo").is_err());
        assert!(validate_package_name("1pkg").is_err());
    }

    #[test]
    fn segment_names_are_validated() {
        assert!(validate_segment("renamed").is_ok());
        assert!(validate_segment("").is_err());
        assert!(validate_segment("a/b").is_err());
    }
}
