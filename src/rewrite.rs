//! Reference rewriting: compute the edits and file moves a relocation implies.
//!
//! The engine is a pure function of (project snapshot, relocation): it scans
//! every document, resolves every image reference, asks the relocation where
//! the diagram and the document land, and emits a text replacement exactly
//! when the re-encoded reference string changes. Applying the resulting plan
//! is the caller's job; nothing here touches the filesystem beyond reading.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::project::{EXPORT_SUFFIX, Project, join_root};
use crate::scanner;
use crate::types::{DocumentEdit, FileMove, ImageReference, Replacement, RewritePlan};

/// Where a diagram and its referencing document land after a relocation.
/// Either side may equal the current location, meaning "unchanged".
struct Destination {
    /// The diagram's location after the relocation, project-relative.
    diagram: PathBuf,
    /// The document's location after the relocation, project-relative.
    document: PathBuf,
}

/// One relocation operation, as decided by the caller. The engine never
/// judges whether the relocation is allowed; it only computes the texts.
#[derive(Debug, Clone)]
pub enum Relocation {
    /// A diagram file moves to another folder; documents stay put.
    MoveDiagram {
        /// The diagram being moved, project-relative.
        diagram: PathBuf,
        /// The destination folder, project-relative.
        dest_folder: PathBuf,
    },
    /// A diagram file changes its name; its folder is unchanged.
    RenameDiagram {
        /// The diagram being renamed, project-relative.
        diagram: PathBuf,
        /// The new file name, including the suffix.
        new_name: String,
    },
    /// A folder changes its name: everything under it — diagrams and
    /// documents alike — is rebased under the new name.
    RenameFolder {
        /// The folder being renamed, project-relative.
        folder: PathBuf,
        /// The new folder name (single path segment).
        new_name: String,
    },
    /// A package is renamed across every source root containing it. The
    /// sides are considered independently: a reference is rewritten only
    /// when exactly one of {diagram, document} falls under the renamed
    /// package — when both move together their relative encoding is
    /// unaffected and no edit is wanted.
    RenamePackage {
        /// The package's new folder path, root-relative.
        new: PathBuf,
        /// The package's current folder path, root-relative.
        old: PathBuf,
    },
}

impl Relocation {
    /// Compute where a (diagram, document) pair lands under this relocation.
    fn destination(&self, project: &Project, diagram: &Path, document: &Path) -> Destination {
        let unchanged = Destination {
            diagram: diagram.to_path_buf(),
            document: document.to_path_buf(),
        };

        return match self {
            Self::MoveDiagram { diagram: moved, dest_folder } => {
                if diagram != moved.as_path() {
                    return unchanged;
                }
                let Some(name) = diagram.file_name() else {
                    return unchanged;
                };
                Destination {
                    diagram: dest_folder.join(name),
                    document: document.to_path_buf(),
                }
            },
            Self::RenameDiagram { diagram: renamed, new_name } => {
                if diagram != renamed.as_path() {
                    return unchanged;
                }
                let parent = diagram.parent().unwrap_or(Path::new(""));
                Destination {
                    diagram: parent.join(new_name),
                    document: document.to_path_buf(),
                }
            },
            Self::RenameFolder { folder, new_name } => {
                let new_folder = renamed_sibling(folder, new_name);
                Destination {
                    diagram: rebase(diagram, folder, &new_folder),
                    document: rebase(document, folder, &new_folder),
                }
            },
            Self::RenamePackage { new, old } => {
                let diagram_in = package_split(project, diagram, old);
                let document_in = package_split(project, document, old);
                // Co-moves cancel: rewrite only when exactly one side moves.
                match (diagram_in, document_in) {
                    (Some((root, rest)), None) => Destination {
                        diagram: join_root(root, &new.join(rest)),
                        document: document.to_path_buf(),
                    },
                    (None, Some((root, rest))) => Destination {
                        diagram: diagram.to_path_buf(),
                        document: join_root(root, &new.join(rest)),
                    },
                    _ => unchanged,
                }
            },
        };
    }

    /// The file and folder moves this relocation implies: the diagram and
    /// its companion export (when it exists), or the affected folders.
    fn file_moves(&self, project: &Project) -> Vec<FileMove> {
        let mut moves = Vec::new();

        match self {
            Self::MoveDiagram { diagram, dest_folder } => {
                let Some(name) = diagram.file_name() else {
                    return moves;
                };
                let to = dest_folder.join(name);
                if to == *diagram {
                    return moves;
                }
                moves.push(FileMove { from: diagram.clone(), to });
                let export = Project::companion_export(diagram);
                if project.contains(&export) {
                    let Some(export_name) = export.file_name() else {
                        return moves;
                    };
                    let export_to = dest_folder.join(export_name);
                    moves.push(FileMove {
                        from: export,
                        to: export_to,
                    });
                }
            },
            Self::RenameDiagram { diagram, new_name } => {
                let parent = diagram.parent().unwrap_or(Path::new(""));
                let to = parent.join(new_name);
                if to == *diagram {
                    return moves;
                }
                moves.push(FileMove { from: diagram.clone(), to });
                let export = Project::companion_export(diagram);
                if project.contains(&export) {
                    let new_export_name = Path::new(new_name).with_extension(EXPORT_SUFFIX);
                    moves.push(FileMove {
                        from: export,
                        to: parent.join(new_export_name),
                    });
                }
            },
            Self::RenameFolder { folder, new_name } => {
                let to = renamed_sibling(folder, new_name);
                if to != *folder {
                    moves.push(FileMove { from: folder.clone(), to });
                }
            },
            Self::RenamePackage { new, old } => {
                for root in project.roots() {
                    let from = join_root(root, old);
                    let to = join_root(root, new);
                    if from == to || !project.has_files_under(&from) {
                        continue;
                    }
                    let candidate = FileMove { from, to };
                    if !moves.contains(&candidate) {
                        moves.push(candidate);
                    }
                }
            },
        }

        return moves;
    }
}

/// Scan every document of the project and compute the full rewrite plan for
/// one relocation. Documents that cannot be read or parsed are skipped;
/// references that resolve to no existing diagram are left untouched.
pub fn compute_updates(project: &Project, relocation: &Relocation) -> RewritePlan {
    let mut edits = Vec::new();

    for document in project.documents() {
        let Ok(refs) = scanner::scan_document(project, document) else {
            continue;
        };
        let replacements = document_replacements(project, relocation, document, &refs);
        if !replacements.is_empty() {
            edits.push(DocumentEdit {
                document: document.clone(),
                replacements,
            });
        }
    }

    return RewritePlan {
        edits,
        moves: relocation.file_moves(project),
    };
}

/// Compute the replacements for one document's references.
///
/// For each reference: resolve, locate the diagram, compute the destination
/// pair, re-encode the old and new reference strings, and emit a replacement
/// over the attribute value span iff they differ. A destination outside
/// every source root is a policy contradiction and treated as "no change".
fn document_replacements(
    project: &Project,
    relocation: &Relocation,
    document: &Path,
    refs: &[ImageReference],
) -> Vec<Replacement> {
    let folder = project.source_root_relative(document.parent().unwrap_or(Path::new("")));
    let mut replacements: Vec<Replacement> = Vec::new();

    for reference in refs {
        let image = paths::resolve(&folder, &reference.src.text);
        let Some(diagram) = project.find_diagram(&image) else {
            continue;
        };

        let dest = relocation.destination(project, &diagram, document);
        if dest.diagram != diagram && !project.in_source_root(&dest.diagram) {
            continue;
        }

        let old_ref = paths::encode(&folder, &image);
        let new_folder = project
            .source_root_relative(dest.document.parent().unwrap_or(Path::new("")));
        let suffix = image.extension().unwrap_or(OsStr::new(EXPORT_SUFFIX));
        let new_image = project.source_root_relative(&dest.diagram).with_extension(suffix);
        let new_ref = paths::encode(&new_folder, &new_image);

        if old_ref != new_ref {
            replacements.push(Replacement {
                span: reference.src.span(),
                text: new_ref,
            });
        }
    }

    replacements.sort_by_key(|r| return r.span.start);
    return replacements;
}

/// Map a path under `folder` to the same path under `new_folder`;
/// paths outside `folder` are unchanged.
fn rebase(path: &Path, folder: &Path, new_folder: &Path) -> PathBuf {
    return match path.strip_prefix(folder) {
        Ok(rest) => new_folder.join(rest),
        Err(_) => path.to_path_buf(),
    };
}

/// The folder's sibling under its new name.
fn renamed_sibling(folder: &Path, new_name: &str) -> PathBuf {
    return folder.parent().unwrap_or(Path::new("")).join(new_name);
}

/// The containing root and package-relative remainder when `path` falls
/// under the renamed package folder within its own source root.
fn package_split<'p>(
    project: &'p Project,
    path: &Path,
    package_folder: &Path,
) -> Option<(&'p Path, PathBuf)> {
    let (root, relative) = project.split_root(path)?;
    let rest = relative.strip_prefix(package_folder).ok()?;
    return Some((root, rest.to_path_buf()));
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{Relocation, document_replacements};
    use crate::markup::SourceString;
    use crate::project::Project;
    use crate::types::ImageReference;

    /// A reference with an arbitrary but consistent value span.
    fn img_ref(document: &str, value: &str) -> ImageReference {
        return ImageReference {
            document: PathBuf::from(document),
            line: 1,
            src: SourceString {
                end: 40 + value.len(),
                start: 40,
                text: value.to_string(),
            },
        };
    }

    /// Replacement texts for one document under one relocation.
    fn replacement_texts(
        project: &Project,
        relocation: &Relocation,
        document: &str,
        value: &str,
    ) -> Vec<String> {
        let refs = [img_ref(document, value)];
        return document_replacements(project, relocation, Path::new(document), &refs)
            .into_iter()
            .map(|r| return r.text)
            .collect();
    }

    #[test]
    fn diagram_move_within_one_level_stays_relative() {
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/Doc.java", "src/pkg/img/a.uxf"],
        );
        let relocation = Relocation::MoveDiagram {
            diagram: PathBuf::from("src/pkg/img/a.uxf"),
            dest_folder: PathBuf::from("src/pkg2/img"),
        };

        assert_eq!(
            replacement_texts(&project, &relocation, "src/pkg/Doc.java", "img/a.png"),
            ["../pkg2/img/a.png"]
        );
    }

    #[test]
    fn diagram_move_past_one_level_switches_to_rooted() {
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/docs/api/Doc.java", "src/pkg/img/a.uxf"],
        );
        let relocation = Relocation::MoveDiagram {
            diagram: PathBuf::from("src/pkg/img/a.uxf"),
            dest_folder: PathBuf::from("src/other/deep/nested"),
        };

        assert_eq!(
            replacement_texts(
                &project,
                &relocation,
                "src/pkg/docs/api/Doc.java",
                "../../img/a.png"
            ),
            ["{ROOT}/other/deep/nested/a.png"]
        );
    }

    #[test]
    fn diagram_rename_rewrites_the_file_name() {
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/Doc.java", "src/pkg/img/a.uxf", "src/pkg/img/a.png"],
        );
        let relocation = Relocation::RenameDiagram {
            diagram: PathBuf::from("src/pkg/img/a.uxf"),
            new_name: "overview.uxf".to_string(),
        };

        assert_eq!(
            replacement_texts(&project, &relocation, "src/pkg/Doc.java", "img/a.png"),
            ["img/overview.png"]
        );
    }

    #[test]
    fn document_move_rewrites_rooted_back_to_relative() {
        // A reference that needed the rooted form from a deep folder becomes
        // plain relative once its document moves next to the diagram's parent.
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/a/b/Doc.java", "src/pkg/img/a.uxf"],
        );
        let relocation = Relocation::RenamePackage {
            new: PathBuf::from("pkg3"),
            old: PathBuf::from("pkg/a/b"),
        };

        assert_eq!(
            replacement_texts(
                &project,
                &relocation,
                "src/pkg/a/b/Doc.java",
                "{ROOT}/pkg/img/a.png"
            ),
            ["../pkg/img/a.png"]
        );
    }

    #[test]
    fn folder_rename_cancels_when_both_sides_move() {
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/Doc.java", "src/pkg/img/a.uxf"],
        );
        let relocation = Relocation::RenameFolder {
            folder: PathBuf::from("src/pkg"),
            new_name: "renamed".to_string(),
        };

        assert_eq!(
            replacement_texts(&project, &relocation, "src/pkg/Doc.java", "img/a.png"),
            Vec::<String>::new()
        );
        // The folder itself still moves.
        let moves = relocation.file_moves(&project);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].from, PathBuf::from("src/pkg"));
        assert_eq!(moves[0].to, PathBuf::from("src/renamed"));
    }

    #[test]
    fn folder_rename_still_updates_rooted_references() {
        // Both sides move together, but a rooted reference names the target
        // from the source root and must follow the rename.
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/x/y/Doc.java", "src/pkg/img/a.uxf"],
        );
        let relocation = Relocation::RenameFolder {
            folder: PathBuf::from("src/pkg"),
            new_name: "ren".to_string(),
        };

        assert_eq!(
            replacement_texts(
                &project,
                &relocation,
                "src/pkg/x/y/Doc.java",
                "{ROOT}/pkg/img/a.png"
            ),
            ["{ROOT}/ren/img/a.png"]
        );
    }

    #[test]
    fn missing_diagram_is_not_rewritten() {
        let project =
            Project::from_files(vec![PathBuf::from("src")], ["src/pkg/Doc.java"]);
        let relocation = Relocation::RenameFolder {
            folder: PathBuf::from("src/pkg"),
            new_name: "renamed".to_string(),
        };

        assert_eq!(
            replacement_texts(&project, &relocation, "src/pkg/Doc.java", "img/ghost.png"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn move_to_unchanged_location_is_a_no_op() {
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/Doc.java", "src/pkg/img/a.uxf"],
        );
        let relocation = Relocation::MoveDiagram {
            diagram: PathBuf::from("src/pkg/img/a.uxf"),
            dest_folder: PathBuf::from("src/pkg/img"),
        };

        // Identical snapshot, identical policy: empty both times.
        for _ in 0..2 {
            assert_eq!(
                replacement_texts(&project, &relocation, "src/pkg/Doc.java", "img/a.png"),
                Vec::<String>::new()
            );
        }
        assert!(relocation.file_moves(&project).is_empty());
    }

    #[test]
    fn destination_outside_every_root_is_ignored() {
        // The relocation names a destination no source root contains; the
        // engine never fabricates a root assignment, so nothing changes.
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/Doc.java", "src/pkg/img/a.uxf"],
        );
        let relocation = Relocation::MoveDiagram {
            diagram: PathBuf::from("src/pkg/img/a.uxf"),
            dest_folder: PathBuf::from("assets/img"),
        };

        assert_eq!(
            replacement_texts(&project, &relocation, "src/pkg/Doc.java", "img/a.png"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn package_rename_cancels_when_both_sides_move() {
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/com/foo/Doc.java", "src/com/foo/img/a.uxf"],
        );
        let relocation = Relocation::RenamePackage {
            new: PathBuf::from("com/bar"),
            old: PathBuf::from("com/foo"),
        };

        assert_eq!(
            replacement_texts(&project, &relocation, "src/com/foo/Doc.java", "img/a.png"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn package_rename_rewrites_when_only_the_diagram_moves() {
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/other/Doc.java", "src/com/foo/img/a.uxf"],
        );
        let relocation = Relocation::RenamePackage {
            new: PathBuf::from("com/bar"),
            old: PathBuf::from("com/foo"),
        };

        assert_eq!(
            replacement_texts(
                &project,
                &relocation,
                "src/other/Doc.java",
                "../com/foo/img/a.png"
            ),
            ["../com/bar/img/a.png"]
        );
    }

    #[test]
    fn package_rename_moves_the_folder_in_every_root() {
        let project = Project::from_files(
            vec![PathBuf::from("src/main/java"), PathBuf::from("src/test/java")],
            [
                "src/main/java/com/foo/A.java",
                "src/test/java/com/foo/ATest.java",
            ],
        );
        let relocation = Relocation::RenamePackage {
            new: PathBuf::from("com/bar"),
            old: PathBuf::from("com/foo"),
        };

        let moves = relocation.file_moves(&project);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].from, PathBuf::from("src/main/java/com/foo"));
        assert_eq!(moves[0].to, PathBuf::from("src/main/java/com/bar"));
        assert_eq!(moves[1].from, PathBuf::from("src/test/java/com/foo"));
    }

    #[test]
    fn diagram_moves_carry_the_companion_export() {
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/Doc.java", "src/pkg/img/a.uxf", "src/pkg/img/a.png"],
        );
        let relocation = Relocation::MoveDiagram {
            diagram: PathBuf::from("src/pkg/img/a.uxf"),
            dest_folder: PathBuf::from("src/pkg2"),
        };

        let moves = relocation.file_moves(&project);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].to, PathBuf::from("src/pkg2/a.uxf"));
        assert_eq!(moves[1].from, PathBuf::from("src/pkg/img/a.png"));
        assert_eq!(moves[1].to, PathBuf::from("src/pkg2/a.png"));
    }

    #[test]
    fn diagram_rename_renames_the_companion_export() {
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/img/a.uxf", "src/pkg/img/a.png"],
        );
        let relocation = Relocation::RenameDiagram {
            diagram: PathBuf::from("src/pkg/img/a.uxf"),
            new_name: "overview.uxf".to_string(),
        };

        let moves = relocation.file_moves(&project);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].to, PathBuf::from("src/pkg/img/overview.uxf"));
        assert_eq!(moves[1].to, PathBuf::from("src/pkg/img/overview.png"));
    }

    #[test]
    fn missing_companion_export_is_not_moved() {
        let project = Project::from_files(
            vec![PathBuf::from("src")],
            ["src/pkg/img/a.uxf"],
        );
        let relocation = Relocation::MoveDiagram {
            diagram: PathBuf::from("src/pkg/img/a.uxf"),
            dest_folder: PathBuf::from("src/pkg2"),
        };

        assert_eq!(relocation.file_moves(&project).len(), 1);
    }
}
