//! Project snapshot: the file tree and source roots, frozen per command.
//!
//! Every command takes a fresh snapshot and computes against it; nothing is
//! cached across invocations. The snapshot itself is never mutated — file
//! moves and text edits happen on disk after all computation is done.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::paths;

/// File suffix of diagram source files.
pub const DIAGRAM_SUFFIX: &str = "uxf";

/// File suffix of documents scanned for references.
pub const DOCUMENT_SUFFIX: &str = "java";

/// File suffix of a diagram's companion raster export.
pub const EXPORT_SUFFIX: &str = "png";

/// An immutable snapshot of the project tree. All stored paths are
/// project-relative; `dir` locates the project on disk.
pub struct Project {
    /// Project top directory on disk.
    dir: PathBuf,
    /// Every file in the project, project-relative.
    files: BTreeSet<PathBuf>,
    /// Ordered source roots from the configuration.
    roots: Vec<PathBuf>,
}

impl Project {
    /// The companion raster export of a diagram: same path, suffix replaced.
    pub fn companion_export(diagram: &Path) -> PathBuf {
        return diagram.with_extension(EXPORT_SUFFIX);
    }

    /// True when the snapshot contains the given project-relative file.
    pub fn contains(&self, path: &Path) -> bool {
        return self.files.contains(path);
    }

    /// All diagram files in the snapshot, in path order.
    pub fn diagrams(&self) -> impl Iterator<Item = &PathBuf> {
        return self.files.iter().filter(|f| return has_suffix(f, DIAGRAM_SUFFIX));
    }

    /// The project top directory on disk.
    pub fn dir(&self) -> &Path {
        return &self.dir;
    }

    /// All documents in the snapshot, in path order.
    pub fn documents(&self) -> impl Iterator<Item = &PathBuf> {
        return self.files.iter().filter(|f| return has_suffix(f, DOCUMENT_SUFFIX));
    }

    /// Locate the diagram denoted by a resolved image reference: replace the
    /// image suffix with the diagram suffix, then probe each source root in
    /// order for an existing file. First match wins; a pure lookup.
    pub fn find_diagram(&self, image: &Path) -> Option<PathBuf> {
        image.file_name()?;
        let diagram_relative = image.with_extension(DIAGRAM_SUFFIX);
        for root in &self.roots {
            let candidate = join_root(root, &diagram_relative);
            if self.files.contains(&candidate) {
                return Some(candidate);
            }
        }
        return None;
    }

    /// Build a snapshot from an explicit file list (no filesystem access).
    pub fn from_files<I, P>(roots: Vec<PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        return Self {
            dir: PathBuf::from("."),
            files: files.into_iter().map(Into::into).collect(),
            roots,
        };
    }

    /// True when at least one snapshot file lies under the given folder.
    pub fn has_files_under(&self, folder: &Path) -> bool {
        return self.files.iter().any(|f| return f.starts_with(folder));
    }

    /// True when the path lies under at least one source root.
    pub fn in_source_root(&self, path: &Path) -> bool {
        return paths::split_root(&self.roots, path).is_some();
    }

    /// Read a document's content from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read.
    pub fn read_document(&self, document: &Path) -> Result<String, Error> {
        return Ok(std::fs::read_to_string(self.dir.join(document))?);
    }

    /// The ordered source-root list.
    pub fn roots(&self) -> &[PathBuf] {
        return &self.roots;
    }

    /// Walk the project directory into a snapshot, honoring the config's
    /// exclude prefixes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory cannot be walked.
    pub fn scan(dir: &Path, config: &Config) -> Result<Self, Error> {
        let mut files = BTreeSet::new();
        for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            if config.is_excluded(&relative.to_string_lossy()) {
                continue;
            }
            files.insert(relative.to_path_buf());
        }

        return Ok(Self {
            dir: dir.to_path_buf(),
            files,
            roots: config.roots.clone(),
        });
    }

    /// Rebase a project-relative path against the first root containing it;
    /// unchanged (opaque) when outside every root.
    pub fn source_root_relative(&self, path: &Path) -> PathBuf {
        return paths::source_root_relative(&self.roots, path);
    }

    /// The containing root and the root-relative remainder, if any.
    pub fn split_root(&self, path: &Path) -> Option<(&Path, PathBuf)> {
        return paths::split_root(&self.roots, path);
    }
}

/// Join a root-relative path back under a source root. A whole-project root
/// leaves the path as-is.
pub fn join_root(root: &Path, relative: &Path) -> PathBuf {
    if paths::matches_all(root) {
        return relative.to_path_buf();
    }
    return root.join(relative);
}

/// True when a path has the given file suffix.
fn has_suffix(path: &Path, suffix: &str) -> bool {
    return path.extension().is_some_and(|e| return e == suffix);
}
