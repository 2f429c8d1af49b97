/// Crate-level error types for diaref diagnostics.
use std::path::PathBuf;

/// All errors in diaref carry enough context to produce a useful diagnostic
/// without a debugger. Recoverable conditions — a reference that resolves to
/// no diagram, a path outside every source root, malformed markup — are not
/// errors; they degrade locally and never reach this type.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A relocation command named a path that is not an existing diagram file.
    #[error("not an existing diagram file: {}", path.display())]
    DiagramNotFound {
        /// The path that was expected to be a diagram.
        path: PathBuf,
    },

    /// Computed replacements for one document overlap or fall out of bounds.
    #[error("conflicting edits for {}: {reason}", document.display())]
    EditConflict {
        /// Document whose replacement set is inconsistent.
        document: PathBuf,
        /// Description of the conflict.
        reason: String,
    },

    /// The export command failed for one or more diagrams.
    #[error("{failed} of {total} diagram exports failed")]
    ExportFailed {
        /// Number of diagrams whose export failed.
        failed: usize,
        /// Total number of diagrams processed.
        total: usize,
    },

    /// `export` was invoked but no converter command is configured.
    #[error("no export command configured")]
    ExportNotConfigured,

    /// A rename-folder command named a folder with no files under it.
    #[error("no files under folder: {}", path.display())]
    FolderNotFound {
        /// The path that was expected to be a folder.
        path: PathBuf,
    },

    /// A new file or folder name is empty, contains a path separator, or
    /// drops the diagram suffix.
    #[error("invalid name: `{name}`")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// A package name does not match `ident(.ident)*`.
    #[error("invalid package name: `{name}`")]
    InvalidPackageName {
        /// The rejected package name.
        name: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// A relocation destination lies outside every configured source root.
    #[error("destination outside every source root: {}", path.display())]
    OutsideSourceRoots {
        /// The offending destination path.
        path: PathBuf,
    },

    /// A renamed package has no folder under any source root.
    #[error("package not found under any source root: `{name}`")]
    PackageNotFound {
        /// The dot-separated package name.
        name: String,
    },

    /// A source file or config file could not be parsed.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A root-management command named a root that is not configured.
    #[error("source root not configured: {path}")]
    UnknownRoot {
        /// The root path as given on the command line.
        path: String,
    },

    /// No parser registered for this document file extension.
    #[error("no parser for extension: .{ext}")]
    UnsupportedLanguage {
        /// File extension without the leading dot.
        ext: String,
    },

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}
