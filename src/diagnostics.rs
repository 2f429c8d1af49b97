use std::fmt::Write as _;
use std::path::PathBuf;

use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// An image reference that resolves to no existing diagram. Produced by the
/// check scan; the rewrite engine itself never reports these.
#[derive(Debug, serde::Serialize)]
pub struct MissingReference {
    /// Project-relative path of the referencing document.
    pub document: PathBuf,
    /// One-based line number of the reference.
    pub line: u32,
    /// The reference string as written in the document.
    pub reference: String,
    /// The root-relative path the reference resolved to.
    pub resolved: PathBuf,
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Print missing-reference notices in the check report format.
pub fn print_missing(missing: &[MissingReference]) {
    for m in missing {
        println!(
            "MISSING  {}:{}  {} -> {}",
            m.document.display(),
            m.line,
            m.reference,
            m.resolved.display()
        );
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is an
/// obvious next step, how to fix it. Designed to be readable by both humans
/// and LLM agents.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::DiagramNotFound { path } => format!(
            "\
# Error: Diagram Not Found

`{}` is not an existing `.uxf` diagram file.
",
            path.display()
        ),

        Error::EditConflict { document, reason } => format!(
            "\
# Error: Conflicting Edits

Computed replacements for `{}` are inconsistent: {reason}

No file was modified.
",
            document.display()
        ),

        Error::ExportFailed { failed, total } => format!(
            "\
# Error: Export Failed

{failed} of {total} diagram exports failed; see the report above.
"
        ),

        Error::ExportNotConfigured => "\
# Error: No Export Command

`.diaref.toml` has no `[export]` table.

## Fix

Configure the converter command:

    [export]
    command = \"umlet -action=convert -format=png -filename={input} -output={output}\"
"
        .to_string(),

        Error::FolderNotFound { path } => format!(
            "\
# Error: Folder Not Found

No files exist under `{}`.
",
            path.display()
        ),

        Error::InvalidName { name } => format!(
            "\
# Error: Invalid Name

`{name}` is not usable as a new name.

## Fix

Use a single path segment; diagram renames must keep the `.uxf` suffix.
"
        ),

        Error::InvalidPackageName { name } => format!(
            "\
# Error: Invalid Package Name

`{name}` is not a valid package name.

## Fix

Use dot-separated identifiers, e.g. `com.example.diagrams`.
"
        ),

        Error::Io(e) => format!(
            "\
# Error: I/O

{e}
"
        ),

        Error::OutsideSourceRoots { path } => render_outside_source_roots(path),

        Error::PackageNotFound { name } => format!(
            "\
# Error: Package Not Found

Package `{name}` has no folder under any configured source root.

## Fix

Check the package name, or the `roots` list in `.diaref.toml`:

    diaref root list
"
        ),

        Error::ParseFailed { file, reason } => format!(
            "\
# Error: Parse Failed

Could not parse `{}`: {reason}
",
            file.display()
        ),

        Error::TomlDe(e) => format!(
            "\
# Error: Invalid TOML

{e}
"
        ),

        Error::UnknownRoot { path } => format!(
            "\
# Error: Unknown Source Root

`{path}` is not in the configured `roots` list.

## Fix

    diaref root list
"
        ),

        Error::UnsupportedLanguage { ext } => format!(
            "\
# Error: Unsupported Language

No parser for `.{ext}` files.

## Supported extensions

- `.java` — Java
"
        ),

        Error::WatchFailed { reason } => format!(
            "\
# Error: Watch Failed

{reason}
"
        ),
    };
}

/// Render the missing-reference summary for the end of a check run.
pub fn render_missing_summary(missing: &[MissingReference]) -> String {
    let mut out = String::new();
    let count = missing.len();
    let _ = writeln!(out, "{count} missing");
    return out;
}

fn render_outside_source_roots(path: &std::path::Path) -> String {
    return format!(
        "\
# Error: Outside Source Roots

`{}` lies outside every configured source root, so references to it
cannot be expressed.

## Fix

Pick a destination under a configured root, or add one:

    diaref root add <path>
",
        path.display()
    );
}
