//! Source-root management: list, add, and remove roots in `.diaref.toml`.
//!
//! Root order is semantic (first match wins during resolution), so edits are
//! format- and order-preserving: new roots are appended, removals keep the
//! remaining order untouched.

use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::error::Error;

// ── CLI commands ──────────────────────────────────────────────────────

/// Append a source root to the config file. Adding an already-configured
/// root is a no-op.
///
/// # Errors
///
/// Returns errors from config reading or writing.
pub fn cmd_add(path: &str) -> Result<(), Error> {
    let project_dir = PathBuf::from(".");
    let normalized = normalize_root_input(path);
    if add_to_config(&project_dir, &normalized)? {
        println!("Added source root: {normalized}");
    } else {
        println!("Source root already configured: {normalized}");
    }
    return Ok(());
}

/// List the configured source roots in resolution order.
///
/// # Errors
///
/// Returns errors from config loading.
pub fn cmd_list() -> Result<(), Error> {
    let project_dir = PathBuf::from(".");
    let config = Config::load(&project_dir)?;

    for root in &config.roots {
        println!("{}", root.display());
    }
    return Ok(());
}

/// Remove a source root from the config file.
///
/// # Errors
///
/// Returns `Error::UnknownRoot` if the root isn't configured,
/// or errors from config reading or writing.
pub fn cmd_remove(path: &str) -> Result<(), Error> {
    let project_dir = PathBuf::from(".");
    let normalized = normalize_root_input(path);
    remove_from_config(&project_dir, &normalized)?;
    println!("Removed source root: {normalized}");
    return Ok(());
}

// ── Config file editing ───────────────────────────────────────────────

/// Append a root to the `roots` array, creating it when missing.
/// Returns false when the root was already present.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the config can't be parsed,
/// or `Error::Io` if writing fails.
fn add_to_config(project_dir: &Path, root: &str) -> Result<bool, Error> {
    let (config_path, mut doc) = read_config_doc(project_dir)?;

    if !doc.contains_key("roots") {
        doc["roots"] = toml_edit::Item::Value(toml_edit::Value::Array(toml_edit::Array::new()));
    }

    let Some(roots) = doc["roots"].as_array_mut() else {
        return Err(Error::ParseFailed {
            file: config_path,
            reason: "`roots` is not an array".to_string(),
        });
    };

    let exists = roots
        .iter()
        .any(|v| return v.as_str().is_some_and(|s| return s == root));
    if exists {
        return Ok(false);
    }

    roots.push(root);
    std::fs::write(&config_path, doc.to_string())?;
    return Ok(true);
}

/// Strip a trailing slash so `src/` and `src` name the same root.
fn normalize_root_input(path: &str) -> String {
    return path.trim_end_matches('/').to_string();
}

/// Parse `.diaref.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ParseFailed` on parse failure.
fn read_config_doc(project_dir: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), Error> {
    let config_path = project_dir.join(config::CONFIG_FILE);
    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::Io(e)),
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        return Error::ParseFailed {
            file: config_path.clone(),
            reason: e.to_string(),
        };
    })?;

    return Ok((config_path, doc));
}

/// Remove a root from the `roots` array.
///
/// # Errors
///
/// Returns `Error::UnknownRoot` if the root isn't present.
fn remove_from_config(project_dir: &Path, root: &str) -> Result<(), Error> {
    let (config_path, mut doc) = read_config_doc(project_dir)?;

    let Some(roots) = doc.get_mut("roots").and_then(toml_edit::Item::as_array_mut) else {
        return Err(Error::UnknownRoot {
            path: root.to_string(),
        });
    };

    let position = roots
        .iter()
        .position(|v| return v.as_str().is_some_and(|s| return s == root));
    let Some(position) = position else {
        return Err(Error::UnknownRoot {
            path: root.to_string(),
        });
    };

    roots.remove(position);
    std::fs::write(&config_path, doc.to_string())?;
    return Ok(());
}
