//! Pure path algebra for reference resolution and encoding.
//!
//! Three path spaces meet here: reference strings as written in documents,
//! source-root-relative paths, and project-relative paths. Everything is a
//! stateless function; the round-trip law `resolve(f, encode(f, t)) == t`
//! holds for every folder `f` and target `t`.

use std::path::{Component, Path, PathBuf};

/// Sentinel prefix marking a reference as source-root-relative.
pub const ROOT_SENTINEL: &str = "{ROOT}";

/// Compute the reference string for `target` as seen from `document_folder`.
///
/// Both paths are source-root-relative and normalized. The relative form is
/// used when it climbs at most one level; deeper `../..` chains switch to the
/// rooted form, which names the target from the source root instead. The
/// threshold is a readability choice, preserved exactly for compatibility
/// with references already in documents.
pub fn encode(document_folder: &Path, target: &Path) -> String {
    let relative = relative_to(target, document_folder);
    if leading_parents(&relative) > 1 {
        return format!("{ROOT_SENTINEL}/{}", slash_string(target));
    }
    return slash_string(&relative);
}

/// Number of leading `..` segments of a relative path.
pub fn leading_parents(path: &Path) -> usize {
    return path
        .components()
        .take_while(|c| return matches!(c, Component::ParentDir))
        .count();
}

/// True for a source root that spans the whole project (`.` or empty),
/// under which project-relative and root-relative paths coincide.
pub fn matches_all(root: &Path) -> bool {
    return root.as_os_str().is_empty() || root == Path::new(".");
}

/// Collapse `.` and `..` components without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                let can_pop = matches!(
                    components.last(),
                    Some(c) if !matches!(c, Component::ParentDir)
                );
                if can_pop {
                    components.pop();
                } else {
                    components.push(component);
                }
            },
            other => components.push(other),
        }
    }
    return components.iter().collect();
}

/// Express `target` relative to `base`, using `..` segments where needed.
/// Both paths must be normalized paths in the same space.
pub fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target_parts: Vec<Component<'_>> = target
        .components()
        .filter(|c| return !matches!(c, Component::CurDir))
        .collect();
    let base_parts: Vec<Component<'_>> = base
        .components()
        .filter(|c| return !matches!(c, Component::CurDir))
        .collect();

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(t, b)| return t == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in target_parts.iter().skip(common) {
        out.push(part);
    }
    return out;
}

/// Resolve a reference string against the referencing document's enclosing
/// folder (source-root-relative). A rooted reference is taken as already
/// root-relative; a relative one is appended to the folder and normalized.
pub fn resolve(document_folder: &Path, reference: &str) -> PathBuf {
    if let Some(rest) = reference.strip_prefix(ROOT_SENTINEL) {
        return normalize(Path::new(rest.trim_start_matches('/')));
    }
    return normalize(&document_folder.join(reference));
}

/// Render a relative path as a slash-separated reference string.
pub fn slash_string(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| {
            return match c {
                Component::ParentDir => "..".to_string(),
                other => other.as_os_str().to_string_lossy().to_string(),
            };
        })
        .collect();
    return parts.join("/");
}

/// Rebase a project-relative path against the first source root containing
/// it. A path outside every root is returned unchanged and treated as opaque
/// by callers. Root order is the configuration order; the first match wins —
/// a deliberate, documented tie-break for paths under nested roots.
pub fn source_root_relative(roots: &[PathBuf], path: &Path) -> PathBuf {
    return match split_root(roots, path) {
        Some((_, relative)) => relative,
        None => path.to_path_buf(),
    };
}

/// Like [`source_root_relative`], but also reports which root matched.
/// Returns `None` for a path outside every source root.
pub fn split_root<'r>(roots: &'r [PathBuf], path: &Path) -> Option<(&'r Path, PathBuf)> {
    for root in roots {
        if matches_all(root) {
            return Some((root.as_path(), path.to_path_buf()));
        }
        if let Ok(stripped) = path.strip_prefix(root) {
            return Some((root.as_path(), stripped.to_path_buf()));
        }
    }
    return None;
}
