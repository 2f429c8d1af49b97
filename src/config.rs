use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = ".diaref.toml";

/// Default number of export worker threads.
const DEFAULT_WORKERS: usize = 4;

/// Project configuration loaded from `.diaref.toml`.
/// The source-root order is semantic: a path under several roots belongs to
/// the first one listed, so the order is preserved exactly as written.
pub struct Config {
    exclude: Vec<String>,
    /// Converter settings for the companion-export pipeline, if configured.
    pub export: Option<ExportConfig>,
    /// Ordered source roots, project-relative.
    pub roots: Vec<PathBuf>,
}

/// Settings for exporting diagrams to their companion images.
#[derive(Clone)]
pub struct ExportConfig {
    /// Converter command line; `{input}` and `{output}` are substituted
    /// with the diagram and export file paths.
    pub command: String,
    /// Worker thread count for the export pool.
    pub workers: usize,
}

/// Raw TOML structure for `.diaref.toml`.
#[derive(serde::Deserialize)]
struct DiarefTomlConfig {
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    export: Option<RawExport>,
    #[serde(default)]
    roots: Vec<String>,
}

/// Raw TOML structure for the `[export]` table.
#[derive(serde::Deserialize)]
struct RawExport {
    command: String,
    #[serde(default)]
    workers: Option<usize>,
}

impl Config {
    /// Load config from `.diaref.toml` in the given project directory.
    /// Returns a default treating the whole project as one source root if
    /// the file doesn't exist. Returns an error if the file exists but is
    /// malformed — never silently falls back to defaults when the user
    /// wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(project_dir: &Path) -> Result<Self, Error> {
        let path = project_dir.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::whole_project_by_default());
            },
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: DiarefTomlConfig = toml::from_str(&content)?;
        let roots = if raw.roots.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            raw.roots.iter().map(PathBuf::from).collect()
        };

        return Ok(Self {
            exclude: raw.exclude,
            export: raw.export.map(|e| {
                return ExportConfig {
                    command: e.command,
                    workers: e.workers.unwrap_or(DEFAULT_WORKERS).max(1),
                };
            }),
            roots,
        });
    }

    /// Check whether a project-relative path is excluded from scans.
    /// Exclude patterns are plain path prefixes.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        return self
            .exclude
            .iter()
            .any(|p| return relative_path.starts_with(p.as_str()));
    }

    /// Default config: one source root spanning the whole project.
    fn whole_project_by_default() -> Self {
        return Self {
            exclude: Vec::new(),
            export: None,
            roots: vec![PathBuf::from(".")],
        };
    }
}
