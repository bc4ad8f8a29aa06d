use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Suffixes of files the tracker keeps a dirty/clean state for
pub const DEFAULT_EXTENSIONS: &[&str] = &[".scss", ".sass"];

/// Glob used to find stylesheets when none is configured
pub const DEFAULT_SOURCE_GLOB: &str = "**/*.{scss,sass}";

/// Construction-time configuration of a [`Tracker`](crate::Tracker)
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Emit verbose diagnostic events
    pub debug: bool,

    /// Suppress all non-debug diagnostic events
    pub suppress_output: bool,

    /// Tracked file suffixes (with dot)
    pub extensions: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            suppress_output: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl TrackerConfig {
    /// Whether `path` ends in one of the tracked suffixes
    pub fn is_tracked(&self, path: &std::path::Path) -> bool {
        let name = path.to_string_lossy();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

/// Where imports are searched for, passed per `inspect` call
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Include roots, searched in order; the first hit wins
    pub include_paths: Vec<PathBuf>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self { include_paths: vec![PathBuf::from(".")] }
    }
}

impl ResolveConfig {
    pub fn new<I, P>(include_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let include_paths: Vec<PathBuf> = include_paths.into_iter().map(Into::into).collect();
        if include_paths.is_empty() {
            return Self::default();
        }
        Self { include_paths }
    }
}

/// Configuration for a one-shot analysis of a project directory
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Stylesheet globs, relative to `cwd`
    pub sources: Vec<String>,

    /// Include roots for import resolution
    pub include_paths: Vec<PathBuf>,

    /// Files reported as changed since the last build
    pub changed: Vec<PathBuf>,

    /// Working directory
    pub cwd: PathBuf,

    /// Patterns to ignore
    pub ignore: Vec<String>,

    pub tracker: TrackerConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sources: vec![DEFAULT_SOURCE_GLOB.to_string()],
            include_paths: Vec::new(),
            changed: Vec::new(),
            cwd: PathBuf::from("."),
            ignore: Vec::new(),
            tracker: TrackerConfig::default(),
        }
    }
}

/// Error types for sassdep operations
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid file reference: {0}")]
    InvalidFileReference(String),

    #[error("Invalid import pattern: {0}")]
    InvalidPattern(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No stylesheets found matching patterns: {0:?}")]
    NoSourceFiles(Vec<String>),
}

/// Config file structure for sassdep.json / sassdep.jsonc
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    #[serde(default)]
    pub ignore: Vec<String>,
}
