use crate::source::SourceFile;
use crate::types::TrackerError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use std::path::{Path, PathBuf};

/// Precompiled glob matchers for efficient file matching
struct CompiledMatchers {
    sources: GlobSet,
    ignore: GlobSet,
}

impl CompiledMatchers {
    fn new(source_patterns: &[String], ignore_patterns: &[String]) -> Self {
        Self { sources: compile_globset(source_patterns), ignore: compile_globset(ignore_patterns) }
    }
}

/// Expand brace patterns like `**/*.{scss,sass}` into multiple patterns
fn expand_brace_pattern(pattern: &str) -> Vec<String> {
    if let Some(start) = pattern.find('{') {
        if let Some(end) = pattern[start..].find('}') {
            let end = start + end;
            let prefix = &pattern[..start];
            let suffix = &pattern[end + 1..];
            let alternatives = &pattern[start + 1..end];

            return alternatives
                .split(',')
                .flat_map(|alt| {
                    let expanded = format!("{prefix}{alt}{suffix}");
                    expand_brace_pattern(&expanded)
                })
                .collect();
        }
    }
    vec![pattern.to_string()]
}

/// Compile a list of glob patterns into a GlobSet; invalid patterns are skipped
fn compile_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        for expanded in expand_brace_pattern(pattern) {
            match Glob::new(&expanded) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => tracing::warn!("ignoring invalid glob '{expanded}': {e}"),
            }
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Finds the stylesheets of a project
pub struct Collector {
    cwd: PathBuf,
    matchers: CompiledMatchers,
}

impl Collector {
    pub fn new(cwd: &Path, source_patterns: &[String], ignore_patterns: &[String]) -> Self {
        Self { cwd: cwd.to_path_buf(), matchers: CompiledMatchers::new(source_patterns, ignore_patterns) }
    }

    /// Paths of all matching files, sorted
    pub fn collect_paths(&self) -> Vec<PathBuf> {
        let mut walker_builder = WalkBuilder::new(&self.cwd);
        walker_builder.hidden(false).git_ignore(true);

        // Always exclude node_modules directories during traversal
        let mut overrides = OverrideBuilder::new(&self.cwd);
        overrides.add("!**/node_modules/").ok();
        if let Ok(built) = overrides.build() {
            walker_builder.overrides(built);
        }

        let mut paths = Vec::new();
        for entry in walker_builder.build().flatten() {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&self.cwd).unwrap_or(path);
            let relative_str = relative.to_string_lossy();

            if self.matchers.ignore.is_match(&*relative_str) {
                continue;
            }

            if self.matchers.sources.is_match(&*relative_str) {
                paths.push(path.to_path_buf());
            }
        }

        paths.sort();
        paths
    }

    /// All matching files with their contents loaded
    pub fn collect(&self) -> Result<Vec<SourceFile>, TrackerError> {
        self.collect_paths().into_iter().map(|path| Ok(SourceFile::read(path)?)).collect()
    }
}
