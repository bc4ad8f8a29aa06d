pub mod cli;
pub mod collector;
pub mod events;
pub mod graph;
pub mod path;
pub mod reporter;
pub mod resolver;
pub mod scanner;
pub mod source;
pub mod tracker;
pub mod types;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use events::{EventLevel, EventSink, TracingSink, TrackerEvent};
pub use graph::DependencyGraph;
pub use path::{FileRef, NormalizedPath, normalize};
pub use reporter::Report;
pub use resolver::{ImportResolver, resolve_import};
pub use source::SourceFile;
pub use tracker::{GraphView, StageItem, Tracker, stream};
pub use types::{
    AnalysisConfig, DEFAULT_EXTENSIONS, DEFAULT_SOURCE_GLOB, FileConfig, ResolveConfig,
    TrackerConfig, TrackerError,
};

use collector::Collector;

/// Find the stylesheets of a project that need compiling after a change
///
/// Every stylesheet is inspected and treated as compiled, then each path in
/// `config.changed` is queued for rebuild. The report lists the changed
/// files and everything that imports them, directly or transitively. With
/// no changed paths every stylesheet is reported, as on a first build.
///
/// # Arguments
/// * `config` - Configuration for the analysis
///
/// # Returns
/// * `Ok(Report)` - Files to compile and the import edges found
/// * `Err(TrackerError)` - Error if no stylesheets matched or the cwd is invalid
///
/// # Example
/// ```no_run
/// use sassdep::{find_affected_files, AnalysisConfig};
/// use std::path::PathBuf;
///
/// let config = AnalysisConfig {
///     include_paths: vec![PathBuf::from("styles")],
///     changed: vec![PathBuf::from("styles/_variables.scss")],
///     ..Default::default()
/// };
///
/// let report = find_affected_files(config).unwrap();
/// println!("{} stylesheets need compiling", report.affected_count);
/// ```
pub fn find_affected_files(config: AnalysisConfig) -> Result<Report, TrackerError> {
    let cwd = config.cwd.canonicalize()?;

    let collector = Collector::new(&cwd, &config.sources, &config.ignore);
    let files = collector.collect()?;
    if files.is_empty() {
        return Err(TrackerError::NoSourceFiles(config.sources));
    }

    let include_paths = if config.include_paths.is_empty() {
        vec![cwd.clone()]
    } else {
        config.include_paths.iter().map(|path| cwd.join(path)).collect()
    };
    let resolve = ResolveConfig::new(include_paths);

    let tracker = Tracker::new(config.tracker);
    let inspected = tracker.inspect(stream(files.iter().cloned()), &resolve)?;
    if !config.changed.is_empty() {
        tracker.report_compiled(inspected).collect::<Result<Vec<_>, _>>()?;
        for changed in &config.changed {
            tracker.queue_rebuild(&cwd.join(changed))?;
        }
    } else {
        inspected.collect::<Result<Vec<_>, _>>()?;
    }

    let mut dependencies: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for file in &files {
        let imports = tracker.get_dependencies(file, false)?;
        let imports = imports.into_iter().map(NormalizedPath::into_path_buf).collect();
        dependencies.insert(file.path.clone(), imports);
    }

    let affected: Vec<PathBuf> = tracker
        .filter(stream(files.iter().cloned()))
        .map(|file| file.map(|file| file.path))
        .collect::<Result<_, _>>()?;

    Ok(Report::new(affected, dependencies, files.len()))
}
