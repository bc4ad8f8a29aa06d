use crate::events::{EventSink, TracingSink, TrackerEvent};
use crate::graph::DependencyGraph;
use crate::path::{FileRef, NormalizedPath, normalize};
use crate::resolver::ImportResolver;
use crate::scanner::{self, Syntax};
use crate::source::SourceFile;
use crate::types::{ResolveConfig, TrackerConfig, TrackerError};
use std::ops::Deref;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Item type of every pipeline stage
pub type StageItem = Result<SourceFile, TrackerError>;

/// Lift plain files into a stage input
pub fn stream<I>(files: I) -> impl Iterator<Item = StageItem>
where
    I: IntoIterator<Item = SourceFile>,
{
    files.into_iter().map(Ok)
}

/// Decides which stylesheets need compiling.
///
/// Wraps a [`DependencyGraph`] and exposes pipeline stages over streams of
/// [`SourceFile`]s:
///
/// ```text
/// inspect -> filter -> (compiler) -> report_compiled
/// ```
///
/// Stages are lazy iterator adapters. An `Err` item from upstream passes
/// through untouched. The graph sits behind a mutex, so a file watcher on
/// another thread can call [`queue_rebuild`](Self::queue_rebuild) while a
/// pipeline runs; every operation locks the graph for its whole duration.
pub struct Tracker {
    config: TrackerConfig,
    graph: Mutex<DependencyGraph>,
    sink: Box<dyn EventSink>,
    partial_warned: AtomicBool,
}

impl Tracker {
    /// A tracker reporting through `tracing`
    pub fn new(config: TrackerConfig) -> Self {
        let sink = TracingSink::new(&config);
        Self::with_sink(config, sink)
    }

    /// A tracker reporting to a custom sink
    pub fn with_sink(config: TrackerConfig, sink: impl EventSink + 'static) -> Self {
        Self {
            config,
            graph: Mutex::new(DependencyGraph::new()),
            sink: Box::new(sink),
            partial_warned: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, DependencyGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: TrackerEvent) {
        self.sink.emit(&event);
    }

    /// Whether `path` carries one of the tracked suffixes
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.config.is_tracked(path)
    }

    /// Pass through untracked files and tracked files that are dirty
    pub fn filter<'t, I>(&'t self, files: I) -> impl Iterator<Item = StageItem> + 't
    where
        I: IntoIterator<Item = StageItem>,
        I::IntoIter: 't,
    {
        files.into_iter().filter_map(move |item| {
            let file = match item {
                Ok(file) => file,
                Err(e) => return Some(Err(e)),
            };

            if !self.is_tracked(&file.path) {
                return Some(Ok(file));
            }

            match self.needs_compiling(&file) {
                Ok(true) => Some(Ok(file)),
                Ok(false) => None,
                Err(e) => Some(Err(e)),
            }
        })
    }

    fn needs_compiling(&self, file: &SourceFile) -> Result<bool, TrackerError> {
        let path = normalize(file)?;
        let dirty = !self.lock().is_compiled(&path)?;
        self.emit(TrackerEvent::FileFiltered { file: path, dirty });
        Ok(dirty)
    }

    /// Scan tracked files for imports and record an edge per resolved import.
    ///
    /// Unresolved imports are reported as warnings and add no edge.
    pub fn inspect<'t, I>(
        &'t self,
        files: I,
        resolve: &ResolveConfig,
    ) -> Result<impl Iterator<Item = StageItem> + 't, TrackerError>
    where
        I: IntoIterator<Item = StageItem>,
        I::IntoIter: 't,
    {
        let resolver = ImportResolver::new(resolve)?;

        Ok(files.into_iter().map(move |item| {
            let file = item?;
            if self.is_tracked(&file.path) {
                self.inspect_file(&file, &resolver)?;
            }
            Ok(file)
        }))
    }

    fn inspect_file(&self, file: &SourceFile, resolver: &ImportResolver) -> Result<(), TrackerError> {
        let mut outcome = Ok(());
        let syntax = Syntax::of(&file.path);

        scanner::scan(file, scanner::default_pattern(), |found, file| {
            for import in found.paths(syntax) {
                if outcome.is_err() {
                    return;
                }
                if let Err(e) = self.record_import(import, file, resolver) {
                    outcome = Err(e);
                }
            }
        });

        outcome
    }

    /// Record an import of `file` that scanning did not discover, such as
    /// one computed at build time. Returns the resolved dependency.
    pub fn report_import(
        &self,
        import: &str,
        file: &SourceFile,
        resolve: &ResolveConfig,
    ) -> Result<Option<NormalizedPath>, TrackerError> {
        let resolver = ImportResolver::new(resolve)?;
        self.record_import(import, file, &resolver)
    }

    fn record_import(
        &self,
        import: &str,
        file: &SourceFile,
        resolver: &ImportResolver,
    ) -> Result<Option<NormalizedPath>, TrackerError> {
        let source = normalize(file)?;

        let Some(dependency) = resolver.resolve(import, source.as_path().parent())? else {
            self.emit(TrackerEvent::UnresolvedImport { file: source, import: import.to_string() });
            return Ok(None);
        };

        self.lock().add_dependency(&source, &dependency)?;
        self.emit(TrackerEvent::DependencyAdded { source, dependency: dependency.clone() });
        Ok(Some(dependency))
    }

    /// Drop the first recorded `source -> dependency` edge
    pub fn remove_dependency<'a, 'b>(
        &self,
        source: impl Into<FileRef<'a>>,
        dependency: impl Into<FileRef<'b>>,
    ) -> Result<bool, TrackerError> {
        let source = normalize(source)?;
        let dependency = normalize(dependency)?;

        let removed = self.lock().remove_dependency(&source, &dependency)?;
        if removed {
            self.emit(TrackerEvent::DependencyRemoved { source, dependency });
        }
        Ok(removed)
    }

    /// Pass files through, listing each one. The first partial seen by this
    /// tracker also triggers a warning.
    pub fn log_files<'t, I>(&'t self, files: I) -> impl Iterator<Item = StageItem> + 't
    where
        I: IntoIterator<Item = StageItem>,
        I::IntoIter: 't,
    {
        files.into_iter().map(move |item| {
            let file = item?;
            let path = normalize(&file)?;

            if path.is_partial()
                && self.is_tracked(path.as_path())
                && !self.partial_warned.swap(true, Ordering::Relaxed)
            {
                self.emit(TrackerEvent::PartialEncountered { file: path.clone() });
            }

            self.emit(TrackerEvent::FileListed { file: path });
            Ok(file)
        })
    }

    /// Mark files clean after compilation.
    ///
    /// Every tracked path in a file's rename history is marked, so a file
    /// renamed `child.scss -> child.css` upstream still cleans `child.scss`.
    pub fn report_compiled<'t, I>(&'t self, files: I) -> impl Iterator<Item = StageItem> + 't
    where
        I: IntoIterator<Item = StageItem>,
        I::IntoIter: 't,
    {
        files.into_iter().map(move |item| {
            let file = item?;
            self.mark_history_compiled(&file)?;
            Ok(file)
        })
    }

    fn mark_history_compiled(&self, file: &SourceFile) -> Result<(), TrackerError> {
        let paths = file
            .all_paths()
            .filter(|path| self.is_tracked(path))
            .map(normalize)
            .collect::<Result<Vec<_>, _>>()?;

        {
            let mut graph = self.lock();
            for path in &paths {
                graph.mark_as_compiled(path)?;
            }
        }

        for path in paths {
            self.emit(TrackerEvent::MarkedCompiled { file: path });
        }
        Ok(())
    }

    /// Mark `file` and everything importing it for recompilation
    pub fn queue_rebuild<'a>(
        &self,
        file: impl Into<FileRef<'a>>,
    ) -> Result<Vec<NormalizedPath>, TrackerError> {
        let path = normalize(file)?;
        let dirtied = self.lock().mark_as_not_compiled(&path)?;
        self.emit(TrackerEvent::QueuedRebuild { file: path, dirtied: dirtied.clone() });
        Ok(dirtied)
    }

    /// Forget every file and edge
    pub fn reset(&self) {
        self.lock().clear();
    }

    /// Run `inspect` then `filter`, collecting the files that need compiling
    pub fn process<I>(&self, files: I, resolve: &ResolveConfig) -> Result<Vec<SourceFile>, TrackerError>
    where
        I: IntoIterator<Item = SourceFile>,
    {
        let inspected = self.inspect(stream(files), resolve)?;
        self.filter(inspected).collect()
    }

    pub fn is_compiled<'a>(&self, file: impl Into<FileRef<'a>>) -> Result<bool, TrackerError> {
        self.lock().is_compiled(file)
    }

    pub fn get_dependencies<'a>(
        &self,
        file: impl Into<FileRef<'a>>,
        deep: bool,
    ) -> Result<Vec<NormalizedPath>, TrackerError> {
        self.lock().get_dependencies(file, deep)
    }

    pub fn dependents<'a>(
        &self,
        file: impl Into<FileRef<'a>>,
        deep: bool,
    ) -> Result<Vec<NormalizedPath>, TrackerError> {
        self.lock().dependents(file, deep)
    }

    /// Read-only view of the graph, for introspection and tests.
    ///
    /// Holds the graph lock until dropped.
    pub fn graph(&self) -> GraphView<'_> {
        GraphView(self.lock())
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

/// Locked, read-only access to a tracker's [`DependencyGraph`]
pub struct GraphView<'t>(MutexGuard<'t, DependencyGraph>);

impl Deref for GraphView<'_> {
    type Target = DependencyGraph;

    fn deref(&self) -> &DependencyGraph {
        &self.0
    }
}
