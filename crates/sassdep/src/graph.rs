use crate::path::{FileRef, NormalizedPath, normalize};
use crate::types::TrackerError;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;

/// Index of an interned path in the graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct PathId(usize);

#[derive(Debug, Clone)]
struct DependencyNode {
    /// Needs (re)compilation
    dirty: bool,
    /// Outgoing edges in insertion order; duplicates and cycles allowed
    dependencies: Vec<PathId>,
}

impl DependencyNode {
    fn new() -> Self {
        Self { dirty: true, dependencies: Vec::new() }
    }
}

/// Dirty/clean state and import edges for every file seen so far.
///
/// An edge `A -> B` means A's output depends on B's content. Nodes are
/// created on first reference, born dirty, and only removed by
/// [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct DependencyGraph {
    ids: FxHashMap<NormalizedPath, PathId>,
    paths: Vec<NormalizedPath>,
    nodes: Vec<DependencyNode>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, path: NormalizedPath) -> PathId {
        if let Some(&id) = self.ids.get(&path) {
            return id;
        }

        let id = PathId(self.paths.len());
        self.paths.push(path.clone());
        self.nodes.push(DependencyNode::new());
        self.ids.insert(path, id);
        id
    }

    fn node_id<'a>(&mut self, file: impl Into<FileRef<'a>>) -> Result<PathId, TrackerError> {
        Ok(self.intern(normalize(file)?))
    }

    fn path(&self, id: PathId) -> &NormalizedPath {
        &self.paths[id.0]
    }

    fn node(&self, id: PathId) -> &DependencyNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: PathId) -> &mut DependencyNode {
        &mut self.nodes[id.0]
    }

    /// Record that `source` imports `dependency`
    pub fn add_dependency<'a, 'b>(
        &mut self,
        source: impl Into<FileRef<'a>>,
        dependency: impl Into<FileRef<'b>>,
    ) -> Result<(), TrackerError> {
        let source = self.node_id(source)?;
        let dependency = self.node_id(dependency)?;
        self.node_mut(source).dependencies.push(dependency);
        tracing::trace!(
            source = %self.path(source),
            dependency = %self.path(dependency),
            "edge added"
        );
        Ok(())
    }

    /// Remove the first `source -> dependency` edge. Returns whether one existed.
    pub fn remove_dependency<'a, 'b>(
        &mut self,
        source: impl Into<FileRef<'a>>,
        dependency: impl Into<FileRef<'b>>,
    ) -> Result<bool, TrackerError> {
        let source = self.node_id(source)?;
        let dependency = self.node_id(dependency)?;

        let dependencies = &mut self.node_mut(source).dependencies;
        match dependencies.iter().position(|&id| id == dependency) {
            Some(index) => {
                dependencies.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Direct dependencies, or with `deep` the direct ones followed by a
    /// depth-first expansion of each. Every node is expanded at most once,
    /// so cycles terminate; a path may still be listed more than once.
    pub fn get_dependencies<'a>(
        &mut self,
        file: impl Into<FileRef<'a>>,
        deep: bool,
    ) -> Result<Vec<NormalizedPath>, TrackerError> {
        let root = self.node_id(file)?;
        let ids = if deep {
            let mut visited = FxHashSet::default();
            visited.insert(root);
            let mut out = Vec::new();
            self.collect_deep(root, &mut visited, &mut out);
            out
        } else {
            self.node(root).dependencies.clone()
        };

        Ok(ids.into_iter().map(|id| self.path(id).clone()).collect())
    }

    fn collect_deep(&self, id: PathId, visited: &mut FxHashSet<PathId>, out: &mut Vec<PathId>) {
        let dependencies = &self.node(id).dependencies;
        out.extend_from_slice(dependencies);
        for &dependency in dependencies {
            if visited.insert(dependency) {
                self.collect_deep(dependency, visited, out);
            }
        }
    }

    /// Call `visitor` for each path [`get_dependencies`](Self::get_dependencies) yields
    pub fn each_dependency<'a, F>(
        &mut self,
        file: impl Into<FileRef<'a>>,
        deep: bool,
        mut visitor: F,
    ) -> Result<(), TrackerError>
    where
        F: FnMut(&NormalizedPath),
    {
        for dependency in self.get_dependencies(file, deep)? {
            visitor(&dependency);
        }
        Ok(())
    }

    /// Files importing `file` directly, or with `deep` transitively
    pub fn dependents<'a>(
        &mut self,
        file: impl Into<FileRef<'a>>,
        deep: bool,
    ) -> Result<Vec<NormalizedPath>, TrackerError> {
        let root = self.node_id(file)?;
        let reverse = self.reverse_edges();

        let mut seen = FxHashSet::default();
        seen.insert(root);
        let mut found = Vec::new();
        let mut queue = vec![root];

        while let Some(id) = queue.pop() {
            for &parent in reverse.get(&id).into_iter().flatten() {
                if seen.insert(parent) {
                    found.push(parent);
                    if deep {
                        queue.push(parent);
                    }
                }
            }
        }

        Ok(found.into_iter().map(|id| self.path(id).clone()).collect())
    }

    fn reverse_edges(&self) -> FxHashMap<PathId, Vec<PathId>> {
        let mut reverse: FxHashMap<PathId, Vec<PathId>> = FxHashMap::default();
        for (index, node) in self.nodes.iter().enumerate() {
            for &dependency in &node.dependencies {
                reverse.entry(dependency).or_default().push(PathId(index));
            }
        }
        reverse
    }

    pub fn mark_as_compiled<'a>(&mut self, file: impl Into<FileRef<'a>>) -> Result<(), TrackerError> {
        let id = self.node_id(file)?;
        self.node_mut(id).dirty = false;
        Ok(())
    }

    /// Mark `file` dirty and propagate to every dependent that is still
    /// clean. Already dirty dependents are not walked again, which also
    /// stops propagation around cycles.
    ///
    /// Returns the paths this call marked, starting with `file`.
    pub fn mark_as_not_compiled<'a>(
        &mut self,
        file: impl Into<FileRef<'a>>,
    ) -> Result<Vec<NormalizedPath>, TrackerError> {
        let root = self.node_id(file)?;
        let reverse = self.reverse_edges();

        self.node_mut(root).dirty = true;
        let mut dirtied = vec![root];
        let mut queue = vec![root];

        while let Some(id) = queue.pop() {
            for &parent in reverse.get(&id).into_iter().flatten() {
                let node = self.node_mut(parent);
                if !node.dirty {
                    node.dirty = true;
                    dirtied.push(parent);
                    queue.push(parent);
                }
            }
        }

        Ok(dirtied.into_iter().map(|id| self.path(id).clone()).collect())
    }

    /// Whether `file` is clean. Files never seen before are dirty.
    pub fn is_compiled<'a>(&mut self, file: impl Into<FileRef<'a>>) -> Result<bool, TrackerError> {
        let id = self.node_id(file)?;
        Ok(!self.node(id).dirty)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.paths.clear();
        self.nodes.clear();
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a node exists for `path`, without creating one
    pub fn contains(&self, path: &Path) -> bool {
        self.ids.contains_key(path)
    }

    /// All known paths in first-seen order
    pub fn paths(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.paths.iter()
    }

    /// Paths currently marked dirty, in first-seen order
    pub fn dirty_paths(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.paths.iter().zip(&self.nodes).filter(|(_, node)| node.dirty).map(|(path, _)| path)
    }
}
