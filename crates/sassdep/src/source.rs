use std::path::{Path, PathBuf};

/// A file flowing through the pipeline stages.
///
/// `history` holds the paths this file had before upstream stages renamed
/// it, oldest first. It is empty for a file that was never renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub contents: Option<String>,
    pub history: Vec<PathBuf>,
}

impl SourceFile {
    /// A file with no contents loaded
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), contents: None, history: Vec::new() }
    }

    pub fn with_contents(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self { path: path.into(), contents: Some(contents.into()), history: Vec::new() }
    }

    /// Read a file from disk
    pub fn read(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)?;
        Ok(Self { path, contents: Some(contents), history: Vec::new() })
    }

    /// Move the file to a new path, remembering the old one
    pub fn rename(&mut self, path: impl Into<PathBuf>) {
        let previous = std::mem::replace(&mut self.path, path.into());
        self.history.push(previous);
    }

    /// Every path this file has had, oldest first, ending with the current one
    pub fn all_paths(&self) -> impl Iterator<Item = &Path> {
        let current = self.path.as_path();
        let tail = (self.history.last().map(PathBuf::as_path) != Some(current)).then_some(current);
        self.history.iter().map(PathBuf::as_path).chain(tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_records_history() {
        let mut file = SourceFile::with_contents("/a/child.scss", "");
        file.rename("/a/child.css");
        file.rename("/dist/child.css");

        assert_eq!(file.path, PathBuf::from("/dist/child.css"));
        assert_eq!(file.history, vec![PathBuf::from("/a/child.scss"), PathBuf::from("/a/child.css")]);

        let all: Vec<_> = file.all_paths().collect();
        assert_eq!(
            all,
            vec![Path::new("/a/child.scss"), Path::new("/a/child.css"), Path::new("/dist/child.css")]
        );
    }

    #[test]
    fn test_all_paths_skips_duplicate_tail() {
        let file = SourceFile {
            path: PathBuf::from("/a/b.scss"),
            contents: None,
            history: vec![PathBuf::from("/a/b.scss")],
        };
        assert_eq!(file.all_paths().count(), 1);
    }
}
