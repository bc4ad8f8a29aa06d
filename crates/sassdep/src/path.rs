use crate::source::SourceFile;
use crate::types::TrackerError;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Absolute, lexically normalized path used as graph node identity.
///
/// Two references to the same file always normalize to equal values, so
/// equality here is plain path equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedPath(PathBuf);

impl NormalizedPath {
    /// Wrap a path already known to be absolute
    pub(crate) fn from_absolute(path: &Path) -> Self {
        Self(clean(path))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// File name starts with `_`
    pub fn is_partial(&self) -> bool {
        self.0.file_name().map(|name| name.to_string_lossy().starts_with('_')).unwrap_or(false)
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Borrow<Path> for NormalizedPath {
    fn borrow(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl PartialEq<Path> for NormalizedPath {
    fn eq(&self, other: &Path) -> bool {
        self.0 == other
    }
}

impl PartialEq<PathBuf> for NormalizedPath {
    fn eq(&self, other: &PathBuf) -> bool {
        &self.0 == other
    }
}

/// Anything that identifies a file.
///
/// Each graph operation accepts `impl Into<FileRef>`, so callers can pass a
/// path, a [`SourceFile`], or a JSON record carrying a `path` field.
#[derive(Debug, Clone, Copy)]
pub enum FileRef<'a> {
    /// Absolute or cwd-relative path
    Path(&'a Path),
    /// A pipeline file; its current `path` is used
    File(&'a SourceFile),
    /// A key-value record with a `path` entry (string or nested record)
    Record(&'a Value),
}

impl<'a> From<&'a Path> for FileRef<'a> {
    fn from(path: &'a Path) -> Self {
        FileRef::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for FileRef<'a> {
    fn from(path: &'a PathBuf) -> Self {
        FileRef::Path(path.as_path())
    }
}

impl<'a> From<&'a str> for FileRef<'a> {
    fn from(path: &'a str) -> Self {
        FileRef::Path(Path::new(path))
    }
}

impl<'a> From<&'a String> for FileRef<'a> {
    fn from(path: &'a String) -> Self {
        FileRef::Path(Path::new(path.as_str()))
    }
}

impl<'a> From<&'a NormalizedPath> for FileRef<'a> {
    fn from(path: &'a NormalizedPath) -> Self {
        FileRef::Path(path.as_path())
    }
}

impl<'a> From<&'a SourceFile> for FileRef<'a> {
    fn from(file: &'a SourceFile) -> Self {
        FileRef::File(file)
    }
}

impl<'a> From<&'a Value> for FileRef<'a> {
    fn from(record: &'a Value) -> Self {
        FileRef::Record(record)
    }
}

/// Normalize any file reference into its canonical absolute path.
///
/// Purely lexical: the file does not have to exist.
pub fn normalize<'a>(file: impl Into<FileRef<'a>>) -> Result<NormalizedPath, TrackerError> {
    match file.into() {
        FileRef::Path(path) => absolutize(path),
        FileRef::File(file) => absolutize(&file.path),
        FileRef::Record(record) => normalize_record(record),
    }
}

fn normalize_record(record: &Value) -> Result<NormalizedPath, TrackerError> {
    match record {
        Value::String(path) => absolutize(Path::new(path)),
        Value::Object(map) => match map.get("path") {
            Some(inner @ (Value::String(_) | Value::Object(_))) => normalize_record(inner),
            Some(Value::Null) | None => {
                Err(TrackerError::InvalidFileReference(format!("record has no path: {record}")))
            }
            Some(other) => Err(TrackerError::InvalidFileReference(format!(
                "path field is not a string: {other}"
            ))),
        },
        other => Err(TrackerError::InvalidFileReference(format!("unsupported record: {other}"))),
    }
}

fn absolutize(path: &Path) -> Result<NormalizedPath, TrackerError> {
    if path.as_os_str().is_empty() {
        return Err(TrackerError::InvalidFileReference("empty path".to_string()));
    }

    let joined;
    let path = if path.is_absolute() {
        path
    } else {
        joined = std::env::current_dir()?.join(path);
        joined.as_path()
    };

    Ok(NormalizedPath(clean(path)))
}

/// Resolve `.` and `..` components and unify separators
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_resolves_dots() {
        assert_eq!(clean(Path::new("/a/./b/../c/")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("/a//b")), PathBuf::from("/a/b"));
        assert_eq!(clean(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_relative_path_uses_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let normalized = normalize("styles/./main.scss").unwrap();
        assert_eq!(normalized, cwd.join("styles").join("main.scss"));
    }

    #[test]
    fn test_all_shapes_normalize_identically() {
        let path = "/project/styles/child.scss";
        let from_str = normalize(path).unwrap();
        let from_file = normalize(&SourceFile::new("/project/styles/../styles/child.scss")).unwrap();
        let record = json!({ "path": path });
        let from_record = normalize(&record).unwrap();
        let nested = json!({ "path": { "path": "/project/styles/child.scss/" } });
        let from_nested = normalize(&nested).unwrap();

        assert_eq!(from_str, from_file);
        assert_eq!(from_str, from_record);
        assert_eq!(from_str, from_nested);
    }

    #[test]
    fn test_invalid_references() {
        assert!(matches!(normalize(""), Err(TrackerError::InvalidFileReference(_))));
        assert!(matches!(normalize(&json!({})), Err(TrackerError::InvalidFileReference(_))));
        assert!(matches!(
            normalize(&json!({ "path": null })),
            Err(TrackerError::InvalidFileReference(_))
        ));
        assert!(matches!(
            normalize(&json!({ "path": 42 })),
            Err(TrackerError::InvalidFileReference(_))
        ));
        assert!(matches!(normalize(&json!([1, 2])), Err(TrackerError::InvalidFileReference(_))));
    }

    #[test]
    fn test_is_partial() {
        assert!(normalize("/a/_partial.scss").unwrap().is_partial());
        assert!(!normalize("/_a/partial.scss").unwrap().is_partial());
    }
}
