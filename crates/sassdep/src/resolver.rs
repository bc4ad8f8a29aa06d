use crate::path::{NormalizedPath, normalize};
use crate::types::{ResolveConfig, TrackerError};
use std::path::{Path, PathBuf};

/// Resolves Sass import paths against an ordered list of include roots.
///
/// Follows the compiler's own lookup rules so that recorded edges match
/// what actually gets compiled in:
/// - `foo` means `foo.scss`, falling back to `foo.sass`
/// - `foo.scss` may live on disk as the partial `_foo.scss`
/// - an import that misses the include root is retried relative to the
///   importing file's directory, if that directory lives under the root
pub struct ImportResolver {
    include_paths: Vec<NormalizedPath>,
}

impl ImportResolver {
    pub fn new(config: &ResolveConfig) -> Result<Self, TrackerError> {
        let include_paths =
            config.include_paths.iter().map(normalize).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { include_paths })
    }

    /// Try each include root in order; the first hit wins.
    ///
    /// `context` is the directory of the importing file. A relative context
    /// is taken from the current directory, like the include roots.
    pub fn resolve(
        &self,
        import: &str,
        context: Option<&Path>,
    ) -> Result<Option<NormalizedPath>, TrackerError> {
        let context = context.map(normalize).transpose()?;
        let context = context.as_ref().map(NormalizedPath::as_path);
        Ok(self
            .include_paths
            .iter()
            .find_map(|include| resolve_absolute(import, include.as_path(), context)))
    }
}

/// Resolve a single import against one include root.
///
/// Relative include roots and contexts are taken from the current
/// directory. Returns `Ok(None)` when nothing on disk matches.
pub fn resolve_import(
    import: &str,
    include_path: impl AsRef<Path>,
    context: Option<&Path>,
) -> Result<Option<NormalizedPath>, TrackerError> {
    let include = normalize(include_path.as_ref())?;
    let context = context.map(normalize).transpose()?;
    Ok(resolve_absolute(import, include.as_path(), context.as_ref().map(NormalizedPath::as_path)))
}

fn has_sass_extension(import: &str) -> bool {
    import.ends_with(".scss") || import.ends_with(".sass")
}

fn resolve_absolute(import: &str, include: &Path, context: Option<&Path>) -> Option<NormalizedPath> {
    if has_sass_extension(import) {
        return lookup(Path::new(import), include, context);
    }

    lookup(Path::new(&format!("{import}.scss")), include, context)
        .or_else(|| lookup(Path::new(&format!("{import}.sass")), include, context))
}

fn lookup(candidate: &Path, include: &Path, context: Option<&Path>) -> Option<NormalizedPath> {
    let file_name = candidate.file_name()?.to_string_lossy();
    let dir = match candidate.parent() {
        Some(base) => include.join(base),
        None => include.to_path_buf(),
    };

    let plain = dir.join(file_name.as_ref());
    if plain.exists() {
        return Some(found(plain));
    }

    if !file_name.starts_with('_') {
        let partial = dir.join(format!("_{file_name}"));
        if partial.exists() {
            return Some(found(partial));
        }
    }

    // Retry relative to the importer, without a context so this happens once
    let relative = context?.strip_prefix(include).ok()?;
    lookup(&relative.join(candidate), include, None)
}

fn found(path: PathBuf) -> NormalizedPath {
    NormalizedPath::from_absolute(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_resolves_partial() {
        let dir = tempdir().unwrap();
        let partial = touch(dir.path(), "_partial.scss");

        let resolved = resolve_import("partial", dir.path(), None).unwrap();
        assert_eq!(resolved.unwrap(), partial);
    }

    #[test]
    fn test_underscore_import_does_not_fall_back_to_plain() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "partial.scss");

        let resolved = resolve_import("_partial", dir.path(), None).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_plain_file_wins_over_partial() {
        let dir = tempdir().unwrap();
        let plain = touch(dir.path(), "theme.scss");
        touch(dir.path(), "_theme.scss");

        let resolved = resolve_import("theme", dir.path(), None).unwrap();
        assert_eq!(resolved.unwrap(), plain);
    }

    #[test]
    fn test_extension_inference_order() {
        let dir = tempdir().unwrap();
        let sass = touch(dir.path(), "foo.sass");

        let resolved = resolve_import("foo", dir.path(), None).unwrap();
        assert_eq!(resolved.unwrap(), sass);

        let scss = touch(dir.path(), "foo.scss");
        let resolved = resolve_import("foo", dir.path(), None).unwrap();
        assert_eq!(resolved.unwrap(), scss);
    }

    #[test]
    fn test_explicit_extension_is_not_swapped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "foo.sass");

        let resolved = resolve_import("foo.scss", dir.path(), None).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        let resolved = resolve_import("missing", dir.path(), None).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_nested_partial() {
        let dir = tempdir().unwrap();
        let buttons = touch(dir.path(), "partials/_buttons.scss");

        let resolved = resolve_import("partials/buttons", dir.path(), None).unwrap();
        assert_eq!(resolved.unwrap(), buttons);
    }

    #[test]
    fn test_context_fallback_under_include_root() {
        let dir = tempdir().unwrap();
        let mixins = touch(dir.path(), "components/_mixins.scss");
        let context = dir.path().join("components");

        let resolved = resolve_import("mixins", dir.path(), None).unwrap();
        assert!(resolved.is_none());

        let resolved = resolve_import("mixins", dir.path(), Some(&context)).unwrap();
        assert_eq!(resolved.unwrap(), mixins);
    }

    #[test]
    fn test_context_outside_include_root_is_ignored() {
        let include = tempdir().unwrap();
        let other = tempdir().unwrap();
        touch(other.path(), "_mixins.scss");

        let resolved = resolve_import("mixins", include.path(), Some(other.path())).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_context_fallback_sass_syntax() {
        let dir = tempdir().unwrap();
        let vars = touch(dir.path(), "components/_vars.sass");
        let context = dir.path().join("components");

        let resolved = resolve_import("vars", dir.path(), Some(&context)).unwrap();
        assert_eq!(resolved.unwrap(), vars);
    }

    #[test]
    fn test_parent_relative_import_is_normalized() {
        let dir = tempdir().unwrap();
        let base = touch(dir.path(), "_base.scss");
        let context = dir.path().join("components");
        fs::create_dir_all(&context).unwrap();

        let resolved = resolve_import("../base", &context, None).unwrap();
        assert_eq!(resolved.unwrap(), base);
    }

    #[test]
    fn test_include_paths_first_match_wins() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        touch(second.path(), "_colors.scss");
        let expected = touch(first.path(), "colors.scss");
        touch(second.path(), "only-second.scss");

        let resolver =
            ImportResolver::new(&ResolveConfig::new([first.path(), second.path()])).unwrap();

        assert_eq!(resolver.resolve("colors", None).unwrap().unwrap(), expected);
        assert_eq!(
            resolver.resolve("only-second", None).unwrap().unwrap(),
            second.path().join("only-second.scss")
        );
        assert!(resolver.resolve("nowhere", None).unwrap().is_none());
    }

    #[test]
    fn test_relative_context_matches_include_root() {
        let cwd = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir_in(&cwd).unwrap();
        let mixins = touch(dir.path(), "components/_mixins.scss");
        let relative = dir.path().strip_prefix(&cwd).unwrap();

        let resolver = ImportResolver::new(&ResolveConfig::new([relative])).unwrap();
        let context = relative.join("components");

        assert_eq!(resolver.resolve("mixins", Some(&context)).unwrap().unwrap(), mixins);
        assert!(resolver.resolve("mixins", Some(Path::new(""))).is_err());
    }
}
