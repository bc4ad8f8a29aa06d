use crate::source::SourceFile;
use crate::types::TrackerError;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;

/// A regular expression locating import directives.
///
/// Capture group 1 holds the directive's argument: one or more quoted
/// paths, or bare paths in the indented syntax.
#[derive(Debug, Clone)]
pub struct ImportPattern {
    regex: Regex,
}

impl ImportPattern {
    pub fn new(pattern: &str) -> Result<Self, TrackerError> {
        let regex = Regex::new(pattern)?;
        if regex.captures_len() < 2 {
            return Err(TrackerError::InvalidPattern(format!(
                "pattern has no capture group: {pattern}"
            )));
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for ImportPattern {
    fn default() -> Self {
        default_pattern().clone()
    }
}

/// Get the default `@import` pattern (compiled once, cached)
pub fn default_pattern() -> &'static ImportPattern {
    static PATTERN: OnceLock<ImportPattern> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Matches, up to a semicolon or end of line:
        //   @import 'variables';
        //   @import "mixins", 'partials/buttons';
        //   @import 'reset',
        //     'grid';                     (quoted list over several lines)
        //   @import base, grid            (indented syntax)
        let regex =
            Regex::new(r#"(?m)@import\s+((?:['"][^'"\n]*['"]\s*,\s*)*[^;\n]+?)\s*(?:;|$)"#)
                .expect("default import pattern is valid");
        ImportPattern { regex }
    })
}

/// A quoted path, with group 1 set when it sits inside `url(...)`
fn quoted_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"(url\(\s*)?['"]([^'"]+)['"]"#).expect("quoted path pattern is valid")
    })
}

/// Which Sass syntax a stylesheet is written in.
///
/// Only the indented syntax allows unquoted import paths. In SCSS an
/// unquoted `@import` is plain CSS or not an import at all, e.g. inside a
/// `//` comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Scss,
    Indented,
}

impl Syntax {
    pub fn of(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext == "sass" => Syntax::Indented,
            _ => Syntax::Scss,
        }
    }
}

/// One import directive found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMatch<'c> {
    /// The full matched text
    pub text: &'c str,
    /// Capture group 1
    pub argument: &'c str,
    /// Byte offset of the match in the file
    pub offset: usize,
}

impl<'c> ImportMatch<'c> {
    fn from_captures(captures: &Captures<'c>) -> Option<Self> {
        let whole = captures.get(0)?;
        let argument = captures.get(1).map(|m| m.as_str()).unwrap_or(whole.as_str());
        Some(Self { text: whole.as_str(), argument, offset: whole.start() })
    }

    /// Import paths named by this directive, skipping plain CSS imports
    /// and built-in modules, which the compiler never reads from disk.
    ///
    /// Unquoted paths are only read for [`Syntax::Indented`].
    pub fn paths(&self, syntax: Syntax) -> Vec<&'c str> {
        let argument = self.argument;
        let raw: Vec<&'c str> = if argument.contains(['\'', '"']) {
            quoted_regex()
                .captures_iter(argument)
                .filter(|cap| cap.get(1).is_none())
                .filter_map(|cap| cap.get(2).map(|m| m.as_str()))
                .collect()
        } else if syntax == Syntax::Indented {
            argument.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
        } else {
            Vec::new()
        };

        raw.into_iter().filter(|path| !is_css_import(path)).collect()
    }
}

fn is_css_import(path: &str) -> bool {
    path.ends_with(".css")
        || path.starts_with("http://")
        || path.starts_with("https://")
        || path.starts_with("//")
        || path.starts_with("url(")
        || path.starts_with("sass:")
}

/// Lazily iterate the import directives in `content`.
///
/// Every call starts a fresh search from the beginning of the content.
pub fn matches<'c>(
    content: &'c str,
    pattern: &'c ImportPattern,
) -> impl Iterator<Item = ImportMatch<'c>> + 'c {
    pattern.regex.captures_iter(content).filter_map(|cap| ImportMatch::from_captures(&cap))
}

/// Invoke `on_match` once per import directive in the file's contents.
///
/// Files without loaded contents produce no matches.
pub fn scan<F>(file: &SourceFile, pattern: &ImportPattern, mut on_match: F)
where
    F: FnMut(&ImportMatch<'_>, &SourceFile),
{
    let Some(content) = file.contents.as_deref() else {
        return;
    };

    for found in matches(content, pattern) {
        on_match(&found, file);
    }
}
