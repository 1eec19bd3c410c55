//! Language table
//!
//! Read-only mapping from file extension to language tag.

use std::collections::HashMap;

/// Built-in extension → tag entries
const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
    ("php", "php"),
    ("java", "java"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("hpp", "cpp"),
    ("c", "c"),
    ("h", "c"),
    ("go", "golang"),
    ("py", "python"),
    ("rb", "ruby"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("css", "css"),
    ("html", "html"),
    ("sh", "bash"),
    ("rs", "rust"),
];

/// Mapping from extension (without the leading dot) to language tag
#[derive(Debug, Clone)]
pub struct LanguageTable {
    by_extension: HashMap<String, String>,
}

impl LanguageTable {
    /// Table with the built-in languages
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_LANGUAGES.iter().copied())
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            by_extension: entries
                .into_iter()
                .map(|(ext, tag)| (ext.to_string(), tag.to_string()))
                .collect(),
        }
    }

    /// Language tag for a path, if its extension is known
    pub fn detect(&self, path: &str) -> Option<&str> {
        file_extension(path)
            .and_then(|ext| self.by_extension.get(ext))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Extension of the last path segment, without the dot.
///
/// Everything after the final `.` counts, so `.bashrc` yields `bashrc` and
/// `archive.tar.gz` yields `gz`. Paths without a dot have no extension.
pub fn file_extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}
