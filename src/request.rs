use crate::errors::{Error, Result};
use std::path::PathBuf;

/// Everything one rewrite run needs, built from user input and handed to
/// [`PathRewriter`](crate::rewriter::PathRewriter) once.
#[derive(Debug, Clone)]
pub struct ReplacementRequest {
    /// The directory to walk. Must exist.
    pub root: PathBuf,
    /// The path-like text to look for. Must not be empty.
    pub search: String,
    /// The replacement text. Only required in apply mode.
    pub replace: String,
    /// File name suffixes whose contents are scanned. Empty means all files.
    pub extensions: Vec<String>,
    /// Also report directory paths and file names containing the search text.
    pub search_in_names: bool,
    /// Report only; never write.
    pub preview: bool,
    /// Honor `.gitignore` and hidden-file filters while walking.
    pub respect_ignore: bool,
    /// Directory names whose subtrees are skipped.
    pub exclude: Vec<String>,
    /// In apply mode, rename matched files and directories after rewriting contents.
    pub rename_paths: bool,
    /// Copy each file to `<file>.bak` before rewriting it.
    pub backup: bool,
    /// Threads used for content processing. `None` uses all available cores.
    pub workers: Option<usize>,
}

impl ReplacementRequest {
    /// Creates a request with the default options: names searched, all
    /// extensions, apply mode, no backups, no renames.
    pub fn new(root: impl Into<PathBuf>, search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            search: search.into(),
            replace: replace.into(),
            extensions: Vec::new(),
            search_in_names: true,
            preview: false,
            respect_ignore: false,
            exclude: Vec::new(),
            rename_paths: false,
            backup: false,
            workers: None,
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_names(mut self, search_in_names: bool) -> Self {
        self.search_in_names = search_in_names;
        self
    }

    /// Rejects requests that must not start a traversal.
    ///
    /// The root must be an existing directory, the search text must be
    /// non-empty, and apply mode additionally needs a replacement.
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(Error::Validation("no root directory given".into()));
        }
        if !self.root.is_dir() {
            return Err(Error::Validation(format!(
                "root directory '{}' does not exist",
                self.root.display()
            )));
        }
        if self.search.is_empty() {
            return Err(Error::Validation("search text is empty".into()));
        }
        if !self.preview && self.replace.is_empty() {
            return Err(Error::Validation(
                "replacement text is required unless previewing".into(),
            ));
        }
        Ok(())
    }

    /// Returns `true` if the file's contents should be scanned.
    pub fn accepts_file_name(&self, file_name: &str) -> bool {
        self.extensions.is_empty() || self.extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
    }
}

/// Splits space-separated extension lists, dropping empty entries.
///
/// Each argument may itself hold several extensions, e.g. `".py .txt"`.
pub fn parse_extensions<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .flat_map(|s| s.as_ref().split_whitespace())
        .map(str::to_string)
        .collect()
}
