use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Where a match was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    DirectoryPath,
    Filename,
    Content,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchKind::DirectoryPath => "DIRECTORY_PATH",
            MatchKind::Filename => "FILENAME",
            MatchKind::Content => "CONTENT",
        };
        f.write_str(label)
    }
}

/// A single reported match. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub location: PathBuf,
    pub kind: MatchKind,
    /// Always at least 1. Name matches count 1 regardless of variant hits.
    pub occurrences: usize,
}

impl MatchRecord {
    pub fn new(location: impl Into<PathBuf>, kind: MatchKind, occurrences: usize) -> Self {
        Self {
            location: location.into(),
            kind,
            occurrences: occurrences.max(1),
        }
    }
}

/// Aggregate outcome of one run.
///
/// Built up while walking and handed out exactly once when the run ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// Files whose contents were read (only those passing the extension filter).
    pub files_processed: usize,
    /// Files written back in apply mode.
    pub files_modified: usize,
    /// Content occurrences found (preview) or replaced (apply).
    pub total_replacements: usize,
    /// Directory paths and file names containing a search variant.
    pub path_matches: usize,
    /// Files with at least one content occurrence.
    pub content_matches: usize,
    /// Files and directories renamed by the renaming pass.
    pub paths_renamed: usize,
    pub errors: Vec<String>,
    pub matches: Vec<MatchRecord>,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A message from a running rewrite to whoever is watching it.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Free-form progress line such as `Scanning: <path>`.
    Progress(String),
    Match(MatchRecord),
    /// Always the last event of a run.
    Finished(RunResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_record_occurrences_at_least_one() {
        let m = MatchRecord::new("/tmp/x", MatchKind::Filename, 0);
        assert_eq!(m.occurrences, 1);
    }

    #[test]
    fn test_match_kind_serializes_like_display() {
        for kind in [MatchKind::DirectoryPath, MatchKind::Filename, MatchKind::Content] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
