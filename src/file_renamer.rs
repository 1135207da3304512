use crate::errors::Error;
use crate::report::RunEvent;
use crate::rewriter::build_walker;
use crate::variants::VariantPairs;
use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a renaming pass.
#[derive(Debug, Default)]
pub struct RenameStats {
    pub renamed: usize,
    pub errors: Vec<String>,
}

/// Renames every file and directory below `root` whose own name contains a
/// search variant.
///
/// Entries are collected with the same filters as the content walk, then
/// renamed deepest-first, so a directory is only renamed after everything
/// inside it. The root itself is never renamed. Matching here is
/// case-sensitive because the rename has to produce the replacement in place
/// of the exact text found.
pub fn rename_matches(
    root: &Path,
    pairs: &VariantPairs,
    respect_ignore: bool,
    exclude: &[String],
    on_event: &dyn Fn(RunEvent),
) -> RenameStats {
    let mut stats = RenameStats::default();

    let mut entries = Vec::new();
    for entry in build_walker(root, respect_ignore, exclude).build() {
        match entry {
            Ok(entry) if entry.depth() > 0 => entries.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => stats.errors.push(Error::Walk(e).to_string()),
        }
    }
    // Stable, so siblings keep walk order.
    entries.sort_by_key(|path| Reverse(path.components().count()));

    for path in entries {
        match rename_entry(&path, pairs) {
            Ok(Some(new_path)) => {
                stats.renamed += 1;
                info!(from = %path.display(), to = %new_path.display(), "renamed");
                on_event(RunEvent::Progress(format!(
                    "Renamed: {} -> {}",
                    path.display(),
                    new_path.display()
                )));
            }
            Ok(None) => {}
            Err(msg) => {
                warn!("{msg}");
                on_event(RunEvent::Progress(msg.clone()));
                stats.errors.push(msg);
            }
        }
    }

    stats
}

/// Computes the new name for `path`'s last component, if any variant occurs in it.
fn new_path(path: &Path, pairs: &VariantPairs) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_str()?;
    if !pairs.searches().any(|s| file_name.contains(s)) {
        return None;
    }
    let (new_name, _) = pairs.apply(file_name);
    if new_name == file_name || new_name.is_empty() {
        return None;
    }
    Some(path.with_file_name(new_name))
}

/// Renames a single entry if its name matches.
///
/// Returns `Ok(Some(new_path))` if the entry was renamed and `Ok(None)` if it
/// did not match. An existing target is never overwritten.
fn rename_entry(path: &Path, pairs: &VariantPairs) -> Result<Option<PathBuf>, String> {
    let Some(target) = new_path(path, pairs) else {
        return Ok(None);
    };
    if target.exists() {
        return Err(format!(
            "Error renaming {}: {} already exists",
            path.display(),
            target.display()
        ));
    }
    fs::rename(path, &target)
        .map_err(|e| format!("Error renaming {}: {}", path.display(), e))?;
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ReplacementRequest;
    use crate::rewriter;
    use tempfile::TempDir;

    #[test]
    fn test_renames_nested_entries_deepest_first() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("old_project");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("old_project.txt"), "uses old_project").unwrap();

        let mut request = ReplacementRequest::new(temp_dir.path(), "old_project", "new_project");
        request.rename_paths = true;
        let result = rewriter::run(request, |_| {}).unwrap();

        let renamed_file = temp_dir.path().join("new_project").join("new_project.txt");
        assert_eq!(result.paths_renamed, 2);
        assert!(renamed_file.exists());
        assert!(!dir.exists());
        assert_eq!(fs::read_to_string(renamed_file).unwrap(), "uses new_project");
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_preview_never_renames() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("old_name.txt");
        fs::write(&file, "").unwrap();

        let mut request = ReplacementRequest::new(temp_dir.path(), "old_name", "new_name").with_preview(true);
        request.rename_paths = true;
        let result = rewriter::run(request, |_| {}).unwrap();

        assert_eq!(result.paths_renamed, 0);
        assert_eq!(result.path_matches, 1);
        assert!(file.exists());
    }

    #[test]
    fn test_existing_target_is_reported_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("old.cfg"), "a").unwrap();
        fs::write(temp_dir.path().join("new.cfg"), "b").unwrap();

        let pairs = VariantPairs::new("old", "new");
        let stats = rename_matches(temp_dir.path(), &pairs, false, &[], &|_| {});

        assert_eq!(stats.renamed, 0);
        assert_eq!(stats.errors.len(), 1);
        assert_eq!(fs::read_to_string(temp_dir.path().join("new.cfg")).unwrap(), "b");
    }

    #[test]
    fn test_ignored_entries_are_not_renamed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        // A `.git` directory makes `.gitignore` apply.
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".gitignore"), "build/\n").unwrap();
        for dir in [".cache", "build"] {
            fs::create_dir(root.join(dir)).unwrap();
            fs::write(root.join(dir).join("old.txt"), "").unwrap();
        }
        fs::write(root.join("old.txt"), "").unwrap();

        let mut request = ReplacementRequest::new(root, "old", "new");
        request.rename_paths = true;
        request.respect_ignore = true;
        let result = rewriter::run(request, |_| {}).unwrap();

        assert_eq!(result.paths_renamed, 1);
        assert!(root.join("new.txt").exists());
        assert!(root.join(".cache").join("old.txt").exists());
        assert!(root.join("build").join("old.txt").exists());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_hidden_entries_renamed_without_ignore_filters() {
        let temp_dir = TempDir::new().unwrap();
        let cache = temp_dir.path().join(".cache");
        fs::create_dir(&cache).unwrap();
        fs::write(cache.join("old.txt"), "").unwrap();

        let pairs = VariantPairs::new("old", "new");
        let stats = rename_matches(temp_dir.path(), &pairs, false, &[], &|_| {});

        assert_eq!(stats.renamed, 1);
        assert!(cache.join("new.txt").exists());
    }

    #[test]
    fn test_rename_is_case_sensitive() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("OLD.md");
        fs::write(&file, "").unwrap();

        let pairs = VariantPairs::new("old", "new");
        let stats = rename_matches(temp_dir.path(), &pairs, false, &[], &|_| {});

        assert_eq!(stats.renamed, 0);
        assert!(file.exists());
    }
}
