use crate::errors::Result;
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Appended to a file's full name to form its backup, e.g. `app.cfg.bak`.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Statistics from an `undo` operation.
#[derive(Debug, Default)]
pub struct UndoStats {
    /// The number of backup files found.
    pub found: usize,
    /// The number of files successfully restored from backups.
    pub restored: usize,
    /// The restored originals.
    pub paths: Vec<PathBuf>,
}

/// Statistics from a `clean-backups` operation.
#[derive(Debug, Default)]
pub struct CleanStats {
    pub found: usize,
    pub removed: usize,
    /// Combined size of the backups found, in bytes.
    pub total_size: u64,
    /// Backups removed, or that would be removed on a dry run.
    pub paths: Vec<PathBuf>,
}

/// Returns the backup location for `path`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Copies `path` next to itself with the backup suffix, replacing any older backup.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path);
    fs::copy(path, &backup)?;
    Ok(backup)
}

/// Maps a backup file back to the file it was taken from.
fn original_path(backup: &Path) -> Option<PathBuf> {
    let name = backup.file_name()?.to_str()?;
    let stem = name.strip_suffix(BACKUP_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(backup.with_file_name(stem))
}

/// Every backup file below `dir`, hidden and ignored files included.
fn find_backups(dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut found = Vec::new();
    let mut walker = WalkBuilder::new(dir);
    walker.standard_filters(false);

    for entry in walker.build() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if let Some(original) = original_path(path) {
            found.push((path.to_path_buf(), original));
        }
    }
    Ok(found)
}

/// Scans a directory for backup files and restores them over their originals.
///
/// # Arguments
///
/// * `dir` - The directory to scan for backup files.
/// * `keep_backups` - If `false`, the backup files are deleted after being restored.
pub fn undo(dir: &Path, keep_backups: bool) -> Result<UndoStats> {
    let mut stats = UndoStats::default();

    for (backup, original) in find_backups(dir)? {
        stats.found += 1;
        fs::copy(&backup, &original)?;
        if !keep_backups {
            fs::remove_file(&backup)?;
        }
        stats.restored += 1;
        info!(path = %original.display(), "restored");
        stats.paths.push(original);
    }

    Ok(stats)
}

/// Removes backup files without restoring them. With `dry_run`, only counts them.
pub fn clean_backups(dir: &Path, dry_run: bool) -> Result<CleanStats> {
    let mut stats = CleanStats::default();

    for (backup, _) in find_backups(dir)? {
        stats.found += 1;
        if let Ok(metadata) = backup.metadata() {
            stats.total_size += metadata.len();
        }

        if dry_run {
            stats.paths.push(backup);
            continue;
        }
        match fs::remove_file(&backup) {
            Ok(()) => {
                stats.removed += 1;
                info!(path = %backup.display(), "removed");
                stats.paths.push(backup);
            }
            Err(e) => warn!(path = %backup.display(), error = %e, "failed to remove backup"),
        }
    }

    Ok(stats)
}

/// The main entry point for the `undo` command.
pub fn run_undo(dir: PathBuf, keep_backups: bool) -> Result<()> {
    let stats = undo(&dir, keep_backups)?;
    for path in &stats.paths {
        println!("Restored {}", path.display());
    }
    println!(
        "\nBackups found: {}, restored: {}",
        stats.found, stats.restored
    );
    Ok(())
}

/// The main entry point for the `clean-backups` command.
pub fn run_clean_backups(dir: PathBuf, dry_run: bool) -> Result<()> {
    println!("Searching for backup files in {}...\n", dir.display());
    let stats = clean_backups(&dir, dry_run)?;
    let verb = if dry_run { "Would remove" } else { "Removed" };
    for path in &stats.paths {
        println!("{verb}: {}", path.display());
    }

    println!("\n{}", "-".repeat(50));
    println!("Backup files found: {}", stats.found);
    if dry_run {
        println!("Total size: {:.2} MB", stats.total_size as f64 / 1_048_576.0);
        println!("\nRun without --dry-run to remove these files");
    } else {
        println!("Backup files removed: {}", stats.removed);
        println!("Space freed: {:.2} MB", stats.total_size as f64 / 1_048_576.0);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ReplacementRequest;
    use crate::rewriter;
    use tempfile::TempDir;

    #[test]
    fn test_backup_path_appends_suffix() {
        assert_eq!(backup_path(Path::new("/a/app.cfg")), PathBuf::from("/a/app.cfg.bak"));
        assert_eq!(original_path(Path::new("/a/app.cfg.bak")), Some(PathBuf::from("/a/app.cfg")));
        assert_eq!(original_path(Path::new("/a/.bak")), None);
    }

    #[test]
    fn test_rewrite_with_backup_then_undo_restores() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("settings.ini");
        fs::write(&file, "dir=C:\\old\\bin").unwrap();

        let mut request = ReplacementRequest::new(temp_dir.path(), "C:/old", "C:/new");
        request.backup = true;
        let result = rewriter::run(request, |_| {}).unwrap();
        assert_eq!(result.files_modified, 1);
        assert_eq!(fs::read_to_string(&file).unwrap(), "dir=C:\\new\\bin");
        assert_eq!(fs::read_to_string(backup_path(&file)).unwrap(), "dir=C:\\old\\bin");

        let stats = undo(temp_dir.path(), false).unwrap();
        assert_eq!(stats.found, 1);
        assert_eq!(stats.restored, 1);
        assert_eq!(fs::read_to_string(&file).unwrap(), "dir=C:\\old\\bin");
        assert!(!backup_path(&file).exists());
    }

    #[test]
    fn test_backups_are_not_rewritten_on_later_runs() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "old").unwrap();

        let mut request = ReplacementRequest::new(temp_dir.path(), "old", "new");
        request.backup = true;
        rewriter::run(request.clone(), |_| {}).unwrap();
        fs::write(&file, "old again").unwrap();
        let second = rewriter::run(request, |_| {}).unwrap();

        assert_eq!(second.files_processed, 1);
        assert_eq!(fs::read_to_string(backup_path(&file)).unwrap(), "old again");
    }

    #[test]
    fn test_clean_backups_dry_run_keeps_files() {
        let temp_dir = TempDir::new().unwrap();
        let backup = temp_dir.path().join("x.txt.bak");
        fs::write(&backup, "12345").unwrap();

        let preview = clean_backups(temp_dir.path(), true).unwrap();
        assert_eq!(preview.found, 1);
        assert_eq!(preview.removed, 0);
        assert_eq!(preview.total_size, 5);
        assert_eq!(preview.paths, vec![backup.clone()]);
        assert!(backup.exists());

        let stats = clean_backups(temp_dir.path(), false).unwrap();
        assert_eq!(stats.removed, 1);
        assert!(!backup.exists());
    }
}
