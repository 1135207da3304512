//! The rewrite engine: walk a tree, match names and contents against the four
//! separator variants, and optionally write the rewritten contents back.

use crate::backups;
use crate::errors::{Error, Result};
use crate::file_renamer;
use crate::report::{MatchKind, MatchRecord, RunEvent, RunResult};
use crate::request::ReplacementRequest;
use crate::variants::VariantPairs;
use ignore::WalkBuilder;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Core engine for one rewrite run.
///
/// A `PathRewriter` owns a validated request, its variant table and the
/// case-insensitive name matchers derived from it. It holds no state between
/// runs; each call to [`run`](Self::run) builds a fresh [`RunResult`].
pub struct PathRewriter {
    request: ReplacementRequest,
    pairs: VariantPairs,
    name_patterns: Vec<Regex>,
}

/// What happened to a single scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOutcome {
    /// Content occurrences across all four variants.
    pub occurrences: usize,
    /// `true` if the file was written back.
    pub modified: bool,
}

impl PathRewriter {
    /// Validates the request and prepares the variant table.
    ///
    /// Fails with [`Error::Validation`] for requests that must not start.
    pub fn new(request: ReplacementRequest) -> Result<Self> {
        request.validate()?;
        let pairs = VariantPairs::new(&request.search, &request.replace);
        let name_patterns = pairs
            .searches()
            .map(|s| {
                RegexBuilder::new(&regex::escape(s))
                    .case_insensitive(true)
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            request,
            pairs,
            name_patterns,
        })
    }

    pub fn request(&self) -> &ReplacementRequest {
        &self.request
    }

    /// Returns `true` if any search variant occurs in `name`, ignoring case.
    ///
    /// Variants are tried in table order and the first hit ends the check, so
    /// a name is reported at most once.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name_patterns.iter().any(|re| re.is_match(name))
    }

    /// Reads one file and either counts the variants in it (preview) or
    /// applies the pairs and writes the result back in place.
    ///
    /// Invalid UTF-8 is decoded lossily. Nothing is written when there are no
    /// occurrences or when previewing.
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let bytes = fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);

        if self.request.preview {
            return Ok(FileOutcome {
                occurrences: self.pairs.count(&content),
                modified: false,
            });
        }

        let (new_content, occurrences) = self.pairs.apply(&content);
        let mut modified = false;
        if occurrences > 0 {
            if self.request.backup {
                backups::create_backup(path)?;
            }
            fs::write(path, new_content.as_bytes())?;
            modified = true;
        }

        Ok(FileOutcome {
            occurrences,
            modified,
        })
    }

    /// Executes the run, reporting progress and matches through `on_event`.
    ///
    /// The returned [`RunResult`] is also sent as the final
    /// [`RunEvent::Finished`]. Per-file failures end up in
    /// [`RunResult::errors`] and never stop the walk.
    pub fn run<F>(&self, on_event: F) -> RunResult
    where
        F: Fn(RunEvent) + Sync,
    {
        let mut result = RunResult::default();
        let files = self.walk(&mut result, &on_event);
        self.process_files(&files, &mut result, &on_event);

        if self.request.rename_paths && !self.request.preview {
            let stats = file_renamer::rename_matches(
                &self.request.root,
                &self.pairs,
                self.request.respect_ignore,
                &self.request.exclude,
                &on_event,
            );
            result.paths_renamed = stats.renamed;
            result.errors.extend(stats.errors);
        }

        info!(
            processed = result.files_processed,
            modified = result.files_modified,
            replacements = result.total_replacements,
            errors = result.errors.len(),
            "rewrite finished"
        );
        on_event(RunEvent::Finished(result.clone()));
        result
    }

    /// Walks the tree once, reporting name matches as they are seen, and
    /// returns the files whose contents should be scanned.
    fn walk<F>(&self, result: &mut RunResult, on_event: &F) -> Vec<PathBuf>
    where
        F: Fn(RunEvent) + Sync,
    {
        let request = &self.request;
        let walker = build_walker(&request.root, request.respect_ignore, &request.exclude);

        let mut files = Vec::new();
        for entry in walker.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let msg = Error::Walk(e).to_string();
                    warn!("{msg}");
                    on_event(RunEvent::Progress(msg.clone()));
                    result.errors.push(msg);
                    continue;
                }
            };
            let path = entry.path();
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            // Symlinks are not followed, but a link to a directory still counts as one.
            let is_dir = file_type.is_dir() || (file_type.is_symlink() && path.is_dir());

            if is_dir {
                if request.search_in_names && self.name_matches(&path.to_string_lossy()) {
                    self.record_name_match(path, MatchKind::DirectoryPath, result, on_event);
                }
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if request.search_in_names && self.name_matches(&file_name) {
                self.record_name_match(path, MatchKind::Filename, result, on_event);
            }

            // Sockets and FIFOs would block or fail on read.
            if !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }
            if request.backup && file_name.ends_with(backups::BACKUP_SUFFIX) {
                continue;
            }
            if request.accepts_file_name(&file_name) {
                files.push(path.to_path_buf());
            }
        }
        files
    }

    fn record_name_match<F>(&self, path: &Path, kind: MatchKind, result: &mut RunResult, on_event: &F)
    where
        F: Fn(RunEvent) + Sync,
    {
        let label = match kind {
            MatchKind::DirectoryPath => "Found in path",
            _ => "Found in filename",
        };
        debug!(path = %path.display(), %kind, "name match");
        let record = MatchRecord::new(path, kind, 1);
        result.path_matches += 1;
        result.matches.push(record.clone());
        on_event(RunEvent::Progress(format!("{label}: {}", path.display())));
        on_event(RunEvent::Match(record));
    }

    /// Scans file contents on a private pool and folds the outcomes into
    /// `result` in walk order.
    fn process_files<F>(&self, files: &[PathBuf], result: &mut RunResult, on_event: &F)
    where
        F: Fn(RunEvent) + Sync,
    {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.request.workers.unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            }))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                let msg = format!("Fatal error: {}", Error::ThreadPool(e));
                warn!("{msg}");
                result.errors.push(msg);
                return;
            }
        };

        let outcomes: Vec<(&PathBuf, Result<FileOutcome>)> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    debug!(path = %path.display(), "scanning");
                    on_event(RunEvent::Progress(format!("Scanning: {}", path.display())));
                    (path, self.process_file(path))
                })
                .collect()
        });

        for (path, outcome) in outcomes {
            match outcome {
                Ok(outcome) => {
                    result.files_processed += 1;
                    if outcome.occurrences == 0 {
                        continue;
                    }
                    result.content_matches += 1;
                    result.total_replacements += outcome.occurrences;
                    if outcome.modified {
                        result.files_modified += 1;
                        info!(path = %path.display(), replacements = outcome.occurrences, "modified");
                        on_event(RunEvent::Progress(format!(
                            "Modified: {} ({} replacements)",
                            path.display(),
                            outcome.occurrences
                        )));
                    } else {
                        on_event(RunEvent::Progress(format!(
                            "Found in content: {} ({} matches)",
                            path.display(),
                            outcome.occurrences
                        )));
                    }
                    let record = MatchRecord::new(path.as_path(), MatchKind::Content, outcome.occurrences);
                    result.matches.push(record.clone());
                    on_event(RunEvent::Match(record));
                }
                Err(e) => {
                    let msg = format!("Error processing {}: {}", path.display(), e);
                    warn!("{msg}");
                    on_event(RunEvent::Progress(msg.clone()));
                    result.errors.push(msg);
                }
            }
        }
    }
}

/// Walker over `root` shared by the content and rename passes.
///
/// Hidden and ignored entries are filtered only with `respect_ignore`.
/// Entries named in `exclude` are pruned together with their subtrees; the
/// root itself is always kept.
pub(crate) fn build_walker(root: &Path, respect_ignore: bool, exclude: &[String]) -> WalkBuilder {
    let exclude = exclude.to_vec();
    let mut walker = WalkBuilder::new(root);
    walker.standard_filters(respect_ignore);
    walker.filter_entry(move |entry| {
        entry.depth() == 0
            || !exclude
                .iter()
                .any(|ex| entry.file_name() == ex.as_str())
    });
    walker
}

/// Validates `request` and runs it to completion on the calling thread.
pub fn run<F>(request: ReplacementRequest, on_event: F) -> Result<RunResult>
where
    F: Fn(RunEvent) + Sync,
{
    let rewriter = PathRewriter::new(request)?;
    Ok(rewriter.run(on_event))
}
