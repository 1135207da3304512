//! Runs a rewrite on its own thread and streams events back over a channel.
//!
//! The caller only ever reads from the channel; it never touches the state of
//! the run. Each spawned run owns its own [`PathRewriter`] and result.

use crate::cli::ReplaceArgs;
use crate::config::{ConfigLoader, RewriteConfig};
use crate::errors::{Error, Result};
use crate::output_formatter::{OutputFormat, OutputFormatter};
use crate::report::{RunEvent, RunResult};
use crate::request::ReplacementRequest;
use crate::rewriter::PathRewriter;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

/// Handle to a rewrite running in the background.
pub struct RunHandle {
    events: Receiver<RunEvent>,
    thread: JoinHandle<RunResult>,
}

/// Validates `request` on the calling thread, then starts the run on a
/// dedicated worker thread.
///
/// Validation failures are returned here and no thread is started.
pub fn spawn(request: ReplacementRequest) -> Result<RunHandle> {
    let rewriter = PathRewriter::new(request)?;
    let (tx, rx) = mpsc::channel();

    let thread = thread::Builder::new()
        .name("pathrewrite-worker".into())
        .spawn(move || {
            debug!(root = %rewriter.request().root.display(), "worker started");
            rewriter.run(move |event| {
                // A dropped receiver only means nobody is watching anymore.
                let _ = tx.send(event);
            })
        })?;

    Ok(RunHandle { events: rx, thread })
}

impl RunHandle {
    /// Blocking iterator over the run's events. Ends after
    /// [`RunEvent::Finished`], when the worker drops its sender.
    pub fn events(&self) -> impl Iterator<Item = RunEvent> + '_ {
        self.events.iter()
    }

    /// Waits for the worker and returns the final result.
    ///
    /// Events not yet read are discarded.
    pub fn wait(self) -> Result<RunResult> {
        self.thread.join().map_err(|_| Error::WorkerPanicked)
    }
}

/// The main entry point for the `replace` command.
///
/// This function orchestrates the whole run:
/// 1. It merges an optional config file with the command-line arguments.
/// 2. It starts the rewrite on a worker thread.
/// 3. It shows a live spinner fed by the worker's events.
/// 4. It writes the final report in the requested format.
pub fn run_replace(args: ReplaceArgs) -> Result<()> {
    let config = match &args.config {
        Some(cfg_path) => {
            let resolved = ConfigLoader::find_config(cfg_path, &args.dir)?;
            info!(path = %resolved.display(), "using config file");
            ConfigLoader::load_rewrite_config(&resolved)?
        }
        None => RewriteConfig::default(),
    };

    let format = OutputFormat::from(args.format.as_str());
    let output = args.output.clone();
    let request = args.into_request(config)?;
    let preview = request.preview;

    let handle = spawn(request)?;

    let pb = progress_bar(format)?;
    for event in handle.events() {
        match event {
            RunEvent::Progress(msg) => pb.set_message(msg),
            RunEvent::Match(_) => pb.inc(1),
            RunEvent::Finished(_) => break,
        }
    }
    pb.finish_and_clear();

    let result = handle.wait()?;

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    OutputFormatter::new(format, preview).write_output(&mut writer, &result)?;
    writer.flush()?;

    Ok(())
}

/// Live spinner on stderr for text reports; hidden for JSON and CSV so only
/// the report is printed.
fn progress_bar(format: OutputFormat) -> Result<ProgressBar> {
    if format != OutputFormat::Text {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed_precise}] {pos} matches  {wide_msg}")
            .map_err(|e| format!("Invalid progress template: {e}"))?,
    );
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MatchKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_events_stream_then_single_result() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("one.txt"), "see /srv/old").unwrap();
        fs::write(temp_dir.path().join("two.txt"), "see \\srv\\old").unwrap();

        let handle = spawn(ReplacementRequest::new(temp_dir.path(), "/srv/old", "/srv/new")).unwrap();
        let events: Vec<RunEvent> = handle.events().collect();
        let result = handle.wait().unwrap();

        let finished: Vec<&RunResult> = events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Finished(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(finished, vec![&result]);
        assert!(matches!(events.last(), Some(RunEvent::Finished(_))));

        let content_events = events
            .iter()
            .filter(|e| matches!(e, RunEvent::Match(m) if m.kind == MatchKind::Content))
            .count();
        assert_eq!(content_events, 2);
        assert_eq!(result.files_modified, 2);
    }

    #[test]
    fn test_spinner_only_for_text_output() {
        assert!(progress_bar(OutputFormat::Json).unwrap().is_hidden());
        assert!(progress_bar(OutputFormat::Csv).unwrap().is_hidden());
        let text = progress_bar(OutputFormat::Text).unwrap();
        text.finish_and_clear();
    }

    #[test]
    fn test_validation_error_is_synchronous() {
        let outcome = spawn(ReplacementRequest::new("/no/such/root/for/pathrewrite", "a", "b"));
        assert!(matches!(outcome, Err(Error::Validation(_))));
    }

    #[test]
    fn test_concurrent_runs_are_independent() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("a.txt"), "alpha").unwrap();
        fs::write(second.path().join("b.txt"), "alpha alpha").unwrap();

        let a = spawn(ReplacementRequest::new(first.path(), "alpha", "").with_preview(true)).unwrap();
        let b = spawn(ReplacementRequest::new(second.path(), "alpha", "").with_preview(true)).unwrap();

        let ra = a.wait().unwrap();
        let rb = b.wait().unwrap();
        assert_eq!(ra.total_replacements, 1);
        assert_eq!(rb.total_replacements, 2);
    }
}
