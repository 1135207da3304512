use crate::config::RewriteConfig;
use crate::errors::{Error, Result};
use crate::request::{parse_extensions, ReplacementRequest};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Rewrite path-like strings across a directory tree.
///
/// `prw` finds a path in file names, directory paths and file contents, no
/// matter whether it was written with `/`, `//`, `\` or `\\` separators, and
/// replaces each occurrence with the new path in the same separator style.
#[derive(Parser, Debug)]
#[command(
    name = "prw",
    author,
    version,
    about = "Rewrite paths in names and file contents, in every separator style",
    long_about = "prw (pathrewrite) - Find and replace path-like strings across a directory tree.

A search such as C:\\old_project is matched as all of:
  C:/old_project   C://old_project   C:\\old_project   C:\\\\old_project
and each hit is replaced with the new path written the same way.

QUICK EXAMPLES:
  prw replace -d . -s old_project --preview             # Report matches only
  prw replace -d . -s 'C:\\old' -r 'D:/new' -x '.py .ini'  # Rewrite .py and .ini files
  prw replace -d . -s old -r new --rename --backup      # Also rename, keep .bak copies
  prw undo -d .                                         # Restore from backups

For detailed help on any command, use: prw <command> --help"
)]
pub struct Args {
    /// Increase log output on stderr (-v debug). `RUST_LOG` overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// The set of available commands for the `prw` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find a path in names and contents and replace it in every separator style
    ///
    /// EXAMPLES:
    ///   prw replace -d . -s old_project --preview
    ///   prw replace -d . -s 'C:\old\bin' -r 'D:\new\bin' -x '.bat .ps1'
    ///   prw replace -d . -c rewrite.yaml -f json -o report.json
    ///
    /// Config file format (rewrite.yaml):
    ///   search: 'C:\old_project'
    ///   replace: 'D:/new_project'
    ///   extensions: ['.py', '.json']
    ///   exclude: ['.git', 'node_modules']
    Replace(ReplaceArgs),

    /// Restore files from backups (undo replacements)
    ///
    /// EXAMPLES:
    ///   prw undo -d .                    # Restore all files in current dir
    ///   prw undo -d src/ --keep-backups  # Restore but keep .bak files
    Undo {
        /// The directory where the `replace` operation was run.
        #[arg(short, long, required = true)]
        dir: PathBuf,

        /// Keep the backup files after restoring the original files.
        #[arg(long)]
        keep_backups: bool,
    },

    /// Remove backup files without restoring
    ///
    /// EXAMPLES:
    ///   prw clean-backups -d . --dry-run  # Preview what would be deleted
    ///   prw clean-backups -d .            # Delete all .bak files
    CleanBackups {
        /// The directory to clean of backup files.
        #[arg(short, long, required = true)]
        dir: PathBuf,

        /// Preview which backup files would be removed without deleting them.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Arguments of the `replace` command.
#[derive(clap::Args, Debug)]
pub struct ReplaceArgs {
    /// The directory to process.
    #[arg(short, long, required = true)]
    pub dir: PathBuf,

    /// The path to search for. Any separator style may be used.
    #[arg(short, long)]
    pub search: Option<String>,

    /// The replacement path. Required unless `--preview` is given.
    #[arg(short, long)]
    pub replace: Option<String>,

    /// Space-separated file name suffixes whose contents are scanned, e.g. '.py .txt'.
    #[arg(short = 'x', long = "ext")]
    pub extensions: Vec<String>,

    /// Do not report matches in directory paths and file names.
    #[arg(long)]
    pub no_names: bool,

    /// Report matches without modifying any file.
    #[arg(long)]
    pub preview: bool,

    /// Also rename matched files and directories.
    #[arg(long)]
    pub rename: bool,

    /// Copy each file to `<file>.bak` before rewriting it.
    #[arg(long)]
    pub backup: bool,

    /// Skip files ignored by `.gitignore` and hidden files.
    #[arg(long)]
    pub gitignore: bool,

    /// A comma-separated list of directory names to exclude.
    #[arg(short = 'e', long = "exclude", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// The number of parallel worker threads used for file contents.
    #[arg(short = 'w', long = "workers", env = "PATHREWRITE_WORKERS")]
    pub workers: Option<usize>,

    /// Path to a YAML file with rewrite settings.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The output format for the report (`text`, `json`, `csv`).
    #[arg(short = 'f', long = "format", default_value = "text")]
    pub format: String,

    /// Path to the report file. If omitted, the report is written to standard output.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ReplaceArgs {
    /// Merges the command line with an optional config file into a request.
    ///
    /// Values given on the command line win; switches only ever turn an
    /// option on, except `--no-names` which turns name matching off.
    pub fn into_request(self, config: RewriteConfig) -> Result<ReplacementRequest> {
        let search = self.search.or(config.search).ok_or_else(|| {
            Error::Validation("specify --search or a config file with `search`".into())
        })?;
        let replace = self.replace.or(config.replace).unwrap_or_default();

        let extensions = if self.extensions.is_empty() {
            parse_extensions(&config.extensions.unwrap_or_default())
        } else {
            parse_extensions(&self.extensions)
        };
        let exclude = if self.exclude.is_empty() {
            config.exclude.unwrap_or_default()
        } else {
            self.exclude
        };

        let mut request = ReplacementRequest::new(self.dir, search, replace)
            .with_extensions(extensions)
            .with_preview(self.preview)
            .with_names(!self.no_names && config.search_in_names.unwrap_or(true));
        request.exclude = exclude;
        request.respect_ignore = self.gitignore || config.respect_ignore.unwrap_or(false);
        request.rename_paths = self.rename || config.rename_paths.unwrap_or(false);
        request.backup = self.backup || config.backup.unwrap_or(false);
        request.workers = self.workers;
        Ok(request)
    }
}

/// Parses command-line arguments and returns the populated `Args` struct.
impl Args {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "pathrewrite=info",
            _ => "pathrewrite=debug",
        }
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
