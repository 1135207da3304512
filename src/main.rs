//! The main entry point for the `prw` command-line application.
//!
//! This file is responsible for parsing command-line arguments, setting up
//! logging and dispatching to the appropriate command in the `pathrewrite` library.
//!
//! Logging: set `RUST_LOG=pathrewrite=debug` (or `info`, `warn`) to see engine logs on stderr.

use pathrewrite::cli::{self, Commands};
use pathrewrite::{backups, worker};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Check if no arguments provided (just 'prw')
    let args_vec: Vec<String> = env::args().collect();
    if args_vec.len() == 1 {
        println!("Rewrite paths in names and file contents, in every separator style\n");
        println!("QUICK START EXAMPLES:");
        println!("  prw replace -d . -s old_project --preview          # Preview matches");
        println!("  prw replace -d . -s 'C:\\old' -r 'D:/new'           # Rewrite contents");
        println!("  prw replace -d . -s old -r new -x '.py .txt'       # Only .py and .txt files");
        println!("  prw undo -d .                                      # Restore from backups\n");
        println!("Run 'prw --help' for full command list");
        println!("Run 'prw <command> --help' for detailed command help");
        process::exit(0);
    }

    // Check for specific commands with missing args and show examples
    if args_vec.len() == 2 {
        match args_vec[1].as_str() {
            "replace" => {
                eprintln!("Error: Missing required arguments: --dir <DIR> --search <SEARCH>\n");
                eprintln!("USAGE EXAMPLES:");
                eprintln!("  prw replace -d . -s old_project --preview");
                eprintln!("  prw replace -d . -s 'C:\\old\\bin' -r 'D:\\new\\bin' -x '.bat .ps1'");
                eprintln!("  prw replace -d . -c rewrite.yaml --backup");
                eprintln!("\nFor more options: prw replace --help");
                process::exit(1);
            }
            "undo" => {
                eprintln!("Error: Missing required argument: --dir <DIR>\n");
                eprintln!("USAGE EXAMPLES:");
                eprintln!("  prw undo -d .                    # Restore all files");
                eprintln!("  prw undo -d src/ --keep-backups  # Restore but keep .bak files");
                eprintln!("\nFor more options: prw undo --help");
                process::exit(1);
            }
            "clean-backups" => {
                eprintln!("Error: Missing required argument: --dir <DIR>\n");
                eprintln!("USAGE EXAMPLES:");
                eprintln!("  prw clean-backups -d .            # Remove all backup files");
                eprintln!("  prw clean-backups -d . --dry-run  # Preview what would be deleted");
                eprintln!("\nFor more options: prw clean-backups --help");
                process::exit(1);
            }
            _ => {}
        }
    }

    let args = cli::parse_args();

    // RUST_LOG overrides the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match args.command {
        Commands::Replace(replace) => worker::run_replace(replace)?,
        Commands::Undo { dir, keep_backups } => backups::run_undo(dir, keep_backups)?,
        Commands::CleanBackups { dir, dry_run } => backups::run_clean_backups(dir, dry_run)?,
    }
    Ok(())
}
