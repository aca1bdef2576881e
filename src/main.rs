use album_art_tidy::config::RunConfig;
use album_art_tidy::{output, walk};
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "album-art-tidy")]
#[command(about = "Normalize album folders to a single cover.jpg")]
#[command(long_about = "\
Normalize album folders to a single cover.jpg

Walks a music library and, in every folder, folds the cover candidates into
one cover.jpg and removes embedded pictures from MP3 and FLAC files.

Per folder, in order:

  cover.png    converted to cover.jpg if there is none or it is strictly
               larger (width, then height), then deleted
  folder.jpg   renamed to cover.jpg if there is none, moved over it if
               strictly larger, deleted otherwise
  embedded     with no cover.jpg, the first music file with a picture donates
               it as cover.jpg; then every embedded picture is removed

Names are matched case-insensitively. Symlinks are never followed.

Run with --dry-run first: it lists every change without making any. A dry run
does not carry earlier steps forward, so its plan for a folder can differ
slightly from what a live run does.")]
#[command(version = version_string())]
struct Cli {
    /// Root of the music library
    path: PathBuf,

    /// Print the changes that would be made without making them
    #[arg(long)]
    dry_run: bool,

    /// Log a failing folder and continue; exit non-zero at the end
    #[arg(long)]
    keep_going: bool,

    /// Show per-folder decisions on stderr (-vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Print only the summary
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = RunConfig {
        dry_run: cli.dry_run,
        keep_going: cli.keep_going,
        ..RunConfig::new(cli.path)
    };
    config.validate()?;

    if config.dry_run {
        println!("==> Dry run: {}", config.root.display());
    } else {
        println!("==> Tidying {}", config.root.display());
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let root = config.root.clone();
    let quiet = cli.quiet;
    let printer = std::thread::spawn(move || {
        for event in rx {
            if !quiet {
                output::print_walk_event(&event, &root);
            }
        }
    });
    let result = walk::walk(&config, Some(tx));
    printer
        .join()
        .map_err(|_| "output thread panicked")?;
    let summary = result?;

    output::print_summary(&summary);

    if !summary.failures.is_empty() {
        return Err(format!("{} folder(s) failed", summary.failures.len()).into());
    }
    Ok(())
}
