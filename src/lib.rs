// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_optional, Settings};
use crate::exec::MavenInvoker;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::{register_tree, DryRunBackend, PumpExit, WatchOptions, WatchSet};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the Maven build invoker
/// - the watch session (initial registration + background pump)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let file = load_optional(args.config.as_deref())?;
    let settings = Settings::resolve(&args, file);
    debug!(?settings, "resolved settings");

    if args.dry_run {
        print_dry_run(&settings)?;
        return Ok(());
    }

    let options = WatchOptions {
        root: settings.directory.clone(),
        coalesce: settings.coalesce,
        max_depth: settings.max_depth,
    };
    let invoker = MavenInvoker::new(settings.build.clone());
    let session = watch::start(options, invoker)?;

    // Ctrl-C -> stop the pump (and any build in progress).
    {
        let token = session.cancel_token();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            token.cancel();
        });
    }

    match session.wait().await? {
        PumpExit::NothingLeftToWatch => {
            info!("every watched directory was removed; exiting")
        }
        PumpExit::Cancelled => info!("stopped"),
        PumpExit::SourceClosed => info!("change notification source closed; exiting"),
    }
    Ok(())
}

/// Dry-run output: resolved settings and the directories that would be
/// registered.
fn print_dry_run(settings: &Settings) -> Result<()> {
    let fs = RealFileSystem;
    let root = fs.canonicalize(&settings.directory)?;

    let mut set = WatchSet::new();
    let mut backend = DryRunBackend;
    register_tree(&fs, &mut backend, &mut set, &root, settings.max_depth);

    println!("pomwatch dry-run");
    println!("  root = {}", root.display());
    println!("  coalesce = {:?}", settings.coalesce);
    println!("  max_depth = {}", settings.max_depth);
    println!("  build.program = {}", settings.build.program);
    println!();

    println!("directories ({}):", set.len());
    for dir in set.dirs() {
        println!("  - {}", display_relative(&root, &dir));
    }

    debug!("dry-run complete (no watching)");
    Ok(())
}

fn display_relative(root: &Path, dir: &Path) -> String {
    match dir.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => dir.display().to_string(),
    }
}
