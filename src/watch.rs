//! File system watcher for incremental rebuilds.
//!
//! Monitors the source directory and the config file and recompiles what
//! changed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Event Loop                              │
//! │                                                              │
//! │  ┌──────────┐    ┌──────────┐    ┌────────────────────────┐  │
//! │  │ notify   │───▶│ Debouncer│───▶│    handle_changes()    │  │
//! │  │ events   │    │ (300ms)  │    │                        │  │
//! │  └──────────┘    └──────────┘    │  ┌──────────────────┐  │  │
//! │                                  │  │ Full Rebuild     │  │  │
//! │                                  │  │ (config)         │  │  │
//! │                                  │  └──────────────────┘  │  │
//! │                                  │  ┌──────────────────┐  │  │
//! │                                  │  │ Incremental      │  │  │
//! │                                  │  │ (template/static)│  │  │
//! │                                  │  └──────────────────┘  │  │
//! │                                  └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Templates never need their dependents recompiled: includes, layouts and
//! components are resolved by PHP at request time.

use crate::{
    build::{build_site, compile_template, copy_static},
    cli::Cli,
    compiler::Compiler,
    config::SiteConfig,
    log,
    logger::WatchStatus,
    utils::category::{FileCategory, categorize_path},
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{RecvTimeoutError, channel},
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

const DEBOUNCE_MS: u64 = 300;
const REBUILD_COOLDOWN_MS: u64 = 800;

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Format path relative to the project root for display.
///
/// `/proj/source/blog/post.blade` → `source/blog/post.blade`
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing and rebuild cooldown.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_rebuild: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            last_rebuild: None,
        }
    }

    /// Events right after a full rebuild are its own writes echoing back.
    fn in_cooldown(&self) -> bool {
        self.last_rebuild
            .is_some_and(|t| t.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS))
    }

    fn add(&mut self, event: Event) {
        for path in event.paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    /// Pending paths in a stable order.
    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn mark_rebuild(&mut self) {
        self.last_rebuild = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Watch state that survives config reloads.
struct Session<'a, W: Watcher> {
    cli: &'a Cli,
    config: SiteConfig,
    compiler: Compiler,
    watcher: W,
    status: WatchStatus,
}

impl<'a, W: Watcher> Session<'a, W> {
    fn new(cli: &'a Cli, config: SiteConfig, watcher: W) -> Self {
        Self {
            cli,
            compiler: config.compiler(),
            config,
            watcher,
            status: WatchStatus::new(),
        }
    }

    fn watch_paths(&mut self) -> Result<()> {
        let source = &self.config.build.source;
        self.watcher
            .watch(source, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch source: {}", source.display()))?;

        let config_path = &self.config.config_path;
        if config_path.exists() {
            self.watcher
                .watch(config_path, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch config: {}", config_path.display()))?;
        }

        let root = self.config.get_root();
        log!("watch"; "watching {}", rel_path(source, root));
        Ok(())
    }

    fn unwatch_paths(&mut self) {
        // Paths that vanished are already unwatched
        self.watcher.unwatch(&self.config.build.source).ok();
        self.watcher.unwatch(&self.config.config_path).ok();
    }

    /// Process file changes. Returns true if a full rebuild ran (for cooldown).
    fn handle_changes(&mut self, paths: &[PathBuf]) -> bool {
        let mut config_changed = false;
        let mut targets = Vec::new();

        for path in paths {
            match categorize_path(path, &self.config) {
                FileCategory::Config => config_changed = true,
                cat @ (FileCategory::Template | FileCategory::Static) => targets.push((path, cat)),
                FileCategory::Unknown => {}
            }
        }

        if config_changed {
            self.reload();
            return true;
        }
        if !targets.is_empty() {
            self.rebuild(&targets);
        }
        false
    }

    /// Re-read the config and rebuild everything with it.
    fn reload(&mut self) {
        let config = match SiteConfig::from_cli(self.cli) {
            Ok(config) => config,
            Err(e) => {
                self.status.error("config reload failed", &format!("{e:#}"));
                return;
            }
        };

        self.unwatch_paths();
        self.compiler = config.compiler();
        self.config = config;
        if let Err(e) = self.watch_paths() {
            self.status.error("watch failed", &format!("{e:#}"));
            return;
        }

        self.status.detach();
        log!("watch"; "config changed, rebuilding...");
        match build_site(&self.config) {
            Ok(summary) => self.status.success(&format!(
                "rebuilt {} templates, copied {} files",
                summary.compiled, summary.copied
            )),
            Err(e) => self.status.error("full build failed", &format!("{e:#}")),
        }
    }

    /// Recompile changed templates and recopy changed files.
    fn rebuild(&mut self, targets: &[(&PathBuf, FileCategory)]) {
        let root = self.config.get_root();
        let mut done = Vec::new();

        for &(path, category) in targets {
            // Deleted files leave their last output in place
            if !path.is_file() {
                continue;
            }

            let result = match category {
                FileCategory::Template => compile_template(path, &self.config, &self.compiler, true),
                _ => copy_static(path, &self.config, true),
            };

            if let Err(e) = result {
                let summary = format!("{} failed: {}", category.name(), rel_path(path, root));
                self.status.error(&summary, &format!("{e:#}"));
                return;
            }
            done.push(rel_path(path, root));
        }

        if !done.is_empty() {
            self.status.success(&format!("rebuilt: {}", done.join(", ")));
        }
    }
}

const fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
}

// =============================================================================
// Public API
// =============================================================================

/// Start blocking file watcher with debouncing and incremental rebuild.
///
/// `cli` is kept to reload the config with the same overrides when the
/// config file changes.
pub fn watch_for_changes_blocking(config: SiteConfig, cli: &Cli) -> Result<()> {
    let (tx, rx) = channel();
    let watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;

    let mut session = Session::new(cli, config, watcher);
    session.watch_paths()?;

    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) && !debouncer.in_cooldown() => {
                debouncer.add(event);
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                if session.handle_changes(&debouncer.take()) {
                    debouncer.mark_rebuild();
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
            // Other cases: irrelevant events, timeout without ready, etc.
            _ => {}
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("/x/index.blade~")));
        assert!(is_temp_file(Path::new("/x/.index.blade.swp")));
        assert!(is_temp_file(Path::new("/x/index.bak")));
        assert!(!is_temp_file(Path::new("/x/index.blade")));
        assert!(!is_temp_file(Path::new("/x/site.css")));
    }

    #[test]
    fn test_rel_path() {
        assert_eq!(rel_path(Path::new("/p/source/a.blade"), Path::new("/p")), "source/a.blade");
        assert_eq!(rel_path(Path::new("/elsewhere/a"), Path::new("/p")), "/elsewhere/a");
    }

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(&Event::new(EventKind::Create(CreateKind::File))));
        assert!(is_relevant(&Event::new(EventKind::Modify(ModifyKind::Any))));
        assert!(!is_relevant(&Event::new(EventKind::Remove(RemoveKind::File))));
    }

    #[test]
    fn test_debouncer_batches_and_filters() {
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.ready());
        assert_eq!(debouncer.timeout(), Duration::from_secs(60));

        let event = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/s/b.blade"))
            .add_path(PathBuf::from("/s/a.blade"))
            .add_path(PathBuf::from("/s/a.blade~"));
        debouncer.add(event);
        assert_eq!(debouncer.timeout(), Duration::from_millis(DEBOUNCE_MS));
        assert!(!debouncer.ready(), "events are still settling");

        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS));
        assert!(debouncer.ready());
        assert_eq!(
            debouncer.take(),
            vec![PathBuf::from("/s/a.blade"), PathBuf::from("/s/b.blade")]
        );
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_debouncer_cooldown() {
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.in_cooldown());
        debouncer.mark_rebuild();
        assert!(debouncer.in_cooldown());
    }
}
