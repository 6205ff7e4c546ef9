//! Site building orchestration.
//!
//! Compiles every template under the source root and copies everything else.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── collect_all_files(source) ──► templates / statics
//!     │
//!     ├── load_page() (parallel)
//!     │       │
//!     │       └── front matter, output path; two files writing the same
//!     │           output abort here, before anything is written
//!     │
//!     └── rayon::join
//!             ├── write_page()  ──► compile + assemble → output/*.php
//!             └── copy_static() ──► output/<same relative path>
//! ```

use crate::{
    compiler::Compiler,
    config::SiteConfig,
    log,
    page::{Page, paths::is_template},
    utils::{
        category::get_deps_mtime,
        fs::{collect_all_files, is_up_to_date, mtime_secs},
    },
};
use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::SystemTime,
};

/// What a build did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub compiled: usize,
    pub copied: usize,
    /// Outputs already newer than their source.
    pub skipped: usize,
}

/// Build the entire site, compiling templates and copying files in parallel.
///
/// If `config.build.clean` is true, clears the output directory first and
/// rewrites every output. Otherwise outputs newer than both their source and
/// the config file are left alone.
pub fn build_site(config: &SiteConfig) -> Result<BuildSummary> {
    let source = &config.build.source;
    let output = &config.build.output;
    let force = config.build.clean;

    if !source.is_dir() {
        bail!("source directory not found: {}", source.display());
    }
    prepare_output(output, force)?;

    let deps_mtime = get_deps_mtime(config);
    let compiler = config.compiler();

    // Output nested inside the source root must not be read back as input
    let (templates, statics): (Vec<_>, Vec<_>) = collect_all_files(source)
        .into_iter()
        .filter(|p| !p.starts_with(output))
        .partition(|p| is_template(p));

    let pages = templates
        .par_iter()
        .map(|path| load_page(path, config).map(|page| (path.as_path(), page)))
        .collect::<Result<Vec<_>>>()?;

    check_collisions(
        pages
            .iter()
            .map(|(_, page)| (page.source.as_path(), page.output.as_path()))
            .chain(statics.iter().map(|p| {
                let rel = p.strip_prefix(source).unwrap_or(p);
                (rel, rel)
            })),
    )?;

    let has_error = AtomicBool::new(false);
    let compiled = AtomicUsize::new(0);
    let copied = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    let tally = |written: bool, counter: &AtomicUsize| {
        let counter = if written { counter } else { &skipped };
        counter.fetch_add(1, Ordering::Relaxed);
    };
    let fail = |path: &Path, e: anyhow::Error| {
        if !has_error.swap(true, Ordering::Relaxed) {
            log!("error"; "{}: {:#}", path.display(), e);
        }
        anyhow!("Build failed")
    };

    let (pages_result, statics_result) = rayon::join(
        || {
            pages.par_iter().try_for_each(|(path, page)| {
                if has_error.load(Ordering::Relaxed) {
                    return Err(anyhow!("Aborted"));
                }
                let written = write_page(page, path, config, &compiler, deps_mtime, force)
                    .map_err(|e| fail(page.source.as_path(), e))?;
                tally(written, &compiled);
                Ok(())
            })
        },
        || {
            statics.par_iter().try_for_each(|path| {
                if has_error.load(Ordering::Relaxed) {
                    return Err(anyhow!("Aborted"));
                }
                let written = copy_static(path, config, force).map_err(|e| fail(path.as_path(), e))?;
                tally(written, &copied);
                Ok(())
            })
        },
    );
    pages_result?;
    statics_result?;

    let summary = BuildSummary {
        compiled: compiled.into_inner(),
        copied: copied.into_inner(),
        skipped: skipped.into_inner(),
    };
    log_build_result(&summary);
    Ok(summary)
}

/// Create the output directory, wiping it first when `clean` is set.
fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

/// Reject builds where two sources map to the same output file.
fn check_collisions<'a>(entries: impl IntoIterator<Item = (&'a Path, &'a Path)>) -> Result<()> {
    let mut seen: FxHashMap<&Path, &Path> = FxHashMap::default();
    for (source, output) in entries {
        if let Some(previous) = seen.insert(output, source) {
            bail!(
                "{} and {} both write {}",
                previous.display(),
                source.display(),
                output.display()
            );
        }
    }
    Ok(())
}

fn log_build_result(summary: &BuildSummary) {
    if summary.compiled + summary.copied + summary.skipped == 0 {
        log!("warn"; "nothing to build, source has no files");
        return;
    }
    log!(
        "build";
        "done: {} compiled, {} copied, {} up to date",
        summary.compiled,
        summary.copied,
        summary.skipped
    );
}

// ============================================================================
// Single Files
// ============================================================================

/// Source path relative to the source root.
fn source_rel<'a>(path: &'a Path, config: &SiteConfig) -> Result<&'a Path> {
    path.strip_prefix(&config.build.source)
        .with_context(|| format!("{} is outside the source root", path.display()))
}

fn load_page(path: &Path, config: &SiteConfig) -> Result<Page> {
    let rel = source_rel(path, config)?;
    Page::load(&config.build.source, rel, &config.build.dirs)
        .with_context(|| format!("Failed to load {}", rel.display()))
}

/// Compile `page` (read from `path`) into the output root.
///
/// Returns `false` when the existing output was already up to date.
fn write_page(
    page: &Page,
    path: &Path,
    config: &SiteConfig,
    compiler: &Compiler,
    deps_mtime: Option<SystemTime>,
    force: bool,
) -> Result<bool> {
    let dest = config.build.output.join(&page.output);
    if !force && is_up_to_date(path, &dest, deps_mtime) {
        return Ok(false);
    }

    let rendered = page.render(compiler, mtime_secs(path));

    if config.verbose {
        log!("compile"; "{} [{}]", page.source.display(), rendered.report.stages.join(", "));
    }
    if rendered.dropped_sections > 0 {
        log!(
            "warn";
            "{}: {} section(s) in a partial have no page to run in",
            page.source.display(),
            rendered.dropped_sections
        );
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&dest, rendered.text).with_context(|| format!("Failed to write {}", dest.display()))?;
    Ok(true)
}

/// Compile one template from the source root (watch mode).
pub fn compile_template(
    path: &Path,
    config: &SiteConfig,
    compiler: &Compiler,
    force: bool,
) -> Result<bool> {
    let page = load_page(path, config)?;
    write_page(&page, path, config, compiler, get_deps_mtime(config), force)
}

/// Copy a non-template file to the same relative path under the output root.
pub fn copy_static(path: &Path, config: &SiteConfig, force: bool) -> Result<bool> {
    let rel = source_rel(path, config)?;
    let dest = config.build.output.join(rel);

    // Static files don't depend on config, just check source vs dest
    if !force && is_up_to_date(path, &dest, None) {
        return Ok(false);
    }

    if config.verbose {
        log!("copy"; "{}", rel.display());
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::copy(path, &dest).with_context(|| format!("Failed to copy {}", rel.display()))?;
    Ok(true)
}

/// Compile one template file and return its PHP without writing anything.
///
/// `logical` is the path the template is compiled as, relative to the
/// source root; it decides page vs partial, the output path and relative
/// include paths. Without it, a file inside the source root uses its real
/// relative path and any other file its bare name.
pub fn compile_one(config: &SiteConfig, file: &Path, logical: Option<&Path>) -> Result<String> {
    let text =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let logical = match logical {
        Some(path) => path.to_path_buf(),
        None => default_logical_path(file, &config.build.source)?,
    };

    let page = Page::parse(&logical, &text, &config.build.dirs)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    let rendered = page.render(&config.compiler(), mtime_secs(file));
    Ok(rendered.text)
}

fn default_logical_path(file: &Path, source: &Path) -> Result<PathBuf> {
    if let Ok(full) = file.canonicalize()
        && let Ok(rel) = full.strip_prefix(source)
    {
        return Ok(rel.to_path_buf());
    }
    file.file_name()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("not a file: {}", file.display()))
}

// ============================================================================
// Tests
// ============================================================================
