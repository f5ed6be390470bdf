//! Directory walk applying one normalization pass to every workflow file.
use super::document::WorkflowDocument;
use super::pass::{Change, NormalizationPass};
use crate::report;
use crate::util::display_path;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub total: usize,
    pub fixed: usize,
    pub failed: usize,
}

/// Every `.json` file under `root`, ordered by the full path string.
pub fn collect_json_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }
    for entry in fs::read_dir(root).with_context(|| format!("read {}", root.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(collect_json_files(&path)?);
        } else if path.is_file() && is_json(&path) {
            files.push(path);
        }
    }
    files.sort_by_cached_key(|path| path.to_string_lossy().into_owned());
    Ok(files)
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("json")
}

/// Run `pass` over one file, rewriting it in place when anything changed.
pub fn normalize_file(path: &Path, pass: NormalizationPass) -> Result<Vec<Change>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    if !pass.may_apply(&raw) {
        return Ok(Vec::new());
    }
    let mut doc = WorkflowDocument::parse(&raw)?;
    let changes = pass.apply(&mut doc);
    if !changes.is_empty() {
        write_in_place(path, &doc.to_pretty_json()?)?;
        tracing::info!(path = %path.display(), changes = changes.len(), "workflow rewritten");
    }
    Ok(changes)
}

/// Replace `path` through a sibling temp file so a failed write never
/// truncates the original.
fn write_in_place(path: &Path, text: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(text.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

/// Walk `root` and report per file. `None` means the directory is missing.
pub fn walk(root: &Path, pass: NormalizationPass) -> Result<Option<WalkSummary>> {
    if !root.is_dir() {
        report::workflow_dir_missing(root);
        return Ok(None);
    }
    let files = collect_json_files(root)?;
    report::walk_started(files.len());

    let mut summary = WalkSummary {
        total: files.len(),
        ..WalkSummary::default()
    };
    for file in &files {
        report::walk_file(&display_path(file, Some(root)));
        match normalize_file(file, pass) {
            Ok(changes) if changes.is_empty() => report::walk_unchanged(pass.unchanged_label()),
            Ok(changes) => {
                for change in &changes {
                    tracing::debug!(node = %change.node_id, %change, "input rewritten");
                    report::walk_change(change);
                }
                report::walk_fixed();
                summary.fixed += 1;
            }
            Err(err) => {
                tracing::warn!(path = %file.display(), error = %err, "workflow skipped");
                report::walk_error(file, &err);
                summary.failed += 1;
            }
        }
    }
    print!("{}", report::render_walk_summary(&summary));
    Ok(Some(summary))
}
