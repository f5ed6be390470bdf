//! Plan execution for model downloads.
//!
//! A [`Fetcher`] knows how to pull one entry from its host; [`run_plan`] owns
//! everything around it: overwrite policy, placing the file under its final
//! name, verification and fail-fast sequencing.
use crate::plan::{FetchEntry, FetchPlan};
use crate::report;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub mod http;
pub mod hub;
pub mod remediation;

pub use http::HttpFetcher;
pub use hub::HubFetcher;

/// Smallest plausible size for a file fetched over plain HTTP.
///
/// Anything smaller is almost always an error page or a login redirect.
pub const MIN_DOWNLOAD_BYTES: u64 = 1_000_000;

/// Coarse failure classes used to pick remediation hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Setup,
    Transfer,
    Unauthorized,
    Verification,
    Cancelled,
    Io,
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    Setup(String),
    #[error("transfer of {remote} failed: {message}")]
    Transfer { remote: String, message: String },
    #[error("access to {remote} was denied: {message}")]
    Unauthorized { remote: String, message: String },
    #[error("download failed or file is too small: {} ({size} bytes)", path.display())]
    Verification { path: PathBuf, size: u64 },
    #[error("download of {remote} cancelled by user")]
    Cancelled { remote: String },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Setup(_) => FailureKind::Setup,
            FetchError::Transfer { .. } => FailureKind::Transfer,
            FetchError::Unauthorized { .. } => FailureKind::Unauthorized,
            FetchError::Verification { .. } => FailureKind::Verification,
            FetchError::Cancelled { .. } => FailureKind::Cancelled,
            FetchError::Io { .. } => FailureKind::Io,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        FetchError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Retrieval mechanism for one host.
pub trait Fetcher {
    /// Whether replacing an existing target needs user confirmation first.
    ///
    /// Fetchers that do not confirm treat a non-empty target as already
    /// fetched and skip it.
    fn confirms_overwrite(&self) -> bool {
        false
    }

    /// Pull `entry` and return the path the mechanism wrote it to.
    fn retrieve(&self, entry: &FetchEntry) -> Result<PathBuf, FetchError>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Every entry is in place; paths are in plan order.
    Completed(Vec<PathBuf>),
    /// The user declined to overwrite an existing file.
    Declined,
}

/// Create every destination directory of the plan.
pub fn prepare_destinations(plan: &FetchPlan) -> Result<(), FetchError> {
    for dir in plan.destination_dirs() {
        fs::create_dir_all(&dir)
            .map_err(|err| FetchError::io(format!("create {}", dir.display()), err))?;
    }
    Ok(())
}

/// Execute the plan entry by entry, stopping at the first failure.
pub fn run_plan(
    plan: &FetchPlan,
    fetcher: &dyn Fetcher,
    confirm: &mut dyn FnMut(&Path) -> io::Result<bool>,
) -> Result<PlanOutcome, FetchError> {
    let mut placed = Vec::with_capacity(plan.entries.len());
    for entry in &plan.entries {
        let target = entry.target_path();
        if target.exists() {
            if fetcher.confirms_overwrite() {
                let accepted = confirm(&target)
                    .map_err(|err| FetchError::io("read overwrite confirmation", err))?;
                if !accepted {
                    return Ok(PlanOutcome::Declined);
                }
                fs::remove_file(&target)
                    .map_err(|err| FetchError::io(format!("remove {}", target.display()), err))?;
            } else if file_size(&target) > 0 {
                report::fetch_skipped(&target);
                placed.push(target);
                continue;
            }
        }

        report::fetch_started(entry);
        let written = fetcher.retrieve(entry)?;
        place_file(&written, &target)?;
        ensure_present(&target)?;
        tracing::info!(remote = %entry.remote, target = %target.display(), "fetch complete");
        report::fetch_saved(&target);
        placed.push(target);
    }
    Ok(PlanOutcome::Completed(placed))
}

/// Move whatever the mechanism wrote to `target`, replacing an existing file.
///
/// `written` may be a symlink into a cache; the link target is moved and the
/// link removed so no dangling entry is left behind.
pub fn place_file(written: &Path, target: &Path) -> Result<(), FetchError> {
    if written == target {
        return Ok(());
    }
    let source = fs::canonicalize(written)
        .map_err(|err| FetchError::io(format!("resolve {}", written.display()), err))?;
    if fs::canonicalize(target).ok().as_deref() == Some(source.as_path()) {
        return Ok(());
    }
    if target.exists() {
        fs::remove_file(target)
            .map_err(|err| FetchError::io(format!("remove {}", target.display()), err))?;
    }
    if fs::rename(&source, target).is_err() {
        copy_into_place(&source, target)?;
        fs::remove_file(&source)
            .map_err(|err| FetchError::io(format!("remove {}", source.display()), err))?;
    }
    let is_link = fs::symlink_metadata(written)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    if is_link {
        if let Err(err) = fs::remove_file(written) {
            tracing::warn!(path = %written.display(), %err, "failed to remove cache link");
        }
    }
    tracing::debug!(from = %written.display(), to = %target.display(), "placed file");
    Ok(())
}

/// Copy `source` next to `target` under a scratch name, then rename it over
/// `target`. An interrupted copy never leaves a partial file at `target`.
fn copy_into_place(source: &Path, target: &Path) -> Result<(), FetchError> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut scratch = tempfile::NamedTempFile::new_in(dir)
        .map_err(|err| FetchError::io(format!("create temp file in {}", dir.display()), err))?;
    let mut reader = fs::File::open(source)
        .map_err(|err| FetchError::io(format!("open {}", source.display()), err))?;
    io::copy(&mut reader, scratch.as_file_mut())
        .map_err(|err| FetchError::io(format!("copy to {}", target.display()), err))?;
    scratch
        .persist(target)
        .map_err(|err| FetchError::io(format!("replace {}", target.display()), err.error))?;
    Ok(())
}

/// Fail unless `path` exists and is non-empty.
pub fn ensure_present(path: &Path) -> Result<u64, FetchError> {
    let size = file_size(path);
    if size == 0 {
        return Err(FetchError::Verification {
            path: path.to_path_buf(),
            size,
        });
    }
    Ok(size)
}

/// Fail unless `path` holds at least [`MIN_DOWNLOAD_BYTES`]; a short file is
/// deleted.
pub fn verify_download(path: &Path) -> Result<u64, FetchError> {
    let size = file_size(path);
    if size < MIN_DOWNLOAD_BYTES {
        if path.exists() {
            fs::remove_file(path)
                .map_err(|err| FetchError::io(format!("remove {}", path.display()), err))?;
        }
        return Err(FetchError::Verification {
            path: path.to_path_buf(),
            size,
        });
    }
    Ok(size)
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}
