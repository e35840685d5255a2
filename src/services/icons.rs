//! Icon symlinks.
//!
//! Each generated node shows `<uid>.png` from the workflow directory. These
//! are symlinks into the shared icon tree and are rebuilt on every run. Real
//! files are never removed or replaced.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::record::SearchRecord;
use crate::error::SearchioResult;

/// Extension of node icons.
pub const ICON_EXTENSION: &str = "png";

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconReport {
    /// Symlinks removed.
    pub removed: Vec<PathBuf>,
    /// Symlinks created.
    pub linked: Vec<PathBuf>,
    /// Names left alone because a real file occupies them.
    pub skipped: Vec<PathBuf>,
}

/// Path of the node icon for `uid` inside `dir`.
pub fn icon_link_path(dir: &Path, uid: &str) -> PathBuf {
    dir.join(format!("{}.{}", uid, ICON_EXTENSION))
}

/// Remove every icon symlink in `dir`, then link `<uid>.png` to each
/// record's icon.
pub fn reconcile(dir: &Path, records: &[SearchRecord]) -> SearchioResult<IconReport> {
    let mut report = IconReport::default();

    if !cfg!(unix) {
        warn!("Symlinks are not supported on this platform, leaving icons alone");
        return Ok(report);
    }

    if !dir.is_dir() {
        debug!(dir = %dir.display(), "Icon directory does not exist");
        return Ok(report);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.extension().is_some_and(|ext| ext == ICON_EXTENSION) {
            continue;
        }

        let is_link = fs::symlink_metadata(&path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        if is_link {
            fs::remove_file(&path)?;
            report.removed.push(path);
        }
    }
    report.removed.sort();

    for record in records {
        if record.icon.is_empty() {
            continue;
        }

        let link = icon_link_path(dir, &record.uid);
        if fs::symlink_metadata(&link).is_ok() {
            debug!(path = %link.display(), "Icon name taken by a real file");
            report.skipped.push(link);
            continue;
        }

        if let Err(e) = symlink(Path::new(&record.icon), &link) {
            warn!(uid = %record.uid, icon = %record.icon, error = %e, "Failed to link icon");
            continue;
        }
        report.linked.push(link);
    }

    debug!(
        removed = report.removed.len(),
        linked = report.linked.len(),
        "Reconciled icon symlinks"
    );
    Ok(report)
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}
