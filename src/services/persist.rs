//! Atomic file replacement.
//!
//! Every file searchio writes (the workflow document, the settings store and
//! search records) goes through [`write_atomic`]: the bytes are written to a
//! temporary file next to the target, synced, then renamed over it. A killed
//! process leaves either the old file or the new one, never a mix.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Replace `path` with `contents` in a single rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
