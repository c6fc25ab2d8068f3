//! Safe extraction of Confluence HTML-export ZIP archives.
//!
//! Extraction happens into a scratch directory under the system temp root
//! with a cryptographically random name and owner-only permissions. Every
//! entry path is validated against the canonicalized scratch root before
//! anything is written; a single entry that would escape the root aborts the
//! whole extraction (fail closed, CWE-22).

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use rand::RngExt;
use tempfile::TempDir;
use tracing::{debug, error};
use zip::ZipArchive;

use crate::error::ArchiveError;

/// An extracted archive rooted in an exclusively-owned scratch directory.
///
/// The scratch directory is deleted recursively when this value is dropped,
/// on every exit path including parse failures and unwinding.
#[derive(Debug)]
pub struct ExtractedArchive {
    dir: TempDir,
    root: PathBuf,
}

impl ExtractedArchive {
    /// Canonical path of the extraction root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Delete the scratch directory now instead of waiting for drop.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory could not be removed.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

/// Extract a ZIP archive into a fresh scratch directory.
///
/// Platform export artifacts (`__MACOSX` subtrees and `._*` resource forks)
/// are skipped. Directory entries are created before file entries are
/// written, and the canonicalized parent directory of every file entry must
/// resolve inside the scratch root.
///
/// # Errors
///
/// Returns [`ArchiveError::Corrupt`] if the ZIP cannot be read,
/// [`ArchiveError::UnsafePath`] if any entry would escape the scratch root
/// and [`ArchiveError::Io`] on filesystem failures. Any error aborts the
/// whole extraction and removes the scratch directory.
pub fn extract(zip_path: &Path) -> Result<ExtractedArchive, ArchiveError> {
    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;

    // Unpredictable scratch name; tempfile creates it with mode 0700 on Unix.
    let token: u128 = rand::rng().random();
    let dir = tempfile::Builder::new()
        .prefix(&format!("confluence-import-{token:032x}-"))
        .tempdir()?;
    let root = dir.path().canonicalize()?;

    let mut extracted = 0_usize;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let raw_name = entry.name().to_owned();

        if is_export_artifact(&raw_name) {
            continue;
        }

        let Some(relative) = entry.enclosed_name() else {
            return Err(reject_unsafe_entry(&raw_name, &root));
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = root.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        let parent = target.parent().unwrap_or(&root);
        fs::create_dir_all(parent)?;

        // enclosed_name() catches textual traversal; canonicalizing the
        // parent also catches escapes through symlinked intermediates.
        let real_parent = parent.canonicalize()?;
        if !real_parent.starts_with(&root) {
            return Err(reject_unsafe_entry(&raw_name, &root));
        }

        let mut output = File::create(&target)?;
        io::copy(&mut entry, &mut output)?;
        extracted += 1;
    }

    debug!(count = extracted, root = %root.display(), "extracted archive");

    Ok(ExtractedArchive { dir, root })
}

/// Log a path-escape attempt as a security event and build the error.
fn reject_unsafe_entry(entry: &str, root: &Path) -> ArchiveError {
    error!(
        entry,
        root = %root.display(),
        "Zip Slip attempt detected in archive entry"
    );
    ArchiveError::UnsafePath {
        entry: entry.to_owned(),
    }
}

/// Check whether an entry is a platform export artifact to skip.
fn is_export_artifact(name: &str) -> bool {
    let path = Path::new(name);
    if path
        .components()
        .any(|component| matches!(component, Component::Normal(part) if part == "__MACOSX"))
    {
        return true;
    }
    path.file_name()
        .and_then(|basename| basename.to_str())
        .is_some_and(|basename| basename.starts_with("._"))
}
