//! Import orchestration.
//!
//! [`ZipImporter`] drives the HTML-export path and [`ApiImporter`] the REST
//! path. Both produce an [`ImportOutcome`]: the converted
//! [`IntermediateFormat`](pagedock_model::IntermediateFormat) plus an
//! [`ImportReport`] with per-page skip reasons. Page-level failures are
//! recovered locally; only archive corruption, cancellation and fatal API
//! errors abort a run.

mod api;
mod zip;

pub use api::ApiImporter;
pub use self::zip::ZipImporter;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pagedock_model::IntermediateFormat;
use serde::Serialize;

/// Cooperative cancellation flag, checked between pages.
///
/// Clones share the flag, so a token handed to another thread can stop a
/// long-running import.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// A page skipped during import, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPage {
    /// Source file path or page title.
    pub source: String,
    /// Human-readable skip reason.
    pub reason: String,
}

/// Aggregate result of one import run.
///
/// The import reports partial success instead of failing on the first
/// page-level problem.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Number of pages converted.
    pub pages_imported: usize,
    /// Pages skipped, with reasons.
    pub pages_skipped: Vec<SkippedPage>,
    /// Media downloads registered and awaiting the asset store.
    pub media_pending: usize,
}

impl ImportReport {
    /// Record a skipped page.
    pub fn skip(&mut self, source: impl Into<String>, reason: impl Into<String>) {
        self.pages_skipped.push(SkippedPage {
            source: source.into(),
            reason: reason.into(),
        });
    }

    /// Whether every discovered page was imported.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pages_skipped.is_empty()
    }
}

/// Converted content plus the run report.
#[derive(Debug)]
pub struct ImportOutcome {
    /// The normalized document model.
    pub format: IntermediateFormat,
    /// Aggregate run statistics.
    pub report: ImportReport,
}
