//! Confluence import pipeline.
//!
//! Converts Confluence content into the normalized
//! [`pagedock_model::IntermediateFormat`] from two ingestion paths:
//!
//! - **HTML-export ZIP archives** ([`importer::ZipImporter`]): safe archive
//!   extraction, page discovery, hierarchy reconstruction from directory
//!   layout and breadcrumbs, and per-file parsing.
//! - **REST API** ([`importer::ApiImporter`] via [`client::ApiClient`]):
//!   version auto-detection, paginated space/page listings and rate-limited
//!   page fetches.
//!
//! Both paths converge on the same [`storage_format::StorageFormatParser`],
//! which routes namespaced macros through the [`macros`] dispatcher and plain
//! markup through the sanitizing [`html`] converter.

pub mod archive;
pub mod client;
pub mod error;
pub mod hierarchy;
pub mod html;
pub mod importer;
pub mod macros;
pub mod storage_format;

pub use archive::{ExtractedArchive, extract};
pub use client::{ApiClient, ConfluenceVersion, ConnectionStatus};
pub use error::{ApiError, ArchiveError, ImportError, ParseError};
pub use importer::{ApiImporter, CancelToken, ImportOutcome, ImportReport, ZipImporter};
pub use storage_format::StorageFormatParser;
