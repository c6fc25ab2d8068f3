//! Import of Confluence spaces over the REST API.

use std::collections::HashSet;

use pagedock_model::{IntermediateFormat, IntermediatePage, MediaDownload};
use tracing::{info, warn};

use super::{CancelToken, ImportOutcome, ImportReport};
use crate::client::{ApiClient, ConnectionStatus, Space};
use crate::error::{ApiError, ImportError};
use crate::macros::ConversionContext;
use crate::storage_format::StorageFormatParser;

/// Importer for live Confluence instances.
///
/// Fetched page bodies go through the same storage-format parser as local
/// exports, so both ingestion paths produce identical block structures.
pub struct ApiImporter {
    client: ApiClient,
    language: String,
    dedupe_media: bool,
}

impl ApiImporter {
    /// Create an importer around an API client.
    #[must_use]
    pub fn new(client: ApiClient, language: impl Into<String>) -> Self {
        Self {
            client,
            language: language.into(),
            dedupe_media: false,
        }
    }

    /// Create an importer from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownAuthScheme`] for an unrecognized auth tag.
    pub fn from_config(
        confluence: &pagedock_config::ConfluenceConfig,
        import: &pagedock_config::ImportConfig,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: ApiClient::from_config(confluence, import)?,
            language: import.language.clone(),
            dedupe_media: import.dedupe_media,
        })
    }

    /// Collapse duplicate media URLs into a single download.
    #[must_use]
    pub fn with_dedupe_media(mut self, dedupe_media: bool) -> Self {
        self.dedupe_media = dedupe_media;
        self
    }

    /// Test connectivity and authentication.
    pub fn test_connection(&mut self) -> ConnectionStatus {
        self.client.test_connection()
    }

    /// List spaces available for import.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the listing request fails.
    pub fn list_spaces(&mut self) -> Result<Vec<Space>, ApiError> {
        self.client.list_spaces()
    }

    /// Import all pages of a space.
    ///
    /// Individual page failures are recorded in the report; the run aborts
    /// only on cancellation or when the page listing itself fails.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Api`] when the space listing fails and
    /// [`ImportError::Cancelled`] when the token fires between pages.
    pub fn import_space(
        &mut self,
        space_key: &str,
        cancel: &CancelToken,
    ) -> Result<ImportOutcome, ImportError> {
        info!(space_key, "importing Confluence space");

        let pages = self.client.space_pages(space_key)?;
        info!(space_key, count = pages.len(), "found pages in space");

        let parser = StorageFormatParser::new();
        let mut format = IntermediateFormat::new(&self.language);
        let mut report = ImportReport::default();
        let mut seen_media = HashSet::new();
        let base_url = self.client.base_url().to_owned();

        for summary in pages {
            if cancel.is_cancelled() {
                return Err(ImportError::Cancelled);
            }

            let remote = match self.client.page_content(&summary.id) {
                Ok(remote) => remote,
                Err(err) => {
                    warn!(page_id = %summary.id, error = %err, "failed to fetch page");
                    report.skip(summary.title.as_str(), format!("fetch failed: {err}"));
                    continue;
                }
            };

            let mut ctx = ConversionContext::new(base_url.clone(), Some(space_key.to_owned()));
            let blocks = match parser.parse(&remote.body, &mut ctx) {
                Ok(blocks) => blocks,
                Err(err) => {
                    warn!(page_id = %remote.id, error = %err, "failed to parse page body");
                    report.skip(remote.title.as_str(), format!("parse failed: {err}"));
                    continue;
                }
            };

            let mut page = IntermediatePage::new(remote.title, &self.language);
            page.parent_slug = remote.parent_slug;
            page.metadata.created = remote.created;
            page.metadata.modified = remote.modified;
            page.metadata.author = remote.author;
            for block in blocks {
                page.add_content_block(block);
            }

            let page_slug = page.slug.clone();
            format.add_page(page);

            for media in ctx.take_media() {
                if self.dedupe_media && !seen_media.insert(media.url.clone()) {
                    continue;
                }
                format.add_media_download(MediaDownload {
                    url: media.url,
                    target_filename: media.filename,
                    page_slug: page_slug.clone(),
                });
            }

            report.pages_imported += 1;
        }

        report.media_pending = format.media_downloads.len();

        info!(
            space_key,
            imported = report.pages_imported,
            skipped = report.pages_skipped.len(),
            media = report.media_pending,
            "finished API import"
        );

        Ok(ImportOutcome { format, report })
    }

    /// Download an attachment's bytes for the asset store.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the lookup or download fails; callers
    /// treat this as a per-asset failure, not a fatal one.
    pub fn download_attachment(
        &mut self,
        page_id: &str,
        filename: &str,
    ) -> Result<Vec<u8>, ApiError> {
        self.client.download_attachment(page_id, filename)
    }
}
