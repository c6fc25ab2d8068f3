//! Page content and attachment operations.

use pagedock_model::slugify;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::info;

use super::ApiClient;
use super::types::{AttachmentsResponse, PageContentResponse};
use crate::error::ApiError;

/// A page fetched from the REST API, ready for storage-format parsing.
#[derive(Debug)]
pub struct RemotePage {
    /// Content id.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Storage-format body markup.
    pub body: String,
    /// Slug of the nearest ancestor, empty for space roots.
    pub parent_slug: String,
    /// Creation timestamp.
    pub created: Option<String>,
    /// Last-modified timestamp.
    pub modified: Option<String>,
    /// Last author display name.
    pub author: Option<String>,
}

impl ApiClient {
    /// Fetch a page with its storage-format body and ancestors expanded.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request fails or the server returns
    /// an error status.
    pub fn page_content(&mut self, page_id: &str) -> Result<RemotePage, ApiError> {
        let url = format!(
            "{}/content/{page_id}?expand=body.storage,version,ancestors,metadata.labels",
            self.api_url()
        );
        let data: PageContentResponse = self.get_json(&url)?;

        // The nearest ancestor is the last entry of the expansion
        let parent_slug = data
            .ancestors
            .last()
            .and_then(|ancestor| ancestor.title.as_deref())
            .map(slugify)
            .unwrap_or_default();

        let body = data.storage_value().to_owned();
        let (modified, author) = data.version.map_or((None, None), |version| {
            let author = version.by.and_then(|by| by.display_name);
            (version.when, author)
        });

        Ok(RemotePage {
            id: data.id,
            title: data.title,
            body,
            parent_slug,
            created: modified.clone(),
            modified,
            author,
        })
    }

    /// Download an attachment's bytes by filename.
    ///
    /// Looks the attachment up among the page's children, then follows its
    /// download link.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AttachmentNotFound`] when the page has no such
    /// attachment, or an [`ApiError`] for request failures.
    pub fn download_attachment(
        &mut self,
        page_id: &str,
        filename: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let encoded = utf8_percent_encode(filename, NON_ALPHANUMERIC);
        let url = format!(
            "{}/content/{page_id}/child/attachment?filename={encoded}",
            self.api_url()
        );
        let listing: AttachmentsResponse = self.get_json(&url)?;

        let Some(download) = listing
            .results
            .first()
            .and_then(|attachment| attachment.links.download.clone())
        else {
            return Err(ApiError::AttachmentNotFound {
                filename: filename.to_owned(),
            });
        };

        let download_url = if download.starts_with("http") {
            download
        } else {
            format!("{}{}{download}", self.base_url(), self.prefix())
        };

        info!(page_id, filename, "downloading attachment");

        let response = self.send_get(&download_url)?;
        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ApiError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(body.read_to_vec()?)
    }
}
