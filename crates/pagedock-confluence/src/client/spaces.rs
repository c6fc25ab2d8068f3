//! Space listing operations.

use tracing::info;

use super::ApiClient;
use super::types::{PageListResponse, PageSummary, Space, SpacesResponse};
use crate::error::ApiError;

/// Page size for space listings.
const SPACE_PAGE_SIZE: usize = 100;

/// Page size for space content listings.
const CONTENT_PAGE_SIZE: usize = 50;

impl ApiClient {
    /// List all spaces visible to the authenticated user.
    ///
    /// Fetches in fixed-size pages while the response signals a next page.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when a request fails or the server returns an
    /// error status.
    pub fn list_spaces(&mut self) -> Result<Vec<Space>, ApiError> {
        self.detect_version();

        let mut spaces = Vec::new();
        let mut start = 0;

        loop {
            let url = format!(
                "{}/space?start={start}&limit={SPACE_PAGE_SIZE}&expand=description.plain,homepage",
                self.api_url()
            );
            let response: SpacesResponse = self.get_json(&url)?;
            spaces.extend(response.results);

            if response.links.next.is_none() {
                break;
            }
            start += SPACE_PAGE_SIZE;
        }

        info!(count = spaces.len(), "listed Confluence spaces");
        Ok(spaces)
    }

    /// List all pages of a space.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when a request fails or the server returns an
    /// error status.
    pub fn space_pages(&mut self, space_key: &str) -> Result<Vec<PageSummary>, ApiError> {
        self.detect_version();

        let mut pages = Vec::new();
        let mut start = 0;

        loop {
            let url = format!(
                "{}/space/{space_key}/content/page?start={start}&limit={CONTENT_PAGE_SIZE}&expand=version,ancestors",
                self.api_url()
            );
            let response: PageListResponse = self.get_json(&url)?;
            pages.extend(response.results);

            if response.links.next.is_none() {
                break;
            }
            start += CONTENT_PAGE_SIZE;
        }

        info!(space_key, count = pages.len(), "listed space pages");
        Ok(pages)
    }
}
