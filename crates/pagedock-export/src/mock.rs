//! In-memory store implementations for testing.

use std::collections::HashMap;

use pagedock_model::MediaDownload;

use crate::destination::DestinationPage;
use crate::store::{AssetRef, AssetStore, PageRef, PageStore, StoreError};

/// In-memory page store.
///
/// Stores pages keyed by slug and rejects duplicate slugs, mirroring how a
/// real store enforces unique page paths.
#[derive(Debug, Default)]
pub struct MockPageStore {
    pages: HashMap<String, DestinationPage>,
}

impl MockPageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Look up a stored page by slug.
    #[must_use]
    pub fn page(&self, slug: &str) -> Option<&DestinationPage> {
        self.pages.get(slug)
    }
}

impl PageStore for MockPageStore {
    fn store(&mut self, page: &DestinationPage) -> Result<PageRef, StoreError> {
        if self.pages.contains_key(&page.slug) {
            return Err(StoreError::Rejected {
                subject: page.slug.clone(),
                reason: "slug already exists".to_owned(),
            });
        }

        self.pages.insert(page.slug.clone(), page.clone());
        Ok(PageRef {
            id: page.unique_id.clone(),
        })
    }
}

/// In-memory asset store.
#[derive(Debug, Default)]
pub struct MockAssetStore {
    assets: HashMap<String, Vec<u8>>,
}

impl MockAssetStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored for a filename.
    #[must_use]
    pub fn asset(&self, filename: &str) -> Option<&[u8]> {
        self.assets.get(filename).map(Vec::as_slice)
    }
}

impl AssetStore for MockAssetStore {
    fn store(&mut self, media: &MediaDownload, bytes: &[u8]) -> Result<AssetRef, StoreError> {
        self.assets
            .insert(media.target_filename.clone(), bytes.to_vec());
        Ok(AssetRef {
            id: format!("asset-{}", self.assets.len()),
            filename: media.target_filename.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pagedock_model::{IntermediateFormat, IntermediatePage};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::to_destination;

    #[test]
    fn test_store_and_lookup_roundtrip() {
        let mut format = IntermediateFormat::new("en");
        format.add_page(IntermediatePage::new("Guide", "en"));
        let pages = to_destination(&format);

        let mut store = MockPageStore::new();
        let page_ref = store.store(&pages[0]).unwrap();
        assert_eq!(page_ref.id, pages[0].unique_id);
        assert_eq!(store.page("guide").unwrap().title, "Guide");
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let mut format = IntermediateFormat::new("en");
        format.add_page(IntermediatePage::new("Same", "en"));
        format.add_page(IntermediatePage::new("Same", "en"));
        let pages = to_destination(&format);

        let mut store = MockPageStore::new();
        store.store(&pages[0]).unwrap();
        assert!(matches!(
            store.store(&pages[1]),
            Err(StoreError::Rejected { .. })
        ));
    }

    #[test]
    fn test_asset_store_keeps_bytes() {
        let media = MediaDownload {
            url: "logo.png".to_owned(),
            target_filename: "logo.png".to_owned(),
            page_slug: "home".to_owned(),
        };

        let mut store = MockAssetStore::new();
        let asset_ref = store.store(&media, b"\x89PNG").unwrap();
        assert_eq!(asset_ref.filename, "logo.png");
        assert_eq!(store.asset("logo.png").unwrap(), b"\x89PNG");
    }
}
