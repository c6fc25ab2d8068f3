//! Response types for the Confluence REST API.

use serde::Deserialize;

/// Pagination links block shared by listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct Links {
    /// Relative URL of the next result page, absent on the last page.
    pub next: Option<String>,
    /// Download link on attachment results.
    pub download: Option<String>,
}

/// `GET /rest/api/settings/systemInfo` response (Server/Data Center).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    /// Set on Data Center instances.
    #[serde(default)]
    pub is_data_center: bool,
}

/// Current-user response from `user/current` or `myself`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CurrentUser {
    /// Best-effort display identity.
    #[must_use]
    pub fn identity(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.username.clone())
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "Unknown".to_owned())
    }
}

/// One space in a `GET /rest/api/space` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Space {
    pub key: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub space_type: Option<String>,
    #[serde(default)]
    pub description: Option<SpaceDescription>,
}

impl Space {
    /// Plain-text space description, empty when absent.
    #[must_use]
    pub fn description_text(&self) -> &str {
        self.description
            .as_ref()
            .and_then(|description| description.plain.as_ref())
            .map_or("", |plain| plain.value.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceDescription {
    #[serde(default)]
    pub plain: Option<SpaceDescriptionBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceDescriptionBody {
    #[serde(default)]
    pub value: String,
}

/// `GET /rest/api/space` response page.
#[derive(Debug, Deserialize)]
pub struct SpacesResponse {
    #[serde(default)]
    pub results: Vec<Space>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// One page in a space content listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSummary {
    pub id: String,
    pub title: String,
}

/// `GET /rest/api/space/{key}/content/page` response page.
#[derive(Debug, Deserialize)]
pub struct PageListResponse {
    #[serde(default)]
    pub results: Vec<PageSummary>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// `GET /rest/api/content/{id}` response with storage-format expansion.
#[derive(Debug, Deserialize)]
pub struct PageContentResponse {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<PageBody>,
    #[serde(default)]
    pub version: Option<PageVersion>,
    #[serde(default)]
    pub ancestors: Vec<PageAncestor>,
}

impl PageContentResponse {
    /// Storage-format markup of the page body, empty when absent.
    #[must_use]
    pub fn storage_value(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|body| body.storage.as_ref())
            .map_or("", |storage| storage.value.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct PageBody {
    #[serde(default)]
    pub storage: Option<PageBodyStorage>,
}

#[derive(Debug, Deserialize)]
pub struct PageBodyStorage {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct PageVersion {
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub by: Option<VersionAuthor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionAuthor {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageAncestor {
    #[serde(default)]
    pub title: Option<String>,
}

/// One attachment in a child-attachment listing.
#[derive(Debug, Deserialize)]
pub struct AttachmentResult {
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// `GET /rest/api/content/{id}/child/attachment` response.
#[derive(Debug, Deserialize)]
pub struct AttachmentsResponse {
    #[serde(default)]
    pub results: Vec<AttachmentResult>,
}
