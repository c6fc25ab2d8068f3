//! Import of Confluence HTML-export ZIP archives.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use kuchikikiki::{NodeRef, parse_html};
use pagedock_model::{IntermediateFormat, IntermediatePage, MediaDownload};
use tendril::TendrilSink;
use tracing::{info, warn};

use super::{CancelToken, ImportOutcome, ImportReport};
use crate::archive;
use crate::error::ImportError;
use crate::hierarchy::{self, FALLBACK_ORDER};
use crate::macros::ConversionContext;
use crate::storage_format::StorageFormatParser;

/// Filenames that are navigation artifacts, not pages.
const NAVIGATION_FILES: &[&str] = &["index.html", "overview.html", "toc.html"];

/// Content-area selectors, in order of specificity.
const CONTENT_SELECTORS: &[&str] = &[
    "#main-content",
    ".wiki-content",
    ".page-content",
    "#content",
    "main",
    "article",
];

/// Subtrees removed from the content area before parsing.
const UNWANTED_SELECTORS: &[&str] = &[
    "#pagetreesearch",
    ".breadcrumbs",
    ".pageSection",
    "form.aui",
    "nav",
    ".page-metadata",
];

/// Importer for Confluence HTML-export ZIP archives.
pub struct ZipImporter {
    language: String,
    dedupe_media: bool,
}

impl ZipImporter {
    /// Create an importer tagging pages with the given language.
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            dedupe_media: false,
        }
    }

    /// Create an importer from configuration.
    #[must_use]
    pub fn from_config(import: &pagedock_config::ImportConfig) -> Self {
        Self {
            language: import.language.clone(),
            dedupe_media: import.dedupe_media,
        }
    }

    /// Collapse duplicate media URLs into a single download.
    #[must_use]
    pub fn with_dedupe_media(mut self, dedupe_media: bool) -> Self {
        self.dedupe_media = dedupe_media;
        self
    }

    /// Import a ZIP export.
    ///
    /// Extracts to a scratch directory (removed on every exit path),
    /// reconstructs the page hierarchy, parses every page file in manifest
    /// order and links parent references. Page-level problems are recorded
    /// in the report and do not abort the run.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Archive`] for corrupt or unsafe archives and
    /// [`ImportError::Cancelled`] when the token fires between pages.
    pub fn import(
        &self,
        zip_path: &Path,
        cancel: &CancelToken,
    ) -> Result<ImportOutcome, ImportError> {
        let archive = archive::extract(zip_path)?;

        let mut files = find_page_files(archive.root());
        info!(count = files.len(), "discovered page files in export");

        let hierarchy = hierarchy::build(&files, archive.root());

        // Manifest order, then path: deterministic regardless of how the
        // filesystem iterates
        files.sort_by_key(|file| {
            let order = hierarchy
                .get(file)
                .map_or(FALLBACK_ORDER, |entry| entry.order);
            (order, file.clone())
        });

        let parser = StorageFormatParser::new();
        let mut format = IntermediateFormat::new(&self.language);
        let mut report = ImportReport::default();
        let mut seen_media = HashSet::new();

        for file in &files {
            if cancel.is_cancelled() {
                return Err(ImportError::Cancelled);
            }

            let html = match fs::read_to_string(archive.root().join(file)) {
                Ok(html) => html,
                Err(err) => {
                    warn!(file = %file, error = %err, "failed to read page file");
                    report.skip(file.as_str(), format!("unreadable file: {err}"));
                    continue;
                }
            };

            let title = extract_title(&html, file);

            let Some(body) = extract_content(&html) else {
                warn!(file = %file, "no body content found");
                report.skip(file.as_str(), "no body content");
                continue;
            };

            let mut ctx = ConversionContext::default();
            let blocks = match parser.parse(&body, &mut ctx) {
                Ok(blocks) => blocks,
                Err(err) => {
                    warn!(file = %file, error = %err, "failed to parse page content");
                    report.skip(file.as_str(), format!("parse failed: {err}"));
                    continue;
                }
            };

            let mut page = IntermediatePage::new(title, &self.language);
            page.source_file = Some(file.clone());
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

        hierarchy::link_parents(&mut format, &hierarchy);
        report.media_pending = format.media_downloads.len();

        info!(
            imported = report.pages_imported,
            skipped = report.pages_skipped.len(),
            media = report.media_pending,
            "finished ZIP import"
        );

        Ok(ImportOutcome { format, report })
    }
}

/// Find all page files in the extracted archive, recursively.
///
/// Returns extract-relative paths with `/` separators. Navigation artifacts
/// (`index.html` and friends) are not pages.
fn find_page_files(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    walk(root, root, &mut files);
    files.sort();
    files
}

fn walk(root: &Path, dir: &Path, files: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.is_dir() {
            walk(root, &path, files);
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_lowercase();
        if !name.ends_with(".html") || NAVIGATION_FILES.contains(&name.as_str()) {
            continue;
        }

        if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}

/// Extract the page title.
///
/// Prefers the `<title>` element (minus the export's ` - Confluence`
/// suffix), then the first `<h1>`, then a humanized filename.
fn extract_title(html: &str, file: &str) -> String {
    let document = parse_html().one(html);

    if let Ok(title) = document.select_first("title") {
        let text = title.as_node().text_contents();
        let text = text.trim().trim_end_matches(" - Confluence").trim();
        if !text.is_empty() {
            return text.to_owned();
        }
    }

    if let Ok(heading) = document.select_first("h1") {
        let text = heading.as_node().text_contents();
        let text = text.trim();
        if !text.is_empty() {
            return text.to_owned();
        }
    }

    humanize_filename(file)
}

/// Turn a filename into a presentable fallback title.
fn humanize_filename(file: &str) -> String {
    let stem = file
        .rsplit('/')
        .next()
        .unwrap_or(file)
        .trim_end_matches(".html")
        .replace(['-', '_'], " ");

    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => stem,
    }
}

/// Extract the content area of an exported page.
///
/// Tries the known Confluence content containers in order of specificity,
/// pruning navigation subtrees, and falls back to the whole `<body>`.
/// Returns `None` when nothing with text content is found.
fn extract_content(html: &str) -> Option<String> {
    let document = parse_html().one(html);

    for selector in CONTENT_SELECTORS {
        if let Ok(content) = document.select_first(selector) {
            let node = content.as_node();
            remove_unwanted(node);
            if !node.text_contents().trim().is_empty() {
                return Some(node_inner_html(node));
            }
        }
    }

    if let Ok(body) = document.select_first("body") {
        let node = body.as_node();
        remove_unwanted(node);
        if !node.text_contents().trim().is_empty() {
            return Some(node_inner_html(node));
        }
    }

    None
}

/// Detach navigation, search and metadata subtrees.
fn remove_unwanted(node: &NodeRef) {
    for selector in UNWANTED_SELECTORS {
        let Ok(matches) = node.select(selector) else {
            continue;
        };
        let unwanted: Vec<NodeRef> = matches.map(|m| m.as_node().clone()).collect();
        for subtree in unwanted {
            subtree.detach();
        }
    }
}

/// Inner HTML of a DOM node.
fn node_inner_html(node: &NodeRef) -> String {
    let mut out = Vec::new();
    for child in node.children() {
        let _ = child.serialize(&mut out);
    }
    String::from_utf8_lossy(&out).into_owned()
}
