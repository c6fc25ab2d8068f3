//! Page hierarchy reconstruction for HTML exports.
//!
//! Confluence HTML exports carry hierarchy in three places, combined here in
//! increasing order of authority:
//!
//! 1. Directory structure (subdirectories hold child pages)
//! 2. Breadcrumb navigation inside each page (overrides directory inference)
//! 3. A root `index.html` manifest whose link order defines page ordering

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use kuchikikiki::parse_html;
use pagedock_model::IntermediateFormat;
use tendril::TendrilSink;
use tracing::{debug, warn};

/// Ordinal assigned to pages absent from the manifest, so they sort after
/// all manifest-listed pages.
pub const FALLBACK_ORDER: usize = 9999;

/// Hierarchy facts for one page file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEntry {
    /// Extract-relative path of the parent page file, when resolved.
    pub parent: Option<String>,
    /// 0-based manifest ordinal, or [`FALLBACK_ORDER`].
    pub order: usize,
    /// Depth in the directory structure.
    pub level: usize,
}

/// Build the hierarchy map for a set of discovered page files.
///
/// `files` holds extract-relative paths with `/` separators; `root` is the
/// extraction root used to read page markup for breadcrumbs and the
/// ordering manifest.
#[must_use]
pub fn build(files: &[String], root: &Path) -> BTreeMap<String, HierarchyEntry> {
    let page_order = extract_page_order(root);
    let known_files: HashSet<&str> = files.iter().map(String::as_str).collect();

    let mut hierarchy = BTreeMap::new();

    for file in files {
        let parts: Vec<&str> = file.split('/').collect();
        let level = parts.len() - 1;

        let mut parent = directory_parent(&parts, &known_files);

        // Explicit breadcrumb trail beats structural inference
        if let Ok(html) = fs::read_to_string(root.join(file)) {
            if let Some(breadcrumb_parent) = breadcrumb_parent(&html, file) {
                parent = Some(breadcrumb_parent);
            }
        }

        hierarchy.insert(
            file.clone(),
            HierarchyEntry {
                parent,
                order: page_order.get(file.as_str()).copied().unwrap_or(FALLBACK_ORDER),
                level,
            },
        );
    }

    hierarchy
}

/// Infer a parent from the directory layout.
///
/// A page at `A/B/page.html` defaults to `A/B/index.html` when that file is
/// part of the page set, else to the sibling `A/B.html` named after its
/// directory.
fn directory_parent(parts: &[&str], known_files: &HashSet<&str>) -> Option<String> {
    let (_, dirs) = parts.split_last()?;
    if dirs.is_empty() {
        return None;
    }

    let parent_index = format!("{}/index.html", dirs.join("/"));
    if known_files.contains(parent_index.as_str()) {
        return Some(parent_index);
    }

    let dir_name = dirs.last()?;
    let named_parent = if dirs.len() > 1 {
        format!("{}/{dir_name}.html", dirs[..dirs.len() - 1].join("/"))
    } else {
        format!("{dir_name}.html")
    };
    known_files
        .contains(named_parent.as_str())
        .then_some(named_parent)
}

/// Extract the authoritative parent from a page's breadcrumb trail.
///
/// Looks for an `ol` whose class or id mentions `breadcrumb`; the
/// second-to-last link is the parent (the last is the page itself). Hrefs
/// without a directory component are qualified with the page's top-level
/// directory.
fn breadcrumb_parent(html: &str, current_path: &str) -> Option<String> {
    let document = parse_html().one(html);

    let breadcrumb = document.select("ol").ok()?.find(|ol| {
        let attributes = ol.attributes.borrow();
        attributes.get("class").unwrap_or_default().contains("breadcrumb")
            || attributes.get("id").unwrap_or_default().contains("breadcrumb")
    })?;

    let links: Vec<String> = breadcrumb
        .as_node()
        .select("a")
        .ok()?
        .filter_map(|anchor| anchor.attributes.borrow().get("href").map(ToOwned::to_owned))
        .collect();
    if links.len() < 2 {
        return None;
    }

    let href = normalize_href(&links[links.len() - 2]);
    if href.is_empty() {
        return None;
    }

    let directory = current_path.rsplit_once('/').map(|(dir, _)| dir);
    match directory {
        Some(dir) if !href.contains('/') => {
            let top_level = dir.split('/').next().unwrap_or(dir);
            Some(format!("{top_level}/{href}"))
        }
        _ => Some(href),
    }
}

/// Extract 0-based page ordinals from the root `index.html` manifest.
fn extract_page_order(root: &Path) -> HashMap<String, usize> {
    let mut order = HashMap::new();

    let Ok(html) = fs::read_to_string(root.join("index.html")) else {
        return order;
    };

    let document = parse_html().one(html.as_str());
    let Ok(anchors) = document.select("a") else {
        return order;
    };

    let mut position = 0;
    for anchor in anchors {
        let Some(href) = anchor.attributes.borrow().get("href").map(normalize_href) else {
            continue;
        };
        if href.is_empty() {
            continue;
        }
        order.entry(href).or_insert(position);
        position += 1;
    }

    debug!(entries = order.len(), "extracted page order from index manifest");
    order
}

/// Normalize an href to an extract-relative file path.
///
/// Strips a leading `./`, leading slashes, and any fragment or query suffix.
fn normalize_href(href: &str) -> String {
    let href = href.strip_prefix("./").unwrap_or(href);
    let href = href.trim_start_matches('/');
    let href = href.split(['#', '?']).next().unwrap_or(href);
    href.to_owned()
}

/// Resolve hierarchy facts onto parsed pages.
///
/// Sets `parent_unique_id`/`parent_slug` by matching `source_file` paths,
/// records manifest ordinals in page metadata, then walks every ancestor
/// chain and drops the parent link of any page whose chain loops back to it.
pub fn link_parents(
    format: &mut IntermediateFormat,
    hierarchy: &BTreeMap<String, HierarchyEntry>,
) {
    let by_path: HashMap<String, (String, String)> = format
        .pages
        .iter()
        .filter_map(|page| {
            page.source_file
                .as_ref()
                .map(|file| (file.clone(), (page.unique_id.clone(), page.slug.clone())))
        })
        .collect();

    for page in &mut format.pages {
        let Some(source) = page.source_file.as_deref() else {
            continue;
        };
        let Some(entry) = hierarchy.get(source) else {
            continue;
        };

        page.metadata.source_order = Some(entry.order);

        if let Some(parent_path) = &entry.parent {
            if let Some((parent_id, parent_slug)) = by_path.get(parent_path) {
                if *parent_id != page.unique_id {
                    page.parent_unique_id = Some(parent_id.clone());
                    page.parent_slug.clone_from(parent_slug);
                }
            }
        }
    }

    break_cycles(format);
}

/// Drop parent links whose ancestor chain revisits the starting page.
fn break_cycles(format: &mut IntermediateFormat) {
    let parents: HashMap<String, Option<String>> = format
        .pages
        .iter()
        .map(|page| (page.unique_id.clone(), page.parent_unique_id.clone()))
        .collect();
    let max_steps = format.pages.len();

    let mut dropped = Vec::new();
    for (index, page) in format.pages.iter().enumerate() {
        let mut current = page.parent_unique_id.clone();
        let mut steps = 0;
        while let Some(ancestor) = current {
            if ancestor == page.unique_id || steps >= max_steps {
                warn!(
                    slug = %page.slug,
                    "cycle detected in page hierarchy, treating page as root"
                );
                dropped.push(index);
                break;
            }
            steps += 1;
            current = parents.get(&ancestor).cloned().flatten();
        }
    }

    for index in dropped {
        format.pages[index].parent_unique_id = None;
        format.pages[index].parent_slug.clear();
    }
}
