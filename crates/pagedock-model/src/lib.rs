//! Intermediate document model for content imports.
//!
//! This crate defines the normalized, source-agnostic representation that
//! decouples format parsers (Confluence storage format, HTML exports, REST
//! imports) from destination exporters:
//!
//! - [`IntermediateFormat`]: root container for one import run
//! - [`IntermediatePage`]: a single page with ordered content blocks
//! - [`ContentBlock`]: closed set of renderable block variants
//! - [`Attachment`] / [`MediaDownload`]: referenced and deferred media
//!
//! The model is built incrementally during parsing (append-only) and is
//! read-only once handed to an exporter.

mod block;
mod format;
mod media;
mod slug;

pub use block::{ContentBlock, PanelType};
pub use format::{IntermediateFormat, IntermediatePage, PageMetadata};
pub use media::{Attachment, MediaDownload};
pub use slug::slugify;
