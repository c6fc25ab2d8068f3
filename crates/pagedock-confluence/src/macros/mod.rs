//! Macro dispatch for Confluence `ac:structured-macro` elements.
//!
//! Handlers form a priority-ordered registry; the first handler whose
//! [`MacroHandler::supports`] accepts the macro name converts it. The
//! dispatcher always ends in [`DefaultMacroHandler`], held as a concrete
//! field rather than a registry entry, so every macro converts to something
//! visible - unsupported macros degrade to placeholders, never to silence.

mod attachment;
mod code;
mod context;
mod default;
mod expand;
mod panel;

pub use attachment::{AttachmentMacroHandler, resolve_image};
pub use code::CodeMacroHandler;
pub use context::{ConversionContext, PendingMedia, macro_body, parameter, parameter_text};
pub use default::DefaultMacroHandler;
pub use expand::ExpandMacroHandler;
pub use panel::PanelMacroHandler;

use pagedock_model::ContentBlock;
use tracing::warn;

use crate::storage_format::TreeNode;

/// Converter for one family of Confluence macros.
pub trait MacroHandler: Send + Sync {
    /// Whether this handler converts the given macro name.
    fn supports(&self, macro_name: &str) -> bool;

    /// Convert the `ac:structured-macro` element to content blocks.
    ///
    /// An empty vector is a valid result (e.g. a panel with an empty body);
    /// it means "nothing to render", not failure.
    fn convert(&self, macro_node: &TreeNode, ctx: &mut ConversionContext) -> Vec<ContentBlock>;
}

/// Priority-ordered macro handler registry.
pub struct MacroDispatcher {
    handlers: Vec<Box<dyn MacroHandler>>,
    fallback: DefaultMacroHandler,
}

impl MacroDispatcher {
    /// Create a dispatcher with the built-in handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: vec![
                Box::new(PanelMacroHandler),
                Box::new(CodeMacroHandler),
                Box::new(AttachmentMacroHandler),
                Box::new(ExpandMacroHandler),
            ],
            fallback: DefaultMacroHandler,
        }
    }

    /// Register an additional handler after the built-in ones.
    ///
    /// The fallback handler still runs last regardless of registrations.
    #[must_use]
    pub fn with_handler(mut self, handler: impl MacroHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Convert a macro element via the first supporting handler.
    pub fn convert(
        &self,
        macro_node: &TreeNode,
        ctx: &mut ConversionContext,
    ) -> Vec<ContentBlock> {
        let Some(name) = macro_name(macro_node) else {
            warn!("macro without name attribute");
            return Vec::new();
        };

        for handler in &self.handlers {
            if handler.supports(name) {
                return handler.convert(macro_node, ctx);
            }
        }

        self.fallback.convert(macro_node, ctx)
    }
}

impl Default for MacroDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of a `ac:structured-macro` element.
#[must_use]
pub fn macro_name(macro_node: &TreeNode) -> Option<&str> {
    macro_node.attr("ac:name").filter(|name| !name.is_empty())
}
