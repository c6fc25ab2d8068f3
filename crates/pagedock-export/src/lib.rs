//! Exporter from the intermediate document model to destination structures.
//!
//! [`to_destination`] is a pure function: it maps an
//! [`IntermediateFormat`](pagedock_model::IntermediateFormat) to destination
//! pages whose widgets carry explicit per-page ordering. Persistence belongs
//! to the hosting application, consumed through the [`PageStore`] and
//! [`AssetStore`] collaborator traits.

mod destination;
mod exporter;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod store;

pub use destination::{DestinationPage, Widget, WidgetKind};
pub use exporter::to_destination;
pub use store::{AssetRef, AssetStore, PageRef, PageStore, StoreError};
