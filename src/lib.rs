//! Core library for the Mapdesk admin console.
//! Manages empire records, geo layers, and attached metadata (key/value
//! attributes plus images) against the remote record service, including the
//! merge and reconciliation logic behind the editing screens.

pub mod api;
pub mod editor;
pub mod filter;
mod gui;
pub mod images;
pub mod merge;
pub mod meta;
pub mod session;
pub mod statics;

pub use api::{ApiClient, ApiError, Empire, Layer, MetadataRecord};
pub use editor::{AttributeRow, RowEditor, ValidationError};
pub use gui::run_gui;
pub use images::{ImageSession, PreviewRegistry};
pub use merge::{MergeFallback, merge_rows};
pub use meta::{MetaBlob, MetaValue};
pub use session::{Credentials, Session};
