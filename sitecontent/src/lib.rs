pub mod assets;
pub mod document;
pub mod entry_id;
pub mod error;
pub mod loader;
pub mod record;
pub mod schema;
pub mod store;
pub mod validation;
pub mod watcher;

pub use assets::{ImageRef, ImageResolver, RelativeImageResolver};
pub use error::{ContentError, Result};
pub use loader::GlobLoader;
pub use record::{RawRecord, TypedValue, ValidatedRecord};
pub use schema::{CollectionDefinition, CollectionSchema, FieldKind, SchemaField};
pub use store::{CheckReport, ContentStore};
pub use validation::{validate, ValidationError, ValidationReason};
pub use watcher::ContentWatcher;
