pub mod builtin;
pub mod config;
pub mod parser;
pub mod types;

pub use config::{CollectionConfig, ContentConfig, FieldConfig, FieldType};
pub use parser::{load_collections, parse_config, parse_config_str, CONFIG_FILE};
pub use types::{CollectionDefinition, CollectionSchema, Coercion, FieldKind, SchemaField};
