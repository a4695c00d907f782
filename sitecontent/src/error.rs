use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error in {source_id}: {message}")]
    Parse { source_id: String, message: String },

    #[error("Collection '{collection}' failed validation:\n{}", format_errors(.errors))]
    InvalidCollection {
        collection: String,
        errors: Vec<ValidationError>,
    },

    #[error("{} collections failed to load:\n{}", .0.len(), format_failures(.0))]
    InvalidContent(Vec<ContentError>),

    #[error("Duplicate entry id '{id}' in collection '{collection}': {first} and {second}")]
    DuplicateId {
        collection: String,
        id: String,
        first: String,
        second: String,
    },

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Entry not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, ContentError>;

/// One `  - source: field 'x': reason` line per error.
fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_failures(failures: &[ContentError]) -> String {
    failures
        .iter()
        .map(ContentError::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
