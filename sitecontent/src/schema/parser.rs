use super::builtin;
use super::types::CollectionDefinition;
use super::config::ContentConfig;
use crate::assets::{ImageResolver, RelativeImageResolver};
use crate::error::{ContentError, Result};
use std::path::Path;
use std::sync::Arc;

/// Config file looked up at the site root when none is given.
pub const CONFIG_FILE: &str = "content.yaml";

/// Parse a content.yaml file into a ContentConfig
pub fn parse_config(path: &Path) -> Result<ContentConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse a content config YAML string into a ContentConfig
pub fn parse_config_str(content: &str) -> Result<ContentConfig> {
    let config: ContentConfig = serde_yaml::from_str(content)?;
    Ok(config)
}

/// Resolve the collections for a site.
///
/// An explicit `config` path must exist. Without one, `<root>/content.yaml`
/// is used when present, otherwise the built-in blog and dining collections.
pub fn load_collections(root: &Path, config: Option<&Path>) -> Result<Vec<CollectionDefinition>> {
    let images: Arc<dyn ImageResolver> = Arc::new(RelativeImageResolver);

    let path = match config {
        Some(path) if !path.exists() => {
            return Err(ContentError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Some(path) => Some(path.to_path_buf()),
        None => Some(root.join(CONFIG_FILE)).filter(|p| p.exists()),
    };

    match path {
        Some(path) => {
            log::info!("Reading collections from {}", path.display());
            parse_config(&path)?.build(images)
        }
        None => {
            log::info!("No {CONFIG_FILE} in {}, using built-in collections", root.display());
            builtin::site_collections(images)
        }
    }
}
