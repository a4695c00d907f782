use super::types::{CollectionDefinition, CollectionSchema, FieldKind, SchemaField};
use crate::assets::ImageResolver;
use crate::error::{ContentError, Result};
use crate::loader::GlobLoader;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Top-level content config parsed from content.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Collection name → declaration, in declaration order.
    #[serde(default)]
    pub collections: serde_yaml::Mapping,
}

/// Declaration of a single collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub loader: GlobLoader,
    /// Field name → definition, in declaration order.
    #[serde(default)]
    pub fields: serde_yaml::Mapping,
    #[serde(default = "default_true")]
    pub additional_properties: bool,
}

/// Definition of a single field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Defaults to true, or false when a default is declared.
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(rename = "enum", default)]
    pub enum_values: Option<Vec<String>>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Boolean,
    Date,
    Url,
    Image,
}

fn default_true() -> bool {
    true
}

impl ContentConfig {
    /// Turn the declarations into collection definitions, handing `images`
    /// to every schema.
    pub fn build(&self, images: Arc<dyn ImageResolver>) -> Result<Vec<CollectionDefinition>> {
        self.collections
            .iter()
            .map(|(key, value)| -> Result<CollectionDefinition> {
                let name = key.as_str().ok_or_else(|| {
                    ContentError::Config(format!("Collection names must be strings, got {key:?}"))
                })?;
                let collection: CollectionConfig = serde_yaml::from_value(value.clone())
                    .map_err(|e| ContentError::Config(format!("Collection '{name}': {e}")))?;
                let schema = collection
                    .schema(images.clone())
                    .map_err(|e| ContentError::Config(format!("Collection '{name}': {e}")))?;
                Ok(CollectionDefinition::new(name, collection.loader, schema))
            })
            .collect()
    }
}

impl CollectionConfig {
    pub fn schema(&self, images: Arc<dyn ImageResolver>) -> Result<CollectionSchema> {
        let mut fields = Vec::with_capacity(self.fields.len());

        for (key, value) in &self.fields {
            let name = key.as_str().ok_or_else(|| {
                ContentError::Schema(format!("Field names must be strings, got {key:?}"))
            })?;
            let config: FieldConfig = serde_yaml::from_value(value.clone()).map_err(|e| {
                ContentError::Schema(format!("Field '{name}': {e}"))
            })?;
            fields.push(config.to_field(name)?);
        }

        let schema = CollectionSchema::new(fields)?.with_images(images);
        Ok(if self.additional_properties {
            schema
        } else {
            schema.deny_unknown_fields()
        })
    }
}

impl FieldConfig {
    pub fn to_field(&self, name: &str) -> Result<SchemaField> {
        let kind = match (self.field_type, &self.enum_values) {
            (FieldType::String, Some(values)) => FieldKind::Enum(values.clone()),
            (_, Some(_)) => {
                return Err(ContentError::Schema(format!(
                    "Field '{name}': enum values are only allowed on string fields"
                )));
            }
            (FieldType::String, None) => FieldKind::String,
            (FieldType::Boolean, None) => FieldKind::Boolean,
            (FieldType::Date, None) => FieldKind::Date,
            (FieldType::Url, None) => FieldKind::Url,
            (FieldType::Image, None) => FieldKind::Image,
        };

        let mut field = SchemaField::new(name, kind);
        match (&self.default, self.required) {
            (Some(_), Some(true)) => {
                return Err(ContentError::Schema(format!(
                    "Field '{name}' is required and cannot declare a default"
                )));
            }
            (Some(default), _) => field = field.default_value(default.clone()),
            (None, Some(false)) => field = field.optional(),
            (None, _) => {}
        }
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::RelativeImageResolver;
    use crate::schema::parse_config_str;
    use pretty_assertions::assert_eq;

    fn images() -> Arc<dyn ImageResolver> {
        Arc::new(RelativeImageResolver)
    }

    const SITE: &str = r#"
collections:
  dining:
    loader: { base: src/content/dining, pattern: "*.json" }
    additional_properties: false
    fields:
      name: { type: string }
      website: { type: url }
      phone: { type: string, required: false }
      petFriendly: { type: boolean, default: false }
      priceRange: { type: string, enum: ["$", "$$", "$$$", "$$$$"], required: false }
  blog:
    loader: { base: src/content/blog, pattern: "**/*.{md,mdx}" }
    fields:
      title: { type: string }
      pubDate: { type: date }
      updatedDate: { type: date, required: false }
      heroImage: { type: image, required: false }
"#;

    #[test]
    fn test_build_from_yaml() {
        let config = parse_config_str(SITE).unwrap();
        let collections = config.build(images()).unwrap();
        assert_eq!(collections.len(), 2);

        let names: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["dining", "blog"]);

        let blog = &collections[1];
        assert_eq!(blog.loader, GlobLoader::new("src/content/blog", "**/*.{md,mdx}"));
        assert!(blog.schema.additional_properties());

        let dining = &collections[0];
        assert!(!dining.schema.additional_properties());
        let names: Vec<&str> = dining.schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["name", "website", "phone", "petFriendly", "priceRange"]);

        let pet = dining.schema.field("petFriendly").unwrap();
        assert!(!pet.is_required());
        assert_eq!(pet.default(), Some(&serde_json::json!(false)));

        let price = dining.schema.field("priceRange").unwrap();
        assert_eq!(
            price.kind(),
            &FieldKind::Enum(vec!["$".into(), "$$".into(), "$$$".into(), "$$$$".into()])
        );
        assert!(!price.is_required());
        assert!(dining.schema.field("name").unwrap().is_required());
    }

    #[test]
    fn test_required_with_default_rejected() {
        let config = parse_config_str(
            r#"
collections:
  c:
    loader: { base: c, pattern: "*.md" }
    fields:
      draft: { type: boolean, required: true, default: false }
"#,
        )
        .unwrap();
        let err = config.build(images()).unwrap_err();
        assert!(err.to_string().contains("Collection 'c'"));
        assert!(err.to_string().contains("draft"));
    }

    #[test]
    fn test_collection_without_loader_rejected() {
        let config = parse_config_str(
            r#"
collections:
  c:
    fields:
      title: { type: string }
"#,
        )
        .unwrap();
        let err = config.build(images()).unwrap_err();
        assert!(matches!(err, ContentError::Config(ref m) if m.contains("Collection 'c'")));
    }

    #[test]
    fn test_enum_on_non_string_rejected() {
        let field = FieldConfig {
            field_type: FieldType::Boolean,
            required: None,
            enum_values: Some(vec!["yes".into()]),
            default: None,
        };
        assert!(field.to_field("flag").is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let config = parse_config_str(
            r#"
collections:
  c:
    loader: { base: c, pattern: "*.md" }
    fields:
      count: { type: number }
"#,
        )
        .unwrap();
        let err = config.build(images()).unwrap_err();
        assert!(err.to_string().contains("count"));
    }
}
