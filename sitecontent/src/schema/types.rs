use crate::assets::{ImageResolver, RelativeImageResolver};
use crate::error::{ContentError, Result};
use crate::loader::GlobLoader;
use crate::validation;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// A named collection: where its files live and the schema they must satisfy.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionDefinition {
    pub name: String,
    pub loader: GlobLoader,
    pub schema: CollectionSchema,
}

impl CollectionDefinition {
    pub fn new(name: impl Into<String>, loader: GlobLoader, schema: CollectionSchema) -> Self {
        CollectionDefinition {
            name: name.into(),
            loader,
            schema,
        }
    }
}

/// The kind of value a field holds once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Boolean,
    Enum(Vec<String>),
    Date,
    Url,
    Image,
}

/// How a raw value is turned into a typed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Identity,
    StringToDate,
    StringToUrl,
    ImageReference,
}

impl FieldKind {
    pub fn coercion(&self) -> Coercion {
        match self {
            FieldKind::String | FieldKind::Boolean | FieldKind::Enum(_) => Coercion::Identity,
            FieldKind::Date => Coercion::StringToDate,
            FieldKind::Url => Coercion::StringToUrl,
            FieldKind::Image => Coercion::ImageReference,
        }
    }

    /// Short name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::Enum(_) => "enum",
            FieldKind::Date => "date",
            FieldKind::Url => "url",
            FieldKind::Image => "image",
        }
    }
}

/// A single declared field. Fields are required unless marked optional or
/// given a default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaField {
    name: String,
    kind: FieldKind,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<serde_json::Value>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        SchemaField {
            name: name.into(),
            kind,
            required: true,
            default: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn url(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Url)
    }

    pub fn image(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Image)
    }

    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            FieldKind::Enum(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Declare a default. A field with a default is never required.
    pub fn default_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.required = false;
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&serde_json::Value> {
        self.default.as_ref()
    }

    pub fn coercion(&self) -> Coercion {
        self.kind.coercion()
    }
}

/// Ordered set of fields for one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSchema {
    fields: Vec<SchemaField>,
    additional_properties: bool,
    #[serde(skip)]
    images: Arc<dyn ImageResolver>,
}

impl CollectionSchema {
    /// Build a schema, rejecting duplicate names, required fields with
    /// defaults, empty enums, image defaults and defaults that do not coerce.
    pub fn new(fields: Vec<SchemaField>) -> Result<Self> {
        let images: Arc<dyn ImageResolver> = Arc::new(RelativeImageResolver);
        let mut seen = HashSet::new();

        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ContentError::Schema(format!(
                    "Duplicate field '{}'",
                    field.name
                )));
            }

            if let FieldKind::Enum(values) = &field.kind {
                if values.is_empty() {
                    return Err(ContentError::Schema(format!(
                        "Enum field '{}' declares no values",
                        field.name
                    )));
                }
            }

            if let Some(default) = &field.default {
                if field.required {
                    return Err(ContentError::Schema(format!(
                        "Field '{}' is required and cannot declare a default",
                        field.name
                    )));
                }
                if field.kind == FieldKind::Image {
                    return Err(ContentError::Schema(format!(
                        "Image field '{}' cannot declare a default",
                        field.name
                    )));
                }
                validation::coerce_value(&field.kind, default, images.as_ref(), Path::new(""))
                    .map_err(|reason| {
                        ContentError::Schema(format!(
                            "Default for field '{}' is invalid: {reason}",
                            field.name
                        ))
                    })?;
            }
        }

        Ok(CollectionSchema {
            fields,
            additional_properties: true,
            images,
        })
    }

    /// Replace the image resolver used for image-reference fields.
    pub fn with_images(mut self, images: Arc<dyn ImageResolver>) -> Self {
        self.images = images;
        self
    }

    /// Reject undeclared keys instead of stripping them.
    pub fn deny_unknown_fields(mut self) -> Self {
        self.additional_properties = false;
        self
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn additional_properties(&self) -> bool {
        self.additional_properties
    }

    pub fn images(&self) -> &dyn ImageResolver {
        self.images.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_keep_declared_order() {
        let schema = CollectionSchema::new(vec![
            SchemaField::string("title"),
            SchemaField::date("pubDate"),
            SchemaField::boolean("draft").default_value(false),
        ])
        .unwrap();

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["title", "pubDate", "draft"]);
        assert!(schema.field("pubDate").unwrap().is_required());
        assert!(!schema.field("draft").unwrap().is_required());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = CollectionSchema::new(vec![
            SchemaField::string("title"),
            SchemaField::string("title").optional(),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate field 'title'"));
    }

    #[test]
    fn test_default_must_coerce() {
        let err = CollectionSchema::new(vec![SchemaField::boolean("petFriendly").default_value("no")])
            .unwrap_err();
        assert!(err.to_string().contains("petFriendly"));

        let err = CollectionSchema::new(vec![
            SchemaField::enumeration("tier", ["free", "paid"]).default_value("gold"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("tier"));
    }

    #[test]
    fn test_empty_enum_rejected() {
        let empty: Vec<String> = Vec::new();
        let err = CollectionSchema::new(vec![SchemaField::enumeration("tier", empty)]).unwrap_err();
        assert!(matches!(err, ContentError::Schema(_)));
    }

    #[test]
    fn test_image_default_rejected() {
        let err = CollectionSchema::new(vec![SchemaField::image("cover").default_value("./a.png")])
            .unwrap_err();
        assert!(err.to_string().contains("cover"));
    }

    #[test]
    fn test_coercion_follows_kind() {
        assert_eq!(SchemaField::string("a").coercion(), Coercion::Identity);
        assert_eq!(SchemaField::enumeration("b", ["x"]).coercion(), Coercion::Identity);
        assert_eq!(SchemaField::date("c").coercion(), Coercion::StringToDate);
        assert_eq!(SchemaField::url("d").coercion(), Coercion::StringToUrl);
        assert_eq!(SchemaField::image("e").coercion(), Coercion::ImageReference);
    }
}
