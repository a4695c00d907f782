//! The site's own collections: blog posts and dining entries.
//!
//! Schemas are declared here as data, and typed views of their records are
//! provided for templates that prefer structs over field lookups.

use super::types::{CollectionDefinition, CollectionSchema, SchemaField};
use crate::assets::{ImageRef, ImageResolver};
use crate::error::Result;
use crate::loader::GlobLoader;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;

pub const BLOG: &str = "blog";
pub const DINING: &str = "dining";

pub const PRICE_RANGES: [&str; 4] = ["$", "$$", "$$$", "$$$$"];

/// Markdown and MDX posts. Needs an image resolver for `heroImage`.
pub fn blog_schema(images: Arc<dyn ImageResolver>) -> Result<CollectionSchema> {
    Ok(CollectionSchema::new(vec![
        SchemaField::string("title"),
        SchemaField::string("description"),
        SchemaField::date("pubDate"),
        SchemaField::date("updatedDate").optional(),
        SchemaField::image("heroImage").optional(),
    ])?
    .with_images(images))
}

/// Restaurant records, one JSON file each.
pub fn dining_schema() -> Result<CollectionSchema> {
    CollectionSchema::new(vec![
        SchemaField::string("name"),
        SchemaField::string("category"),
        SchemaField::string("description"),
        SchemaField::string("image"),
        SchemaField::url("website"),
        SchemaField::string("phone").optional(),
        SchemaField::string("address").optional(),
        SchemaField::boolean("petFriendly").default_value(false),
        SchemaField::enumeration("priceRange", PRICE_RANGES).optional(),
    ])
}

pub fn blog_collection(images: Arc<dyn ImageResolver>) -> Result<CollectionDefinition> {
    Ok(CollectionDefinition::new(
        BLOG,
        GlobLoader::new("src/content/blog", "**/*.{md,mdx}"),
        blog_schema(images)?,
    ))
}

pub fn dining_collection() -> Result<CollectionDefinition> {
    Ok(CollectionDefinition::new(
        DINING,
        GlobLoader::new("src/content/dining", "*.json"),
        dining_schema()?,
    ))
}

/// Every collection the site declares.
pub fn site_collections(images: Arc<dyn ImageResolver>) -> Result<Vec<CollectionDefinition>> {
    Ok(vec![blog_collection(images)?, dining_collection()?])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub title: String,
    pub description: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hero_image: Option<ImageRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Expensive,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl PriceRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceRange::Budget => "$",
            PriceRange::Moderate => "$$",
            PriceRange::Expensive => "$$$",
            PriceRange::Luxury => "$$$$",
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningEntry {
    pub name: String,
    pub category: String,
    pub description: String,
    pub image: String,
    pub website: Url,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub pet_friendly: bool,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
}
