// Entry ids: derived from the file path, or taken from front matter.

use std::path::{Component, Path};

/// Front-matter key that overrides the path-derived id.
pub const SLUG_KEY: &str = "slug";

/// Derive an entry id from a path relative to the collection base.
///
/// A string `slug` in the record wins. Otherwise the extension is dropped,
/// each segment is slugified and a trailing `/index` is removed, so
/// `2024/Hello World/index.md` becomes `2024/hello-world`.
pub fn derive_entry_id(
    relative: &Path,
    fields: &serde_json::Map<String, serde_json::Value>,
) -> String {
    if let Some(serde_json::Value::String(slug)) = fields.get(SLUG_KEY) {
        let slug = slug.trim().trim_matches('/');
        if !slug.is_empty() {
            return slug.to_string();
        }
    }

    let without_ext = relative.with_extension("");
    let id = without_ext
        .components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(slugify(&segment.to_string_lossy())),
            _ => None,
        })
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    match id.strip_suffix("/index") {
        Some(parent) => parent.to_string(),
        None => id,
    }
}

/// Slugify a string for use in entry ids
pub fn slugify(input: &str) -> String {
    slug::slugify(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_fields() -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }

    #[test]
    fn test_id_from_file_name() {
        assert_eq!(derive_entry_id(Path::new("first-post.md"), &no_fields()), "first-post");
        assert_eq!(derive_entry_id(Path::new("Second Post.mdx"), &no_fields()), "second-post");
        assert_eq!(derive_entry_id(Path::new("joes-diner.json"), &no_fields()), "joes-diner");
    }

    #[test]
    fn test_id_keeps_directories() {
        assert_eq!(
            derive_entry_id(Path::new("2024/Trip Report.md"), &no_fields()),
            "2024/trip-report"
        );
    }

    #[test]
    fn test_trailing_index_removed() {
        assert_eq!(
            derive_entry_id(Path::new("guides/setup/index.md"), &no_fields()),
            "guides/setup"
        );
        assert_eq!(derive_entry_id(Path::new("index.md"), &no_fields()), "index");
    }

    #[test]
    fn test_slug_field_overrides_path() {
        let fields = json!({ "slug": "/custom/path/" });
        let fields = fields.as_object().unwrap();
        assert_eq!(derive_entry_id(Path::new("whatever.md"), fields), "custom/path");

        let blank = json!({ "slug": "  " });
        assert_eq!(
            derive_entry_id(Path::new("whatever.md"), blank.as_object().unwrap()),
            "whatever"
        );
    }
}
