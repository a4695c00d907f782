// Document parsing - Markdown with YAML front matter, JSON and YAML data files

use crate::error::{ContentError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// How a source file's record is encoded, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `---` fenced YAML front matter followed by a Markdown/MDX body.
    Markdown,
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("mdx") | Some("markdown") => Some(DocumentFormat::Markdown),
            Some("json") => Some(DocumentFormat::Json),
            Some("yaml") | Some("yml") => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

/// Fields and optional body extracted from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub body: Option<String>,
}

fn front_matter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A\x{feff}?---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)")
            .expect("front matter pattern is valid")
    })
}

/// Split text into its front-matter block and body. Text without a leading
/// fence has no front matter and is all body.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    match front_matter_re().captures(text) {
        Some(caps) => {
            let front = caps.get(1).map_or("", |m| m.as_str());
            let end = caps.get(0).map_or(0, |m| m.end());
            (Some(front), &text[end..])
        }
        None => (None, text),
    }
}

/// Parse the contents of a source file in the given format.
pub fn parse_document(source_id: &str, format: DocumentFormat, text: &str) -> Result<ParsedDocument> {
    match format {
        DocumentFormat::Markdown => {
            let (front, body) = split_front_matter(text);
            let fields = match front {
                Some(yaml) => parse_yaml_object(source_id, yaml)?,
                None => serde_json::Map::new(),
            };
            Ok(ParsedDocument {
                fields,
                body: Some(body.to_string()),
            })
        }
        DocumentFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(text).map_err(|e| parse_error(source_id, e))?;
            Ok(ParsedDocument {
                fields: into_object(source_id, value)?,
                body: None,
            })
        }
        DocumentFormat::Yaml => Ok(ParsedDocument {
            fields: parse_yaml_object(source_id, text)?,
            body: None,
        }),
    }
}

/// Read and parse a file, picking the format from its extension.
pub fn read_document(path: &Path, source_id: &str) -> Result<ParsedDocument> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| ContentError::Parse {
        source_id: source_id.to_string(),
        message: "unsupported file extension".into(),
    })?;
    let text = std::fs::read_to_string(path)?;
    parse_document(source_id, format, &text)
}

fn parse_yaml_object(
    source_id: &str,
    yaml: &str,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    if yaml.trim().is_empty() {
        return Ok(serde_json::Map::new());
    }
    let value: serde_json::Value =
        serde_yaml::from_str(yaml).map_err(|e| parse_error(source_id, e))?;
    into_object(source_id, value)
}

fn into_object(
    source_id: &str,
    value: serde_json::Value,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(serde_json::Map::new()),
        other => Err(ContentError::Parse {
            source_id: source_id.to_string(),
            message: format!("expected a key/value object at the top level, got {}", kind_of(&other)),
        }),
    }
}

fn parse_error(source_id: &str, e: impl std::fmt::Display) -> ContentError {
    ContentError::Parse {
        source_id: source_id.to_string(),
        message: e.to_string(),
    }
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_split_front_matter() {
        let text = "---\ntitle: Hello\npubDate: 2024-01-05\n---\n# Body\n";
        let (front, body) = split_front_matter(text);
        assert_eq!(front, Some("title: Hello\npubDate: 2024-01-05"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_front_matter_crlf_and_bom() {
        let text = "\u{feff}---\r\ntitle: Hi\r\n---\r\nBody";
        let (front, body) = split_front_matter(text);
        assert_eq!(front, Some("title: Hi"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_empty_front_matter() {
        let (front, body) = split_front_matter("---\n---\ntext");
        assert_eq!(front, Some(""));
        assert_eq!(body, "text");
    }

    #[test]
    fn test_fence_must_start_a_line() {
        let text = "---\ntitle: a---\nkind: b\n---\nrest";
        let (front, body) = split_front_matter(text);
        assert_eq!(front, Some("title: a---\nkind: b"));
        assert_eq!(body, "rest");
    }

    #[test]
    fn test_no_front_matter() {
        let (front, body) = split_front_matter("# Just markdown\n---\n");
        assert_eq!(front, None);
        assert_eq!(body, "# Just markdown\n---\n");
    }

    #[test]
    fn test_markdown_document_fields() {
        let doc = parse_document(
            "blog/a.md",
            DocumentFormat::Markdown,
            "---\ntitle: Hello\npubDate: 2024-01-05\ndraft: true\nupdatedDate:\n---\nBody",
        )
        .unwrap();

        assert_eq!(
            serde_json::Value::Object(doc.fields),
            json!({ "title": "Hello", "pubDate": "2024-01-05", "draft": true, "updatedDate": null })
        );
        assert_eq!(doc.body.as_deref(), Some("Body"));
    }

    #[test]
    fn test_json_document_must_be_object() {
        let doc = parse_document("d/a.json", DocumentFormat::Json, r#"{"name": "Cafe"}"#).unwrap();
        assert_eq!(doc.fields["name"], json!("Cafe"));
        assert_eq!(doc.body, None);

        let err = parse_document("d/b.json", DocumentFormat::Json, "[1, 2]").unwrap_err();
        assert!(err.to_string().contains("d/b.json"));
        assert!(err.to_string().contains("list"));
    }

    #[test]
    fn test_malformed_input_names_source() {
        let err = parse_document("d/c.json", DocumentFormat::Json, "{ nope").unwrap_err();
        assert!(matches!(err, ContentError::Parse { ref source_id, .. } if source_id == "d/c.json"));

        let err = parse_document("b/x.md", DocumentFormat::Markdown, "---\ntitle: [unclosed\n---\n")
            .unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
    }

    #[test]
    fn test_yaml_data_file() {
        let doc = parse_document("d/a.yaml", DocumentFormat::Yaml, "name: Cafe\npetFriendly: true\n")
            .unwrap();
        assert_eq!(doc.fields["petFriendly"], json!(true));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.mdx")), Some(DocumentFormat::Markdown));
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_path(Path::new("a.txt")), None);
    }

    #[test]
    fn test_unsupported_extension_names_source() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "title: nope\n").unwrap();

        let err = read_document(&path, "src/content/blog/notes.txt").unwrap_err();
        assert!(matches!(
            err,
            ContentError::Parse { ref source_id, .. } if source_id == "src/content/blog/notes.txt"
        ));
        assert_eq!(
            err.to_string(),
            "Parse error in src/content/blog/notes.txt: unsupported file extension"
        );
    }
}
