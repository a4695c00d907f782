// Image references: the asset pipeline itself lives elsewhere, this only
// turns a reference string into a handle it can act on.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};

/// Opaque handle to an image referenced by an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// The reference as written in the source file.
    pub src: String,
    /// File the reference points at, for images that live next to content.
    /// `None` for public-directory and remote images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<PathBuf>,
}

impl ImageRef {
    pub fn is_local(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Capability injected into a schema at construction time for resolving
/// image-reference fields.
pub trait ImageResolver: Send + Sync + Debug {
    /// Resolve `reference` as written in the entry at `entry_path`.
    fn resolve(&self, entry_path: &Path, reference: &str) -> Result<ImageRef, String>;
}

/// Resolves relative references against the entry's directory. Root-relative
/// (`/img.png`) and `http(s)` references are passed through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeImageResolver;

impl ImageResolver for RelativeImageResolver {
    fn resolve(&self, entry_path: &Path, reference: &str) -> Result<ImageRef, String> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err("empty image reference".into());
        }

        if trimmed.starts_with('/')
            || trimmed.starts_with("http://")
            || trimmed.starts_with("https://")
        {
            return Ok(ImageRef {
                src: trimmed.to_string(),
                resolved: None,
            });
        }

        let dir = entry_path.parent().unwrap_or_else(|| Path::new(""));
        Ok(ImageRef {
            src: trimmed.to_string(),
            resolved: Some(normalize(&dir.join(trimmed))),
        })
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_reference_resolves_next_to_entry() {
        let image = RelativeImageResolver
            .resolve(Path::new("site/src/content/blog/post.md"), "./hero.jpg")
            .unwrap();
        assert_eq!(image.src, "./hero.jpg");
        assert_eq!(
            image.resolved,
            Some(PathBuf::from("site/src/content/blog/hero.jpg"))
        );
        assert!(image.is_local());
    }

    #[test]
    fn test_parent_reference_is_normalized() {
        let image = RelativeImageResolver
            .resolve(Path::new("src/content/blog/post.md"), "../../assets/a.png")
            .unwrap();
        assert_eq!(image.resolved, Some(PathBuf::from("src/assets/a.png")));
    }

    #[test]
    fn test_public_and_remote_pass_through() {
        let public = RelativeImageResolver
            .resolve(Path::new("blog/post.md"), "/images/a.png")
            .unwrap();
        assert!(!public.is_local());

        let remote = RelativeImageResolver
            .resolve(Path::new("blog/post.md"), "https://cdn.example.com/a.png")
            .unwrap();
        assert_eq!(remote.src, "https://cdn.example.com/a.png");
        assert_eq!(remote.resolved, None);
    }

    #[test]
    fn test_empty_reference_fails() {
        assert!(RelativeImageResolver
            .resolve(Path::new("blog/post.md"), "  ")
            .is_err());
    }
}
