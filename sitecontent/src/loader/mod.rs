use crate::document;
use crate::entry_id;
use crate::error::Result;
use crate::record::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Finds a collection's source files: every file under `base` (relative to
/// the site root) whose path relative to `base` matches `pattern`.
///
/// Patterns use glob syntax plus `{a,b}` alternation. Files or directories
/// starting with `_` or `.` are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobLoader {
    pub base: String,
    pub pattern: String,
}

impl GlobLoader {
    pub fn new(base: impl Into<String>, pattern: impl Into<String>) -> Self {
        GlobLoader {
            base: base.into(),
            pattern: pattern.into(),
        }
    }

    pub fn base_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.base)
    }

    /// Matching files, sorted by path with duplicates removed.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let base_dir = self.base_dir(root);
        if !base_dir.is_dir() {
            log::warn!("Collection directory does not exist: {}", base_dir.display());
            return Ok(Vec::new());
        }

        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };
        let escaped_base = glob::Pattern::escape(&base_dir.to_string_lossy());

        let mut files = BTreeSet::new();
        for pattern in expand_braces(&self.pattern) {
            let full = format!("{}/{}", escaped_base.trim_end_matches('/'), pattern);
            for path in glob::glob_with(&full, options)?.filter_map(|r| r.ok()) {
                if path.is_file() && !is_excluded(&base_dir, &path) {
                    files.insert(path);
                }
            }
        }

        log::debug!(
            "Matched {} file(s) under {} for '{}'",
            files.len(),
            base_dir.display(),
            self.pattern
        );
        Ok(files.into_iter().collect())
    }

    /// Discover and parse every matching file into a raw record. Stops at the
    /// first file that cannot be read or parsed.
    pub fn load(&self, root: &Path) -> Result<Vec<RawRecord>> {
        self.load_each(root)?.into_iter().collect()
    }

    /// Like [`GlobLoader::load`], but keeps going past unreadable files: one
    /// result per discovered file, in discovery order.
    pub fn load_each(&self, root: &Path) -> Result<Vec<Result<RawRecord>>> {
        let base_dir = self.base_dir(root);
        Ok(self
            .discover(root)?
            .into_iter()
            .map(|path| read_record(root, &base_dir, path))
            .collect())
    }
}

fn read_record(root: &Path, base_dir: &Path, path: PathBuf) -> Result<RawRecord> {
    let source = relative_id(root, &path);
    let parsed = document::read_document(&path, &source)?;
    let relative = path.strip_prefix(base_dir).unwrap_or(&path);
    let id = entry_id::derive_entry_id(relative, &parsed.fields);

    Ok(RawRecord {
        source,
        id,
        path,
        fields: parsed.fields,
        body: parsed.body,
    })
}

/// Expand `{a,b}` alternations into plain glob patterns. Nested and repeated
/// groups are expanded recursively; unbalanced braces are left as written.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut splits = Vec::new();
    for (i, c) in pattern[open..].char_indices() {
        let i = open + i;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(i),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    let mut out: Vec<String> = Vec::new();
    for pair in bounds.windows(2) {
        let alternative = &pattern[pair[0] + 1..pair[1]];
        for expanded in expand_braces(&format!("{prefix}{alternative}{suffix}")) {
            if !out.contains(&expanded) {
                out.push(expanded);
            }
        }
    }
    out
}

fn is_excluded(base_dir: &Path, path: &Path) -> bool {
    path.strip_prefix(base_dir)
        .unwrap_or(path)
        .components()
        .any(|c| {
            let name = c.as_os_str().to_string_lossy();
            name.starts_with('_') || name.starts_with('.')
        })
}

/// Source identifier: path relative to the site root with `/` separators.
fn relative_id(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
