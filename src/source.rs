//! Source discovery: walking input paths, filtering with globs and loading files.

use crate::error::{LintError, LintResult};
use globset::{Glob, GlobSet, GlobSetBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/.git/**",
    "**/dist/**",
    "**/vendor/**",
    "**/*.min.js",
    "**/*.min.css",
];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileKind {
    Html,
    Css,
    Js,
    Other,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "html" | "htm" => FileKind::Html,
            "css" => FileKind::Css,
            "js" | "mjs" => FileKind::Js,
            _ => FileKind::Other,
        }
    }
}

/// A file found during discovery, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Path relative to the lint root; what layout rules and reports use.
    pub relative_path: PathBuf,
    pub kind: FileKind,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub kind: FileKind,
    pub contents: String,
}

impl SourceFile {
    /// In-memory source, mostly for tests and editor integrations.
    pub fn from_string(relative_path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let relative_path = relative_path.into();
        Self {
            kind: FileKind::from_path(&relative_path),
            path: relative_path.clone(),
            relative_path,
            contents: contents.into(),
        }
    }

    /// Relative path with `/` separators on every platform.
    pub fn display_path(&self) -> String {
        display_path(&self.relative_path)
    }
}

pub fn display_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Include/exclude glob filter applied to paths relative to each root.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

fn build_globset(patterns: &[String]) -> LintResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|err| LintError::Config(format!("invalid glob pattern {pattern}: {err}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| LintError::Config(format!("invalid glob set: {err}")))
}

impl SourceFilter {
    pub fn new(include: &[String], exclude: &[String]) -> LintResult<Self> {
        let include = if include.is_empty() {
            None
        } else {
            Some(build_globset(include)?)
        };
        Ok(Self {
            include,
            exclude: build_globset(exclude)?,
        })
    }

    pub fn with_default_excludes() -> LintResult<Self> {
        let defaults: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
        Self::new(&[], &defaults)
    }

    pub fn matches(&self, relative: &Path) -> bool {
        if self.exclude.is_match(relative) {
            return false;
        }
        match &self.include {
            Some(include) => include.is_match(relative),
            None => true,
        }
    }

    /// A directory is pruned when anything beneath it would be excluded.
    fn prunes_dir(&self, relative_dir: &Path) -> bool {
        !relative_dir.as_os_str().is_empty() && self.exclude.is_match(relative_dir.join("_"))
    }
}

/// Walks every root and returns lintable files sorted by relative path.
///
/// Files named directly on the command line bypass the glob filter; directories
/// are walked recursively and filtered.
pub fn discover(roots: &[PathBuf], filter: &SourceFilter) -> LintResult<Vec<DiscoveredFile>> {
    let mut found = Vec::new();

    for root in roots {
        let metadata = std::fs::metadata(root).map_err(|err| LintError::io(root, err))?;

        if metadata.is_file() {
            let kind = FileKind::from_path(root);
            if kind == FileKind::Other {
                tracing::debug!(path = %root.display(), "skipping file with unsupported extension");
                continue;
            }
            let relative_path = root.strip_prefix(".").unwrap_or(root).to_path_buf();
            found.push(DiscoveredFile {
                path: root.clone(),
                relative_path,
                kind,
            });
            continue;
        }

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                !filter.prunes_dir(relative)
            });

        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                LintError::io(path, std::io::Error::other(err.to_string()))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let kind = FileKind::from_path(path);
            if kind == FileKind::Other {
                continue;
            }
            let relative_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            if !filter.matches(&relative_path) {
                tracing::trace!(path = %relative_path.display(), "excluded by filter");
                continue;
            }
            found.push(DiscoveredFile {
                path: path.to_path_buf(),
                relative_path,
                kind,
            });
        }
    }

    // the same file reached through two roots is linted once, under its first name
    let mut seen = HashSet::new();
    found.retain(|file| {
        let canonical = std::fs::canonicalize(&file.path).unwrap_or_else(|_| file.path.clone());
        seen.insert(canonical)
    });
    found.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    tracing::debug!(file_count = found.len(), "source discovery complete");
    Ok(found)
}

/// Reads a discovered file. Non UTF-8 content is a parse error.
pub async fn load(file: &DiscoveredFile) -> LintResult<SourceFile> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|err| LintError::io(&file.path, err))?;
    let mut contents = String::from_utf8(bytes).map_err(|err| LintError::Parse {
        path: file.relative_path.clone(),
        message: format!("file is not valid UTF-8: {err}"),
    })?;
    if contents.starts_with('\u{feff}') {
        contents.remove(0);
    }
    Ok(SourceFile {
        path: file.path.clone(),
        relative_path: file.relative_path.clone(),
        kind: file.kind,
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn relative_paths(files: &[DiscoveredFile]) -> Vec<String> {
        files.iter().map(|f| display_path(&f.relative_path)).collect()
    }

    #[test]
    fn classifies_by_extension() {
        assert_eq!(FileKind::from_path(Path::new("a/INDEX.HTM")), FileKind::Html);
        assert_eq!(FileKind::from_path(Path::new("site.css")), FileKind::Css);
        assert_eq!(FileKind::from_path(Path::new("app.mjs")), FileKind::Js);
        assert_eq!(FileKind::from_path(Path::new("README.md")), FileKind::Other);
        assert_eq!(FileKind::from_path(Path::new("Makefile")), FileKind::Other);
    }

    #[test]
    fn discovers_and_sorts_lintable_files() {
        let dir = tempdir().unwrap();
        write(dir.path(), "index.html", "");
        write(dir.path(), "js/app.js", "");
        write(dir.path(), "css/site.css", "");
        write(dir.path(), "notes.txt", "");

        let files = discover(
            &[dir.path().to_path_buf()],
            &SourceFilter::with_default_excludes().unwrap(),
        )
        .unwrap();
        assert_eq!(
            relative_paths(&files),
            vec!["css/site.css", "index.html", "js/app.js"]
        );
    }

    #[test]
    fn default_excludes_prune_dependencies_and_minified_files() {
        let dir = tempdir().unwrap();
        write(dir.path(), "node_modules/lib/index.js", "");
        write(dir.path(), "js/vendor.min.js", "");
        write(dir.path(), "js/main.js", "");

        let files = discover(
            &[dir.path().to_path_buf()],
            &SourceFilter::with_default_excludes().unwrap(),
        )
        .unwrap();
        assert_eq!(relative_paths(&files), vec!["js/main.js"]);
    }

    #[test]
    fn overlapping_roots_yield_each_file_once() {
        let dir = tempdir().unwrap();
        write(dir.path(), "index.html", "");
        write(dir.path(), "css/site.css", "");

        let roots = vec![dir.path().to_path_buf(), dir.path().join("index.html")];
        let files = discover(&roots, &SourceFilter::with_default_excludes().unwrap()).unwrap();
        assert_eq!(relative_paths(&files), vec!["css/site.css", "index.html"]);
    }

    #[test]
    fn include_globs_restrict_results() {
        let dir = tempdir().unwrap();
        write(dir.path(), "index.html", "");
        write(dir.path(), "css/site.css", "");

        let filter = SourceFilter::new(&["**/*.css".to_string()], &[]).unwrap();
        let files = discover(&[dir.path().to_path_buf()], &filter).unwrap();
        assert_eq!(relative_paths(&files), vec!["css/site.css"]);
    }

    #[test]
    fn invalid_glob_is_config_error() {
        let err = SourceFilter::new(&["a[".to_string()], &[]).unwrap_err();
        assert!(matches!(err, LintError::Config(_)));
    }

    #[test]
    fn missing_root_is_io_error() {
        let err = discover(
            &[PathBuf::from("/definitely/not/here")],
            &SourceFilter::with_default_excludes().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, LintError::Io { .. }));
    }

    #[tokio::test]
    async fn load_rejects_invalid_utf8_and_strips_bom() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("bad.css");
        fs::write(&bad, [0xff, 0xfe, 0x00]).unwrap();
        let good = dir.path().join("good.css");
        fs::write(&good, "\u{feff}a{}").unwrap();

        let bad_file = DiscoveredFile {
            path: bad.clone(),
            relative_path: PathBuf::from("bad.css"),
            kind: FileKind::Css,
        };
        assert!(matches!(load(&bad_file).await, Err(LintError::Parse { .. })));

        let good_file = DiscoveredFile {
            path: good,
            relative_path: PathBuf::from("good.css"),
            kind: FileKind::Css,
        };
        assert_eq!(load(&good_file).await.unwrap().contents, "a{}");
    }
}
