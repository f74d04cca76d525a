use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::config::DiscoveryConfig;
use crate::constants::discovery::{DEFAULT_PATTERN, VCS_DIRS};
use crate::types::{DocumentRecord, Result, UnifyError, repository_basename};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Finds documentation files below a root directory.
///
/// Every regular file whose name matches the pattern is returned, except
/// those under an excluded (version-control) directory. Ignore files are
/// deliberately not honoured: a README listed in `.gitignore` is still a
/// README. Order is walk order and carries no meaning.
pub struct DocumentLocator {
    root: PathBuf,
    pattern: Pattern,
    exclude_dirs: Vec<String>,
    follow_links: bool,
}

impl DocumentLocator {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            pattern: Pattern::new(DEFAULT_PATTERN).unwrap_or_default(),
            exclude_dirs: VCS_DIRS.iter().map(|d| d.to_string()).collect(),
            follow_links: false,
        }
    }

    pub fn from_config<P: AsRef<Path>>(root: P, config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self::new(root)
            .with_pattern(&config.pattern)?
            .with_exclude_dirs(config.exclude_dirs.clone())
            .follow_links(config.follow_links))
    }

    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.pattern = Pattern::new(pattern).map_err(|e| {
            UnifyError::Config(format!("Invalid discovery pattern '{}': {}", pattern, e))
        })?;
        Ok(self)
    }

    pub fn with_exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.exclude_dirs = dirs;
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Base name of the root, used as owner label for top-level files
    pub fn root_label(&self) -> String {
        let resolved = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        resolved
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| repository_basename(&self.root.to_string_lossy()))
    }

    /// Walk the tree and read every matching document.
    ///
    /// Unreadable files and walk errors are logged and skipped. An empty
    /// result is not an error.
    pub fn locate(&self) -> Result<Vec<DocumentRecord>> {
        if !self.root.is_dir() {
            return Err(UnifyError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", self.root.display()),
            )));
        }

        let root_label = self.root_label();
        let excluded = self.exclude_dirs.clone();
        let mut documents = Vec::new();
        let mut skipped = 0usize;

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(self.follow_links)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir && excluded.iter().any(|d| entry.file_name() == d.as_str()))
            })
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path during discovery: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || !self.matches_name(path) {
                continue;
            }

            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };

            if self.in_excluded_dir(relative) {
                continue;
            }

            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Error reading {}: {}", path.display(), e);
                    skipped += 1;
                    continue;
                }
            };

            let owner_label = relative
                .parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| root_label.clone());

            debug!("Found {} (owner: {})", relative.display(), owner_label);
            documents.push(DocumentRecord::new(
                to_slash_path(relative),
                content,
                owner_label,
            ));
        }

        debug!(
            "Discovery finished: {} documents, {} skipped",
            documents.len(),
            skipped
        );
        Ok(documents)
    }

    fn matches_name(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.pattern.matches_with(name, MATCH_OPTIONS))
    }

    fn in_excluded_dir(&self, relative: &Path) -> bool {
        relative.components().any(|c| match c {
            Component::Normal(seg) => self.exclude_dirs.iter().any(|d| seg == d.as_str()),
            _ => false,
        })
    }
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(seg) => Some(seg.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn by_path(docs: Vec<DocumentRecord>) -> HashMap<String, DocumentRecord> {
        docs.into_iter()
            .map(|d| (d.relative_path.clone(), d))
            .collect()
    }

    #[test]
    fn test_finds_every_matching_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "tool-a/README.md", b"Tool A does X");
        write(temp.path(), "tool-b/readme.txt", b"Tool B does Y");
        write(temp.path(), "nested/deep/tool-c/ReadMe", b"Tool C");
        write(temp.path(), "tool-a/main.rs", b"fn main() {}");
        write(temp.path(), "docs/NOT_README.md", b"nope");

        let docs = by_path(DocumentLocator::new(temp.path()).locate().unwrap());

        assert_eq!(docs.len(), 3);
        assert_eq!(docs["tool-a/README.md"].content, "Tool A does X");
        assert_eq!(docs["tool-b/readme.txt"].owner_label, "tool-b");
        assert_eq!(docs["nested/deep/tool-c/ReadMe"].owner_label, "tool-c");
    }

    #[test]
    fn test_root_file_owned_by_root_name() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "README.md", b"# Root");
        write(temp.path(), "tool-a/README.md", b"# A");

        let docs = by_path(DocumentLocator::new(temp.path()).locate().unwrap());
        let root_name = temp.path().file_name().unwrap().to_string_lossy();

        assert_eq!(docs["README.md"].owner_label, root_name);
        assert_eq!(docs["tool-a/README.md"].owner_label, "tool-a");
    }

    #[test]
    fn test_skips_version_control_dirs() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".git/README", b"internal");
        write(temp.path(), "tool/.hg/store/README.md", b"internal");
        write(temp.path(), "tool/README.md", b"visible");

        let docs = DocumentLocator::new(temp.path()).locate().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].relative_path, "tool/README.md");
    }

    #[test]
    fn test_ignore_files_are_not_honoured() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".gitignore", b"generated/\n");
        write(temp.path(), "generated/README.md", b"still a readme");
        write(temp.path(), ".github/README.md", b"hidden dir");

        let docs = DocumentLocator::new(temp.path()).locate().unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "bin/README.bin", &[0xff, 0xfe, 0x00, 0xc3]);
        write(temp.path(), "ok/README.md", b"fine");

        let docs = DocumentLocator::new(temp.path()).locate().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].owner_label, "ok");
    }

    #[test]
    fn test_empty_tree_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/lib.rs", b"");

        let docs = DocumentLocator::new(temp.path()).locate().unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = DocumentLocator::new(temp.path().join("absent")).locate();
        assert!(matches!(result, Err(UnifyError::Io(_))));
    }

    #[test]
    fn test_custom_pattern_from_config() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a/README.md", b"a");
        write(temp.path(), "a/USAGE.md", b"usage");

        let config = DiscoveryConfig {
            pattern: "usage*".to_string(),
            ..Default::default()
        };
        let docs = DocumentLocator::from_config(temp.path(), &config)
            .unwrap()
            .locate()
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].relative_path, "a/USAGE.md");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dir_followed_only_when_enabled() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "tool-a/README.md", b"Tool A");
        std::os::unix::fs::symlink(temp.path().join("tool-a"), temp.path().join("alias"))
            .unwrap();

        let docs = DocumentLocator::new(temp.path()).locate().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].relative_path, "tool-a/README.md");

        // Same file reached twice; both records are kept
        let docs = by_path(
            DocumentLocator::new(temp.path())
                .follow_links(true)
                .locate()
                .unwrap(),
        );
        assert_eq!(docs.len(), 2);
        assert_eq!(docs["alias/README.md"].content, "Tool A");
        assert_eq!(docs["alias/README.md"].owner_label, "alias");
        assert_eq!(docs["tool-a/README.md"].owner_label, "tool-a");
    }
}
