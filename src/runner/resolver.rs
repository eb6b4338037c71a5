//! Selector classification and test file discovery.
//!
//! A selector is one command-line argument. Each is split on commas and whitespace, then every piece is classified as
//! an explicit file, a suite keyword, or a directory shortcut and expanded into test files. Files are concatenated in
//! selector order and deduplicated by canonical path, keeping the first occurrence.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use apptest_core::conventions::is_test_file_name;
use apptest_core::suites::{self, SuiteId, SUITES};

use super::interfaces::{FileSystem, TestError};

// ============================================================================
// Suite table
// ============================================================================

/// Keyword (canonical or alias) to test directories, relative to the test root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteTable {
    keywords: HashMap<String, Vec<String>>,
}

impl SuiteTable {
    /// The builtin keywords and their aliases.
    pub fn builtin() -> Self {
        let mut keywords = HashMap::new();
        for info in SUITES {
            let dirs: Vec<String> = info.directories.iter().map(|d| d.to_string()).collect();
            for spelling in std::iter::once(&info.canonical).chain(info.aliases) {
                keywords.insert(spelling.to_string(), dirs.clone());
            }
        }
        Self { keywords }
    }

    /// Add project-specific keywords. Their directories also join `all`.
    pub fn with_extra(mut self, extra: &BTreeMap<String, Vec<String>>) -> Self {
        let all = suites::as_str(SuiteId::All).to_string();
        for (keyword, dirs) in extra {
            if keyword == &all {
                tracing::warn!(keyword, "ignoring configured suite that shadows the builtin union");
                continue;
            }
            let union = self.keywords.entry(all.clone()).or_default();
            for dir in dirs {
                if !union.contains(dir) {
                    union.push(dir.clone());
                }
            }
            self.keywords.insert(keyword.clone(), dirs.clone());
        }
        self
    }

    pub fn lookup(&self, keyword: &str) -> Option<&[String]> {
        self.keywords.get(keyword).map(Vec::as_slice)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.contains_key(keyword)
    }
}

impl Default for SuiteTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Selectors
// ============================================================================

/// One classified selector piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    ExplicitFile(PathBuf),
    SuiteKeyword(String),
    DirectoryShortcut(PathBuf),
    /// No selectors at all: run every suite.
    Empty,
}

/// Split raw arguments on commas and whitespace, dropping empty pieces.
pub fn split_selectors(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|s| s.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Resolved files
// ============================================================================

/// Ordered, deduplicated test files of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFileSet {
    files: Vec<PathBuf>,
    expanded: bool,
}

impl ResolvedFileSet {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Whether any file came from a suite keyword or directory rather than an explicit path.
    pub fn from_expansion(&self) -> bool {
        self.expanded
    }
}

// ============================================================================
// Resolver
// ============================================================================

pub struct PathResolver<'a> {
    fs: &'a dyn FileSystem,
    suites: &'a SuiteTable,
    test_root: PathBuf,
    extension: String,
}

impl<'a> PathResolver<'a> {
    /// `test_root` is relative to the project root passed to [`PathResolver::resolve`].
    pub fn new(fs: &'a dyn FileSystem, suites: &'a SuiteTable, test_root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            fs,
            suites,
            test_root: test_root.into(),
            extension: extension.to_string(),
        }
    }

    /// Expand selectors into the files of one run.
    ///
    /// ## Errors
    /// - [`TestError::InvalidSelector`] for a piece that is neither a test file, a suite keyword, nor a directory.
    #[tracing::instrument(skip(self), fields(root = %root.display()))]
    pub fn resolve(&self, selectors: &[String], root: &Path) -> Result<ResolvedFileSet, TestError> {
        let pieces = split_selectors(selectors);
        let classified = if pieces.is_empty() {
            vec![Selector::Empty]
        } else {
            pieces
                .iter()
                .map(|piece| self.classify(piece, root))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut seen = HashSet::new();
        let mut resolved = ResolvedFileSet::default();
        for selector in &classified {
            resolved.expanded |= !matches!(selector, Selector::ExplicitFile(_));
            for file in self.expand(selector, root)? {
                let canonical = self.fs.canonicalize(&file);
                if seen.insert(canonical.clone()) {
                    resolved.files.push(canonical);
                }
            }
        }

        tracing::debug!(files = resolved.len(), expanded = resolved.expanded, "resolved selectors");
        Ok(resolved)
    }

    /// Classify one piece: explicit file, then suite keyword, then directory.
    pub fn classify(&self, piece: &str, root: &Path) -> Result<Selector, TestError> {
        let candidates = [root.join(piece), root.join(&self.test_root).join(piece)];

        let file = candidates.iter().find(|p| self.fs.is_file(p));
        if let Some(path) = file.filter(|p| self.is_test_file(p)) {
            return Ok(Selector::ExplicitFile(path.clone()));
        }
        if self.suites.contains(piece) {
            return Ok(Selector::SuiteKeyword(piece.to_string()));
        }
        if let Some(dir) = candidates.iter().find(|p| self.fs.is_dir(p)) {
            return Ok(Selector::DirectoryShortcut(dir.clone()));
        }

        let reason = if file.is_some() {
            format!("not a test file (expected *_test.{})", self.extension)
        } else {
            "no such test file, suite, or directory".to_string()
        };
        Err(TestError::InvalidSelector {
            selector: piece.to_string(),
            reason,
        })
    }

    fn expand(&self, selector: &Selector, root: &Path) -> Result<Vec<PathBuf>, TestError> {
        match selector {
            Selector::ExplicitFile(path) => Ok(vec![path.clone()]),
            Selector::SuiteKeyword(keyword) => self.expand_suite(keyword, root),
            Selector::DirectoryShortcut(dir) => {
                let mut files = Vec::new();
                self.collect_recursive(dir, &mut files)?;
                files.sort();
                Ok(files)
            }
            Selector::Empty => self.expand_suite(suites::as_str(SuiteId::All), root),
        }
    }

    /// Direct children of each suite directory, sorted per directory.
    fn expand_suite(&self, keyword: &str, root: &Path) -> Result<Vec<PathBuf>, TestError> {
        let mut files = Vec::new();
        for dir in self.suites.lookup(keyword).unwrap_or_default() {
            let dir = root.join(&self.test_root).join(dir);
            if !self.fs.is_dir(&dir) {
                tracing::trace!(dir = %dir.display(), "suite directory missing");
                continue;
            }
            let mut entries: Vec<PathBuf> = self
                .fs
                .list_dir(&dir)?
                .into_iter()
                .filter(|p| self.fs.is_file(p) && self.is_test_file(p))
                .collect();
            entries.sort();
            files.extend(entries);
        }
        Ok(files)
    }

    fn collect_recursive(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), TestError> {
        for entry in self.fs.list_dir(dir)? {
            if self.fs.is_dir(&entry) {
                let hidden = entry
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.starts_with('.'));
                if !hidden {
                    self.collect_recursive(&entry, files)?;
                }
            } else if self.is_test_file(&entry) {
                files.push(entry);
            }
        }
        Ok(())
    }

    fn is_test_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| is_test_file_name(name, &self.extension))
    }
}
