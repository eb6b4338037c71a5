//! Fixture preloading: the gate that decides whether to load, and the YAML loader that does it.
//!
//! Fixture tables live in `<test root>/fixtures/<table>.yml`. Each top-level key of a file is one record:
//!
//! ```yaml
//! crab:
//!   id: 2
//!   name: Senjougahara Hitagi
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use apptest_core::conventions::FIXTURE_EXTENSION;
use apptest_core::should_preload_fixtures;
use serde_yaml::{Mapping, Value};

use super::environment::Environment;
use super::interfaces::{FileSystem, FixtureLoader, TestError};
use super::resolver::ResolvedFileSet;

// ============================================================================
// Gate
// ============================================================================

/// Decides whether fixtures are loaded before any test file.
pub struct FixtureGate;

impl FixtureGate {
    /// Suite and directory runs always preload; explicit-file runs follow [`should_preload_fixtures`].
    pub fn should_preload(files: &ResolvedFileSet, force: bool) -> bool {
        files.from_expansion() || should_preload_fixtures(files.len(), force)
    }
}

// ============================================================================
// Fixture data
// ============================================================================

/// Preloaded fixture tables, keyed by table name. Empty when fixtures were not loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureSet {
    tables: BTreeMap<String, Mapping>,
}

impl FixtureSet {
    pub fn insert(&mut self, table: impl Into<String>, records: Mapping) {
        self.tables.insert(table.into(), records);
    }

    /// Number of records in `table`; 0 for unknown tables.
    pub fn count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, Mapping::len)
    }

    /// Scalar field of one record, rendered as text.
    pub fn field(&self, table: &str, record: &str, field: &str) -> Option<String> {
        let record = self.tables.get(table)?.get(Value::from(record))?;
        match record.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Number of loaded tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

// ============================================================================
// YAML loader
// ============================================================================

/// Loads every `*.yml` table from one directory.
pub struct YamlFixtureLoader<'a> {
    fs: &'a dyn FileSystem,
    dir: PathBuf,
}

impl<'a> YamlFixtureLoader<'a> {
    pub fn new(fs: &'a dyn FileSystem, dir: impl Into<PathBuf>) -> Self {
        Self { fs, dir: dir.into() }
    }

    fn load_table(&self, path: &Path) -> Result<Mapping, TestError> {
        let source = self.fs.read_to_string(path)?;
        let fixture_error = |message: String| TestError::Fixture {
            path: path.to_path_buf(),
            message,
        };

        match serde_yaml::from_str::<Value>(&source).map_err(|e| fixture_error(e.to_string()))? {
            Value::Null => Ok(Mapping::new()),
            Value::Mapping(records) => Ok(records),
            _ => Err(fixture_error("expected a mapping of named records".to_string())),
        }
    }
}

impl FixtureLoader for YamlFixtureLoader<'_> {
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display(), environment = %environment))]
    fn load_all(&self, environment: &Environment) -> Result<FixtureSet, TestError> {
        let mut set = FixtureSet::default();
        if !self.fs.is_dir(&self.dir) {
            tracing::debug!("no fixtures directory");
            return Ok(set);
        }

        let mut paths: Vec<PathBuf> = self
            .fs
            .list_dir(&self.dir)?
            .into_iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == FIXTURE_EXTENSION) && self.fs.is_file(p))
            .collect();
        paths.sort();

        for path in paths {
            let Some(table) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let records = self.load_table(&path)?;
            tracing::debug!(table, records = records.len(), "loaded fixture table");
            set.insert(table, records);
        }

        Ok(set)
    }
}
