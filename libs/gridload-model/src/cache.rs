//! Dataset cache
//!
//! Keyed memoization of built datasets. Entries are `Arc<Dataset>` so any
//! number of readers can share one immutable dataset. Paths are used as
//! given; two spellings of the same file are two entries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::table::{CsvTableLoader, TableLoader};
use crate::timestamp::TimestampResolver;

pub struct DatasetCache {
    loader: Box<dyn TableLoader>,
    resolver: TimestampResolver,
    entries: DashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(loader: Box<dyn TableLoader>, resolver: TimestampResolver) -> Self {
        Self {
            loader,
            resolver,
            entries: DashMap::new(),
        }
    }

    /// Cache backed by the CSV loader
    pub fn csv(resolver: TimestampResolver) -> Self {
        Self::new(Box::new(CsvTableLoader), resolver)
    }

    /// Cached dataset for `path`, building it on first use
    ///
    /// A failed build leaves the cache untouched. Two callers racing on a
    /// cold path may both build; the first insert wins.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>> {
        if let Some(entry) = self.entries.get(path) {
            debug!("Dataset cache hit: {}", path.display());
            return Ok(Arc::clone(entry.value()));
        }

        let dataset = Arc::new(self.build(path)?);
        let entry = self
            .entries
            .entry(path.to_path_buf())
            .or_insert(dataset);
        Ok(Arc::clone(entry.value()))
    }

    /// Rebuild `path` and replace any cached entry
    pub fn reload(&self, path: &Path) -> Result<Arc<Dataset>> {
        let dataset = Arc::new(self.build(path)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&dataset));
        info!("Dataset reloaded: {}", path.display());
        Ok(dataset)
    }

    /// Drop the entry for `path`; returns whether one existed
    pub fn invalidate(&self, path: &Path) -> bool {
        let removed = self.entries.remove(path).is_some();
        if removed {
            debug!("Dataset cache invalidated: {}", path.display());
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    fn build(&self, path: &Path) -> Result<Dataset> {
        info!("Loading dataset from {}", path.display());
        Dataset::load(path, self.loader.as_ref(), &self.resolver)
    }
}

impl std::fmt::Debug for DatasetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetCache")
            .field("resolver", &self.resolver)
            .field("entries", &self.entries.len())
            .finish()
    }
}
