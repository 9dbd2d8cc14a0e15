//! Memoized load + aggregate, keyed by the identity of the source file.

use crate::analyzers::analyzer::{Analysis, analyze};
use crate::config::ColumnMapping;
use crate::error::{RaterError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Path, size and modification time of a source file at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentity {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceIdentity {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| RaterError::DataLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Holds the most recent [`Analysis`] and rebuilds it whenever the source
/// file or the column mapping changes.
#[derive(Default)]
pub struct DatasetCache {
    entry: Option<(SourceIdentity, ColumnMapping, Arc<Analysis>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached analysis if `path` and `mapping` are unchanged,
    /// otherwise reloads.
    pub fn get_or_load(&mut self, path: &Path, mapping: &ColumnMapping) -> Result<Arc<Analysis>> {
        let identity = SourceIdentity::of(path)?;

        if let Some((cached_identity, cached_mapping, analysis)) = &self.entry {
            if *cached_identity == identity && cached_mapping == mapping {
                debug!(path = %path.display(), "Dataset cache hit");
                return Ok(Arc::clone(analysis));
            }
        }

        debug!(path = %path.display(), "Dataset cache miss");
        let analysis = Arc::new(analyze(path, mapping)?);
        self.entry = Some((identity, mapping.clone(), Arc::clone(&analysis)));
        Ok(analysis)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
