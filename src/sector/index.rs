use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use anyhow::{bail, Context, Result};

use super::SectorPolygonSet;
use crate::error::SectorError;
use crate::types::StateCode;

/// Hands out the polygon set for a state.
///
/// A trait seam so the pipeline can run against in-memory boundaries in
/// tests; the disk-backed implementation is [`SectorIndex`].
pub trait SectorProvider: Send + Sync {
    fn sectors_for(&self, state: StateCode) -> Result<Arc<SectorPolygonSet>, SectorError>;
}

/// Disk-backed [`SectorProvider`] over a root of per-state shapefile
/// directories (`{root}/{code}/*.shp`), as laid out by `fetch-data`.
///
/// States load lazily on first use and stay cached for the process
/// lifetime; the sets themselves are immutable, so the lock only guards
/// cache insertion.
pub struct SectorIndex {
    root: PathBuf,
    cache: RwLock<AHashMap<StateCode, Arc<SectorPolygonSet>>>,
}

impl SectorIndex {
    pub fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf(), cache: RwLock::new(AHashMap::new()) }
    }

    fn load_state(&self, state: StateCode) -> Result<SectorPolygonSet> {
        let dir = self.root.join(state.as_str());
        let shp = first_shapefile_in(&dir)
            .with_context(|| format!("No sector shapefile under {}", dir.display()))?;
        SectorPolygonSet::from_shapefile(&shp)
    }
}

impl SectorProvider for SectorIndex {
    fn sectors_for(&self, state: StateCode) -> Result<Arc<SectorPolygonSet>, SectorError> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(set) = cache.get(&state) {
                return Ok(Arc::clone(set));
            }
        }

        let loaded = Arc::new(self.load_state(state).map_err(|source| SectorError::Load {
            state: state.as_str().to_string(),
            source: source.into(),
        })?);
        tracing::info!(%state, sectors = loaded.len(), "loaded sector polygon set");

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(cache.entry(state).or_insert(loaded)))
    }
}

/// First `.shp` file in a directory, in name order for determinism.
fn first_shapefile_in(dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("shp")))
        .collect();
    candidates.sort();

    match candidates.into_iter().next() {
        Some(path) => Ok(path),
        None => bail!("no .shp file in {}", dir.display()),
    }
}
