use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::DataLoadError;
use super::loader;
use super::model::Dataset;

/// Identity of a listings source: the canonical path when it can be
/// resolved, the path as given otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey(PathBuf);

impl SourceKey {
    pub fn new(path: &Path) -> Self {
        SourceKey(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Memoizes loaded datasets per source.
///
/// Owned by whoever drives the session and passed around explicitly, so two
/// caches never share state. Failed loads are not remembered.
#[derive(Debug)]
pub struct DatasetCache {
    reference_year: i32,
    entries: HashMap<SourceKey, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(reference_year: i32) -> Self {
        Self {
            reference_year,
            entries: HashMap::new(),
        }
    }

    /// Return the cached dataset for `path`, reading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, DataLoadError> {
        let key = SourceKey::new(path);
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("Dataset cache hit for {}", key.path().display());
            return Ok(Arc::clone(hit));
        }

        let dataset = Arc::new(loader::load_file(path, self.reference_year)?);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Forget one source; the next `get_or_load` re-reads it.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(&SourceKey::new(path)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const CSV: &str = "\
,brand,fuelType,vehicleType,gearbox,model,price,powerPS,yearOfRegistration
0,bmw,diesel,limousine,manual,3er,12000,150,2015
";

    fn source(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("cleaned_df.csv");
        fs::write(&path, CSV).unwrap();
        path
    }

    #[test]
    fn repeated_loads_share_one_dataset() {
        let dir = TempDir::new().unwrap();
        let path = source(&dir);
        let mut cache = DatasetCache::new(2025);

        let first = cache.get_or_load(&path).unwrap();
        // Served from memory even once the file is gone.
        fs::remove_file(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn equivalent_paths_hit_the_same_entry() {
        let dir = TempDir::new().unwrap();
        let path = source(&dir);
        let dotted = dir.path().join(".").join("cleaned_df.csv");
        let mut cache = DatasetCache::new(2025);

        let a = cache.get_or_load(&path).unwrap();
        let b = cache.get_or_load(&dotted).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let dir = TempDir::new().unwrap();
        let path = source(&dir);
        let mut cache = DatasetCache::new(2025);

        let first = cache.get_or_load(&path).unwrap();
        assert!(cache.invalidate(&path));
        assert_eq!(cache.len(), 0);

        let extra_row = format!("{CSV}1,audi,petrol,kombi,automatic,a4,3000,75,2000\n");
        fs::write(&path, extra_row).unwrap();
        let second = cache.get_or_load(&path).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cleaned_df.csv");
        let mut cache = DatasetCache::new(2025);

        assert!(cache.get_or_load(&path).is_err());
        assert_eq!(cache.len(), 0);

        fs::write(&path, CSV).unwrap();
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 1);
    }

    #[test]
    fn clear_drops_every_source() {
        let dir = TempDir::new().unwrap();
        let path = source(&dir);
        let mut cache = DatasetCache::new(2025);
        cache.get_or_load(&path).unwrap();
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
