use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{load_archive, LoadError};
use super::model::UnifiedTable;

// ---------------------------------------------------------------------------
// TableCache – memoized archive loads
// ---------------------------------------------------------------------------

/// Explicit load cache keyed by archive path. A path is read at most once
/// until [`TableCache::invalidate`]; repeated loads hand back the same
/// `Arc`. Failed loads are not cached, so the caller may retry.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: BTreeMap<PathBuf, Arc<UnifiedTable>>,
}

impl TableCache {
    /// Load `path`, reusing the cached table when present.
    pub fn load(&mut self, path: &Path) -> Result<Arc<UnifiedTable>, LoadError> {
        if let Some(table) = self.entries.get(path) {
            log::debug!("cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_archive(path)?);
        log::info!(
            "loaded {} rows ({} sources) from {}",
            table.len(),
            table.sources.len(),
            path.display()
        );
        self.entries.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    /// Forget the cached table for `path`; the next load re-reads the
    /// archive.
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write as _;

    use tempfile::TempDir;

    fn write_archive(dir: &TempDir, csv_text: &str) -> PathBuf {
        let path = dir.path().join("data.zip");
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("data.csv", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(csv_text.as_bytes()).unwrap();
        writer.finish().unwrap();
        path
    }

    fn sample_csv(price: u64) -> String {
        let mut csv = "Block Timestamp,Price,Volume,Source\n".to_string();
        for i in 0..5 {
            csv.push_str(&format!("2024-01-01 00:00:00,{price},1,src{i}\n"));
        }
        csv
    }

    #[test]
    fn repeated_loads_return_the_same_table() {
        let dir = TempDir::new().unwrap();
        let path = write_archive(&dir, &sample_csv(100_000_000));

        let mut cache = TableCache::default();
        let first = cache.load(&path).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn invalidate_forces_a_fresh_read() {
        let dir = TempDir::new().unwrap();
        let path = write_archive(&dir, &sample_csv(100_000_000));

        let mut cache = TableCache::default();
        let first = cache.load(&path).unwrap();

        // Rewrite the archive; the cache must keep serving the old table
        // until invalidated.
        write_archive(&dir, &sample_csv(200_000_000));
        let cached = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        cache.invalidate(&path);
        let fresh = cache.load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert_eq!(fresh.rows[0].price, 2.0);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.zip");

        let mut cache = TableCache::default();
        assert!(cache.load(&path).is_err());

        // Archive appears afterwards; the retry must succeed.
        write_archive(&dir, &sample_csv(100_000_000));
        assert!(cache.load(&path).is_ok());
    }
}
