//! Two-tier cache for processed per-surface texture data.
//!
//! Decoding source textures (DXT/INDEX16 plus palette conversion) is
//! expensive; the decoded bytes are stable for a given (surface,
//! palette) pair, so they are cached across sessions. The memory tier
//! is a bounded map checked first; the disk tier is unbounded and
//! survives restarts.
//!
//! The cache is advisory throughout: any failure degrades to "not
//! cached" instead of surfacing an error, because the payload can
//! always be regenerated from source assets at the cost of latency.
//!
//! # Disk layout
//!
//! ```text
//! <root>/
//!   1A/
//!     0000001A_00000003.texcache   raw payload bytes, no header
//!   7F/
//!     ...
//! ```
//!
//! Keys are `{surface:08X}_{palette:08X}`; the two-character prefix
//! directory bounds per-directory file counts.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use tracing::{debug, warn};

/// Soft cap on memory-tier entries. When full, the tier stops
/// accepting promotions; nothing already resident is evicted.
const MAX_MEMORY_ENTRIES: usize = 512;

const CACHE_EXTENSION: &str = "texcache";

/// Raised only at construction time: an unusable cache root is a
/// wiring bug, not a runtime condition.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tracks in-flight background disk writes so shutdown (and tests)
/// can wait for the queue to drain.
#[derive(Default)]
struct PendingWrites {
    count: Mutex<usize>,
    drained: Condvar,
}

impl PendingWrites {
    fn begin(&self) {
        *self.count.lock().expect("pending-write lock poisoned") += 1;
    }

    fn end(&self) {
        let mut count = self.count.lock().expect("pending-write lock poisoned");
        *count -= 1;
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    fn wait(&self) {
        let mut count = self.count.lock().expect("pending-write lock poisoned");
        while *count > 0 {
            count = self
                .drained
                .wait(count)
                .expect("pending-write lock poisoned");
        }
    }
}

/// Disk-backed cache for processed texture bytes, keyed by
/// (surface id, palette id). Safe for concurrent reads and inserts
/// from parallel decode workers.
pub struct TextureDiskCache {
    root: PathBuf,
    memory: RwLock<FxHashMap<String, Arc<[u8]>>>,
    memory_capacity: usize,
    pending: Arc<PendingWrites>,
}

impl TextureDiskCache {
    /// Opens (creating if needed) a cache rooted at `root`. Failure to
    /// create the root directory fails fast: a misconfigured cache
    /// location is a wiring bug, not a runtime condition.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(TextureDiskCache {
            root,
            memory: RwLock::new(FxHashMap::default()),
            memory_capacity: MAX_MEMORY_ENTRIES,
            pending: Arc::new(PendingWrites::default()),
        })
    }

    /// Overrides the memory-tier soft cap. Mainly for tests; the
    /// default of 512 suits production worlds.
    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity;
        self
    }

    fn cache_key(surface_id: u32, palette_id: u32) -> String {
        format!("{surface_id:08X}_{palette_id:08X}")
    }

    /// File location for a key: two-character hex prefix directory
    /// plus `<key>.texcache`. Sharding bounds per-directory file
    /// counts; it is not a security measure.
    fn cache_path(&self, key: &str) -> PathBuf {
        self.root.join(&key[..2]).join(format!("{key}.{CACHE_EXTENSION}"))
    }

    // ─── Lookup / store ─────────────────────────────────────────────

    /// Returns the cached payload for (surface, palette), or `None` if
    /// absent. Checks the memory tier first; a disk hit is promoted
    /// into memory when the soft cap allows. An unreadable disk entry
    /// is deleted and reported absent.
    pub fn try_get(&self, surface_id: u32, palette_id: u32) -> Option<Arc<[u8]>> {
        let key = Self::cache_key(surface_id, palette_id);

        {
            let memory = self.memory.read().expect("memory tier lock poisoned");
            if let Some(data) = memory.get(&key) {
                return Some(Arc::clone(data));
            }
        }

        let path = self.cache_path(&key);
        if !path.exists() {
            return None;
        }

        match std::fs::read(&path) {
            Ok(bytes) => {
                let data: Arc<[u8]> = bytes.into();
                let mut memory = self.memory.write().expect("memory tier lock poisoned");
                if memory.len() < self.memory_capacity {
                    memory.insert(key, Arc::clone(&data));
                }
                Some(data)
            }
            Err(e) => {
                // Corrupt or unreadable entry: drop it and regenerate
                // from source next time.
                warn!(path = %path.display(), error = %e, "removing unreadable cache entry");
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    /// Stores a processed payload in both tiers. The memory insert
    /// honors the soft cap; the disk write is scheduled as
    /// fire-and-forget background work whose failure is logged and
    /// otherwise ignored.
    pub fn store(&self, surface_id: u32, palette_id: u32, data: Vec<u8>) {
        let key = Self::cache_key(surface_id, palette_id);
        let data: Arc<[u8]> = data.into();

        {
            let mut memory = self.memory.write().expect("memory tier lock poisoned");
            if memory.len() < self.memory_capacity || memory.contains_key(&key) {
                memory.insert(key.clone(), Arc::clone(&data));
            }
        }

        let path = self.cache_path(&key);
        let pending = Arc::clone(&self.pending);
        pending.begin();
        rayon::spawn(move || {
            if let Err(e) = write_entry(&path, &data) {
                warn!(path = %path.display(), error = %e, "cache disk write failed");
            }
            pending.end();
        });
    }

    // ─── Maintenance ────────────────────────────────────────────────

    /// Empties the memory tier and deletes the disk tier, recreating
    /// the root directory. Does not wait for in-flight background
    /// writes; a racing write may leave a stray file that the next
    /// clear removes or the next store overwrites.
    pub fn clear(&self) {
        self.memory
            .write()
            .expect("memory tier lock poisoned")
            .clear();

        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            warn!(root = %self.root.display(), error = %e, "failed to clear cache directory");
        }
        if let Err(e) = std::fs::create_dir_all(&self.root) {
            warn!(root = %self.root.display(), error = %e, "failed to recreate cache directory");
        }
        debug!(root = %self.root.display(), "cache cleared");
    }

    /// Best-effort total size of all cache files on disk. Returns 0 on
    /// any enumeration failure.
    pub fn disk_usage_bytes(&self) -> u64 {
        scan_disk_usage(&self.root).unwrap_or(0)
    }

    /// Blocks until all scheduled background disk writes finish.
    /// Intended for orderly shutdown and for tests; normal operation
    /// never needs it.
    pub fn wait_for_pending_writes(&self) {
        self.pending.wait();
    }
}

fn write_entry(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)
}

fn scan_disk_usage(root: &Path) -> std::io::Result<u64> {
    let mut total = 0u64;
    for shard in std::fs::read_dir(root)? {
        let shard = shard?.path();
        if !shard.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(&shard)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == CACHE_EXTENSION) {
                total += entry.metadata()?.len();
            }
        }
    }
    Ok(total)
}
