use crate::common::{Result, RECOVERED_EDITS_FILENAME};
use crate::error::SplitError;
use crate::fs::FileSystem;
use crate::wal::{EntryKey, WalEntry};
use slog::{info, warn, Logger};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Directory name of a region under its table: hex of the raw region key.
pub fn region_dir_name(region: &[u8]) -> String {
    hex::encode(region)
}

pub fn table_dir_name(table: &[u8]) -> String {
    String::from_utf8_lossy(table).into_owned()
}

/// Path of the recovered-edits file for the region `key` points at.
pub fn recovered_edits_path(root_dir: &Path, key: &EntryKey) -> PathBuf {
    root_dir
        .join(table_dir_name(&key.table))
        .join(region_dir_name(&key.region))
        .join(RECOVERED_EDITS_FILENAME)
}

/// Open append handle for one region's recovered-edits file.
pub struct RegionWriter<W: Write> {
    path: PathBuf,
    writer: W,
    edits: u64,
}

impl<W: Write> RegionWriter<W> {
    pub fn append(&mut self, entry: &WalEntry) -> Result<()> {
        bincode::serialize_into(&mut self.writer, entry)?;
        self.edits += 1;
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| SplitError::path_io(&self.path, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Edits appended over the writer's lifetime.
    pub fn edits(&self) -> u64 {
        self.edits
    }
}

/// Creates the writer for a region, replacing any file a previous failed
/// split attempt left behind.
pub fn create_region_writer<F: FileSystem>(
    fs: &F,
    root_dir: &Path,
    key: &EntryKey,
    logger: &Logger,
) -> Result<RegionWriter<F::Writer>> {
    let region_dir = root_dir
        .join(table_dir_name(&key.table))
        .join(region_dir_name(&key.region));
    fs.mkdirs(&region_dir)?;
    let path = region_dir.join(RECOVERED_EDITS_FILENAME);
    if fs.exists(&path)? {
        let len = fs.file_len(&path)?;
        warn!(
            logger,
            "Found existing recovered edits file {}, length={}, removing it",
            path.display(),
            len
        );
        fs.delete(&path)?;
    }
    info!(
        logger,
        "Creating writer for region {}, path={}",
        region_dir_name(&key.region),
        path.display()
    );
    let writer = fs.open_writer(&path)?;
    Ok(RegionWriter {
        path,
        writer,
        edits: 0,
    })
}

/// Region writers for one split run, shared by every batch.
///
/// Insertion is serialized by the outer mutex. The per-writer mutex is
/// uncontended in practice: a batch submits at most one task per region and
/// batches never overlap.
pub struct WriterTable<W: Write> {
    writers: Mutex<BTreeMap<Vec<u8>, Arc<Mutex<RegionWriter<W>>>>>,
}

impl<W: Write + Send> WriterTable<W> {
    pub fn new() -> WriterTable<W> {
        WriterTable {
            writers: Mutex::new(BTreeMap::new()),
        }
    }

    /// Looks up the writer for `key`'s region, creating it on first use.
    pub fn get_or_create<F>(
        &self,
        fs: &F,
        root_dir: &Path,
        key: &EntryKey,
        logger: &Logger,
    ) -> Result<Arc<Mutex<RegionWriter<W>>>>
    where
        F: FileSystem<Writer = W>,
    {
        let mut writers = self.writers.lock().unwrap();
        if let Some(writer) = writers.get(&key.region) {
            return Ok(Arc::clone(writer));
        }
        let writer = Arc::new(Mutex::new(create_region_writer(fs, root_dir, key, logger)?));
        writers.insert(key.region.clone(), Arc::clone(&writer));
        Ok(writer)
    }

    /// Closes every writer and returns the recovered-edits paths in
    /// region-key order. Close failures are logged; the first one is
    /// returned after the rest have still been closed.
    pub fn close_all(&self, logger: &Logger) -> Result<Vec<PathBuf>> {
        let writers = self.writers.lock().unwrap();
        let mut paths = Vec::with_capacity(writers.len());
        let mut first_err = None;
        for writer in writers.values() {
            let mut writer = writer.lock().unwrap();
            if let Err(e) = writer.close() {
                warn!(
                    logger,
                    "Failed to close writer {}: {}",
                    writer.path().display(),
                    e
                );
                if first_err.is_none() {
                    first_err = Some(e);
                }
                continue;
            }
            paths.push(writer.path().to_path_buf());
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(paths),
        }
    }
}

impl<W: Write + Send> Default for WriterTable<W> {
    fn default() -> Self {
        WriterTable::new()
    }
}
