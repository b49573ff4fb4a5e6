use crate::common::Result;
use crate::fs::{FileStatus, FileSystem};
use crate::wal::{WalEntry, WalReader};
use slog::{warn, Logger};
use std::collections::BTreeMap;

/// One batch's region queues, ordered by region key. Populated from the
/// batch's parsed logs, drained by the flusher, discarded at batch end.
pub type BatchMap = BTreeMap<Vec<u8>, Vec<WalEntry>>;

/// Reads every entry of one log file, in write order.
///
/// A zero-length file is an append that never made it to the filesystem;
/// it yields an empty sequence with a warning, not an error. Any mid-stream
/// failure surfaces as an error and the caller applies the skip policy.
pub fn parse_log<F: FileSystem>(
    fs: &F,
    file: &FileStatus,
    logger: &Logger,
) -> Result<Vec<WalEntry>> {
    if file.len == 0 {
        warn!(
            logger,
            "File {} might be still open, length is 0",
            file.path.display()
        );
        return Ok(Vec::new());
    }
    let mut reader = WalReader::new(fs.open_reader(&file.path)?, &file.path);
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry()? {
        entries.push(entry);
    }
    Ok(entries)
}

/// Merges one fully parsed log into the batch map, creating region queues
/// lazily. Only called after the whole file parsed cleanly, so a corrupt
/// log never contributes partial entries.
pub fn add_to_batch(batch: &mut BatchMap, entries: Vec<WalEntry>) {
    for entry in entries {
        batch
            .entry(entry.key.region.clone())
            .or_insert_with(Vec::new)
            .push(entry);
    }
}
