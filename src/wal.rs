use crate::common::Result;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Key of one WAL edit: the table and region it targets plus its sequence id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryKey {
    pub table: Vec<u8>,
    pub region: Vec<u8>,
    pub seq_id: u64,
}

/// A single WAL edit. The payload is opaque to the splitter; only the key
/// is inspected for demultiplexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    pub key: EntryKey,
    pub payload: Vec<u8>,
}

impl WalEntry {
    pub fn new(table: &[u8], region: &[u8], seq_id: u64, payload: Vec<u8>) -> WalEntry {
        WalEntry {
            key: EntryKey {
                table: table.to_vec(),
                region: region.to_vec(),
                seq_id,
            },
            payload,
        }
    }
}

/// Streaming reader over one log file: consecutive bincode-encoded entries.
pub struct WalReader<R> {
    reader: R,
    path: PathBuf,
}

impl<R: BufRead> WalReader<R> {
    pub fn new(reader: R, path: &Path) -> WalReader<R> {
        WalReader {
            reader,
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next entry, or `None` at a clean end of the stream. A failure in
    /// the middle of a record (short read or undecodable bytes) is an
    /// error; the caller decides whether it is recoverable.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        let path = self.path.clone();
        let at_end = self
            .reader
            .fill_buf()
            .map_err(|e| crate::error::SplitError::path_io(&path, e))?
            .is_empty();
        if at_end {
            return Ok(None);
        }
        let entry = bincode::deserialize_from(&mut self.reader)?;
        Ok(Some(entry))
    }
}
