use crate::error::SplitError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Result<T> = std::result::Result<T, SplitError>;

/// Name of the per-region output file holding recovered edits.
pub const RECOVERED_EDITS_FILENAME: &str = "recovered.edits";
/// Directory under the root where unparseable logs are preserved.
pub const DEFAULT_CORRUPT_DIR: &str = ".corrupt";

const DEFAULT_BATCH_SIZE: usize = 3;
const DEFAULT_WRITER_THREADS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SplitterType {
    Batching,
    Sequential,
}

impl fmt::Display for SplitterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ThreadPoolType {
    SharedQ,
    Rayon,
}

impl fmt::Display for ThreadPoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

/// Immutable per-run settings, produced by the caller's configuration loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// How many log files are parsed into memory before flushing.
    pub batch_size: usize,
    /// Size of the region writer pool.
    pub writer_threads: u32,
    /// Quarantine unparseable logs instead of failing the split.
    pub parse_skip_errors: bool,
    /// Tolerate an interrupted writer pool. Writer I/O errors stay fatal.
    pub writer_skip_errors: bool,
    /// Quarantine directory name, created under the root directory.
    pub corrupt_dir_name: String,
    pub splitter: SplitterType,
    pub thread_pool: ThreadPoolType,
}

impl Default for SplitConfig {
    fn default() -> SplitConfig {
        SplitConfig {
            batch_size: DEFAULT_BATCH_SIZE,
            writer_threads: DEFAULT_WRITER_THREADS,
            parse_skip_errors: false,
            writer_skip_errors: false,
            corrupt_dir_name: DEFAULT_CORRUPT_DIR.to_string(),
            splitter: SplitterType::Batching,
            thread_pool: ThreadPoolType::SharedQ,
        }
    }
}
