mod common;
mod error;
mod fs;
mod splitter;
mod thread_pool;
mod wal;
mod writer;

pub use common::{
    Result, SplitConfig, SplitterType, ThreadPoolType, DEFAULT_CORRUPT_DIR,
    RECOVERED_EDITS_FILENAME,
};
pub use error::SplitError;
pub use fs::{FileStatus, FileSystem, LocalFs};
pub use splitter::{
    archive_path, split_log, BatchMap, BatchingSplitter, LogSplitter, SequentialSplitter,
};
pub use thread_pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};
pub use wal::{EntryKey, WalEntry, WalReader};
pub use writer::{
    recovered_edits_path, region_dir_name, table_dir_name, RegionWriter, WriterTable,
};
