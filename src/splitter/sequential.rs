use crate::common::{Result, SplitConfig};
use crate::fs::{FileStatus, FileSystem};
use crate::splitter::demux::{self, BatchMap};
use crate::splitter::{check_orphans, finish_split, list_logs, LogSplitter};
use crate::writer::{region_dir_name, WriterTable};
use slog::{info, warn, Logger};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Alternate splitter that appends region queues inline on the caller
/// thread. Same batching, bookkeeping and archival as the batching
/// splitter, no writer pool.
pub struct SequentialSplitter {
    config: SplitConfig,
    logger: Logger,
}

impl SequentialSplitter {
    pub fn new(config: SplitConfig, logger: Logger) -> SequentialSplitter {
        SequentialSplitter { config, logger }
    }

    fn run_batches<F: FileSystem>(
        &self,
        root_dir: &Path,
        src_dir: &Path,
        fs: &F,
        files: &[FileStatus],
        writers: &WriterTable<F::Writer>,
    ) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let mut processed = Vec::new();
        let mut corrupted = Vec::new();
        let batch_size = self.config.batch_size.max(1);

        for (batch_idx, batch) in files.chunks(batch_size).enumerate() {
            let mut batch_map = BatchMap::new();
            for (offset, file) in batch.iter().enumerate() {
                info!(
                    self.logger,
                    "Splitting hlog {} of {}: {}, length={}",
                    batch_idx * batch_size + offset + 1,
                    files.len(),
                    file.path.display(),
                    file.len
                );
                fs.recover_lease(&file.path)?;
                match demux::parse_log(fs, file, &self.logger) {
                    Ok(entries) => {
                        demux::add_to_batch(&mut batch_map, entries);
                        processed.push(file.path.clone());
                    }
                    Err(e) => {
                        if !self.config.parse_skip_errors {
                            return Err(e);
                        }
                        warn!(
                            self.logger,
                            "Unable to parse log {}, marking as corrupted: {}",
                            file.path.display(),
                            e
                        );
                        corrupted.push(file.path.clone());
                    }
                }
            }
            self.flush_inline(root_dir, fs, batch_map, writers)?;
        }

        check_orphans(fs, src_dir, &processed, &corrupted)?;
        Ok((processed, corrupted))
    }

    fn flush_inline<F: FileSystem>(
        &self,
        root_dir: &Path,
        fs: &F,
        batch: BatchMap,
        writers: &WriterTable<F::Writer>,
    ) -> Result<()> {
        for (region, entries) in batch {
            let start = Instant::now();
            let key = match entries.first() {
                Some(entry) => entry.key.clone(),
                None => continue,
            };
            let writer = writers.get_or_create(fs, root_dir, &key, &self.logger)?;
            let mut writer = writer.lock().unwrap();
            for entry in &entries {
                writer.append(entry)?;
            }
            info!(
                self.logger,
                "Applied {} edits to region {} in {}ms",
                entries.len(),
                region_dir_name(&region),
                start.elapsed().as_millis()
            );
        }
        Ok(())
    }
}

impl LogSplitter for SequentialSplitter {
    fn split<F: FileSystem>(
        &self,
        root_dir: &Path,
        src_dir: &Path,
        old_log_dir: &Path,
        fs: Arc<F>,
    ) -> Result<Vec<PathBuf>> {
        let start = Instant::now();
        let files = match list_logs(&*fs, src_dir, &self.logger)? {
            Some(files) => files,
            None => return Ok(Vec::new()),
        };
        info!(
            self.logger,
            "Splitting {} hlog(s) in {}",
            files.len(),
            src_dir.display()
        );

        let writers = WriterTable::new();
        let outcome = self.run_batches(root_dir, src_dir, &*fs, &files, &writers);
        finish_split(
            &*fs,
            root_dir,
            src_dir,
            old_log_dir,
            &self.config.corrupt_dir_name,
            &writers,
            outcome,
            start,
            &self.logger,
        )
    }
}
