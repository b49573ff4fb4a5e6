use crate::common::{Result, SplitConfig, ThreadPoolType};
use crate::fs::{FileStatus, FileSystem};
use crate::splitter::demux::{self, BatchMap};
use crate::splitter::{check_orphans, finish_split, flush, list_logs, LogSplitter};
use crate::thread_pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};
use crate::writer::WriterTable;
use slog::{info, warn, Logger};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// The default splitter: parses logs in fixed-size batches on the caller
/// thread, then drains each batch into the region writers in parallel.
/// Memory stays bounded by batch size, not by the size of the directory.
pub struct BatchingSplitter {
    config: SplitConfig,
    logger: Logger,
}

impl BatchingSplitter {
    pub fn new(config: SplitConfig, logger: Logger) -> BatchingSplitter {
        BatchingSplitter { config, logger }
    }

    fn run<F: FileSystem, P: ThreadPool>(
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

        let writers = Arc::new(WriterTable::new());
        let outcome = self.run_batches::<F, P>(root_dir, src_dir, &fs, &files, &writers);
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

    fn run_batches<F: FileSystem, P: ThreadPool>(
        &self,
        root_dir: &Path,
        src_dir: &Path,
        fs: &Arc<F>,
        files: &[FileStatus],
        writers: &Arc<WriterTable<F::Writer>>,
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
                match demux::parse_log(&**fs, file, &self.logger) {
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
            flush::flush_batch::<F, P>(
                batch_map,
                writers,
                fs,
                root_dir,
                self.config.writer_threads,
                self.config.writer_skip_errors,
                &self.logger,
            )?;
        }

        check_orphans(&**fs, src_dir, &processed, &corrupted)?;
        Ok((processed, corrupted))
    }
}

impl LogSplitter for BatchingSplitter {
    fn split<F: FileSystem>(
        &self,
        root_dir: &Path,
        src_dir: &Path,
        old_log_dir: &Path,
        fs: Arc<F>,
    ) -> Result<Vec<PathBuf>> {
        match self.config.thread_pool {
            ThreadPoolType::SharedQ => {
                self.run::<F, SharedQueueThreadPool>(root_dir, src_dir, old_log_dir, fs)
            }
            ThreadPoolType::Rayon => {
                self.run::<F, RayonThreadPool>(root_dir, src_dir, old_log_dir, fs)
            }
        }
    }
}
