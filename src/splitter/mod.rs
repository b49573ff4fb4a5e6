use crate::common::{Result, SplitConfig, SplitterType};
use crate::error::SplitError;
use crate::fs::{FileStatus, FileSystem};
use crate::writer::WriterTable;
use slog::{info, warn, Logger};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

mod batching;
mod demux;
mod flush;
mod sequential;

pub use batching::BatchingSplitter;
pub use demux::BatchMap;
pub use sequential::SequentialSplitter;

/// Strategy seam for the split algorithm. The variant is chosen from
/// configuration at construction time.
pub trait LogSplitter {
    fn split<F: FileSystem>(
        &self,
        root_dir: &Path,
        src_dir: &Path,
        old_log_dir: &Path,
        fs: Arc<F>,
    ) -> Result<Vec<PathBuf>>;
}

/// Splits every log under `src_dir` into per-region recovered-edits files
/// beneath `root_dir`, archiving the inputs into `old_log_dir`.
///
/// This is the entry point the master's server-shutdown handler calls.
/// Safe to re-run after a partial failure: pre-existing recovered-edits
/// files are replaced. The caller holds the split-log lock; a single writer
/// per source directory is assumed, not enforced here.
pub fn split_log<F: FileSystem>(
    root_dir: &Path,
    src_dir: &Path,
    old_log_dir: &Path,
    fs: Arc<F>,
    config: &SplitConfig,
    logger: &Logger,
) -> Result<Vec<PathBuf>> {
    info!(
        logger,
        "Using {} splitter, {} pool", config.splitter, config.thread_pool
    );
    match config.splitter {
        SplitterType::Batching => {
            BatchingSplitter::new(config.clone(), logger.clone()).split(root_dir, src_dir, old_log_dir, fs)
        }
        SplitterType::Sequential => {
            SequentialSplitter::new(config.clone(), logger.clone()).split(root_dir, src_dir, old_log_dir, fs)
        }
    }
}

/// Where a processed log is archived; the filename is preserved.
pub fn archive_path(old_log_dir: &Path, log: &Path) -> PathBuf {
    match log.file_name() {
        Some(name) => old_log_dir.join(name),
        None => old_log_dir.to_path_buf(),
    }
}

/// Lists the source directory, handling the two trivial outcomes: a missing
/// directory and an empty one (which is removed). `None` means the split is
/// already complete with an empty result.
fn list_logs<F: FileSystem>(
    fs: &F,
    src_dir: &Path,
    logger: &Logger,
) -> Result<Option<Vec<FileStatus>>> {
    if !fs.exists(src_dir)? {
        info!(
            logger,
            "Log directory {} does not exist, nothing to split",
            src_dir.display()
        );
        return Ok(None);
    }
    let files = fs.list(src_dir)?;
    if files.is_empty() {
        info!(logger, "No logs to split in {}", src_dir.display());
        fs.delete_recursive(src_dir)?;
        return Ok(None);
    }
    Ok(Some(files))
}

/// A file appearing in the source directory that the run never accounted
/// for means a presumed-dead server came back and wrote mid-split.
fn check_orphans<F: FileSystem>(
    fs: &F,
    src_dir: &Path,
    processed: &[PathBuf],
    corrupted: &[PathBuf],
) -> Result<()> {
    let listed = fs.list(src_dir)?.len();
    if listed != processed.len() + corrupted.len() {
        return Err(SplitError::OrphanLog {
            listed,
            processed: processed.len(),
            corrupted: corrupted.len(),
        });
    }
    Ok(())
}

/// Moves corrupted logs into quarantine and processed logs into the
/// archive, creating both directories on demand.
fn archive_logs<F: FileSystem>(
    fs: &F,
    processed: &[PathBuf],
    corrupted: &[PathBuf],
    old_log_dir: &Path,
    corrupt_dir: &Path,
    logger: &Logger,
) -> Result<()> {
    if !corrupted.is_empty() {
        fs.mkdirs(corrupt_dir)?;
    }
    fs.mkdirs(old_log_dir)?;
    for log in corrupted {
        let target = corrupt_dir.join(log.file_name().unwrap_or_default());
        fs.rename(log, &target)?;
        warn!(
            logger,
            "Moved corrupt log {} to {}",
            log.display(),
            target.display()
        );
    }
    for log in processed {
        let target = archive_path(old_log_dir, log);
        fs.rename(log, &target)?;
        info!(
            logger,
            "Archived processed log {} to {}",
            log.display(),
            target.display()
        );
    }
    Ok(())
}

/// Finalization shared by both splitters. Writers are closed on every exit
/// path; archival, source-directory removal and the result paths happen
/// only when the run succeeded.
fn finish_split<F: FileSystem>(
    fs: &F,
    root_dir: &Path,
    src_dir: &Path,
    old_log_dir: &Path,
    corrupt_dir_name: &str,
    writers: &WriterTable<F::Writer>,
    outcome: Result<(Vec<PathBuf>, Vec<PathBuf>)>,
    start: Instant,
    logger: &Logger,
) -> Result<Vec<PathBuf>> {
    let outcome = outcome.and_then(|(processed, corrupted)| {
        archive_logs(
            fs,
            &processed,
            &corrupted,
            old_log_dir,
            &root_dir.join(corrupt_dir_name),
            logger,
        )
    });
    match outcome {
        Ok(()) => {
            let paths = writers.close_all(logger)?;
            fs.delete_recursive(src_dir)?;
            info!(
                logger,
                "Split of {} completed in {}ms, {} recovered edits file(s)",
                src_dir.display(),
                start.elapsed().as_millis(),
                paths.len()
            );
            Ok(paths)
        }
        Err(e) => {
            if let Err(close_err) = writers.close_all(logger) {
                warn!(
                    logger,
                    "Failed to close region writers after split error: {}", close_err
                );
            }
            Err(e)
        }
    }
}
