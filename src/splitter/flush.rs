use crate::common::Result;
use crate::error::SplitError;
use crate::fs::FileSystem;
use crate::splitter::demux::BatchMap;
use crate::thread_pool::ThreadPool;
use crate::wal::WalEntry;
use crate::writer::{region_dir_name, WriterTable};
use crossbeam_channel::{unbounded, RecvTimeoutError};
use slog::{info, warn, Logger};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Interval between progress reports while draining a batch.
const QUIESCE_INTERVAL: Duration = Duration::from_secs(5);

/// Drains one batch map into the shared writer table, one pool task per
/// region. Returns once every task has reported.
///
/// The pool lives for one batch: tasks are submitted, the pool is dropped,
/// and the caller thread waits on the result channel with a bounded poll so
/// progress stays observable. Writer I/O failures are fatal regardless of
/// any skip flag; `skip_interruption` only tolerates the pool dying
/// underneath us, which is logged as possible data loss either way.
pub fn flush_batch<F, P>(
    batch: BatchMap,
    writers: &Arc<WriterTable<F::Writer>>,
    fs: &Arc<F>,
    root_dir: &Path,
    writer_threads: u32,
    skip_interruption: bool,
    logger: &Logger,
) -> Result<()>
where
    F: FileSystem,
    P: ThreadPool,
{
    let total = batch.len();
    if total == 0 {
        return Ok(());
    }

    // A zero-thread pool could never drain its queue; treat it as one.
    let pool = P::new(writer_threads.max(1), logger)?;
    let (sender, receiver) = unbounded();
    for (region, entries) in batch {
        let sender = sender.clone();
        let writers = Arc::clone(writers);
        let fs = Arc::clone(fs);
        let root_dir = root_dir.to_path_buf();
        let logger = logger.clone();
        pool.spawn(move || {
            let result = write_region_edits(&writers, &*fs, &root_dir, &region, entries, &logger);
            // The receiver is gone once the wait was abandoned.
            let _ = sender.send(result);
        });
    }
    drop(sender);
    drop(pool);

    let mut done = 0;
    let mut first_err: Option<SplitError> = None;
    while done < total {
        match receiver.recv_timeout(QUIESCE_INTERVAL) {
            Ok(result) => {
                done += 1;
                if let Err(e) = result {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                info!(
                    logger,
                    "Waiting for region writers to finish, {} of {} done", done, total
                );
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(
                    logger,
                    "Interrupted while waiting for region writers, possible data loss"
                );
                if skip_interruption {
                    break;
                }
                return Err(SplitError::Interrupted);
            }
        }
    }

    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn write_region_edits<F: FileSystem>(
    writers: &WriterTable<F::Writer>,
    fs: &F,
    root_dir: &Path,
    region: &[u8],
    entries: Vec<WalEntry>,
    logger: &Logger,
) -> Result<()> {
    let start = Instant::now();
    let key = match entries.first() {
        Some(entry) => entry.key.clone(),
        None => return Ok(()),
    };
    let writer = writers.get_or_create(fs, root_dir, &key, logger)?;
    let mut writer = writer.lock().unwrap();
    for entry in &entries {
        writer.append(entry)?;
    }
    info!(
        logger,
        "Applied {} edits to region {} in {}ms",
        entries.len(),
        region_dir_name(region),
        start.elapsed().as_millis()
    );
    Ok(())
}
