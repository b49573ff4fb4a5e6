use crate::common::Result;
use crate::error::SplitError;
use crate::thread_pool::ThreadPool;
use slog::{warn, Logger};
use std::io;

pub struct RayonThreadPool {
    rayon: rayon::ThreadPool,
}

impl ThreadPool for RayonThreadPool {
    fn new(num_threads: u32, logger: &Logger) -> Result<Self>
    where
        Self: Sized,
    {
        // Rayon keeps the worker alive across a panicking job; the handler
        // makes the death of the job itself visible.
        let panic_logger = logger.clone();
        let rayon = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads as usize)
            .thread_name(|i| format!("split-writer-{}", i))
            .panic_handler(move |_| {
                warn!(
                    panic_logger,
                    "Region writer job panicked, its result will never arrive"
                );
            })
            .build()
            .map_err(|e| SplitError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        Ok(RayonThreadPool { rayon })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.rayon.spawn(job);
    }
}
