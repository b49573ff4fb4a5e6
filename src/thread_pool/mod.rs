use crate::common::Result;
use slog::Logger;

mod rayon_tp;
mod sharedq_tp;
pub use rayon_tp::RayonThreadPool;
pub use sharedq_tp::SharedQueueThreadPool;

pub trait ThreadPool {
    /// The logger outlives the pool in every pool event: worker deaths,
    /// respawns and the shutdown drain are reported through it.
    fn new(num_threads: u32, logger: &Logger) -> Result<Self>
    where
        Self: Sized;
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}
