use crate::common::Result;
use crate::thread_pool::ThreadPool;
use crossbeam_channel::{bounded, Receiver, Sender};
use slog::{debug, error, warn, Logger};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Shutdown,
}

/// Fixed-size pool draining a shared queue. Workers are named
/// `split-writer-N` so the per-region write logs identify their thread.
pub struct SharedQueueThreadPool {
    sender: Sender<Message>,
    num_threads: u32,
    logger: Logger,
}

#[derive(Clone)]
struct Worker {
    queue: Receiver<Message>,
    logger: Logger,
}

impl Worker {
    fn run(&mut self) {
        while let Ok(Message::Run(job)) = self.queue.recv() {
            job();
        }
        debug!(
            self.logger,
            "Thread {} drained its queue, exiting",
            thread::current().name().unwrap_or("split-writer")
        );
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // A job that panicked takes its worker down; replace it so the
        // pool keeps its capacity.
        if thread::panicking() {
            let name = thread::current()
                .name()
                .unwrap_or("split-writer")
                .to_string();
            warn!(
                self.logger,
                "Thread {} died on a panicked job, respawning", name
            );
            let mut worker = self.clone();
            if let Err(e) = thread::Builder::new()
                .name(name)
                .spawn(move || worker.run())
            {
                error!(
                    self.logger,
                    "Unable to respawn writer thread, pool is short a worker: {}", e
                );
            }
        }
    }
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(num_threads: u32, logger: &Logger) -> Result<Self>
    where
        Self: Sized,
    {
        let (sender, receiver) = bounded::<Message>(4 * num_threads as usize);

        for i in 0..num_threads {
            let mut worker = Worker {
                queue: receiver.clone(),
                logger: logger.clone(),
            };
            thread::Builder::new()
                .name(format!("split-writer-{}", i))
                .spawn(move || worker.run())?;
        }
        Ok(SharedQueueThreadPool {
            num_threads,
            sender,
            logger: logger.clone(),
        })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender.send(Message::Run(Box::new(job))).unwrap();
    }
}

impl Drop for SharedQueueThreadPool {
    fn drop(&mut self) {
        debug!(
            self.logger,
            "Draining {} region writer thread(s)", self.num_threads
        );
        for _ in 0..self.num_threads {
            let _ = self.sender.send(Message::Shutdown);
        }
    }
}
