use std::collections::VecDeque;

use tokio::sync::{Mutex, Notify};

use crate::jobs::Job;

/// Unbounded FIFO queue handing jobs from producers to workers.
///
/// [`JobQueue::dequeue`] waits until a job is available. Each job is delivered to exactly one
/// caller, in the order it was enqueued.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
    notify: Notify,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `job` to the back of the queue and wakes one waiting worker.
    pub async fn enqueue(&self, job: Job) {
        self.jobs.lock().await.push_back(job);
        // `notify_one` stores a permit when nobody is waiting, so a worker that is about to
        // wait does not miss the job.
        self.notify.notify_one();
    }

    /// Removes the job at the front of the queue, waiting for one if the queue is empty.
    ///
    /// This method is cancel safe: if the returned future is dropped before completing, no job
    /// is removed from the queue.
    pub async fn dequeue(&self) -> Job {
        loop {
            if let Some(job) = self.try_dequeue().await {
                return job;
            }

            self.notify.notified().await;
        }
    }

    /// Removes the job at the front of the queue, if any, without waiting.
    pub async fn try_dequeue(&self) -> Option<Job> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.pop_front();

        // Another worker may have consumed the permit meant for a job that is still queued.
        if job.is_some() && !jobs.is_empty() {
            self.notify.notify_one();
        }

        job
    }

    /// Returns the number of queued jobs.
    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    /// Returns `true` if no job is queued.
    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }
}
