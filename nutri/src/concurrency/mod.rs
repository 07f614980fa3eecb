//! Concurrency primitives shared by the job service and its workers.
//!
//! Producers and workers only communicate through the [`queue::JobQueue`]. The
//! [`shutdown`] channel broadcasts the end of the pool's life to every worker at once, so that
//! idle workers stop waiting on the queue while busy ones finish the job in hand.

pub mod queue;
pub mod shutdown;
