pub mod customer_history;
pub mod error;
pub mod executor;
pub mod job_queue;
pub mod period;
pub mod progress_tracker;
pub mod rate_resolver;
pub mod recorder;
pub mod revenue;
pub mod run_context;
pub mod run_lock;
pub mod spiff_engine;
pub mod worker;

#[cfg(test)]
mod tests;
