//! Search Driver (C5): turns a [`crate::filter::CompiledFilter`] and a
//! batch range into a running search — sequential batch/lane enumeration
//! ([`batch`]), a pausable/cancellable thread pool ([`pool`]), and
//! lock-free progress accounting ([`progress`]).

pub mod batch;
pub mod pool;
pub mod progress;

pub use pool::{SearchConfig, SearchDriver};
pub use progress::ProgressSnapshot;
