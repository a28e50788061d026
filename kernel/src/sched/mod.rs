//! Thread scheduling.
//!
//! A single-CPU round-robin scheduler: one ready queue, one current
//! thread, and a wait-channel table that backs [`crate::sync`]'s blocking
//! primitives. See [`scheduler`] for the implementation.

pub mod scheduler;
pub mod thread;

pub use thread::{ThreadId, ThreadState};
