//! Background Tasks Module
//!
//! Contains background tasks that run periodically during service operation.
//!
//! # Tasks
//! - TTL Cleanup: Sweeps expired entries from the memory backend

mod cleanup;

pub use cleanup::spawn_cleanup_task;
