//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cleanup: Drops expired in-memory verdicts at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
