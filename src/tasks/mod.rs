//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expired-entry sweep: Purges expired entries across every namespace

mod sweep;

pub use sweep::spawn_sweep_task;
