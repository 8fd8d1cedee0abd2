//! Background Tasks Module
//!
//! # Tasks
//! - Sweep: optionally removes expired secondary entries at a fixed interval

mod sweep;

pub use sweep::spawn_sweep_task;
