//! Background Tasks Module
//!
//! Recurring tasks owned by cache instances.
//!
//! # Tasks
//! - TTL Sweeper: purges expired entries at a configured interval,
//!   independently of read/write traffic

mod sweeper;

pub use sweeper::spawn_sweeper;
