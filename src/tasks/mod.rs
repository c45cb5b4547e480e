//! Background Tasks Module
//!
//! Contains the periodic work a cache runs alongside its callers.
//!
//! # Tasks
//! - Cleaner: samples the table and removes expired entries every interval

mod cleaner;

pub(crate) use cleaner::{spawn_cleaner, CleanerContext};
