//! Utility modules: usage tracking.

pub mod usage;
