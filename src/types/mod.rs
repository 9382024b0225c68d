//! Core types for Rill.

pub mod generation;
pub mod message;
pub mod metadata;
pub mod stream;
pub mod usage;

pub use generation::*;
pub use message::*;
pub use metadata::*;
pub use stream::*;
pub use usage::*;
