//! Helpers for consuming streamed generations.

pub mod stream;

pub use stream::{collect_response, collect_response_with};
