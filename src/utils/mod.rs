//! Utils Module - Helper Functions & Shared Utilities
//!
//! TTL cache, great-circle math and application constants.

pub mod cache;
pub mod constants;
pub mod geo;

pub use cache::*;
pub use constants::*;
pub use geo::*;
