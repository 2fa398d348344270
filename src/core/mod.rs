//! Core Module - Stats engine & lookup flow
//!
//! Distance statistics with its worker pool, prompt parsing and the
//! IP lookup orchestration.

pub mod aggregator;
pub mod command;
pub mod lookup;
pub mod stats;

pub use aggregator::*;
pub use command::*;
pub use lookup::*;
pub use stats::*;
