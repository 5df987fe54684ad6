//! Analysis modules.
//!
//! This module turns stored log records into chart series.

pub mod aggregator;

pub use aggregator::*;
