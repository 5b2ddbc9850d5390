//! plugreg library
//!
//! This module exports the internal components of the `plugreg` binary for testing purposes.

pub mod config;
pub mod report;
