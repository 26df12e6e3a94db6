//! CLI command implementations.

pub mod compress;
pub mod pipe;
