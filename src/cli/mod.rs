//! CLI command implementations
//!
//! This module contains the implementation of the launch sequence.

pub mod launch;
