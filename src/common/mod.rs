//! Common types and error definitions for frenet_planner
//!
//! This module provides the foundational building blocks used across
//! the planner subsystems.

pub mod types;
pub mod error;

pub use types::*;
pub use error::*;
