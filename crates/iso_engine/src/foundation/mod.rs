//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and bounding volumes
//! - Mutation-tolerant collections
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
