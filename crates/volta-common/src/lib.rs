//! Volta Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the volta platform.
//!
//! # Overview
//!
//! This crate provides common functionality used across volta workspace
//! members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Checksums**: Content integrity utilities for stored datasets
//! - **Logging**: Centralized tracing configuration and initialization
//!
//! # Example
//!
//! ```no_run
//! use volta_common::checksum::sha256_hex;
//!
//! let digest = sha256_hex(b"potential,current\n0.1,0.002\n");
//! println!("Content checksum: {}", digest);
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{Result, VoltaError};
