//! Supporting infrastructure.
//!
//! Provides the error types shared by the packet decoder and the frame
//! synchronizer.

pub mod errors;
