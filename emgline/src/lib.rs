//! Parser and decoder for the 4b/5b line-coded sample stream emitted by
//! ADS129x-based EMG acquisition firmware.
//!
//! ## Stream Organization
//!
//! The device streams conversion results over a raw serial link with no
//! clock line and no checksums. Every conversion becomes a 5-byte
//! **packet**: 5 alignment bits (the sync marker) followed by seven 5-bit
//! line symbols carrying a channel nibble and a signed 24-bit sample.
//! Eight consecutive packets with channel tags 1..=8 form one **frame**,
//! the atomic unit of output.
//!
//! Because the line code carries no checksum, the only corruption signals
//! are an unexpected sync-marker bit or a broken channel sequence;
//! recovery is a byte-wise rescan for the next channel-1 packet boundary.
//!
//! ## Quick Start
//!
//! 1. Snapshot the captured bytes once acquisition has stopped
//! 2. Walk the capture with [`process::sync::FrameSynchronizer`]
//! 3. Hand the ordered frames to a sink, along with the dropped-byte
//!    diagnostics
//!
//! ```rust
//! use emgline::process::EXAMPLE_DATA;
//! use emgline::process::sync::FrameSynchronizer;
//!
//! let report = FrameSynchronizer::new(EXAMPLE_DATA).run();
//!
//! for frame in &report.frames {
//!     let row: [i32; 8] = frame.values();
//!     // write the row to a sink
//!     # let _ = row;
//! }
//!
//! assert_eq!(report.frames.len(), 2);
//! assert_eq!(report.dropped_bytes, 0);
//! ```

/// Processing functionality for line-coded captures.
///
/// 1. **Packet decoding** ([`process::decode`]): translates 5-byte
///    packets into (channel, sample) pairs.
/// 2. **Stream synchronization** ([`process::sync`]): locates frame
///    boundaries and recovers from corruption.
/// 3. **Encoding** ([`process::encode`]): the firmware-side inverse, for
///    loopback tests and capture generation.
pub mod process;

/// Data structures representing line-code components.
///
/// - **Symbol tables** ([`structs::symbol`]): the fixed 4b/5b mapping and
///   control symbol set
/// - **Frames** ([`structs::frame`]): decoded sample and frame values
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Error Handling** ([`utils::errors`]): error types
pub mod utils;
