//! Scanning session
//!
//! Connects the deduplicator, the store and the notification manager into a
//! single entry point for decode events.

pub mod decode;
pub mod pipeline;

pub use decode::{parse_line, DecodeEvent, DecodeLineError};
pub use pipeline::{ScanOutcome, ScanPipeline, ALREADY_SCANNED_MESSAGE, NEW_CODE_MESSAGE};
