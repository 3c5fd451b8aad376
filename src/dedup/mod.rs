//! Decode Event Deduplication
//!
//! Raw decoders fire many times per second while a code stays in frame. The
//! [`Deduplicator`] turns that stream into at most one accepted scan at a
//! time, and suppresses re-acceptance of the same payload within a cooldown
//! window.
//!
//! ```text
//!  decode ──► processing? ──yes──► RejectBusy
//!                 │ no
//!                 ▼
//!       same payload within cooldown? ──yes──► RejectDuplicate
//!                 │ no
//!                 ▼
//!   Accept (processing = true, auto-release after processing_timeout)
//! ```

pub mod decision;
pub mod deduplicator;

pub use decision::{
    DedupConfig, Decision, DeduplicationState, DEFAULT_COOLDOWN, DEFAULT_PROCESSING_TIMEOUT,
};
pub use deduplicator::Deduplicator;
