//! Scan capture core: decode-event deduplication, a local scan log with
//! statistics, and best-effort sync to a remote endpoint.

pub mod app;
pub mod core;
pub mod dedup;
pub mod notifications;
pub mod session;
pub mod store;
pub mod sync;
