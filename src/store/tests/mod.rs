//! Test modules for the scan store
//!
//! `contract` runs the same behavioural checks against every backend;
//! `file_store` covers persistence specifics.
