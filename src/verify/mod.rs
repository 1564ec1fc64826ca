//! The verb-specific assertion protocol: what a "correct" response looks
//! like for each HTTP method, and how to prove a write did or did not
//! persist on the backend.

pub mod payload;
pub mod report;
pub mod session;
