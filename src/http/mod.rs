//! HTTP plumbing: request context lifecycle, verb mapping, and the response
//! envelope the verification layer asserts against.

pub mod context;
pub mod method;
pub mod response;
