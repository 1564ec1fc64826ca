//! # Checkman
//!
//! A contract-verification harness for jsonplaceholder-style REST backends.
//!
//! The harness issues HTTP requests against a fixed base URL, asserts
//! response status and shape, and cross-checks every write operation against
//! a subsequent read. A backend that merely echoes mutations without storing
//! them (the jsonplaceholder contract) passes all checks; a backend that
//! actually persists writes is flagged.
//!
//! ## Usage
//!
//! ```no_run
//! use checkman::{Collection, ContextConfig, MutationPayload, RequestContext, VerificationSession};
//!
//! # async fn run() -> Result<(), checkman::Error> {
//! let config = ContextConfig::new("https://jsonplaceholder.typicode.com/");
//! let context = RequestContext::new(&config)?;
//! let mut session = VerificationSession::new(context);
//!
//! session.check_collection(Collection::Posts).await?;
//! session
//!     .verify_create(
//!         Collection::Posts,
//!         MutationPayload::new()
//!             .field("title", "New post title")
//!             .field("body", "This is the body")
//!             .field("userId", 1),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod http;
pub mod verify;

pub use error::Error;
pub use http::context::{ContextConfig, RequestContext};
pub use http::method::HttpMethod;
pub use http::response::ResponseEnvelope;
pub use verify::payload::MutationPayload;
pub use verify::report::{CheckRecord, RunReport};
pub use verify::session::{Collection, VerificationSession};
