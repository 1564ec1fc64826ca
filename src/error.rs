use thiserror::Error;

/// Failure taxonomy for the harness. Setup failures (`Config`,
/// `Connectivity`) are kept distinct from contract violations (`Assertion`)
/// so a broken network never masquerades as a broken backend contract.
#[derive(Debug, Error)]
pub enum Error {
    /// The context could not be built from its configuration.
    #[error("context setup failed: {reason}")]
    Config { reason: String },

    /// The backend could not be reached (DNS/TLS/refused/timeout). Fatal to
    /// the owning test case; never retried.
    #[error("failed to reach `{endpoint}`: {source}")]
    Connectivity {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// A verification contract was violated. `detail` carries expected vs.
    /// actual so the failure can be diagnosed without re-running.
    #[error("assertion failed for `{endpoint}`: {detail}")]
    Assertion { endpoint: String, detail: String },
}

impl Error {
    pub(crate) fn assertion(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Assertion {
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }
}
