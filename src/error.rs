//! Error types for the proof engines and the pseudonym system.

/// Main error type for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid group parameters were provided.
    #[error("Invalid group parameters: {0}")]
    InvalidParams(String),

    /// A scalar value is out of the range `[0, Q)`.
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),

    /// A group element is outside the group's coordinate domain.
    #[error("Invalid group element: {0}")]
    InvalidGroupElement(String),

    /// A message arrived that the session does not expect in its current state.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The verifier's opening of its challenge commitment did not match.
    #[error("Challenge decommitment does not match the commitment")]
    Decommitment,

    /// A proof failed and the role cannot produce its output.
    #[error("Proof verification failed: {0}")]
    Verification(String),

    /// The CA signature on a certificate did not verify.
    #[error("Signature verification failed: {0}")]
    Signature(String),

    /// The registration store refused the registration key.
    #[error("Registration key rejected")]
    RegistrationDenied,

    /// An external collaborator (store, key generator) failed.
    #[error("Collaborator failure: {0}")]
    Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn protocol(expected: &str, state: &str) -> Self {
        Error::Protocol(format!("expected {expected}, session is {state}"))
    }
}
