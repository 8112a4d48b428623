//! Interactive zero-knowledge proofs over discrete-log groups, and a
//! pseudonym system built from them.
//!
//! Every proof engine is generic over [`Group`], so the same code runs over
//! Schnorr groups, quadratic residues modulo a product of safe primes and the
//! NIST curves. Sessions are single-use state machines: each round is a
//! method call, and a call out of order ends the session with
//! [`Error::Protocol`].
//!
//! ```no_run
//! use pseudonym_zkp::groups::P256;
//! use pseudonym_zkp::protocol::{ChallengeMode, SchnorrProver, SchnorrVerifier};
//! use pseudonym_zkp::Group;
//! use rand_core::OsRng;
//!
//! let group = P256::p256();
//! let base = group.generator();
//! let mut prover = SchnorrProver::new(group.clone(), ChallengeMode::Sigma, 42u32.into(), base.clone(), &mut OsRng)?;
//! let mut verifier = SchnorrVerifier::new(group, ChallengeMode::Sigma);
//!
//! let x = prover.proof_random_data(&mut OsRng)?;
//! let challenge = verifier.challenge(base, prover.value().clone(), x, &mut OsRng)?;
//! let response = prover.proof_data(&challenge)?;
//! assert!(verifier.verify(&response)?);
//! # Ok::<(), pseudonym_zkp::Error>(())
//! ```

/// Configuration loading.
pub mod config;
/// Group abstraction and shared arithmetic.
pub mod crypto;
/// Error types.
pub mod error;
/// Concrete groups.
pub mod groups;
/// Proof engines.
pub mod protocol;
/// Anonymous credentials.
pub mod pseudonymsys;

pub use config::Config;
pub use crypto::Group;
pub use error::Error;
pub use groups::{GroupSelector, GroupVisitor};
pub use protocol::ChallengeMode;

/// Result type alias using the library's error type.
pub type Result<T> = core::result::Result<T, Error>;
