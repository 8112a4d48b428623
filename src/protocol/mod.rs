/// Chaum-Pedersen proof of equal discrete logarithms.
pub mod dlog_equality;
/// Equality proof whose transcript the verifier blinds for third parties.
pub mod blinded;
/// Pedersen commitments, used to commit to challenges.
pub mod pedersen;
/// Schnorr proof of knowledge of a discrete logarithm.
pub mod schnorr;

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

pub use blinded::{verify_blinded_transcript, BlindedTranscript, BlindedTranscriptVerifier, Transcript};
pub use dlog_equality::{DLogEqualityProver, DLogEqualityVerifier};
pub use pedersen::{PedersenCommitter, PedersenReceiver};
pub use schnorr::{Challenge, SchnorrProver, SchnorrResponse, SchnorrVerifier};

use crate::Error;

/// How the verifier's challenge reaches the prover.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeMode {
    /// The verifier draws `e` and sends it.
    #[default]
    Sigma,
    /// The verifier commits to `e` before seeing the prover's first message.
    Zkp,
    /// As [`ChallengeMode::Zkp`], and the prover reveals its commitment
    /// trapdoor so the verifier can extract.
    Zkpok,
}

impl ChallengeMode {
    /// Whether the verifier commits to its challenge before seeing `x`.
    pub fn uses_commitment(self) -> bool {
        !matches!(self, ChallengeMode::Sigma)
    }
}

impl FromStr for ChallengeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sigma" => Ok(ChallengeMode::Sigma),
            "zkp" => Ok(ChallengeMode::Zkp),
            "zkpok" => Ok(ChallengeMode::Zkpok),
            other => Err(Error::InvalidParams(format!("unknown challenge mode '{other}'"))),
        }
    }
}

impl fmt::Display for ChallengeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChallengeMode::Sigma => "sigma",
            ChallengeMode::Zkp => "zkp",
            ChallengeMode::Zkpok => "zkpok",
        };
        f.write_str(name)
    }
}
