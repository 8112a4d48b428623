//! Schnorr proof of knowledge of `w` such that `base^w = value`.
//!
//! Message flow for every [`ChallengeMode`]:
//!
//! ```text
//! Prover                                   Verifier
//!   opening_message -> h                     (Zkp, Zkpok)
//!                         <- c               commit_challenge(h)
//!   set_challenge_commitment(c)              (Zkp, Zkpok)
//!   proof_random_data -> x = base^r
//!                         <- e (+ opening)   challenge(base, value, x)
//!   proof_data -> z = r + e*w (+ trapdoor)
//!                                            verify(z) : base^z == x * value^e
//! ```
//!
//! Calling a step out of order returns [`Error::Protocol`] and ends the
//! session.

use core::mem;

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use super::pedersen::{PedersenCommitter, PedersenReceiver};
use super::ChallengeMode;
use crate::crypto::field::sigma_response;
use crate::crypto::SecretScalar;
use crate::{Error, Group, Result};

/// Verifier's challenge, with the opening of its commitment in the
/// commitment-based modes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    pub e: BigUint,
    pub decommitment: Option<BigUint>,
}

/// Prover's response, with the Pedersen trapdoor in [`ChallengeMode::Zkpok`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchnorrResponse {
    pub z: BigUint,
    pub trapdoor: Option<BigUint>,
}

impl SchnorrResponse {
    pub fn new(z: BigUint) -> Self {
        Self { z, trapdoor: None }
    }
}

#[derive(Debug)]
enum ProverState {
    Ready,
    AwaitingChallengeCommitment,
    AwaitingProofRandomData,
    AwaitingChallenge { r: SecretScalar },
    Done,
}

impl ProverState {
    fn name(&self) -> &'static str {
        match self {
            ProverState::Ready => "ready",
            ProverState::AwaitingChallengeCommitment => "awaiting challenge commitment",
            ProverState::AwaitingProofRandomData => "awaiting proof random data",
            ProverState::AwaitingChallenge { .. } => "awaiting challenge",
            ProverState::Done => "done",
        }
    }
}

/// Proving side of a single Schnorr run.
#[derive(Debug)]
pub struct SchnorrProver<G: Group> {
    group: G,
    mode: ChallengeMode,
    secret: SecretScalar,
    base: G::Element,
    value: G::Element,
    receiver: Option<PedersenReceiver<G>>,
    state: ProverState,
}

impl<G: Group> SchnorrProver<G> {
    /// Creates a prover for `secret`, with `value = base^secret`.
    ///
    /// In the commitment modes the prover also acts as the Pedersen receiver
    /// for the verifier's challenge commitment.
    pub fn new<R: CryptoRngCore>(
        group: G,
        mode: ChallengeMode,
        secret: BigUint,
        base: G::Element,
        rng: &mut R,
    ) -> Result<Self> {
        group.check_scalar(&secret, "secret")?;
        group.validate_element(&base)?;

        let value = group.scalar_exp(&base, &secret);
        let (receiver, state) = if mode.uses_commitment() {
            (Some(PedersenReceiver::new(group.clone(), rng)), ProverState::Ready)
        } else {
            (None, ProverState::AwaitingProofRandomData)
        };

        Ok(Self {
            group,
            mode,
            secret: secret.into(),
            base,
            value,
            receiver,
            state,
        })
    }

    pub fn mode(&self) -> ChallengeMode {
        self.mode
    }

    pub fn base(&self) -> &G::Element {
        &self.base
    }

    /// The public value `base^secret`.
    pub fn value(&self) -> &G::Element {
        &self.value
    }

    /// First message of the commitment modes: the Pedersen base `h`.
    pub fn opening_message(&mut self) -> Result<G::Element> {
        match mem::replace(&mut self.state, ProverState::Done) {
            ProverState::Ready => {
                let h = self
                    .receiver
                    .as_ref()
                    .map(|receiver| receiver.h().clone())
                    .ok_or_else(|| Error::protocol("a commitment mode", "sigma"))?;
                self.state = ProverState::AwaitingChallengeCommitment;
                Ok(h)
            }
            other => Err(Error::protocol("ready", other.name())),
        }
    }

    /// Stores the verifier's commitment to its challenge.
    pub fn set_challenge_commitment(&mut self, commitment: G::Element) -> Result<()> {
        match mem::replace(&mut self.state, ProverState::Done) {
            ProverState::AwaitingChallengeCommitment => {
                let receiver = self
                    .receiver
                    .as_mut()
                    .ok_or_else(|| Error::protocol("a commitment mode", "sigma"))?;
                receiver.set_commitment(commitment)?;
                self.state = ProverState::AwaitingProofRandomData;
                Ok(())
            }
            other => Err(Error::protocol("awaiting challenge commitment", other.name())),
        }
    }

    /// Draws the nonce `r` and returns `x = base^r`.
    pub fn proof_random_data<R: CryptoRngCore>(&mut self, rng: &mut R) -> Result<G::Element> {
        match mem::replace(&mut self.state, ProverState::Done) {
            ProverState::AwaitingProofRandomData => {
                let r = self.group.random_scalar(rng);
                let x = self.group.scalar_exp(&self.base, &r);
                self.state = ProverState::AwaitingChallenge { r: r.into() };
                Ok(x)
            }
            other => Err(Error::protocol("awaiting proof random data", other.name())),
        }
    }

    /// Answers the challenge with `z = r + e * secret mod Q`.
    ///
    /// In the commitment modes the challenge must open the verifier's
    /// commitment, otherwise the prover refuses with [`Error::Decommitment`].
    pub fn proof_data(&mut self, challenge: &Challenge) -> Result<SchnorrResponse> {
        let r = match mem::replace(&mut self.state, ProverState::Done) {
            ProverState::AwaitingChallenge { r } => r,
            other => return Err(Error::protocol("awaiting challenge", other.name())),
        };

        self.group.check_scalar(&challenge.e, "challenge")?;

        match (&self.receiver, &challenge.decommitment) {
            (Some(receiver), Some(opening)) => {
                if !receiver.check_decommitment(&challenge.e, opening)? {
                    return Err(Error::Decommitment);
                }
            }
            (Some(_), None) => return Err(Error::Decommitment),
            (None, Some(_)) => {
                return Err(Error::Protocol(
                    "sigma challenges carry no decommitment".to_string(),
                ))
            }
            (None, None) => {}
        }

        let z = sigma_response(&r, &challenge.e, &self.secret, self.group.order());
        let trapdoor = match (self.mode, &self.receiver) {
            (ChallengeMode::Zkpok, Some(receiver)) => Some(receiver.trapdoor().clone()),
            _ => None,
        };
        Ok(SchnorrResponse { z, trapdoor })
    }
}

#[derive(Debug)]
enum VerifierState<E> {
    Ready,
    AwaitingProofRandomData,
    AwaitingResponse {
        base: E,
        value: E,
        x: E,
        e: BigUint,
    },
    Done,
}

impl<E> VerifierState<E> {
    fn name(&self) -> &'static str {
        match self {
            VerifierState::Ready => "ready",
            VerifierState::AwaitingProofRandomData => "awaiting proof random data",
            VerifierState::AwaitingResponse { .. } => "awaiting response",
            VerifierState::Done => "done",
        }
    }
}

/// Verifying side of a single Schnorr run.
#[derive(Debug)]
pub struct SchnorrVerifier<G: Group> {
    group: G,
    mode: ChallengeMode,
    committer: Option<PedersenCommitter<G>>,
    state: VerifierState<G::Element>,
}

impl<G: Group> SchnorrVerifier<G> {
    pub fn new(group: G, mode: ChallengeMode) -> Self {
        Self {
            group,
            mode,
            committer: None,
            state: VerifierState::Ready,
        }
    }

    pub fn mode(&self) -> ChallengeMode {
        self.mode
    }

    /// Draws the challenge `e` early and commits to it under the prover's `h`.
    pub fn commit_challenge<R: CryptoRngCore>(
        &mut self,
        h: G::Element,
        rng: &mut R,
    ) -> Result<G::Element> {
        match mem::replace(&mut self.state, VerifierState::Done) {
            VerifierState::Ready if self.mode.uses_commitment() => {
                let mut committer = PedersenCommitter::new(self.group.clone(), h)?;
                let e = self.group.random_scalar(rng);
                let c = committer.commit(&e, rng)?;
                self.committer = Some(committer);
                self.state = VerifierState::AwaitingProofRandomData;
                Ok(c)
            }
            VerifierState::Ready => Err(Error::protocol("a commitment mode", "sigma")),
            other => Err(Error::protocol("ready", other.name())),
        }
    }

    /// Records the statement and the prover's `x`, and releases the challenge.
    pub fn challenge<R: CryptoRngCore>(
        &mut self,
        base: G::Element,
        value: G::Element,
        x: G::Element,
        rng: &mut R,
    ) -> Result<Challenge> {
        let state = mem::replace(&mut self.state, VerifierState::Done);
        let challenge = match (state, self.mode.uses_commitment()) {
            (VerifierState::Ready, false) => Challenge {
                e: self.group.random_scalar(rng),
                decommitment: None,
            },
            (VerifierState::AwaitingProofRandomData, true) => {
                let committer = self
                    .committer
                    .as_ref()
                    .ok_or_else(|| Error::protocol("a challenge commitment", "uncommitted"))?;
                let (e, r) = committer.decommitment()?;
                Challenge {
                    e,
                    decommitment: Some(r),
                }
            }
            (other, _) => return Err(Error::protocol("proof random data", other.name())),
        };

        for element in [&base, &value, &x] {
            self.group.validate_element(element)?;
        }

        self.state = VerifierState::AwaitingResponse {
            base,
            value,
            x,
            e: challenge.e.clone(),
        };
        Ok(challenge)
    }

    /// Checks `base^z == x * value^e`, and the revealed trapdoor in
    /// [`ChallengeMode::Zkpok`].
    pub fn verify(&mut self, response: &SchnorrResponse) -> Result<bool> {
        let (base, value, x, e) = match mem::replace(&mut self.state, VerifierState::Done) {
            VerifierState::AwaitingResponse { base, value, x, e } => (base, value, x, e),
            other => return Err(Error::protocol("awaiting response", other.name())),
        };

        if self.mode == ChallengeMode::Zkpok {
            let extracted = match (&self.committer, &response.trapdoor) {
                (Some(committer), Some(trapdoor)) => committer.verify_trapdoor(trapdoor),
                _ => false,
            };
            if !extracted {
                return Ok(false);
            }
        }

        if &response.z >= self.group.order() {
            return Ok(false);
        }

        let lhs = self.group.scalar_exp(&base, &response.z);
        let rhs = self.group.compose(&x, &self.group.scalar_exp(&value, &e));
        Ok(lhs == rhs)
    }
}
