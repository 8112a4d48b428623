use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use tracing::{debug, info, warn};

use super::{Pseudonym, SecKey};
use crate::protocol::{ChallengeMode, DLogEqualityProver, SchnorrResponse, SchnorrVerifier};
use crate::{Error, Group, Result};

/// Issuer's first messages of the two blinded-transcript proofs, with the
/// credential values `A = b^s2` and `B = (a * A)^s1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuanceCommitments<E> {
    pub x11: E,
    pub x12: E,
    pub x21: E,
    pub x22: E,
    pub a: E,
    pub b: E,
}

/// Issues a credential on a registered pseudonym.
///
/// The holder first authenticates with a Schnorr proof for the pseudonym.
/// The issuer then proves `log_G(H2) == log_b(A)` and
/// `log_G(H1) == log_{a*A}(B)`, which the holder turns into blinded
/// transcripts.
#[derive(Debug)]
pub struct OrgCredentialIssuer<G: Group> {
    group: G,
    sec_key: SecKey,
    authentication: SchnorrVerifier<G>,
    nym: Option<Pseudonym<G::Element>>,
    provers: Option<(DLogEqualityProver<G>, DLogEqualityProver<G>)>,
}

impl<G: Group> OrgCredentialIssuer<G> {
    pub fn new(group: G, sec_key: SecKey) -> Self {
        let authentication = SchnorrVerifier::new(group.clone(), ChallengeMode::Sigma);
        Self {
            group,
            sec_key,
            authentication,
            nym: None,
            provers: None,
        }
    }

    /// Starts the holder's proof of knowledge of `log_{nym.a}(nym.b)`.
    pub fn authentication_challenge<R: CryptoRngCore>(
        &mut self,
        nym: &Pseudonym<G::Element>,
        x: G::Element,
        rng: &mut R,
    ) -> Result<BigUint> {
        self.group.check_not_identity(&nym.a, "pseudonym base")?;
        self.group.check_not_identity(&nym.b, "pseudonym value")?;
        let challenge =
            self.authentication
                .challenge(nym.a.clone(), nym.b.clone(), x, rng)?;
        self.nym = Some(nym.clone());
        Ok(challenge.e)
    }

    /// Finishes authentication and opens both issuance proofs.
    pub fn verify_authentication<R: CryptoRngCore>(
        &mut self,
        z: &BigUint,
        rng: &mut R,
    ) -> Result<IssuanceCommitments<G::Element>> {
        let nym = self
            .nym
            .take()
            .ok_or_else(|| Error::protocol("an authentication challenge", "no pending proof"))?;

        if !self.authentication.verify(&SchnorrResponse::new(z.clone()))? {
            warn!(group = self.group.name(), "credential holder failed authentication");
            return Err(Error::Verification(
                "pseudonym authentication did not verify".to_string(),
            ));
        }
        debug!(group = self.group.name(), "credential holder authenticated");

        let group = &self.group;
        let g = group.generator();
        let big_a = group.scalar_exp(&nym.b, &self.sec_key.s2);
        let a_times_big_a = group.compose(&nym.a, &big_a);
        let big_b = group.scalar_exp(&a_times_big_a, &self.sec_key.s1);

        let mut first = DLogEqualityProver::new(group.clone(), (*self.sec_key.s2).clone(), g.clone(), nym.b)?;
        let mut second = DLogEqualityProver::new(group.clone(), (*self.sec_key.s1).clone(), g, a_times_big_a)?;
        let (x11, x12) = first.proof_random_data(rng)?;
        let (x21, x22) = second.proof_random_data(rng)?;
        self.provers = Some((first, second));

        Ok(IssuanceCommitments {
            x11,
            x12,
            x21,
            x22,
            a: big_a,
            b: big_b,
        })
    }

    /// Answers the holder's two challenges.
    pub fn proof_data(&mut self, e1: &BigUint, e2: &BigUint) -> Result<(BigUint, BigUint)> {
        let (mut first, mut second) = self
            .provers
            .take()
            .ok_or_else(|| Error::protocol("issuance commitments", "not authenticated"))?;
        let z1 = first.proof_data(e1)?;
        let z2 = second.proof_data(e2)?;
        info!(group = self.group.name(), "credential issued");
        Ok((z1, z2))
    }
}
