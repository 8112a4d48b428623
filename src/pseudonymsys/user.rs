use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use tracing::debug;

use super::{CaCertificate, Credential, IssuanceCommitments, PubKey, Pseudonym};
use crate::crypto::SecretScalar;
use crate::protocol::{
    BlindedTranscriptVerifier, ChallengeMode, DLogEqualityProver, SchnorrProver,
};
use crate::{Error, Group, Result};

/// Credential holder with a single long-term secret.
#[derive(Clone)]
pub struct User<G: Group> {
    group: G,
    secret: SecretScalar,
}

impl<G: Group> User<G> {
    pub fn new(group: G, secret: BigUint) -> Result<Self> {
        group.check_scalar(&secret, "user secret")?;
        Ok(Self {
            group,
            secret: secret.into(),
        })
    }

    pub fn group(&self) -> &G {
        &self.group
    }

    /// Fresh pseudonym `(a, a^secret)` for a random non-identity `a`.
    pub fn generate_nym<R: CryptoRngCore>(&self, rng: &mut R) -> Pseudonym<G::Element> {
        let a = loop {
            let a = self.group.random_element(rng);
            if !self.group.is_identity(&a) {
                break a;
            }
        };
        let b = self.group.scalar_exp(&a, &self.secret);
        Pseudonym::new(a, b)
    }

    /// Prover for the CA's check of `log_a(b)` on the master pseudonym.
    pub fn certificate_prover<R: CryptoRngCore>(
        &self,
        master: &Pseudonym<G::Element>,
        rng: &mut R,
    ) -> Result<SchnorrProver<G>> {
        SchnorrProver::new(
            self.group.clone(),
            ChallengeMode::Sigma,
            (*self.secret).clone(),
            master.a.clone(),
            rng,
        )
    }

    /// Prover for an organization's check that `nym` matches the certified
    /// master pseudonym.
    pub fn nym_prover(
        &self,
        nym: &Pseudonym<G::Element>,
        certificate: &CaCertificate<G::Element>,
    ) -> Result<DLogEqualityProver<G>> {
        DLogEqualityProver::new(
            self.group.clone(),
            (*self.secret).clone(),
            nym.a.clone(),
            certificate.blinded_a.clone(),
        )
    }

    /// Prover for the issuer's authentication of `nym`.
    pub fn authentication_prover<R: CryptoRngCore>(
        &self,
        nym: &Pseudonym<G::Element>,
        rng: &mut R,
    ) -> Result<SchnorrProver<G>> {
        self.certificate_prover(nym, rng)
    }

    /// Starts receiving a credential on `nym` from the issuer owning `issuer`.
    pub fn credential_request<R: CryptoRngCore>(
        &self,
        nym: &Pseudonym<G::Element>,
        issuer: &PubKey<G::Element>,
        rng: &mut R,
    ) -> Result<CredentialRequest<G>> {
        let gamma = loop {
            let gamma = self.group.random_scalar(rng);
            if gamma > BigUint::from(0u32) {
                break gamma;
            }
        };
        Ok(CredentialRequest {
            first: BlindedTranscriptVerifier::new(self.group.clone(), gamma.clone())?,
            second: BlindedTranscriptVerifier::new(self.group.clone(), gamma.clone())?,
            group: self.group.clone(),
            nym: nym.clone(),
            issuer: issuer.clone(),
            gamma: gamma.into(),
            commitments: None,
        })
    }

    /// Prover for another organization's check that `nym` belongs to the
    /// holder of `credential`.
    pub fn transfer_prover(
        &self,
        nym: &Pseudonym<G::Element>,
        credential: &Credential<G::Element>,
    ) -> Result<DLogEqualityProver<G>> {
        DLogEqualityProver::new(
            self.group.clone(),
            (*self.secret).clone(),
            nym.a.clone(),
            credential.small_a_to_gamma.clone(),
        )
    }
}

/// Holder's side of one credential issuance.
///
/// Both issuance proofs are verified with the same blinding `gamma`, so the
/// resulting credential is consistent with `(a^gamma, b^gamma)`.
pub struct CredentialRequest<G: Group> {
    group: G,
    nym: Pseudonym<G::Element>,
    issuer: PubKey<G::Element>,
    gamma: SecretScalar,
    first: BlindedTranscriptVerifier<G>,
    second: BlindedTranscriptVerifier<G>,
    commitments: Option<IssuanceCommitments<G::Element>>,
}

impl<G: Group> CredentialRequest<G> {
    /// Returns the challenges for the issuer's two proofs.
    pub fn challenges<R: CryptoRngCore>(
        &mut self,
        commitments: &IssuanceCommitments<G::Element>,
        rng: &mut R,
    ) -> Result<(BigUint, BigUint)> {
        let g = self.group.generator();
        let e1 = self.first.challenge(
            g.clone(),
            self.nym.b.clone(),
            self.issuer.h2.clone(),
            commitments.a.clone(),
            commitments.x11.clone(),
            commitments.x12.clone(),
            rng,
        )?;
        let e2 = self.second.challenge(
            g,
            self.group.compose(&self.nym.a, &commitments.a),
            self.issuer.h1.clone(),
            commitments.b.clone(),
            commitments.x21.clone(),
            commitments.x22.clone(),
            rng,
        )?;
        self.commitments = Some(commitments.clone());
        Ok((e1, e2))
    }

    /// Verifies the issuer's responses and assembles the blinded credential.
    pub fn finish(mut self, z1: &BigUint, z2: &BigUint) -> Result<Credential<G::Element>> {
        if self.commitments.take().is_none() {
            return Err(Error::protocol("issuance challenges", "not started"));
        }

        let first = self.first.verify(z1)?;
        let second = self.second.verify(z2)?;
        let (first, second) = match (first, second) {
            (Some(first), Some(second)) => (first, second),
            _ => {
                return Err(Error::Verification(
                    "issuer proof did not verify".to_string(),
                ))
            }
        };

        let group = &self.group;
        let credential = Credential {
            small_a_to_gamma: group.scalar_exp(&self.nym.a, &self.gamma),
            small_b_to_gamma: first.g2,
            a_to_gamma: first.t2,
            b_to_gamma: second.t2,
            t1: first.transcript,
            t2: second.transcript,
        };

        let g = group.generator();
        let t1_holds = credential.t1.verify(
            group,
            &g,
            &self.issuer.h2,
            &credential.small_b_to_gamma,
            &credential.a_to_gamma,
        );
        let t2_holds = credential.t2.verify(
            group,
            &g,
            &self.issuer.h1,
            &group.compose(&credential.small_a_to_gamma, &credential.a_to_gamma),
            &credential.b_to_gamma,
        );
        if !(t1_holds && t2_holds) {
            return Err(Error::Verification(
                "credential transcripts are inconsistent".to_string(),
            ));
        }

        debug!(group = group.name(), "credential received");
        Ok(credential)
    }
}
