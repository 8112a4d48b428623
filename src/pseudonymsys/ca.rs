use num_bigint::BigUint;
use num_traits::Zero;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand_core::CryptoRngCore;
use tracing::{debug, info, warn};

use super::{CaCertificate, Pseudonym};
use crate::crypto::hash_elements;
use crate::protocol::{ChallengeMode, SchnorrResponse, SchnorrVerifier};
use crate::{Error, Group, Result};

/// Certificate authority: checks that the user knows the secret behind a
/// master pseudonym and signs a freshly blinded copy of it.
#[derive(Debug)]
pub struct CaCertifier<G: Group> {
    group: G,
    signing_key: SigningKey,
    verifier: SchnorrVerifier<G>,
    nym: Option<Pseudonym<G::Element>>,
}

impl<G: Group> CaCertifier<G> {
    pub fn new(group: G, signing_key: SigningKey) -> Self {
        let verifier = SchnorrVerifier::new(group.clone(), ChallengeMode::Sigma);
        Self {
            group,
            signing_key,
            verifier,
            nym: None,
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }

    /// Starts a Schnorr proof of `log_a(b)` and returns the challenge.
    pub fn challenge<R: CryptoRngCore>(
        &mut self,
        a: G::Element,
        b: G::Element,
        x: G::Element,
        rng: &mut R,
    ) -> Result<BigUint> {
        self.group.check_not_identity(&a, "master pseudonym base")?;
        self.group.check_not_identity(&b, "master pseudonym value")?;
        let challenge = self.verifier.challenge(a.clone(), b.clone(), x, rng)?;
        debug!(group = self.group.name(), "certificate proof started");
        self.nym = Some(Pseudonym::new(a, b));
        Ok(challenge.e)
    }

    /// Checks the response and, if it holds, signs `(a^r, b^r)` for a fresh
    /// blinding `r`.
    pub fn verify<R: CryptoRngCore>(&mut self, z: &BigUint, rng: &mut R) -> Result<CaCertificate<G::Element>> {
        let nym = self
            .nym
            .take()
            .ok_or_else(|| Error::protocol("a challenge", "no pending proof"))?;

        if !self.verifier.verify(&SchnorrResponse::new(z.clone()))? {
            warn!(group = self.group.name(), "certificate proof rejected");
            return Err(Error::Verification(
                "master pseudonym proof did not verify".to_string(),
            ));
        }

        let r = loop {
            let r = self.group.random_scalar(rng);
            if !r.is_zero() {
                break r;
            }
        };
        let blinded_a = self.group.scalar_exp(&nym.a, &r);
        let blinded_b = self.group.scalar_exp(&nym.b, &r);

        let digest = hash_elements(&self.group, &[&blinded_a, &blinded_b]);
        let signature: Signature = self
            .signing_key
            .sign_prehash(&digest)
            .map_err(|e| Error::Signature(e.to_string()))?;

        info!(group = self.group.name(), "certificate issued");
        Ok(CaCertificate::from_signature(blinded_a, blinded_b, signature))
    }
}

/// Checks the CA signature on `certificate`.
pub fn verify_certificate<G: Group>(
    group: &G,
    ca_key: &VerifyingKey,
    certificate: &CaCertificate<G::Element>,
) -> Result<()> {
    let digest = hash_elements(group, &[&certificate.blinded_a, &certificate.blinded_b]);
    ca_key
        .verify_prehash(&digest, certificate.signature())
        .map_err(|e| Error::Signature(e.to_string()))
}
