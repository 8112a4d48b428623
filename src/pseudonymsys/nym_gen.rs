use num_bigint::BigUint;
use p256::ecdsa::VerifyingKey;
use rand_core::CryptoRngCore;
use tracing::{debug, info, warn};

use super::{verify_certificate, CaCertificate, Pseudonym, RegistrationStore};
use crate::protocol::DLogEqualityVerifier;
use crate::{Error, Group, Result};

/// Registers a pseudonym at an organization.
///
/// The user proves that the new pseudonym and the CA-certified blinded
/// master pseudonym share the same discrete log.
#[derive(Debug)]
pub struct OrgNymGen<G: Group> {
    group: G,
    ca_key: VerifyingKey,
    // Taken for the duration of a step; left empty once a step fails.
    verifier: Option<DLogEqualityVerifier<G>>,
}

impl<G: Group> OrgNymGen<G> {
    /// Consumes `registration_key` from `store`; fails with
    /// [`Error::RegistrationDenied`] if the store does not admit it.
    pub fn new(
        group: G,
        ca_key: VerifyingKey,
        store: &dyn RegistrationStore,
        registration_key: &str,
    ) -> Result<Self> {
        if !store.check_and_consume(registration_key)? {
            warn!(group = group.name(), "registration key rejected");
            return Err(Error::RegistrationDenied);
        }
        debug!(group = group.name(), "registration key consumed");

        let verifier = DLogEqualityVerifier::new(group.clone());
        Ok(Self {
            group,
            ca_key,
            verifier: Some(verifier),
        })
    }

    /// Checks the certificate signature, then starts the proof of
    /// `log_{nym.a}(nym.b) == log_{blinded_a}(blinded_b)`.
    ///
    /// A bad signature or an identity element ends the session: every later
    /// call returns [`Error::Protocol`].
    pub fn challenge<R: CryptoRngCore>(
        &mut self,
        nym: &Pseudonym<G::Element>,
        certificate: &CaCertificate<G::Element>,
        x1: G::Element,
        x2: G::Element,
        rng: &mut R,
    ) -> Result<BigUint> {
        let mut verifier = self.take_verifier()?;
        let group = &self.group;
        verify_certificate(group, &self.ca_key, certificate).inspect_err(|_| {
            warn!(group = group.name(), "certificate signature rejected");
        })?;
        group.check_not_identity(&nym.a, "pseudonym base")?;
        group.check_not_identity(&nym.b, "pseudonym value")?;
        group.check_not_identity(&certificate.blinded_a, "certified base")?;
        group.check_not_identity(&certificate.blinded_b, "certified value")?;

        let e = verifier.challenge(
            nym.a.clone(),
            certificate.blinded_a.clone(),
            nym.b.clone(),
            certificate.blinded_b.clone(),
            x1,
            x2,
            rng,
        )?;
        self.verifier = Some(verifier);
        Ok(e)
    }

    pub fn verify(&mut self, z: &BigUint) -> Result<bool> {
        let accepted = self.take_verifier()?.verify(z)?;
        if accepted {
            info!(group = self.group.name(), "pseudonym registered");
        } else {
            warn!(group = self.group.name(), "pseudonym proof rejected");
        }
        Ok(accepted)
    }

    fn take_verifier(&mut self) -> Result<DLogEqualityVerifier<G>> {
        self.verifier
            .take()
            .ok_or_else(|| Error::protocol("an open registration", "session ended"))
    }
}
