use std::sync::Arc;

use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use tracing::{info, warn};

use super::{Credential, PubKey, Pseudonym, SessionKey, SessionKeyGenerator};
use crate::protocol::DLogEqualityVerifier;
use crate::{Error, Group, Result};

/// Accepts a credential issued by another organization.
///
/// The holder proves that its pseudonym here shares a discrete log with the
/// blinded pseudonym inside the credential; the credential's transcripts are
/// then checked against the issuer's public key.
pub struct OrgCredentialVerifier<G: Group> {
    group: G,
    session_keys: Arc<dyn SessionKeyGenerator>,
    verifier: DLogEqualityVerifier<G>,
    credential: Option<Credential<G::Element>>,
}

impl<G: Group> OrgCredentialVerifier<G> {
    pub fn new(group: G, session_keys: Arc<dyn SessionKeyGenerator>) -> Self {
        let verifier = DLogEqualityVerifier::new(group.clone());
        Self {
            group,
            session_keys,
            verifier,
            credential: None,
        }
    }

    /// Starts the proof of `log_{nym.a}(nym.b) == log_{a^gamma}(b^gamma)`.
    pub fn authentication_challenge<R: CryptoRngCore>(
        &mut self,
        nym: &Pseudonym<G::Element>,
        credential: &Credential<G::Element>,
        x1: G::Element,
        x2: G::Element,
        rng: &mut R,
    ) -> Result<BigUint> {
        let group = &self.group;
        group.check_not_identity(&nym.a, "pseudonym base")?;
        group.check_not_identity(&nym.b, "pseudonym value")?;
        group.check_not_identity(&credential.small_a_to_gamma, "blinded credential base")?;
        group.check_not_identity(&credential.small_b_to_gamma, "blinded credential value")?;
        let e = self.verifier.challenge(
            nym.a.clone(),
            credential.small_a_to_gamma.clone(),
            nym.b.clone(),
            credential.small_b_to_gamma.clone(),
            x1,
            x2,
            rng,
        )?;
        self.credential = Some(credential.clone());
        Ok(e)
    }

    /// Returns a session key if the proof and both credential transcripts
    /// hold for `issuer`, `None` otherwise.
    pub fn verify_authentication(
        &mut self,
        z: &BigUint,
        issuer: &PubKey<G::Element>,
    ) -> Result<Option<SessionKey>> {
        let credential = self
            .credential
            .take()
            .ok_or_else(|| Error::protocol("an authentication challenge", "no pending proof"))?;

        if !self.verifier.verify(z)? {
            warn!(group = self.group.name(), "credential holder failed authentication");
            return Ok(None);
        }

        let group = &self.group;
        let g = group.generator();
        let t1_holds = credential.t1.verify(
            group,
            &g,
            &issuer.h2,
            &credential.small_b_to_gamma,
            &credential.a_to_gamma,
        );
        let t2_holds = credential.t2.verify(
            group,
            &g,
            &issuer.h1,
            &group.compose(&credential.small_a_to_gamma, &credential.a_to_gamma),
            &credential.b_to_gamma,
        );
        if !(t1_holds && t2_holds) {
            warn!(group = group.name(), t1_holds, t2_holds, "credential transcript rejected");
            return Ok(None);
        }

        let key = self.session_keys.generate()?;
        info!(group = group.name(), "credential accepted, session key issued");
        Ok(Some(key))
    }
}
