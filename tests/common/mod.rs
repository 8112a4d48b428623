//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use num_bigint::BigUint;
use p256::ecdsa::{SigningKey, VerifyingKey};
use pseudonym_zkp::protocol::{Challenge, SchnorrProver, SchnorrVerifier};
use pseudonym_zkp::pseudonymsys::{
    CaCertificate, CaCertifier, Credential, MemoryOrgKeyStore, MemoryRegistrationStore,
    OrgCredentialIssuer, OrgCredentialVerifier, OrgKeyStore, OrgNymGen, PubKey, Pseudonym,
    RandomSessionKeys, SessionKey, User,
};
use pseudonym_zkp::{ChallengeMode, Group, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Initialize test tracing (call once at the beginning of tests).
///
/// Only logs from this crate are shown. Subsequent calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("pseudonym_zkp=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Runs one Schnorr proof of `log_base(value)` in `mode`.
pub fn run_schnorr<G: Group>(
    group: &G,
    mode: ChallengeMode,
    secret: &BigUint,
    base: &G::Element,
    tamper: impl FnOnce(&mut BigUint),
    rng: &mut StdRng,
) -> Result<bool> {
    let mut prover = SchnorrProver::new(group.clone(), mode, secret.clone(), base.clone(), rng)?;
    let mut verifier = SchnorrVerifier::new(group.clone(), mode);

    if mode.uses_commitment() {
        let h = prover.opening_message()?;
        let c = verifier.commit_challenge(h, rng)?;
        prover.set_challenge_commitment(c)?;
    }
    let x = prover.proof_random_data(rng)?;
    let challenge = verifier.challenge(base.clone(), prover.value().clone(), x, rng)?;
    let mut response = prover.proof_data(&challenge)?;
    tamper(&mut response.z);
    verifier.verify(&response)
}

/// Every party of a single-group deployment, backed by in-memory stores.
pub struct Deployment<G: Group> {
    pub group: G,
    pub ca_key: SigningKey,
    pub org_keys: MemoryOrgKeyStore<G>,
    pub registrations: MemoryRegistrationStore,
    pub session_keys: Arc<RandomSessionKeys>,
}

impl<G: Group> Deployment<G> {
    pub fn new(group: G, rng: &mut StdRng) -> Self {
        let org_keys = MemoryOrgKeyStore::generate(group.clone(), ["org1", "org2"], rng);
        Self {
            ca_key: SigningKey::random(rng),
            org_keys,
            registrations: MemoryRegistrationStore::new(["reg-1", "reg-2", "reg-3"]),
            session_keys: Arc::new(RandomSessionKeys::new(32).unwrap()),
            group,
        }
    }

    pub fn ca_verifying_key(&self) -> VerifyingKey {
        *self.ca_key.verifying_key()
    }

    pub fn certify(
        &self,
        user: &User<G>,
        master: &Pseudonym<G::Element>,
        rng: &mut StdRng,
    ) -> Result<CaCertificate<G::Element>> {
        let mut ca = CaCertifier::new(self.group.clone(), self.ca_key.clone());
        let mut prover = user.certificate_prover(master, rng)?;
        let x = prover.proof_random_data(rng)?;
        let e = ca.challenge(master.a.clone(), master.b.clone(), x, rng)?;
        let z = prover.proof_data(&Challenge { e, decommitment: None })?.z;
        ca.verify(&z, rng)
    }

    pub fn register(
        &self,
        user: &User<G>,
        registration_key: &str,
        certificate: &CaCertificate<G::Element>,
        rng: &mut StdRng,
    ) -> Result<Option<Pseudonym<G::Element>>> {
        let nym = user.generate_nym(rng);
        let mut nym_gen = OrgNymGen::new(
            self.group.clone(),
            self.ca_verifying_key(),
            &self.registrations,
            registration_key,
        )?;
        let mut prover = user.nym_prover(&nym, certificate)?;
        let (x1, x2) = prover.proof_random_data(rng)?;
        let e = nym_gen.challenge(&nym, certificate, x1, x2, rng)?;
        let z = prover.proof_data(&e)?;
        Ok(nym_gen.verify(&z)?.then_some(nym))
    }

    pub fn issue(
        &self,
        user: &User<G>,
        organization: &str,
        nym: &Pseudonym<G::Element>,
        rng: &mut StdRng,
    ) -> Result<Credential<G::Element>> {
        let public = self.org_keys.public_key(organization)?;
        let mut issuer =
            OrgCredentialIssuer::new(self.group.clone(), self.org_keys.secret_key(organization)?);

        let mut auth = user.authentication_prover(nym, rng)?;
        let x = auth.proof_random_data(rng)?;
        let e = issuer.authentication_challenge(nym, x, rng)?;
        let z = auth.proof_data(&Challenge { e, decommitment: None })?.z;
        let commitments = issuer.verify_authentication(&z, rng)?;

        let mut request = user.credential_request(nym, &public, rng)?;
        let (e1, e2) = request.challenges(&commitments, rng)?;
        let (z1, z2) = issuer.proof_data(&e1, &e2)?;
        request.finish(&z1, &z2)
    }

    pub fn transfer(
        &self,
        user: &User<G>,
        nym: &Pseudonym<G::Element>,
        credential: &Credential<G::Element>,
        issuer_key: &PubKey<G::Element>,
        rng: &mut StdRng,
    ) -> Result<Option<SessionKey>> {
        let mut verifier = OrgCredentialVerifier::new(self.group.clone(), self.session_keys.clone());
        let mut prover = user.transfer_prover(nym, credential)?;
        let (x1, x2) = prover.proof_random_data(rng)?;
        let e = verifier.authentication_challenge(nym, credential, x1, x2, rng)?;
        let z = prover.proof_data(&e)?;
        verifier.verify_authentication(&z, issuer_key)
    }

    /// CA, registration at org1 and org2, issuance by org1, transfer to org2.
    /// `tamper` edits org1's public key as seen by org2.
    pub fn full_flow(
        &self,
        secret: BigUint,
        tamper: impl FnOnce(&mut PubKey<G::Element>),
        rng: &mut StdRng,
    ) -> Result<Option<SessionKey>> {
        let user = User::new(self.group.clone(), secret)?;
        let master = user.generate_nym(rng);
        let certificate = self.certify(&user, &master, rng)?;

        let nym1 = self
            .register(&user, "reg-1", &certificate, rng)?
            .expect("org1 registration");
        let nym2 = self
            .register(&user, "reg-2", &certificate, rng)?
            .expect("org2 registration");

        let credential = self.issue(&user, "org1", &nym1, rng)?;

        let mut issuer_key = self.org_keys.public_key("org1")?;
        tamper(&mut issuer_key);
        self.transfer(&user, &nym2, &credential, &issuer_key, rng)
    }
}
