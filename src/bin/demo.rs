use std::sync::Arc;

use clap::Parser;
use num_bigint::BigUint;
use p256::ecdsa::SigningKey;
use pseudonym_zkp::protocol::{Challenge, SchnorrProver, SchnorrVerifier};
use pseudonym_zkp::pseudonymsys::{
    CaCertifier, MemoryOrgKeyStore, MemoryRegistrationStore, OrgCredentialIssuer,
    OrgCredentialVerifier, OrgKeyStore, OrgNymGen, RandomSessionKeys, SessionKey, User,
};
use pseudonym_zkp::{ChallengeMode, Config, Error, Group, GroupSelector, GroupVisitor};
use rand_core::{CryptoRngCore, OsRng, RngCore};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "pseudonym-demo")]
#[command(about = "Runs a Schnorr proof and the full pseudonym flow in-process", long_about = None)]
#[command(version)]
struct Args {
    /// Group to run in (p224, p256, p384, p521, rfc5114, schnorr:<bits>, qr:<bits>)
    #[arg(short, long, env = "PSEUDONYM_GROUP")]
    group: Option<GroupSelector>,

    /// Challenge mode for the standalone Schnorr proof (sigma, zkp, zkpok)
    #[arg(short, long, env = "PSEUDONYM_CHALLENGE_MODE")]
    mode: Option<ChallengeMode>,

    /// User secret, reduced modulo the group order
    #[arg(short, long, default_value = "345345345334")]
    secret: BigUint,
}

struct Outcome {
    group: String,
    schnorr_verified: bool,
    session_key: Option<SessionKey>,
}

struct Demo<'a> {
    config: &'a Config,
    mode: ChallengeMode,
    secret: BigUint,
}

impl GroupVisitor for Demo<'_> {
    type Output = pseudonym_zkp::Result<Outcome>;

    fn visit<G: Group, R: CryptoRngCore>(self, group: G, rng: &mut R) -> Self::Output {
        let secret = &self.secret % group.order();
        let schnorr_verified = schnorr_round(&group, self.mode, &secret, rng)?;
        let session_key = pseudonym_flow(&group, self.config, secret, rng)?;
        Ok(Outcome {
            group: group.name().to_string(),
            schnorr_verified,
            session_key,
        })
    }
}

fn schnorr_round<G: Group, R: CryptoRngCore>(
    group: &G,
    mode: ChallengeMode,
    secret: &BigUint,
    rng: &mut R,
) -> pseudonym_zkp::Result<bool> {
    let base = group.random_element(rng);
    let mut prover = SchnorrProver::new(group.clone(), mode, secret.clone(), base.clone(), rng)?;
    let mut verifier = SchnorrVerifier::new(group.clone(), mode);

    if mode.uses_commitment() {
        let h = prover.opening_message()?;
        let commitment = verifier.commit_challenge(h, rng)?;
        prover.set_challenge_commitment(commitment)?;
    }
    let x = prover.proof_random_data(rng)?;
    let challenge = verifier.challenge(base, prover.value().clone(), x, rng)?;
    let response = prover.proof_data(&challenge)?;
    verifier.verify(&response)
}

fn pseudonym_flow<G: Group, R: CryptoRngCore>(
    group: &G,
    config: &Config,
    secret: BigUint,
    rng: &mut R,
) -> pseudonym_zkp::Result<Option<SessionKey>> {
    let issuer_org = &config.organizations[0];
    let verifier_org = config.organizations.get(1).unwrap_or(issuer_org);

    let org_keys = MemoryOrgKeyStore::generate(group.clone(), config.organizations.iter().cloned(), rng);
    let registrations = MemoryRegistrationStore::new(config.registration_keys.iter().cloned());
    let mut registration_keys = config.registration_keys.clone();
    while registration_keys.len() < 2 {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let key = hex::encode(bytes);
        registrations.insert(key.clone())?;
        registration_keys.push(key);
    }
    let session_keys = Arc::new(RandomSessionKeys::new(config.session_key_bytes)?);

    let user = User::new(group.clone(), secret)?;

    // CA certifies the master pseudonym
    let mut ca = CaCertifier::new(group.clone(), SigningKey::random(rng));
    let master = user.generate_nym(rng);
    let mut prover = user.certificate_prover(&master, rng)?;
    let x = prover.proof_random_data(rng)?;
    let e = ca.challenge(master.a.clone(), master.b.clone(), x, rng)?;
    let z = prover.proof_data(&Challenge { e, decommitment: None })?.z;
    let certificate = ca.verify(&z, rng)?;
    info!("master pseudonym certified");

    // pseudonyms at both organizations
    let mut nyms = Vec::with_capacity(2);
    for registration_key in registration_keys.iter().take(2) {
        let nym = user.generate_nym(rng);
        let mut nym_gen = OrgNymGen::new(group.clone(), ca.verifying_key(), &registrations, registration_key)?;
        let mut prover = user.nym_prover(&nym, &certificate)?;
        let (x1, x2) = prover.proof_random_data(rng)?;
        let e = nym_gen.challenge(&nym, &certificate, x1, x2, rng)?;
        let z = prover.proof_data(&e)?;
        if !nym_gen.verify(&z)? {
            return Err(Error::Verification("pseudonym registration failed".to_string()));
        }
        nyms.push(nym);
    }
    let (issuer_nym, verifier_nym) = (&nyms[0], &nyms[1]);

    // credential from the issuing organization
    let issuer_key = org_keys.public_key(issuer_org)?;
    let mut issuer = OrgCredentialIssuer::new(group.clone(), org_keys.secret_key(issuer_org)?);
    let mut auth = user.authentication_prover(issuer_nym, rng)?;
    let x = auth.proof_random_data(rng)?;
    let e = issuer.authentication_challenge(issuer_nym, x, rng)?;
    let z = auth.proof_data(&Challenge { e, decommitment: None })?.z;
    let commitments = issuer.verify_authentication(&z, rng)?;
    let mut request = user.credential_request(issuer_nym, &issuer_key, rng)?;
    let (e1, e2) = request.challenges(&commitments, rng)?;
    let (z1, z2) = issuer.proof_data(&e1, &e2)?;
    let credential = request.finish(&z1, &z2)?;
    info!(issuer = %issuer_org, "credential obtained");

    // transfer to the verifying organization
    let mut verifier = OrgCredentialVerifier::new(group.clone(), session_keys);
    let mut prover = user.transfer_prover(verifier_nym, &credential)?;
    let (x1, x2) = prover.proof_random_data(rng)?;
    let e = verifier.authentication_challenge(verifier_nym, &credential, x1, x2, rng)?;
    let z = prover.proof_data(&e)?;
    let session_key = verifier.verify_authentication(&z, &issuer_key)?;
    info!(verifier = %verifier_org, accepted = session_key.is_some(), "credential transferred");

    Ok(session_key)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = Config::load()?;
    if let Some(group) = args.group {
        config.group = group;
    }
    if let Some(mode) = args.mode {
        config.challenge_mode = mode;
    }
    config.validate()?;

    info!(group = %config.group, mode = %config.challenge_mode, "starting demo");

    let demo = Demo {
        config: &config,
        mode: config.challenge_mode,
        secret: args.secret,
    };
    let outcome = config.group.dispatch(&mut OsRng, demo)??;

    println!("group:            {}", outcome.group);
    println!("schnorr verified: {}", outcome.schnorr_verified);
    match outcome.session_key {
        Some(key) => println!("session key:      {key}"),
        None => {
            eprintln!("credential transfer rejected");
            std::process::exit(1);
        }
    }
    Ok(())
}
