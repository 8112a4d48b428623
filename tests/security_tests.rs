mod common;

use std::sync::Arc;

use num_bigint::BigUint;
use pseudonym_zkp::groups::{SchnorrGroup, P256};
use pseudonym_zkp::protocol::{
    BlindedTranscriptVerifier, Challenge, DLogEqualityVerifier, SchnorrProver, SchnorrResponse,
    SchnorrVerifier,
};
use pseudonym_zkp::pseudonymsys::{
    verify_certificate, CaCertificate, MemoryRegistrationStore, OrgCredentialIssuer,
    OrgKeyStore, OrgNymGen, Pseudonym, RegistrationStore, User,
};
use pseudonym_zkp::{ChallengeMode, Error, Group};

use common::{rng, Deployment};

#[test]
fn out_of_order_prover_calls_end_the_session() {
    let mut rng = rng(1);
    let group = P256::p256();
    let base = group.generator();
    let mut prover =
        SchnorrProver::new(group.clone(), ChallengeMode::Zkp, 11u32.into(), base, &mut rng).unwrap();

    // proof data before any commitment exchange
    let challenge = Challenge {
        e: 1u32.into(),
        decommitment: Some(1u32.into()),
    };
    assert!(matches!(prover.proof_data(&challenge), Err(Error::Protocol(_))));
    assert!(matches!(prover.opening_message(), Err(Error::Protocol(_))));
}

#[test]
fn out_of_order_verifier_calls_end_the_session() {
    let mut rng = rng(2);
    let group = P256::p256();
    let g = group.generator();

    let mut zkp = SchnorrVerifier::new(group.clone(), ChallengeMode::Zkp);
    let result = zkp.challenge(g, g, g, &mut rng);
    assert!(matches!(result, Err(Error::Protocol(_))));
    assert!(matches!(zkp.commit_challenge(g, &mut rng), Err(Error::Protocol(_))));

    let mut sigma = SchnorrVerifier::new(group.clone(), ChallengeMode::Sigma);
    assert!(matches!(sigma.commit_challenge(g, &mut rng), Err(Error::Protocol(_))));

    let mut equality = DLogEqualityVerifier::new(group.clone());
    assert!(matches!(equality.verify(&1u32.into()), Err(Error::Protocol(_))));

    let mut blinded = BlindedTranscriptVerifier::new_random(group, &mut rng);
    assert!(matches!(blinded.verify(&1u32.into()), Err(Error::Protocol(_))));
}

#[test]
fn scalars_outside_the_order_are_rejected_before_sending() {
    let mut rng = rng(3);
    let group = P256::p256();
    let order = group.order().clone();

    let prover = SchnorrProver::new(group.clone(), ChallengeMode::Sigma, order.clone(), group.generator(), &mut rng);
    assert!(matches!(prover, Err(Error::InvalidScalar(_))));
    assert!(matches!(User::new(group.clone(), order.clone()), Err(Error::InvalidScalar(_))));
    assert!(matches!(
        BlindedTranscriptVerifier::new(group, order),
        Err(Error::InvalidScalar(_))
    ));
}

#[test]
fn elements_outside_the_subgroup_are_rejected() {
    let mut rng = rng(4);
    let group = SchnorrGroup::new(23u32.into(), 11u32.into(), 4u32.into()).unwrap();
    let mut verifier = SchnorrVerifier::new(group.clone(), ChallengeMode::Sigma);

    // 5 generates all of Z_23^*, not the order-11 subgroup
    let result = verifier.challenge(group.generator(), 5u32.into(), group.generator(), &mut rng);
    assert!(matches!(result, Err(Error::InvalidGroupElement(_))));
}

#[test]
fn zkpok_rejects_forged_trapdoor() {
    let mut rng = rng(5);
    let group = P256::p256();
    let base = group.generator();
    let mut prover =
        SchnorrProver::new(group.clone(), ChallengeMode::Zkpok, 77u32.into(), base, &mut rng).unwrap();
    let mut verifier = SchnorrVerifier::new(group, ChallengeMode::Zkpok);

    let h = prover.opening_message().unwrap();
    let c = verifier.commit_challenge(h, &mut rng).unwrap();
    prover.set_challenge_commitment(c).unwrap();
    let x = prover.proof_random_data(&mut rng).unwrap();
    let challenge = verifier.challenge(base, *prover.value(), x, &mut rng).unwrap();
    let response = prover.proof_data(&challenge).unwrap();

    let forged = SchnorrResponse {
        z: response.z,
        trapdoor: response.trapdoor.map(|t| t + 1u32),
    };
    assert!(!verifier.verify(&forged).unwrap());
}

#[test]
fn certificate_is_bound_to_its_blinding() {
    let mut rng = rng(6);
    let deployment = Deployment::new(P256::p256(), &mut rng);
    let group = &deployment.group;
    let user = User::new(group.clone(), 31337u32.into()).unwrap();
    let master = user.generate_nym(&mut rng);
    let certificate = deployment.certify(&user, &master, &mut rng).unwrap();
    let ca_key = deployment.ca_verifying_key();
    verify_certificate(group, &ca_key, &certificate).unwrap();

    // same pseudonym, blinded with a different r
    let reblinded = CaCertificate::new(
        group.scalar_exp(&certificate.blinded_a, &BigUint::from(2u32)),
        group.scalar_exp(&certificate.blinded_b, &BigUint::from(2u32)),
        &certificate.r(),
        &certificate.s(),
    )
    .unwrap();
    assert!(matches!(
        verify_certificate(group, &ca_key, &reblinded),
        Err(Error::Signature(_))
    ));

    // an organization refuses the re-blinded certificate before any proof runs
    let nym = user.generate_nym(&mut rng);
    let mut nym_gen = OrgNymGen::new(group.clone(), ca_key, &deployment.registrations, "reg-1").unwrap();
    let mut prover = user.nym_prover(&nym, &reblinded).unwrap();
    let (x1, x2) = prover.proof_random_data(&mut rng).unwrap();
    let result = nym_gen.challenge(&nym, &reblinded, x1, x2, &mut rng);
    assert!(matches!(result, Err(Error::Signature(_))));
}

#[test]
fn certificate_for_another_user_does_not_register() {
    let mut rng = rng(7);
    let deployment = Deployment::new(P256::p256(), &mut rng);
    let group = &deployment.group;
    let alice = User::new(group.clone(), 1111u32.into()).unwrap();
    let mallory = User::new(group.clone(), 2222u32.into()).unwrap();

    let alice_master = alice.generate_nym(&mut rng);
    let certificate = deployment.certify(&alice, &alice_master, &mut rng).unwrap();

    let registered = deployment
        .register(&mallory, "reg-1", &certificate, &mut rng)
        .unwrap();
    assert!(registered.is_none());
}

#[test]
fn registration_key_cannot_be_reused() {
    let mut rng = rng(8);
    let deployment = Deployment::new(P256::p256(), &mut rng);
    let user = User::new(deployment.group.clone(), 4u32.into()).unwrap();
    let master = user.generate_nym(&mut rng);
    let certificate = deployment.certify(&user, &master, &mut rng).unwrap();

    assert!(deployment.register(&user, "reg-1", &certificate, &mut rng).unwrap().is_some());
    let again = deployment.register(&user, "reg-1", &certificate, &mut rng);
    assert!(matches!(again, Err(Error::RegistrationDenied)));
    let unknown = deployment.register(&user, "never-issued", &certificate, &mut rng);
    assert!(matches!(unknown, Err(Error::RegistrationDenied)));
}

#[test]
fn credential_is_not_transferable_to_another_user() {
    let mut rng = rng(9);
    let deployment = Deployment::new(P256::p256(), &mut rng);
    let group = &deployment.group;
    let alice = User::new(group.clone(), 1010u32.into()).unwrap();
    let mallory = User::new(group.clone(), 2020u32.into()).unwrap();

    let alice_master = alice.generate_nym(&mut rng);
    let alice_cert = deployment.certify(&alice, &alice_master, &mut rng).unwrap();
    let alice_nym = deployment.register(&alice, "reg-1", &alice_cert, &mut rng).unwrap().unwrap();
    let credential = deployment.issue(&alice, "org1", &alice_nym, &mut rng).unwrap();

    let mallory_master = mallory.generate_nym(&mut rng);
    let mallory_cert = deployment.certify(&mallory, &mallory_master, &mut rng).unwrap();
    let mallory_nym = deployment.register(&mallory, "reg-2", &mallory_cert, &mut rng).unwrap().unwrap();

    let issuer_key = deployment.org_keys.public_key("org1").unwrap();
    let key = deployment
        .transfer(&mallory, &mallory_nym, &credential, &issuer_key, &mut rng)
        .unwrap();
    assert!(key.is_none());
}

#[test]
fn tampered_credential_transcript_is_rejected() {
    let mut rng = rng(10);
    let deployment = Deployment::new(P256::p256(), &mut rng);
    let group = &deployment.group;
    let user = User::new(group.clone(), 5150u32.into()).unwrap();
    let master = user.generate_nym(&mut rng);
    let cert = deployment.certify(&user, &master, &mut rng).unwrap();
    let nym1 = deployment.register(&user, "reg-1", &cert, &mut rng).unwrap().unwrap();
    let nym2 = deployment.register(&user, "reg-2", &cert, &mut rng).unwrap().unwrap();
    let mut credential = deployment.issue(&user, "org1", &nym1, &mut rng).unwrap();
    credential.t2.z_alpha += 1u32;

    let issuer_key = deployment.org_keys.public_key("org1").unwrap();
    let key = deployment
        .transfer(&user, &nym2, &credential, &issuer_key, &mut rng)
        .unwrap();
    assert!(key.is_none());
}

#[test]
fn zero_blinding_is_refused() {
    let group = P256::p256();
    let result = BlindedTranscriptVerifier::new(group, 0u32.into());
    assert!(matches!(result, Err(Error::InvalidScalar(_))));
}

#[test]
fn credential_blinded_to_the_identity_is_refused_at_transfer() {
    let mut rng = rng(11);
    let deployment = Deployment::new(P256::p256(), &mut rng);
    let group = &deployment.group;
    let alice = User::new(group.clone(), 7007u32.into()).unwrap();
    let mallory = User::new(group.clone(), 8008u32.into()).unwrap();

    let alice_master = alice.generate_nym(&mut rng);
    let alice_cert = deployment.certify(&alice, &alice_master, &mut rng).unwrap();
    let alice_nym = deployment.register(&alice, "reg-1", &alice_cert, &mut rng).unwrap().unwrap();
    let mut credential = deployment.issue(&alice, "org1", &alice_nym, &mut rng).unwrap();

    // what a zero gamma would have produced: bound to no pseudonym at all
    let identity = group.identity();
    credential.small_a_to_gamma = identity;
    credential.small_b_to_gamma = identity;
    credential.a_to_gamma = identity;
    credential.b_to_gamma = identity;

    let mallory_master = mallory.generate_nym(&mut rng);
    let mallory_cert = deployment.certify(&mallory, &mallory_master, &mut rng).unwrap();
    let mallory_nym = deployment.register(&mallory, "reg-2", &mallory_cert, &mut rng).unwrap().unwrap();

    let issuer_key = deployment.org_keys.public_key("org1").unwrap();
    let result = deployment.transfer(&mallory, &mallory_nym, &credential, &issuer_key, &mut rng);
    assert!(matches!(result, Err(Error::InvalidGroupElement(_))));
}

#[test]
fn identity_master_pseudonym_is_not_certified() {
    let mut rng = rng(12);
    let deployment = Deployment::new(P256::p256(), &mut rng);
    let group = &deployment.group;
    let user = User::new(group.clone(), 99u32.into()).unwrap();

    let trivial = Pseudonym::new(group.identity(), group.identity());
    let result = deployment.certify(&user, &trivial, &mut rng);
    assert!(matches!(result, Err(Error::InvalidGroupElement(_))));
}

#[test]
fn identity_pseudonym_is_not_registered() {
    let mut rng = rng(13);
    let deployment = Deployment::new(P256::p256(), &mut rng);
    let group = &deployment.group;
    let user = User::new(group.clone(), 1234u32.into()).unwrap();
    let master = user.generate_nym(&mut rng);
    let certificate = deployment.certify(&user, &master, &mut rng).unwrap();

    let trivial = Pseudonym::new(group.identity(), group.identity());
    let mut nym_gen = OrgNymGen::new(
        group.clone(),
        deployment.ca_verifying_key(),
        &deployment.registrations,
        "reg-1",
    )
    .unwrap();
    let mut prover = user.nym_prover(&trivial, &certificate).unwrap();
    let (x1, x2) = prover.proof_random_data(&mut rng).unwrap();
    let result = nym_gen.challenge(&trivial, &certificate, x1, x2, &mut rng);
    assert!(matches!(result, Err(Error::InvalidGroupElement(_))));

    // the registration key is spent and the session is over
    let nym = user.generate_nym(&mut rng);
    let mut prover = user.nym_prover(&nym, &certificate).unwrap();
    let (x1, x2) = prover.proof_random_data(&mut rng).unwrap();
    let result = nym_gen.challenge(&nym, &certificate, x1, x2, &mut rng);
    assert!(matches!(result, Err(Error::Protocol(_))));
    assert!(matches!(nym_gen.verify(&1u32.into()), Err(Error::Protocol(_))));
}

#[test]
fn identity_pseudonym_cannot_request_a_credential() {
    let mut rng = rng(14);
    let deployment = Deployment::new(P256::p256(), &mut rng);
    let group = &deployment.group;
    let mut issuer = OrgCredentialIssuer::new(
        group.clone(),
        deployment.org_keys.secret_key("org1").unwrap(),
    );

    let trivial = Pseudonym::new(group.identity(), group.identity());
    let result = issuer.authentication_challenge(&trivial, group.generator(), &mut rng);
    assert!(matches!(result, Err(Error::InvalidGroupElement(_))));
    assert!(matches!(
        issuer.verify_authentication(&1u32.into(), &mut rng),
        Err(Error::Protocol(_))
    ));
}

#[test]
fn failed_certificate_check_ends_the_registration() {
    let mut rng = rng(15);
    let deployment = Deployment::new(P256::p256(), &mut rng);
    let group = &deployment.group;
    let user = User::new(group.clone(), 2468u32.into()).unwrap();
    let master = user.generate_nym(&mut rng);
    let certificate = deployment.certify(&user, &master, &mut rng).unwrap();
    let forged = CaCertificate::new(
        group.scalar_exp(&certificate.blinded_a, &BigUint::from(3u32)),
        group.scalar_exp(&certificate.blinded_b, &BigUint::from(3u32)),
        &certificate.r(),
        &certificate.s(),
    )
    .unwrap();

    let nym = user.generate_nym(&mut rng);
    let mut nym_gen = OrgNymGen::new(
        group.clone(),
        deployment.ca_verifying_key(),
        &deployment.registrations,
        "reg-1",
    )
    .unwrap();

    let mut prover = user.nym_prover(&nym, &forged).unwrap();
    let (x1, x2) = prover.proof_random_data(&mut rng).unwrap();
    let result = nym_gen.challenge(&nym, &forged, x1, x2, &mut rng);
    assert!(matches!(result, Err(Error::Signature(_))));

    // a genuine certificate on the same session is no longer accepted
    let mut prover = user.nym_prover(&nym, &certificate).unwrap();
    let (x1, x2) = prover.proof_random_data(&mut rng).unwrap();
    let result = nym_gen.challenge(&nym, &certificate, x1, x2, &mut rng);
    assert!(matches!(result, Err(Error::Protocol(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_consume_a_key_once() {
    let store = Arc::new(MemoryRegistrationStore::new(["shared-key"]));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.check_and_consume("shared-key").unwrap()
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1);
    assert!(store.is_empty().unwrap());
}
