use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use num_bigint::BigUint;
use pseudonym_zkp::groups::{SchnorrGroup, P256};
use pseudonym_zkp::protocol::{
    verify_blinded_transcript, BlindedTranscriptVerifier, ChallengeMode, DLogEqualityProver,
    SchnorrProver, SchnorrVerifier,
};
use pseudonym_zkp::Group;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn schnorr_round<G: Group>(group: &G, mode: ChallengeMode, secret: &BigUint, rng: &mut StdRng) -> bool {
    let base = group.generator();
    let mut prover = SchnorrProver::new(group.clone(), mode, secret.clone(), base.clone(), rng).unwrap();
    let mut verifier = SchnorrVerifier::new(group.clone(), mode);
    if mode.uses_commitment() {
        let h = prover.opening_message().unwrap();
        let c = verifier.commit_challenge(h, rng).unwrap();
        prover.set_challenge_commitment(c).unwrap();
    }
    let x = prover.proof_random_data(rng).unwrap();
    let challenge = verifier.challenge(base, prover.value().clone(), x, rng).unwrap();
    let response = prover.proof_data(&challenge).unwrap();
    verifier.verify(&response).unwrap()
}

fn bench_schnorr_p256(c: &mut Criterion) {
    let group = P256::p256();
    let mut rng = StdRng::seed_from_u64(1);
    let secret = group.random_scalar(&mut rng);

    for mode in [ChallengeMode::Sigma, ChallengeMode::Zkpok] {
        c.bench_function(&format!("schnorr_{mode}_p256"), |b| {
            b.iter(|| schnorr_round(black_box(&group), mode, black_box(&secret), &mut rng))
        });
    }
}

fn bench_schnorr_rfc5114(c: &mut Criterion) {
    let group = SchnorrGroup::rfc5114_2048_256();
    let mut rng = StdRng::seed_from_u64(2);
    let secret = group.random_scalar(&mut rng);

    c.bench_function("schnorr_sigma_rfc5114", |b| {
        b.iter(|| schnorr_round(black_box(&group), ChallengeMode::Sigma, black_box(&secret), &mut rng))
    });
}

fn bench_blinded_transcript_verification(c: &mut Criterion) {
    let group = P256::p256();
    let mut rng = StdRng::seed_from_u64(3);
    let secret = group.random_scalar(&mut rng);
    let g1 = group.generator();
    let g2 = group.random_element(&mut rng);

    let mut prover = DLogEqualityProver::new(group.clone(), secret, g1, g2).unwrap();
    let (t1, t2) = prover.values();
    let mut verifier = BlindedTranscriptVerifier::new_random(group.clone(), &mut rng);
    let (x1, x2) = prover.proof_random_data(&mut rng).unwrap();
    let e = verifier.challenge(g1, g2, t1, t2, x1, x2, &mut rng).unwrap();
    let z = prover.proof_data(&e).unwrap();
    let blinded = verifier.verify(&z).unwrap().unwrap();

    c.bench_function("blinded_transcript_verification_p256", |b| {
        b.iter(|| {
            verify_blinded_transcript(
                black_box(&group),
                black_box(&blinded.transcript),
                &g1,
                &t1,
                &blinded.g2,
                &blinded.t2,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_schnorr_p256,
    bench_schnorr_rfc5114,
    bench_blinded_transcript_verification
);
criterion_main!(benches);
