//! Discrete-log equality with a transcript the verifier blinds.
//!
//! The prover runs an ordinary Chaum-Pedersen proof for `g1^w = t1` and
//! `g2^w = t2`. The verifier answers with a challenge derived from a blinded
//! commitment, and on success keeps a [`Transcript`] that anyone holding
//! `(g1, t1, g2^gamma, t2^gamma)` can check. The prover cannot link the
//! transcript to its own run.

use core::mem;

use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::CryptoRngCore;

use super::dlog_equality::equality_holds;
use crate::crypto::field::add_mod;
use crate::crypto::{hash_to_int, SecretScalar};
use crate::{Error, Group, Result};

/// Non-interactive record `{A, B, H, Z}` of a blinded run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcript<E> {
    pub a: E,
    pub b: E,
    pub hash: BigUint,
    pub z_alpha: BigUint,
}

impl<E: PartialEq> Transcript<E> {
    /// Checks `H == Hash(A, B)`, `g1^Z == A * t1^H` and `g2^Z == B * t2^H`.
    pub fn verify<G>(&self, group: &G, g1: &E, t1: &E, g2: &E, t2: &E) -> bool
    where
        G: Group<Element = E>,
    {
        if hash_to_int(group, &[&self.a, &self.b]) != self.hash {
            return false;
        }
        let first = group.scalar_exp(g1, &self.z_alpha)
            == group.compose(&self.a, &group.scalar_exp(t1, &self.hash));
        let second = group.scalar_exp(g2, &self.z_alpha)
            == group.compose(&self.b, &group.scalar_exp(t2, &self.hash));
        first && second
    }
}

/// Verifies `transcript` for the blinded bases `g2 = g2^gamma`, `t2 = t2^gamma`.
pub fn verify_blinded_transcript<G: Group>(
    group: &G,
    transcript: &Transcript<G::Element>,
    g1: &G::Element,
    t1: &G::Element,
    g2: &G::Element,
    t2: &G::Element,
) -> bool {
    transcript.verify(group, g1, t1, g2, t2)
}

/// Output of a successful blinded run: the transcript with the blinded bases
/// it verifies against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlindedTranscript<E> {
    pub transcript: Transcript<E>,
    /// `g2^gamma`
    pub g2: E,
    /// `t2^gamma`
    pub t2: E,
}

#[derive(Debug)]
enum State<E> {
    Ready,
    AwaitingResponse(Box<Pending<E>>),
    Done,
}

#[derive(Debug)]
struct Pending<E> {
    g1: E,
    g2: E,
    t1: E,
    t2: E,
    x1: E,
    x2: E,
    alpha: SecretScalar,
    e: BigUint,
    a: E,
    b: E,
    hash: BigUint,
}

/// Verifier of a blinded-transcript run, holding the private blinding `gamma`.
#[derive(Debug)]
pub struct BlindedTranscriptVerifier<G: Group> {
    group: G,
    gamma: SecretScalar,
    state: State<G::Element>,
}

impl<G: Group> BlindedTranscriptVerifier<G> {
    /// Creates a verifier for the blinding `gamma` in `(0, Q)`.
    ///
    /// A zero `gamma` maps every blinded value to the identity, which would
    /// detach the transcript from the prover's statement.
    pub fn new(group: G, gamma: BigUint) -> Result<Self> {
        group.check_scalar(&gamma, "gamma")?;
        if gamma.is_zero() {
            return Err(Error::InvalidScalar("gamma must not be zero".to_string()));
        }
        Ok(Self {
            group,
            gamma: gamma.into(),
            state: State::Ready,
        })
    }

    pub fn new_random<R: CryptoRngCore>(group: G, rng: &mut R) -> Self {
        let gamma = loop {
            let gamma = group.random_scalar(rng);
            if !gamma.is_zero() {
                break gamma;
            }
        };
        Self {
            group,
            gamma: gamma.into(),
            state: State::Ready,
        }
    }

    /// Blinds the prover's `(x1, x2)` and returns `e = Hash(A, B) + beta mod Q`.
    #[allow(clippy::too_many_arguments)]
    pub fn challenge<R: CryptoRngCore>(
        &mut self,
        g1: G::Element,
        g2: G::Element,
        t1: G::Element,
        t2: G::Element,
        x1: G::Element,
        x2: G::Element,
        rng: &mut R,
    ) -> Result<BigUint> {
        match mem::replace(&mut self.state, State::Done) {
            State::Ready => {}
            State::AwaitingResponse(_) => return Err(Error::protocol("ready", "awaiting response")),
            State::Done => return Err(Error::protocol("ready", "done")),
        }

        for element in [&g1, &g2, &t1, &t2, &x1, &x2] {
            self.group.validate_element(element)?;
        }

        let group = &self.group;
        let alpha = SecretScalar::new(group.random_scalar(rng));
        let beta = group.random_scalar(rng);

        // A = x1 * g1^alpha * t1^beta
        let a = group.compose(
            &group.compose(&x1, &group.scalar_exp(&g1, &alpha)),
            &group.scalar_exp(&t1, &beta),
        );
        // B = (x2 * g2^alpha * t2^beta)^gamma
        let b = group.scalar_exp(
            &group.compose(
                &group.compose(&x2, &group.scalar_exp(&g2, &alpha)),
                &group.scalar_exp(&t2, &beta),
            ),
            &self.gamma,
        );
        let hash = hash_to_int(group, &[&a, &b]);
        let e = add_mod(&hash, &beta, group.order());

        self.state = State::AwaitingResponse(Box::new(Pending {
            g1,
            g2,
            t1,
            t2,
            x1,
            x2,
            alpha,
            e: e.clone(),
            a,
            b,
            hash,
        }));
        Ok(e)
    }

    /// Checks the live proof and, if it holds, returns the blinded transcript.
    pub fn verify(&mut self, z: &BigUint) -> Result<Option<BlindedTranscript<G::Element>>> {
        let pending = match mem::replace(&mut self.state, State::Done) {
            State::AwaitingResponse(pending) => pending,
            State::Ready => return Err(Error::protocol("awaiting response", "ready")),
            State::Done => return Err(Error::protocol("awaiting response", "done")),
        };
        let Pending {
            g1,
            g2,
            t1,
            t2,
            x1,
            x2,
            alpha,
            e,
            a,
            b,
            hash,
        } = *pending;

        if !equality_holds(&self.group, [&g1, &g2], [&t1, &t2], [&x1, &x2], &e, z) {
            return Ok(None);
        }

        let transcript = Transcript {
            a,
            b,
            hash,
            z_alpha: add_mod(z, &alpha, self.group.order()),
        };
        Ok(Some(BlindedTranscript {
            transcript,
            g2: self.group.scalar_exp(&g2, &self.gamma),
            t2: self.group.scalar_exp(&t2, &self.gamma),
        }))
    }
}
