use core::mem;

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use crate::crypto::field::sigma_response;
use crate::crypto::SecretScalar;
use crate::{Error, Group, Result};

/// Proves knowledge of `w` with `g1^w = t1` and `g2^w = t2` (Chaum-Pedersen).
#[derive(Debug)]
pub struct DLogEqualityProver<G: Group> {
    group: G,
    secret: SecretScalar,
    g1: G::Element,
    g2: G::Element,
    nonce: Option<SecretScalar>,
    finished: bool,
}

impl<G: Group> DLogEqualityProver<G> {
    pub fn new(group: G, secret: BigUint, g1: G::Element, g2: G::Element) -> Result<Self> {
        group.check_scalar(&secret, "secret")?;
        group.validate_element(&g1)?;
        group.validate_element(&g2)?;
        Ok(Self {
            group,
            secret: secret.into(),
            g1,
            g2,
            nonce: None,
            finished: false,
        })
    }

    /// The proven values `(g1^w, g2^w)`.
    pub fn values(&self) -> (G::Element, G::Element) {
        (
            self.group.scalar_exp(&self.g1, &self.secret),
            self.group.scalar_exp(&self.g2, &self.secret),
        )
    }

    /// Returns `(x1, x2) = (g1^r, g2^r)` for a fresh nonce `r`.
    pub fn proof_random_data<R: CryptoRngCore>(
        &mut self,
        rng: &mut R,
    ) -> Result<(G::Element, G::Element)> {
        if self.finished || self.nonce.is_some() {
            self.finished = true;
            self.nonce = None;
            return Err(Error::protocol("a fresh prover", "already committed"));
        }

        let r = self.group.random_scalar(rng);
        let x1 = self.group.scalar_exp(&self.g1, &r);
        let x2 = self.group.scalar_exp(&self.g2, &r);
        self.nonce = Some(r.into());
        Ok((x1, x2))
    }

    /// Returns `z = r + e * w mod Q`.
    pub fn proof_data(&mut self, challenge: &BigUint) -> Result<BigUint> {
        self.finished = true;
        let r = self
            .nonce
            .take()
            .ok_or_else(|| Error::protocol("a commitment", "uncommitted"))?;
        self.group.check_scalar(challenge, "challenge")?;
        Ok(sigma_response(&r, challenge, &self.secret, self.group.order()))
    }
}

#[derive(Debug)]
enum VerifierState<E> {
    Ready,
    AwaitingResponse {
        g1: E,
        g2: E,
        t1: E,
        t2: E,
        x1: E,
        x2: E,
        e: BigUint,
    },
    Done,
}

/// Verifies a Chaum-Pedersen run: `g1^z == x1 * t1^e` and `g2^z == x2 * t2^e`.
#[derive(Debug)]
pub struct DLogEqualityVerifier<G: Group> {
    group: G,
    state: VerifierState<G::Element>,
}

impl<G: Group> DLogEqualityVerifier<G> {
    pub fn new(group: G) -> Self {
        Self {
            group,
            state: VerifierState::Ready,
        }
    }

    /// Records the statement and the prover's commitment, and returns `e`.
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
        match mem::replace(&mut self.state, VerifierState::Done) {
            VerifierState::Ready => {}
            VerifierState::AwaitingResponse { .. } => {
                return Err(Error::protocol("ready", "awaiting response"))
            }
            VerifierState::Done => return Err(Error::protocol("ready", "done")),
        }

        for element in [&g1, &g2, &t1, &t2, &x1, &x2] {
            self.group.validate_element(element)?;
        }

        let e = self.group.random_scalar(rng);
        self.state = VerifierState::AwaitingResponse {
            g1,
            g2,
            t1,
            t2,
            x1,
            x2,
            e: e.clone(),
        };
        Ok(e)
    }

    pub fn verify(&mut self, z: &BigUint) -> Result<bool> {
        match mem::replace(&mut self.state, VerifierState::Done) {
            VerifierState::AwaitingResponse {
                g1,
                g2,
                t1,
                t2,
                x1,
                x2,
                e,
            } => Ok(equality_holds(&self.group, [&g1, &g2], [&t1, &t2], [&x1, &x2], &e, z)),
            VerifierState::Ready => Err(Error::protocol("awaiting response", "ready")),
            VerifierState::Done => Err(Error::protocol("awaiting response", "done")),
        }
    }
}

/// `gi^z == xi * ti^e` for both bases, with `z` inside `[0, Q)`.
pub(crate) fn equality_holds<G: Group>(
    group: &G,
    bases: [&G::Element; 2],
    values: [&G::Element; 2],
    commitments: [&G::Element; 2],
    e: &BigUint,
    z: &BigUint,
) -> bool {
    if z >= group.order() {
        return false;
    }
    bases
        .iter()
        .zip(values.iter())
        .zip(commitments.iter())
        .all(|((g, t), x)| {
            group.scalar_exp(g, z) == group.compose(x, &group.scalar_exp(t, e))
        })
}
