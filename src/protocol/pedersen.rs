use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use crate::crypto::SecretScalar;
use crate::{Error, Group, Result};

/// Receiving side of a Pedersen commitment.
///
/// Holds the trapdoor `a` and publishes `h = g^a`. Whoever knows `a` can open
/// a commitment to any value, which is what the proof-of-knowledge mode
/// relies on for extraction.
#[derive(Clone, Debug)]
pub struct PedersenReceiver<G: Group> {
    group: G,
    trapdoor: SecretScalar,
    h: G::Element,
    commitment: Option<G::Element>,
}

impl<G: Group> PedersenReceiver<G> {
    /// Creates a receiver with a fresh random trapdoor.
    pub fn new<R: CryptoRngCore>(group: G, rng: &mut R) -> Self {
        let trapdoor = group.random_scalar(rng);
        let h = group.exp_base_g(&trapdoor);
        Self {
            group,
            trapdoor: trapdoor.into(),
            h,
            commitment: None,
        }
    }

    /// Creates a receiver for a caller-chosen trapdoor.
    pub fn with_trapdoor(group: G, trapdoor: BigUint) -> Result<Self> {
        group.check_scalar(&trapdoor, "commitment trapdoor")?;
        let h = group.exp_base_g(&trapdoor);
        Ok(Self {
            group,
            trapdoor: trapdoor.into(),
            h,
            commitment: None,
        })
    }

    /// The public commitment base `h = g^a`.
    pub fn h(&self) -> &G::Element {
        &self.h
    }

    /// The trapdoor `a`, revealed to the committer in proof-of-knowledge mode.
    pub fn trapdoor(&self) -> &BigUint {
        &self.trapdoor
    }

    /// Stores the committer's `c`. A later commitment replaces an earlier one.
    pub fn set_commitment(&mut self, commitment: G::Element) -> Result<()> {
        self.group.validate_element(&commitment)?;
        self.commitment = Some(commitment);
        Ok(())
    }

    /// Checks `c == g^value * h^r` for the stored commitment.
    pub fn check_decommitment(&self, value: &BigUint, r: &BigUint) -> Result<bool> {
        let commitment = self
            .commitment
            .as_ref()
            .ok_or_else(|| Error::protocol("a commitment", "empty"))?;

        if value >= self.group.order() || r >= self.group.order() {
            return Ok(false);
        }

        let expected = self.group.compose(
            &self.group.exp_base_g(value),
            &self.group.scalar_exp(&self.h, r),
        );
        Ok(&expected == commitment)
    }
}

/// Committing side of a Pedersen commitment, bound to the receiver's `h`.
#[derive(Clone, Debug)]
pub struct PedersenCommitter<G: Group> {
    group: G,
    h: G::Element,
    opening: Option<(BigUint, BigUint)>,
}

impl<G: Group> PedersenCommitter<G> {
    pub fn new(group: G, h: G::Element) -> Result<Self> {
        group.validate_element(&h)?;
        Ok(Self {
            group,
            h,
            opening: None,
        })
    }

    /// Commits to `value` in `[0, Q)` and returns `c = g^value * h^r`.
    pub fn commit<R: CryptoRngCore>(&mut self, value: &BigUint, rng: &mut R) -> Result<G::Element> {
        self.group.check_scalar(value, "committed value")?;

        let r = self.group.random_scalar(rng);
        let c = self.group.compose(
            &self.group.exp_base_g(value),
            &self.group.scalar_exp(&self.h, &r),
        );
        self.opening = Some((value.clone(), r));
        Ok(c)
    }

    /// Returns the `(value, r)` opening of the last commitment.
    pub fn decommitment(&self) -> Result<(BigUint, BigUint)> {
        self.opening
            .clone()
            .ok_or_else(|| Error::protocol("a prior commit", "uncommitted"))
    }

    /// Checks that `trapdoor` is the discrete log of `h`.
    pub fn verify_trapdoor(&self, trapdoor: &BigUint) -> bool {
        self.group.exp_base_g(trapdoor) == self.h
    }
}
