use core::fmt::Debug;

use num_bigint::{BigUint, RandBigInt};
use rand_core::CryptoRngCore;

use crate::{Error, Result};

/// Cyclic group of known order used by every proof engine in the crate.
///
/// The same protocol code runs over multiplicative groups modulo a prime
/// (Schnorr groups), quadratic residues modulo a product of safe primes, and
/// elliptic curves. Operations are written multiplicatively: `compose` is
/// point addition on a curve and `scalar_exp` is scalar multiplication.
///
/// Scalars are plain [`BigUint`] values. Callers reduce exponents modulo
/// [`Group::order`] before handing them in; implementations do not re-reduce
/// for the purpose of the protocol.
pub trait Group: Clone + Debug + Send + Sync + 'static {
    /// Element type for this group.
    type Element: Clone + Debug + Eq + PartialEq + Send + Sync;

    /// Returns a human readable name, e.g. `P-256` or `Schnorr-2048`.
    fn name(&self) -> &str;

    /// Returns the order `Q` of the generator.
    fn order(&self) -> &BigUint;

    /// Returns the generator `G`.
    fn generator(&self) -> Self::Element;

    /// Returns the identity element (1, or the point at infinity).
    fn identity(&self) -> Self::Element;

    /// Group operation: `x * y` (or `x + y` on a curve).
    fn compose(&self, x: &Self::Element, y: &Self::Element) -> Self::Element;

    /// Exponentiation: `x^k` (or `k * x` on a curve).
    fn scalar_exp(&self, x: &Self::Element, k: &BigUint) -> Self::Element;

    /// Inverse element: `x^-1` (or `-x` on a curve).
    fn invert(&self, x: &Self::Element) -> Self::Element;

    /// Canonical byte encoding, used for hashing.
    fn element_to_bytes(&self, x: &Self::Element) -> Vec<u8>;

    /// Checks that `x` lies in the group's coordinate domain and subgroup.
    fn validate_element(&self, x: &Self::Element) -> Result<()>;

    /// Exponentiation of the generator: `G^k`.
    fn exp_base_g(&self, k: &BigUint) -> Self::Element {
        self.scalar_exp(&self.generator(), k)
    }

    /// Returns `true` for the identity element.
    fn is_identity(&self, x: &Self::Element) -> bool {
        *x == self.identity()
    }

    /// Rejects the identity where a base or public value must be non-trivial.
    fn check_not_identity(&self, x: &Self::Element, what: &str) -> Result<()> {
        if self.is_identity(x) {
            return Err(Error::InvalidGroupElement(format!(
                "{what} must not be the identity"
            )));
        }
        Ok(())
    }

    /// Draws a uniform scalar in `[0, Q)`.
    fn random_scalar<R: CryptoRngCore>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_below(self.order())
    }

    /// Draws a uniform element as `G^k` for a uniform `k`.
    fn random_element<R: CryptoRngCore>(&self, rng: &mut R) -> Self::Element {
        let k = self.random_scalar(rng);
        self.exp_base_g(&k)
    }

    /// Rejects scalars outside `[0, Q)`.
    fn check_scalar(&self, k: &BigUint, what: &str) -> Result<()> {
        if k >= self.order() {
            return Err(Error::InvalidScalar(format!(
                "{what} must be smaller than the group order"
            )));
        }
        Ok(())
    }
}
