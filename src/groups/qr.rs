use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;

use crate::crypto::field::{coprime, mod_inverse};
use crate::crypto::prime::random_safe_prime;
use crate::{Error, Group, Result};

/// Quadratic residues modulo `N = P * Q` for safe primes `P = 2p + 1` and
/// `Q = 2q + 1`.
///
/// `QR_N` is cyclic of order `p * q`. The order is only known to whoever
/// generated `N`; a holder of this value therefore knows the factorization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrSpecialRsa {
    n: BigUint,
    order: BigUint,
    g: BigUint,
    name: String,
}

impl QrSpecialRsa {
    /// Generates a new group from two fresh `prime_bits`-bit safe primes.
    pub fn generate<R: CryptoRngCore>(prime_bits: u64, rng: &mut R) -> Result<Self> {
        if prime_bits < 16 {
            return Err(Error::InvalidParams(format!(
                "safe primes of {prime_bits} bits are too small"
            )));
        }

        let (p, p_half) = random_safe_prime(prime_bits, rng);
        let (q, q_half) = loop {
            let candidate = random_safe_prime(prime_bits, rng);
            if candidate.0 != p {
                break candidate;
            }
        };

        Self::from_safe_primes(&p, &q, &p_half, &q_half, rng)
    }

    fn from_safe_primes<R: CryptoRngCore>(
        p: &BigUint,
        q: &BigUint,
        p_half: &BigUint,
        q_half: &BigUint,
        rng: &mut R,
    ) -> Result<Self> {
        let n = p * q;
        let order = p_half * q_half;

        // A square g with gcd(g - 1, N) = 1 is neither 1 mod P nor 1 mod Q,
        // so its order is exactly p * q.
        let two = BigUint::from(2u32);
        let g = loop {
            let x = rng.gen_biguint_range(&two, &n);
            if !coprime(&x, &n) {
                continue;
            }
            let g = x.modpow(&two, &n);
            if g.is_one() {
                continue;
            }
            if coprime(&(&g - 1u32), &n) {
                break g;
            }
        };

        let name = format!("QR-SpecialRSA-{}", n.bits());
        Ok(Self { n, order, g, name })
    }

    /// Returns the modulus `N`.
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }
}

impl Group for QrSpecialRsa {
    type Element = BigUint;

    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> &BigUint {
        &self.order
    }

    fn generator(&self) -> Self::Element {
        self.g.clone()
    }

    fn identity(&self) -> Self::Element {
        BigUint::one()
    }

    fn compose(&self, x: &Self::Element, y: &Self::Element) -> Self::Element {
        (x * y) % &self.n
    }

    fn scalar_exp(&self, x: &Self::Element, k: &BigUint) -> Self::Element {
        x.modpow(k, &self.n)
    }

    fn invert(&self, x: &Self::Element) -> Self::Element {
        mod_inverse(x, &self.n)
            .unwrap_or_else(|| panic!("{} is not a unit modulo N; not a group element", x))
    }

    fn element_to_bytes(&self, x: &Self::Element) -> Vec<u8> {
        x.to_bytes_be()
    }

    fn validate_element(&self, x: &Self::Element) -> Result<()> {
        if x.is_zero() || x >= &self.n || !coprime(x, &self.n) {
            return Err(Error::InvalidGroupElement(
                "element must be a unit modulo N".to_string(),
            ));
        }
        if !x.modpow(&self.order, &self.n).is_one() {
            return Err(Error::InvalidGroupElement(
                "element is not a quadratic residue".to_string(),
            ));
        }
        Ok(())
    }
}
