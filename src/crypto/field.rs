use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::{Error, Result};

/// Performs modular exponentiation `base^exp mod modulus`.
///
/// Returns an error for a zero or even modulus; every modulus used in the
/// crate is odd.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(Error::InvalidParams("modulus cannot be zero".to_string()));
    }
    if modulus.is_even() {
        return Err(Error::InvalidParams("modulus must be odd".to_string()));
    }
    Ok(base.modpow(exp, modulus))
}

/// Computes the inverse of `a` modulo `modulus`, if `gcd(a, modulus) = 1`.
pub fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    a.modinv(modulus)
}

/// Computes `(k + e * w) mod q`, the response of every sigma protocol here.
pub fn sigma_response(k: &BigUint, e: &BigUint, w: &BigUint, q: &BigUint) -> BigUint {
    (k + e * w) % q
}

/// Computes `(a + b) mod q`.
pub fn add_mod(a: &BigUint, b: &BigUint, q: &BigUint) -> BigUint {
    (a + b) % q
}

/// Returns `true` when `a` and `b` share no factor.
pub fn coprime(a: &BigUint, b: &BigUint) -> bool {
    a.gcd(b).is_one()
}
