use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;

use crate::crypto::field::{mod_inverse, mod_pow};
use crate::crypto::prime::{is_probable_prime, random_prime, MILLER_RABIN_ROUNDS};
use crate::{Error, Group, Result};

/// Multiplicative subgroup of prime order `Q` in `Z_P^*`, generated by `G`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchnorrGroup {
    p: BigUint,
    q: BigUint,
    g: BigUint,
    name: String,
}

impl SchnorrGroup {
    /// Builds a group from explicit parameters.
    ///
    /// Requires odd `p`, `q | p - 1`, `1 < g < p` and `g^q = 1 mod p`.
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self> {
        if p.is_even() || p <= BigUint::from(3u32) {
            return Err(Error::InvalidParams("modulus must be an odd prime".to_string()));
        }
        if q.is_zero() || !(&p - 1u32).is_multiple_of(&q) {
            return Err(Error::InvalidParams("q must divide p - 1".to_string()));
        }
        if g <= BigUint::one() || g >= p {
            return Err(Error::InvalidParams("generator must lie in (1, p)".to_string()));
        }
        if !mod_pow(&g, &q, &p)?.is_one() {
            return Err(Error::InvalidParams("generator order does not divide q".to_string()));
        }

        let name = format!("Schnorr-{}", p.bits());
        Ok(Self { p, q, g, name })
    }

    /// Generates a fresh group with a `q_bits`-bit prime order.
    ///
    /// `P = r * Q + 1` for the smallest even `r` making `P` prime, and
    /// `G = h^r mod P` for a random `h` with `G != 1`.
    pub fn generate<R: CryptoRngCore>(q_bits: u64, rng: &mut R) -> Result<Self> {
        if q_bits < 16 {
            return Err(Error::InvalidParams(format!(
                "order of {q_bits} bits is too small"
            )));
        }

        let q = random_prime(q_bits, rng);
        let mut r = BigUint::from(2u32);
        let p = loop {
            let candidate = &r * &q + 1u32;
            if is_probable_prime(&candidate, MILLER_RABIN_ROUNDS, rng) {
                break candidate;
            }
            r += 2u32;
        };

        let two = BigUint::from(2u32);
        let g = loop {
            let h = rng.gen_biguint_range(&two, &p);
            let g = h.modpow(&r, &p);
            if !g.is_one() {
                break g;
            }
        };

        Self::new(p, q, g)
    }

    /// The 2048-bit MODP group with 256-bit prime order subgroup from RFC 5114.
    pub fn rfc5114_2048_256() -> Self {
        let p = BigUint::parse_bytes(RFC5114_P.as_bytes(), 16);
        let q = BigUint::parse_bytes(RFC5114_Q.as_bytes(), 16);
        let g = BigUint::parse_bytes(RFC5114_G.as_bytes(), 16);
        match (p, q, g) {
            (Some(p), Some(q), Some(g)) => Self {
                name: "RFC5114-2048-256".to_string(),
                p,
                q,
                g,
            },
            _ => unreachable!("RFC 5114 constants are valid hex"),
        }
    }

    /// Returns the modulus `P`.
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }
}

impl Group for SchnorrGroup {
    type Element = BigUint;

    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> &BigUint {
        &self.q
    }

    fn generator(&self) -> Self::Element {
        self.g.clone()
    }

    fn identity(&self) -> Self::Element {
        BigUint::one()
    }

    fn compose(&self, x: &Self::Element, y: &Self::Element) -> Self::Element {
        (x * y) % &self.p
    }

    fn scalar_exp(&self, x: &Self::Element, k: &BigUint) -> Self::Element {
        x.modpow(k, &self.p)
    }

    fn invert(&self, x: &Self::Element) -> Self::Element {
        mod_inverse(x, &self.p)
            .unwrap_or_else(|| panic!("{} has no inverse modulo P; not a group element", x))
    }

    fn element_to_bytes(&self, x: &Self::Element) -> Vec<u8> {
        x.to_bytes_be()
    }

    fn validate_element(&self, x: &Self::Element) -> Result<()> {
        if x.is_zero() || x >= &self.p {
            return Err(Error::InvalidGroupElement(
                "element must lie in [1, P)".to_string(),
            ));
        }
        if !x.modpow(&self.q, &self.p).is_one() {
            return Err(Error::InvalidGroupElement(
                "element is not in the order-Q subgroup".to_string(),
            ));
        }
        Ok(())
    }
}

const RFC5114_P: &str = "87A8E61DB4B6663CFFBBD19C651959998CEEF608660DD0F25D2CEED4435E3B00E00DF8F1D61957D4FAF7DF4561B2AA3016C3D91134096FAA3BF4296D830E9A7C209E0C6497517ABD5A8A9D306BCF67ED91F9E6725B4758C022E0B1EF4275BF7B6C5BFC11D45F9088B941F54EB1E59BB8BC39A0BF12307F5C4FDB70C581B23F76B63ACAE1CAA6B7902D52526735488A0EF13C6D9A51BFA4AB3AD8347796524D8EF6A167B5A41825D967E144E5140564251CCACB83E6B486F6B3CA3F7971506026C0B857F689962856DED4010ABD0BE621C3A3960A54E710C375F26375D7014103A4B54330C198AF126116D2276E11715F693877FAD7EF09CADB094AE91E1A1597";

const RFC5114_Q: &str = "8CF83642A709A097B447997640129DA299B1A47D1EB3750BA308B0FE64F5FBD3";

const RFC5114_G: &str = "3FB32C9B73134D0B2E77506660EDBD484CA7B18F21EF205407F4793A1A0BA12510DBC15077BE463FFF4FED4AAC0BB555BE3A6C1B0C6B47B1BC3773BF7E8C6F62901228F8C28CBB18A55AE31341000A650196F931C77A57F2DDF463E5E9EC144B777DE62AAAB8A8628AC376D282D6ED3864E67982428EBC831D14348F6F2F9193B5045AF2767164E1DFC967C1FB3F2E55A4BD1BFFE83B9C80D052B985D182EA0ADB2A3B7313D3FE14C8484B1E052588B9B7D2BBD2DF016199ECD06E1557CD0915B3353BBB64E0EC377FD028370DF92B52C7891428CDC67EB6184B523D1DB246C32F63078490F00EF8D647D148D47954515E2327CFEF98C582664B4C0F6CC41659";
