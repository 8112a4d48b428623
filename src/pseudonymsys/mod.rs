//! Anonymous credentials on top of the proof engines.
//!
//! A user holds one secret `w`. Each pseudonym is a pair `(a, a^w)` under a
//! fresh random `a`, so pseudonyms at different organizations cannot be
//! linked. The flow is:
//!
//! 1. [`CaCertifier`] checks that the user knows `w` for a master pseudonym
//!    and signs a blinded copy of it.
//! 2. [`OrgNymGen`] registers a new pseudonym once the user shows it shares
//!    `w` with the certified one.
//! 3. [`OrgCredentialIssuer`] issues a credential on that pseudonym, which
//!    the user blinds with [`CredentialRequest`].
//! 4. [`OrgCredentialVerifier`] at another organization accepts the
//!    credential for a different pseudonym of the same user and hands out a
//!    session key.

mod ca;
mod issuer;
mod nym_gen;
mod store;
mod user;
mod verifier;

use core::fmt;

use num_bigint::BigUint;
use p256::ecdsa::Signature;
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use ca::{verify_certificate, CaCertifier};
pub use issuer::{IssuanceCommitments, OrgCredentialIssuer};
pub use nym_gen::OrgNymGen;
pub use store::{
    MemoryOrgKeyStore, MemoryRegistrationStore, OrgKeyStore, RandomSessionKeys,
    RegistrationStore, SessionKeyGenerator,
};
pub use user::{CredentialRequest, User};
pub use verifier::OrgCredentialVerifier;

use crate::crypto::SecretScalar;
use crate::protocol::Transcript;
use crate::{Error, Group, Result};

/// Pseudonym `(a, b)` with `b = a^w` for the user's secret `w`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pseudonym<E> {
    pub a: E,
    pub b: E,
}

impl<E> Pseudonym<E> {
    pub fn new(a: E, b: E) -> Self {
        Self { a, b }
    }
}

/// CA signature over a blinded master pseudonym.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaCertificate<E> {
    pub blinded_a: E,
    pub blinded_b: E,
    signature: Signature,
}

impl<E> CaCertificate<E> {
    pub(crate) fn from_signature(blinded_a: E, blinded_b: E, signature: Signature) -> Self {
        Self {
            blinded_a,
            blinded_b,
            signature,
        }
    }

    /// Rebuilds a certificate from its ECDSA `(r, s)` pair.
    pub fn new(blinded_a: E, blinded_b: E, r: &BigUint, s: &BigUint) -> Result<Self> {
        let r = scalar_bytes(r)?;
        let s = scalar_bytes(s)?;
        let signature =
            Signature::from_scalars(r, s).map_err(|e| Error::Signature(e.to_string()))?;
        Ok(Self::from_signature(blinded_a, blinded_b, signature))
    }

    pub fn r(&self) -> BigUint {
        let (r, _) = self.signature.split_bytes();
        BigUint::from_bytes_be(&r)
    }

    pub fn s(&self) -> BigUint {
        let (_, s) = self.signature.split_bytes();
        BigUint::from_bytes_be(&s)
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

fn scalar_bytes(value: &BigUint) -> Result<p256::FieldBytes> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(Error::Signature(
            "signature scalar is wider than 256 bits".to_string(),
        ));
    }
    let mut out = p256::FieldBytes::default();
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

/// Credential issued on a pseudonym and blinded by the user's `gamma`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential<E> {
    /// `a^gamma`
    pub small_a_to_gamma: E,
    /// `b^gamma`
    pub small_b_to_gamma: E,
    /// `A^gamma`, where `A = b^s2`
    pub a_to_gamma: E,
    /// `B^gamma`, where `B = (a * A)^s1`
    pub b_to_gamma: E,
    pub t1: Transcript<E>,
    pub t2: Transcript<E>,
}

/// Organization secret key `(s1, s2)`, wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecKey {
    pub s1: SecretScalar,
    pub s2: SecretScalar,
}

impl SecKey {
    pub fn new<G: Group>(group: &G, s1: BigUint, s2: BigUint) -> Result<Self> {
        group.check_scalar(&s1, "s1")?;
        group.check_scalar(&s2, "s2")?;
        Ok(Self {
            s1: s1.into(),
            s2: s2.into(),
        })
    }

    pub fn generate<G: Group, R: CryptoRngCore>(group: &G, rng: &mut R) -> Self {
        Self {
            s1: group.random_scalar(rng).into(),
            s2: group.random_scalar(rng).into(),
        }
    }

    /// `(H1, H2) = (G^s1, G^s2)`.
    pub fn public_key<G: Group>(&self, group: &G) -> PubKey<G::Element> {
        PubKey {
            h1: group.exp_base_g(&self.s1),
            h2: group.exp_base_g(&self.s2),
        }
    }
}

impl fmt::Debug for SecKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecKey(..)")
    }
}

/// Organization public key `(H1, H2)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PubKey<E> {
    pub h1: E,
    pub h2: E,
}

/// Opaque key handed out after a successful credential transfer.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey(Vec<u8>);

impl SessionKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey({} bytes)", self.0.len())
    }
}
