use num_bigint::BigUint;
use sha2::{Digest, Sha512};

use super::Group;

/// SHA-512 over the canonical encodings of `elements`, each prefixed with its
/// big-endian length.
pub fn hash_elements<G: Group>(group: &G, elements: &[&G::Element]) -> Vec<u8> {
    let mut hasher = Sha512::new();
    for element in elements {
        let bytes = group.element_to_bytes(element);
        hasher.update((bytes.len() as u64).to_be_bytes());
        hasher.update(&bytes);
    }
    hasher.finalize().to_vec()
}

/// [`hash_elements`] read as a big-endian integer.
pub fn hash_to_int<G: Group>(group: &G, elements: &[&G::Element]) -> BigUint {
    BigUint::from_bytes_be(&hash_elements(group, elements))
}
