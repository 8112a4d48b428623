use core::fmt;
use core::ops::Deref;

use num_bigint::BigUint;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret scalar (key, witness, nonce, trapdoor or blinding factor).
///
/// The limbs are overwritten with zeros when the value is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretScalar(BigUint);

impl SecretScalar {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }
}

impl Deref for SecretScalar {
    type Target = BigUint;

    fn deref(&self) -> &BigUint {
        &self.0
    }
}

impl From<BigUint> for SecretScalar {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl Zeroize for SecretScalar {
    fn zeroize(&mut self) {
        // assign_from_slice reuses the existing buffer, so every limb is
        // written before normalization drops the length to zero.
        let zeros = vec![0u32; self.0.iter_u32_digits().len()];
        self.0.assign_from_slice(&zeros);
    }
}

impl Drop for SecretScalar {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SecretScalar {}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar(..)")
    }
}

#[cfg(test)]
mod tests {
    use num_traits::Zero;

    use super::*;

    #[test]
    fn zeroize_clears_value() {
        let mut secret = SecretScalar::new(BigUint::from(345_345_345_334u64) << 200u32);
        secret.zeroize();
        assert!(secret.is_zero());
    }

    #[test]
    fn debug_hides_value() {
        let secret = SecretScalar::from(BigUint::from(42u32));
        assert_eq!(format!("{secret:?}"), "SecretScalar(..)");
        assert_eq!(*secret, BigUint::from(42u32));
    }
}
