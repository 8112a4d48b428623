//! NIST elliptic curve groups (P-224, P-256, P-384, P-521).
//!
//! One implementation is written against the `elliptic-curve` traits and
//! instantiated for each curve crate. Elements are projective points; the
//! point at infinity is the identity and is a valid input everywhere.

use core::marker::PhantomData;

use elliptic_curve::group::{Curve as _, Group as _};
use elliptic_curve::sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint};
use elliptic_curve::{
    AffinePoint, CurveArithmetic, Field, FieldBytes, FieldBytesSize, PrimeField, ProjectivePoint,
    Scalar,
};
use num_bigint::BigUint;

use crate::{Error, Group, Result};

/// NIST P-224.
pub type P224 = EcGroup<p224::NistP224>;
/// NIST P-256.
pub type P256 = EcGroup<p256::NistP256>;
/// NIST P-384.
pub type P384 = EcGroup<p384::NistP384>;
/// NIST P-521.
pub type P521 = EcGroup<p521::NistP521>;

/// Prime-order elliptic curve group.
#[derive(Clone, Debug)]
pub struct EcGroup<C> {
    name: &'static str,
    order: BigUint,
    _curve: PhantomData<C>,
}

impl P224 {
    /// The NIST P-224 curve group.
    pub fn p224() -> Self {
        Self::with_name("P-224")
    }
}

impl P256 {
    /// The NIST P-256 curve group.
    pub fn p256() -> Self {
        Self::with_name("P-256")
    }
}

impl P384 {
    /// The NIST P-384 curve group.
    pub fn p384() -> Self {
        Self::with_name("P-384")
    }
}

impl P521 {
    /// The NIST P-521 curve group.
    pub fn p521() -> Self {
        Self::with_name("P-521")
    }
}

impl<C> EcGroup<C>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    fn with_name(name: &'static str) -> Self {
        // n - 1 is the largest scalar, so its encoding gives the order.
        let n_minus_one = -Scalar::<C>::ONE;
        let order = BigUint::from_bytes_be(&n_minus_one.to_repr()) + 1u32;
        Self {
            name,
            order,
            _curve: PhantomData,
        }
    }

    /// Returns the affine `(X, Y)` coordinates, or `None` for the point at
    /// infinity.
    pub fn coordinates(&self, point: &ProjectivePoint<C>) -> Option<(BigUint, BigUint)> {
        let encoded = point.to_affine().to_encoded_point(false);
        match (encoded.x(), encoded.y()) {
            (Some(x), Some(y)) => Some((BigUint::from_bytes_be(x), BigUint::from_bytes_be(y))),
            _ => None,
        }
    }

    /// Builds a point from affine coordinates, rejecting points off the curve.
    pub fn from_coordinates(&self, x: &BigUint, y: &BigUint) -> Result<ProjectivePoint<C>> {
        let x = Self::field_bytes(x)?;
        let y = Self::field_bytes(y)?;
        let encoded = EncodedPoint::<C>::from_affine_coordinates(&x, &y, false);
        let affine = Option::<AffinePoint<C>>::from(AffinePoint::<C>::from_encoded_point(&encoded))
            .ok_or_else(|| {
                Error::InvalidGroupElement(format!("coordinates are not on {}", self.name))
            })?;
        Ok(ProjectivePoint::<C>::from(affine))
    }

    fn field_bytes(value: &BigUint) -> Result<FieldBytes<C>> {
        let bytes = value.to_bytes_be();
        let mut out = FieldBytes::<C>::default();
        if bytes.len() > out.len() {
            return Err(Error::InvalidGroupElement(
                "coordinate does not fit the curve's field".to_string(),
            ));
        }
        let offset = out.len() - bytes.len();
        out[offset..].copy_from_slice(&bytes);
        Ok(out)
    }

    fn to_scalar(&self, k: &BigUint) -> Scalar<C> {
        let reduced = (k % &self.order).to_bytes_be();
        let mut repr = FieldBytes::<C>::default();
        let offset = repr.len() - reduced.len();
        repr[offset..].copy_from_slice(&reduced);
        Option::<Scalar<C>>::from(Scalar::<C>::from_repr(repr))
            .unwrap_or_else(|| unreachable!("scalar reduced modulo the curve order"))
    }
}

impl<C> Group for EcGroup<C>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    type Element = ProjectivePoint<C>;

    fn name(&self) -> &str {
        self.name
    }

    fn order(&self) -> &BigUint {
        &self.order
    }

    fn generator(&self) -> Self::Element {
        ProjectivePoint::<C>::generator()
    }

    fn identity(&self) -> Self::Element {
        ProjectivePoint::<C>::identity()
    }

    fn compose(&self, x: &Self::Element, y: &Self::Element) -> Self::Element {
        *x + *y
    }

    fn scalar_exp(&self, x: &Self::Element, k: &BigUint) -> Self::Element {
        *x * self.to_scalar(k)
    }

    fn invert(&self, x: &Self::Element) -> Self::Element {
        -*x
    }

    fn element_to_bytes(&self, x: &Self::Element) -> Vec<u8> {
        x.to_affine().to_encoded_point(false).as_bytes().to_vec()
    }

    fn validate_element(&self, _x: &Self::Element) -> Result<()> {
        // Points only enter through `from_coordinates` or arithmetic.
        Ok(())
    }
}
