//! These traits are for accounting for what the multiplication kernel actually needs from the
//! field and scalar arithmetic underneath it.
mod affine;
mod jacobian;

pub use affine::*;
pub use jacobian::*;
pub use k256::FieldElement;

use k256::{
    FieldBytes,
    elliptic_curve::{bigint::U256, ff::PrimeField, ops::Reduce},
};

/// Width of a scalar in bits.
pub const SCALAR_BITS: usize = 256;

pub trait BackendScalar: Sized {
    fn from_bytes_mod_order(bytes: [u8; 32]) -> Self;
    fn from_bytes(bytes: [u8; 32]) -> Option<Self>;
    fn to_bytes(&self) -> [u8; 32];
    /// Little-endian 64-bit words of the canonical integer value.
    fn to_limbs(&self) -> [u64; 4] {
        let bytes = self.to_bytes();
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let end = 32 - 8 * i;
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[end - 8..end]);
            *limb = u64::from_be_bytes(word);
        }
        limbs
    }
    fn get_bit(&self, bit: usize) -> bool {
        assert!(bit < SCALAR_BITS, "bit {bit} is outside of a scalar");
        (self.to_limbs()[bit / 64] >> (bit % 64)) & 1 == 1
    }
}

impl BackendScalar for k256::Scalar {
    fn from_bytes_mod_order(bytes: [u8; 32]) -> Self {
        <k256::Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(bytes))
    }

    fn from_bytes(bytes: [u8; 32]) -> Option<Self> {
        k256::Scalar::from_repr(FieldBytes::from(bytes)).into()
    }

    fn to_bytes(&self) -> [u8; 32] {
        k256::Scalar::to_bytes(self).into()
    }
}

/// Checks `y² = x³ + 7`. Both coordinates must have magnitude at most one.
pub(crate) fn is_on_curve(x: &FieldElement, y: &FieldElement) -> bool {
    let rhs = x.square() * x + &curve_b();
    let lhs = y.square();
    bool::from((lhs + &rhs.negate(2)).normalizes_to_zero())
}

pub(crate) fn curve_b() -> FieldElement {
    FieldElement::ONE.mul_single(7).normalize()
}

/// Compares two field elements of magnitude at most one.
pub(crate) fn fe_eq(a: &FieldElement, b: &FieldElement) -> subtle::Choice {
    (*a + &b.negate(1)).normalizes_to_zero()
}

pub(crate) fn fe_from_bytes(bytes: &[u8]) -> Option<FieldElement> {
    let bytes = FieldBytes::clone_from_slice(bytes);
    FieldElement::from_bytes(&bytes).into()
}

pub(crate) fn fe_to_bytes(fe: &FieldElement) -> [u8; 32] {
    fe.normalize().to_bytes().into()
}
