use super::{FieldElement, fe_eq, fe_from_bytes, fe_to_bytes, is_on_curve};
use core::ops::Neg;
use subtle::{Choice, ConstantTimeEq};

/// A point in affine coordinates. The point at infinity is carried as a flag since it has no
/// affine coordinates.
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub infinity: bool,
}

impl AffinePoint {
    /// The point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: true,
    };

    /// The standard generator of secp256k1.
    pub fn generator() -> Self {
        Self::from_coordinates(GENERATOR_X, GENERATOR_Y)
            .expect("the generator is on the curve")
    }

    /// Interprets two big-endian field elements as the coordinates of a point, checking that they
    /// are canonical and on the curve.
    pub fn from_coordinates(x: [u8; 32], y: [u8; 32]) -> Option<Self> {
        let x = fe_from_bytes(&x)?;
        let y = fe_from_bytes(&y)?;
        if !is_on_curve(&x, &y) {
            return None;
        }
        Some(Self {
            x,
            y,
            infinity: false,
        })
    }

    /// Returns the big-endian coordinates or `None` for the point at infinity.
    pub fn coordinates(&self) -> Option<([u8; 32], [u8; 32])> {
        if self.infinity {
            return None;
        }
        Some((fe_to_bytes(&self.x), fe_to_bytes(&self.y)))
    }

    pub fn is_infinity(&self) -> bool {
        self.infinity
    }

    pub fn is_on_curve(&self) -> bool {
        self.infinity || is_on_curve(&self.x, &self.y)
    }
}

impl Neg for AffinePoint {
    type Output = AffinePoint;

    fn neg(self) -> Self::Output {
        AffinePoint {
            x: self.x,
            y: self.y.negate(1).normalize_weak(),
            infinity: self.infinity,
        }
    }
}

impl ConstantTimeEq for AffinePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        let both_infinity = Choice::from((self.infinity & other.infinity) as u8);
        let neither_infinity = Choice::from(!(self.infinity | other.infinity) as u8);
        both_infinity | (neither_infinity & fe_eq(&self.x, &other.x) & fe_eq(&self.y, &other.y))
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for AffinePoint {}

/// Compact storage form of a point that is not at infinity: both coordinates fully normalized.
///
/// This is what a [`PreparedTable`] holds. It converts back to an [`AffinePoint`] without any
/// field arithmetic.
///
/// [`PreparedTable`]: crate::PreparedTable
#[derive(Clone, Copy)]
pub struct AffineStorage {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
}

impl AffineStorage {
    pub(crate) const FILLER: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
    };

    /// Converts a finite point into storage form.
    ///
    /// The point at infinity has no storage form. Passing it is a precondition violation and
    /// panics.
    pub fn from_affine(point: &AffinePoint) -> Self {
        assert!(
            !point.infinity,
            "the point at infinity has no storage encoding"
        );
        Self {
            x: point.x.normalize(),
            y: point.y.normalize(),
        }
    }

    pub fn to_affine(&self) -> AffinePoint {
        AffinePoint {
            x: self.x,
            y: self.y,
            infinity: false,
        }
    }

    /// 64 bytes: `x` then `y`, both big-endian.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&fe_to_bytes(&self.x));
        bytes[32..].copy_from_slice(&fe_to_bytes(&self.y));
        bytes
    }

    /// Decodes the output of [`to_bytes`]. Returns `None` unless both coordinates are canonical
    /// and the point is on the curve.
    ///
    /// [`to_bytes`]: Self::to_bytes
    pub fn from_bytes(bytes: [u8; 64]) -> Option<Self> {
        let x = fe_from_bytes(&bytes[..32])?;
        let y = fe_from_bytes(&bytes[32..])?;
        if !is_on_curve(&x, &y) {
            return None;
        }
        Some(Self { x, y })
    }
}

impl From<AffineStorage> for AffinePoint {
    fn from(storage: AffineStorage) -> Self {
        storage.to_affine()
    }
}

impl ConstantTimeEq for AffineStorage {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y)
    }
}

impl PartialEq for AffineStorage {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for AffineStorage {}

crate::impl_display_debug_serialize! {
    fn to_bytes(storage: &AffineStorage) -> [u8; 64] {
        storage.to_bytes()
    }
}

crate::impl_fromstr_deserialize! {
    name => "secp256k1 affine point",
    fn from_bytes(bytes: [u8; 64]) -> Option<AffineStorage> {
        AffineStorage::from_bytes(bytes)
    }
}

const GENERATOR_X: [u8; 32] = [
    0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b, 0x07,
    0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17, 0x98,
];

const GENERATOR_Y: [u8; 32] = [
    0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65, 0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11, 0x08, 0xa8,
    0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19, 0x9c, 0x47, 0xd0, 0x8f, 0xfb, 0x10, 0xd4, 0xb8,
];

#[cfg(test)]
mod test {
    use super::*;
    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test as test;

    #[test]
    fn generator_is_on_curve() {
        let g = AffinePoint::generator();
        assert!(g.is_on_curve());
        assert!((-g).is_on_curve());
        assert_ne!(g, -g);
        assert_eq!(-(-g), g);
    }

    #[test]
    fn storage_bytes_reject_off_curve() {
        let g = AffineStorage::from_affine(&AffinePoint::generator());
        let mut bytes = g.to_bytes();
        assert_eq!(AffineStorage::from_bytes(bytes), Some(g));
        bytes[63] ^= 1;
        assert_eq!(AffineStorage::from_bytes(bytes), None);
        assert_eq!(AffineStorage::from_bytes([0xff; 64]), None);
    }

    #[test]
    fn storage_display_and_fromstr() {
        let g = AffineStorage::from_affine(&AffinePoint::generator());
        let hex = format!("{}", g);
        assert_eq!(
            &hex[..64],
            "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(hex.parse::<AffineStorage>(), Ok(g));
        assert!("00".parse::<AffineStorage>().is_err());
    }

    #[test]
    fn infinity_equality() {
        assert_eq!(AffinePoint::IDENTITY, AffinePoint::IDENTITY);
        assert_ne!(AffinePoint::IDENTITY, AffinePoint::generator());
        assert_eq!(AffinePoint::IDENTITY.coordinates(), None);
    }

    #[test]
    #[should_panic]
    fn infinity_has_no_storage() {
        AffineStorage::from_affine(&AffinePoint::IDENTITY);
    }
}
