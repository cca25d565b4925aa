use super::{AffinePoint, AffineStorage, FieldElement, fe_eq};
use core::ops::Neg;
use subtle::{Choice, ConstantTimeEq};

/// A point in Jacobian coordinates: the affine point is `(X/Z², Y/Z³)`.
///
/// All three coordinates are kept at magnitude one between operations. The infinity flag is
/// authoritative. `Z` is never zero for a point that is not at infinity.
#[derive(Clone, Copy, Debug)]
pub struct JacobianPoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub z: FieldElement,
    pub infinity: bool,
}

impl JacobianPoint {
    pub const INFINITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
        infinity: true,
    };

    pub fn is_infinity(&self) -> bool {
        self.infinity
    }

    pub fn from_affine(point: &AffinePoint) -> Self {
        if point.infinity {
            return Self::INFINITY;
        }
        Self {
            x: point.x,
            y: point.y,
            z: FieldElement::ONE,
            infinity: false,
        }
    }

    /// Converts to affine with a field inversion of its own. To convert many points prefer a
    /// [`BatchNormalizer`](crate::normalize::BatchNormalizer).
    pub fn to_affine(&self) -> AffinePoint {
        if self.infinity {
            return AffinePoint::IDENTITY;
        }
        let z_inv = match Option::<FieldElement>::from(self.z.invert()) {
            Some(z_inv) => z_inv,
            None => return AffinePoint::IDENTITY,
        };
        let z_inv2 = z_inv.square();
        AffinePoint {
            x: (self.x * &z_inv2).normalize(),
            y: (self.y * &z_inv2 * &z_inv).normalize(),
            infinity: false,
        }
    }

    /// Reads the point as affine assuming it has already been normalized to `Z = 1`.
    pub fn as_normalized_affine(&self) -> AffinePoint {
        if self.infinity {
            return AffinePoint::IDENTITY;
        }
        debug_assert!(
            bool::from(fe_eq(&self.z, &FieldElement::ONE)),
            "point was not normalized"
        );
        AffinePoint {
            x: self.x.normalize(),
            y: self.y.normalize(),
            infinity: false,
        }
    }

    /// Like [`as_normalized_affine`](Self::as_normalized_affine) but into storage form.
    pub fn as_normalized_storage(&self) -> AffineStorage {
        AffineStorage::from_affine(&self.as_normalized_affine())
    }

    /// Multiplies `X` by `s²` and `Y` by `s³` leaving `Z` alone.
    ///
    /// Together with setting `Z` to `Z·s` this is the identity on the represented point.
    pub fn rescale_xy(&mut self, s: &FieldElement) {
        let s2 = s.square();
        self.x = self.x * &s2;
        self.y = self.y * &s2 * s;
    }

    /// Changes the representation to one with `Z` multiplied by `s` (which must be non-zero).
    pub fn rescale(&self, s: &FieldElement) -> Self {
        if self.infinity {
            return *self;
        }
        let mut rescaled = *self;
        rescaled.rescale_xy(s);
        rescaled.z = self.z * s;
        rescaled
    }

    pub fn double(&self) -> Self {
        if self.infinity {
            return *self;
        }
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();
        let d = ((self.x + &b).square() + &a.negate(1) + &c.negate(1))
            .normalize_weak()
            .double();
        let e = a.mul_single(3);
        let f = e.square();

        let x = (f + &d.double().negate(4)).normalize_weak();
        let y = (e * &(d + &x.negate(1)) + &c.mul_single(8).negate(8)).normalize_weak();
        let z = (self.y * &self.z).double().normalize_weak();

        Self {
            x,
            y,
            z,
            infinity: false,
        }
    }

    /// Adds an affine point. Variable time.
    pub fn add_affine(&self, other: &AffinePoint) -> Self {
        if other.infinity {
            return *self;
        }
        if self.infinity {
            return Self::from_affine(other);
        }
        let z1z1 = self.z.square();
        let u2 = other.x * &z1z1;
        let s2 = other.y * &z1z1 * &self.z;
        let h = (u2 + &self.x.negate(1)).normalize_weak();
        let r = (s2 + &self.y.negate(1)).normalize_weak();

        if bool::from(h.normalizes_to_zero()) {
            if bool::from(r.normalizes_to_zero()) {
                return self.double();
            }
            return Self::INFINITY;
        }

        let hh = h.square();
        let hhh = hh * &h;
        let v = self.x * &hh;

        let x = (r.square() + &hhh.negate(1) + &v.double().negate(2)).normalize_weak();
        let y = (r * &(v + &x.negate(1)) + &(hhh * &self.y).negate(1)).normalize_weak();
        let z = self.z * &h;

        Self {
            x,
            y,
            z,
            infinity: false,
        }
    }

    /// Adds another Jacobian point. Variable time.
    pub fn add_point(&self, other: &Self) -> Self {
        if other.infinity {
            return *self;
        }
        if self.infinity {
            return *other;
        }
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x * &z2z2;
        let u2 = other.x * &z1z1;
        let s1 = self.y * &z2z2 * &other.z;
        let s2 = other.y * &z1z1 * &self.z;
        let h = (u2 + &u1.negate(1)).normalize_weak();
        let r = (s2 + &s1.negate(1)).normalize_weak();

        if bool::from(h.normalizes_to_zero()) {
            if bool::from(r.normalizes_to_zero()) {
                return self.double();
            }
            return Self::INFINITY;
        }

        let hh = h.square();
        let hhh = hh * &h;
        let v = u1 * &hh;

        let x = (r.square() + &hhh.negate(1) + &v.double().negate(2)).normalize_weak();
        let y = (r * &(v + &x.negate(1)) + &(hhh * &s1).negate(1)).normalize_weak();
        let z = self.z * &other.z * &h;

        Self {
            x,
            y,
            z,
            infinity: false,
        }
    }
}

impl From<AffinePoint> for JacobianPoint {
    fn from(point: AffinePoint) -> Self {
        Self::from_affine(&point)
    }
}

impl From<AffineStorage> for JacobianPoint {
    fn from(storage: AffineStorage) -> Self {
        Self::from_affine(&storage.to_affine())
    }
}

impl Neg for JacobianPoint {
    type Output = JacobianPoint;

    fn neg(self) -> Self::Output {
        Self {
            y: self.y.negate(1).normalize_weak(),
            ..self
        }
    }
}

impl ConstantTimeEq for JacobianPoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let x_eq = fe_eq(&(self.x * &z2z2), &(other.x * &z1z1));
        let y_eq = fe_eq(&(self.y * &z2z2 * &other.z), &(other.y * &z1z1 * &self.z));
        let both_infinity = Choice::from((self.infinity & other.infinity) as u8);
        let neither_infinity = Choice::from(!(self.infinity | other.infinity) as u8);
        both_infinity | (neither_infinity & x_eq & y_eq)
    }
}

impl PartialEq for JacobianPoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for JacobianPoint {}

impl PartialEq<AffinePoint> for JacobianPoint {
    fn eq(&self, other: &AffinePoint) -> bool {
        *self == JacobianPoint::from_affine(other)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hex;
    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test as test;

    fn point_from_hex(x: &str, y: &str) -> AffinePoint {
        AffinePoint::from_coordinates(
            hex::decode_array(x).unwrap(),
            hex::decode_array(y).unwrap(),
        )
        .unwrap()
    }

    fn two_g() -> AffinePoint {
        point_from_hex(
            "c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5",
            "1ae168fea63dc339a3c58419466ceaeef7f632653266d0e1236431a950cfe52a",
        )
    }

    fn three_g() -> AffinePoint {
        point_from_hex(
            "f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9",
            "388f7b0f632de8140fe337e62a37f3566500a99934c2231b6cb9fd7584b8e672",
        )
    }

    #[test]
    fn double_generator() {
        let g = JacobianPoint::from_affine(&AffinePoint::generator());
        assert_eq!(g.double().to_affine(), two_g());
        assert_eq!(g.add_point(&g).to_affine(), two_g());
        assert_eq!(g.add_affine(&AffinePoint::generator()).to_affine(), two_g());
    }

    #[test]
    fn add_generator_multiples() {
        let g = JacobianPoint::from_affine(&AffinePoint::generator());
        let g2 = g.double();
        assert_eq!(g2.add_affine(&AffinePoint::generator()).to_affine(), three_g());
        assert_eq!(g2.add_point(&g).to_affine(), three_g());
        assert_eq!(g.add_point(&g2), g2.add_point(&g));
    }

    #[test]
    fn infinity_rules() {
        let g = JacobianPoint::from_affine(&AffinePoint::generator());
        let inf = JacobianPoint::INFINITY;
        assert_eq!(inf.double(), inf);
        assert_eq!(inf.add_point(&g), g);
        assert_eq!(g.add_point(&inf), g);
        assert_eq!(g.add_affine(&AffinePoint::IDENTITY), g);
        assert_eq!(inf.add_affine(&AffinePoint::generator()), g);
        assert!(g.add_point(&-g).is_infinity());
        assert!(g.add_affine(&-AffinePoint::generator()).is_infinity());
        assert_eq!(inf.to_affine(), AffinePoint::IDENTITY);
    }

    #[test]
    fn rescaled_points_are_equal() {
        let g = JacobianPoint::from_affine(&AffinePoint::generator()).double();
        let s = crate::backend::fe_from_bytes(&[7u8; 32]).unwrap();
        let rescaled = g.rescale(&s);
        assert_eq!(rescaled, g);
        assert_eq!(rescaled.to_affine(), two_g());
        // adding through a representation with a different Z gives the same point
        assert_eq!(
            rescaled.add_affine(&AffinePoint::generator()).to_affine(),
            three_g()
        );
        assert_eq!(rescaled.add_point(&g.rescale(&s.square())), g.double());
    }

    #[test]
    fn negation() {
        let g3 = JacobianPoint::from_affine(&three_g());
        let minus = -g3;
        assert_eq!(minus.to_affine(), -three_g());
        assert_ne!(minus, g3);
        assert_eq!(g3, three_g());
    }
}
