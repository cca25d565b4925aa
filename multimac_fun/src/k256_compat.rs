//! Conversions to and from the types of the [`k256`] crate.
use crate::{
    AffinePoint, JacobianPoint, Scalar,
    backend::{FieldElement, fe_to_bytes},
};
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};

impl From<k256::AffinePoint> for AffinePoint {
    fn from(point: k256::AffinePoint) -> Self {
        let encoded = point.to_encoded_point(false);
        match (encoded.x(), encoded.y()) {
            (Some(x), Some(y)) => AffinePoint {
                x: FieldElement::from_bytes(x).unwrap(),
                y: FieldElement::from_bytes(y).unwrap(),
                infinity: false,
            },
            _ => AffinePoint::IDENTITY,
        }
    }
}

/// # Panics
///
/// If `point` is not on the curve. Every `AffinePoint` this crate produces is, but the fields are
/// public so one can be assembled by hand.
impl From<AffinePoint> for k256::AffinePoint {
    fn from(point: AffinePoint) -> Self {
        if point.infinity {
            return k256::AffinePoint::IDENTITY;
        }
        let encoded = k256::EncodedPoint::from_affine_coordinates(
            &fe_to_bytes(&point.x).into(),
            &fe_to_bytes(&point.y).into(),
            false,
        );
        k256::AffinePoint::from_encoded_point(&encoded).unwrap()
    }
}

impl From<k256::ProjectivePoint> for AffinePoint {
    fn from(point: k256::ProjectivePoint) -> Self {
        AffinePoint::from(point.to_affine())
    }
}

impl From<k256::ProjectivePoint> for JacobianPoint {
    fn from(point: k256::ProjectivePoint) -> Self {
        JacobianPoint::from_affine(&AffinePoint::from(point))
    }
}

impl From<JacobianPoint> for k256::ProjectivePoint {
    fn from(point: JacobianPoint) -> Self {
        k256::ProjectivePoint::from(k256::AffinePoint::from(point.to_affine()))
    }
}

impl From<k256::Scalar> for Scalar {
    fn from(scalar: k256::Scalar) -> Self {
        Scalar(scalar)
    }
}

impl From<Scalar> for k256::Scalar {
    fn from(scalar: Scalar) -> Self {
        scalar.0
    }
}
