//! Strategies for generating test data for property-based testing with [`proptest`].
//!
//! Points are generated with the `k256` crate's own scalar multiplication so that the
//! arithmetic in this crate is never used to produce its own test inputs.
//!
//! [`proptest`]: https://github.com/altsysrq/proptest
use crate::{AffinePoint, JacobianPoint, Scalar, backend::fe_from_bytes};
use ::proptest::prelude::*;

prop_compose! {
    /// Generate a random `Scalar`.
    pub fn scalar()(
        bytes in any::<[u8; 32]>(),
    ) -> Scalar {
        Scalar::from_bytes_mod_order(bytes)
    }
}

prop_compose! {
    /// Generate a random, non-zero `Scalar`.
    pub fn non_zero_scalar()(
        x in scalar().prop_filter("Value cannot be zero", |x| !x.is_zero()),
    ) -> Scalar {
        x
    }
}

prop_compose! {
    /// Generate a random affine point that is not at infinity.
    pub fn point()(
        x in non_zero_scalar(),
    ) -> AffinePoint {
        AffinePoint::from(k256::ProjectivePoint::GENERATOR * k256::Scalar::from(x))
    }
}

prop_compose! {
    /// Generate a random finite point in Jacobian coordinates with a random `Z`.
    pub fn jacobian_point()(
        point in point(),
        z in any::<[u8; 32]>().prop_filter_map("Z must be a non-zero field element", |bytes| {
            fe_from_bytes(&bytes).filter(|z| !bool::from(z.normalizes_to_zero()))
        }),
    ) -> JacobianPoint {
        JacobianPoint::from_affine(&point).rescale(&z)
    }
}

impl Arbitrary for Scalar {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            1 => Just(Scalar::ZERO),
            1 => Just(Scalar::ONE),
            1 => Just(-Scalar::ONE),
            7 => scalar(),
        ]
        .boxed()
    }
}

impl Arbitrary for AffinePoint {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            1 => Just(AffinePoint::IDENTITY),
            1 => Just(AffinePoint::generator()),
            8 => point(),
        ]
        .boxed()
    }
}
