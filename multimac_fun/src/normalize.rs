//! Montgomery batch inversion over a sequence of Jacobian points.
//!
//! Bringing `n` points to a shared `Z` costs one field inversion plus about `3n`
//! multiplications instead of `n` inversions. The sequence is visited through a
//! [`BatchNormalizer`] cursor so callers can normalize points wherever they live, including a
//! table that is still being built.
use crate::backend::{FieldElement, JacobianPoint};

/// A bidirectional cursor over a sequence of Jacobian points, each paired with a scratch field
/// element that the normalizer may overwrite.
///
/// The cursor starts (and is [`reset`] to) a position *before* the first element. Moving past
/// either end returns `false` and leaves the cursor just outside that end so that moving back
/// lands on the last (or first) element again.
///
/// Points at infinity are skipped: they are left untouched and do not take part in the product.
/// Every other point must have a non-zero `Z`.
///
/// [`reset`]: BatchNormalizer::reset
pub trait BatchNormalizer {
    fn reset(&mut self);
    fn move_next(&mut self) -> bool;
    fn move_prev(&mut self) -> bool;
    /// The point and scratch slot under the cursor. Only called after a successful move.
    fn current(&mut self) -> (&mut JacobianPoint, &mut FieldElement);

    /// Rewrites every point so that `Z = 1` using a single field inversion.
    fn normalize(&mut self) {
        batch_rescale(self, true);
    }

    /// Rewrites every point so that they all share the same `Z` without inverting anything and
    /// returns that shared `Z` (the product of all the original `Z`s, or one if there were no
    /// finite points).
    fn to_common_denominator(&mut self) -> FieldElement {
        batch_rescale(self, false)
    }
}

fn batch_rescale<B: BatchNormalizer + ?Sized>(cursor: &mut B, invert: bool) -> FieldElement {
    // forward: each scratch slot gets the product of the Zs strictly before it
    let mut product: Option<FieldElement> = None;
    cursor.reset();
    while cursor.move_next() {
        let (point, scratch) = cursor.current();
        if point.is_infinity() {
            continue;
        }
        *scratch = product.unwrap_or(FieldElement::ONE);
        product = Some(match product {
            Some(product) => product * &point.z,
            None => point.z,
        });
    }

    let product = match product {
        Some(product) => product,
        None => return FieldElement::ONE,
    };

    let (mut running, denominator) = if invert {
        let inverse = Option::<FieldElement>::from(product.invert())
            .expect("finite points must not have a zero Z coordinate");
        (inverse, FieldElement::ONE)
    } else {
        (FieldElement::ONE, product)
    };

    // backward: running holds denominator / (product of Zs up to and including the current one)
    while cursor.move_prev() {
        let (point, scratch) = cursor.current();
        if point.is_infinity() {
            continue;
        }
        let factor = *scratch * &running;
        running = running * &point.z;
        point.rescale_xy(&factor);
        point.z = denominator;
    }

    denominator
}

/// A [`BatchNormalizer`] over a slice of points with a caller provided scratch slice of the same
/// length.
pub struct SliceNormalizer<'a> {
    points: &'a mut [JacobianPoint],
    scratch: &'a mut [FieldElement],
    // number of elements the cursor has passed, the current element is `passed - 1`
    passed: usize,
}

impl<'a> SliceNormalizer<'a> {
    pub fn new(points: &'a mut [JacobianPoint], scratch: &'a mut [FieldElement]) -> Self {
        assert_eq!(
            points.len(),
            scratch.len(),
            "scratch space must match the number of points"
        );
        Self {
            points,
            scratch,
            passed: 0,
        }
    }
}

impl BatchNormalizer for SliceNormalizer<'_> {
    fn reset(&mut self) {
        self.passed = 0;
    }

    fn move_next(&mut self) -> bool {
        if self.passed < self.points.len() {
            self.passed += 1;
            true
        } else {
            self.passed = self.points.len() + 1;
            false
        }
    }

    fn move_prev(&mut self) -> bool {
        if self.passed > 1 {
            self.passed -= 1;
            true
        } else {
            self.passed = 0;
            false
        }
    }

    fn current(&mut self) -> (&mut JacobianPoint, &mut FieldElement) {
        let i = self.passed - 1;
        (&mut self.points[i], &mut self.scratch[i])
    }
}

/// Normalizes all the points in place with a single inversion.
#[cfg(feature = "alloc")]
pub fn normalize_all(points: &mut [JacobianPoint]) {
    let mut scratch = alloc::vec![FieldElement::ZERO; points.len()];
    SliceNormalizer::new(points, &mut scratch).normalize();
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::{AffinePoint, fe_eq};
    use proptest::prelude::*;
    use std::vec::Vec;
    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test as test;

    fn jacobian_points() -> impl Strategy<Value = Vec<JacobianPoint>> {
        prop::collection::vec(
            prop_oneof![
                8 => crate::proptest::jacobian_point(),
                1 => Just(JacobianPoint::INFINITY),
            ],
            0..12,
        )
    }

    #[test]
    fn empty_sequence_is_a_noop() {
        let mut points: [JacobianPoint; 0] = [];
        let mut scratch: [FieldElement; 0] = [];
        let mut normalizer = SliceNormalizer::new(&mut points, &mut scratch);
        normalizer.normalize();
        let z = normalizer.to_common_denominator();
        assert!(bool::from(fe_eq(&z, &FieldElement::ONE)));
    }

    #[test]
    fn all_infinity_is_untouched() {
        let mut points = [JacobianPoint::INFINITY; 3];
        let mut scratch = [FieldElement::ZERO; 3];
        SliceNormalizer::new(&mut points, &mut scratch).normalize();
        assert!(points.iter().all(|p| p.is_infinity()));
    }

    #[test]
    fn cursor_walks_both_ways() {
        let mut points = [JacobianPoint::INFINITY; 2];
        let mut scratch = [FieldElement::ZERO; 2];
        let mut cursor = SliceNormalizer::new(&mut points, &mut scratch);
        assert!(cursor.move_next());
        assert!(cursor.move_next());
        assert!(!cursor.move_next());
        assert!(cursor.move_prev());
        cursor.current().0.infinity = false;
        assert!(cursor.move_prev());
        assert!(!cursor.move_prev());
        assert!(cursor.move_next());
        assert!(cursor.current().0.is_infinity());
        assert!(!points[1].is_infinity());
    }

    #[test]
    fn single_point() {
        let g = JacobianPoint::from_affine(&AffinePoint::generator()).double();
        let expected = g.to_affine();
        let mut points = [g];
        let mut scratch = [FieldElement::ZERO];
        SliceNormalizer::new(&mut points, &mut scratch).normalize();
        assert_eq!(points[0].as_normalized_affine(), expected);
    }

    #[test]
    #[should_panic(expected = "scratch space")]
    fn mismatched_scratch_panics() {
        let mut points = [JacobianPoint::INFINITY; 2];
        let mut scratch = [FieldElement::ZERO; 1];
        SliceNormalizer::new(&mut points, &mut scratch);
    }

    proptest! {
        #[test]
        fn normalize_matches_individual_inversion(points in jacobian_points()) {
            let expected: Vec<AffinePoint> = points.iter().map(|p| p.to_affine()).collect();
            let mut normalized = points.clone();
            normalize_all(&mut normalized);
            for ((before, after), expected) in points.iter().zip(&normalized).zip(&expected) {
                prop_assert_eq!(before.is_infinity(), after.is_infinity());
                prop_assert_eq!(after.as_normalized_affine(), *expected);
                if !after.is_infinity() {
                    prop_assert!(bool::from(fe_eq(&after.z, &FieldElement::ONE)));
                }
            }
        }

        #[test]
        fn common_denominator_preserves_points(points in jacobian_points()) {
            let mut rescaled = points.clone();
            let mut scratch = std::vec![FieldElement::ZERO; points.len()];
            let z = SliceNormalizer::new(&mut rescaled, &mut scratch).to_common_denominator();

            let mut expected_z = FieldElement::ONE;
            for point in points.iter().filter(|p| !p.is_infinity()) {
                expected_z = expected_z * &point.z;
            }
            prop_assert!(bool::from(fe_eq(&z, &expected_z)));

            for (before, after) in points.iter().zip(&rescaled) {
                prop_assert_eq!(after, before);
                if !after.is_infinity() {
                    prop_assert!(bool::from(fe_eq(&after.z, &z)));
                }
            }
        }
    }
}
