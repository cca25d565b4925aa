//! Multi-scalar multiplication: `Σ kᵢ·Pᵢ` for many `(kᵢ, Pᵢ)` pairs.
//!
//! Each point is first turned into a [`PreparedTable`] of its odd multiples. Each scalar is
//! recoded into wNAF digits and all digits are scheduled on a shared [`BitTable`] so that one
//! pass from the top bit down, doubling a single accumulator at every bit, adds in every digit
//! of every scalar.
//!
//! Everything here is variable time. Do not use it with secret scalars.
use crate::{
    Scalar,
    backend::{AffinePoint, AffineStorage, FieldElement, JacobianPoint, SCALAR_BITS},
    bit_table::BitTable,
    normalize::{BatchNormalizer, SliceNormalizer},
    wnaf::Wnaf,
};

/// Window width used by default.
pub const WINDOW_BITS: u32 = 4;

/// Number of odd multiples in a table for [`WINDOW_BITS`]: `P, 3P, …, 15P`.
pub const TABLE_SIZE: usize = 1 << (WINDOW_BITS - 1);

/// How scalars are recoded before being scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// One wNAF digit stream per scalar.
    #[default]
    Direct,
    /// Split each scalar into a positive and a negative half with [`Scalar::split_pos_neg`] and
    /// schedule both halves against the same table, negating the table entries for the negative
    /// half.
    SplitPosNeg,
}

impl Strategy {
    /// Number of digit streams per scalar.
    pub const fn directions(self) -> usize {
        match self {
            Strategy::Direct => 1,
            Strategy::SplitPosNeg => 2,
        }
    }
}

/// The odd multiples `P, 3P, 5P, …, (2N−1)P` of a point in storage form.
///
/// `N` must be a power of two. The matching window width is `log2(N) + 1`. A table for the point
/// at infinity holds nothing and contributes nothing to a sum.
///
/// Tables are immutable once built and can be shared freely between threads or cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreparedTable<const N: usize = TABLE_SIZE> {
    odd_multiples: Option<[AffineStorage; N]>,
}

impl<const N: usize> PreparedTable<N> {
    /// The window width matching this table size.
    pub const WINDOW_BITS: u32 = {
        assert!(N.is_power_of_two(), "table size must be a power of two");
        assert!(N <= 1 << 14, "table size too large");
        N.trailing_zeros() + 1
    };

    /// The table for the point at infinity.
    pub const INFINITY: Self = Self {
        odd_multiples: None,
    };

    /// Builds the table for `point` with a single field inversion.
    pub fn new(point: &JacobianPoint) -> Self {
        if point.is_infinity() {
            return Self::INFINITY;
        }
        let mut multiples = odd_multiples::<N>(point);
        let mut scratch = [FieldElement::ZERO; N];
        SliceNormalizer::new(&mut multiples, &mut scratch).normalize();
        Self::from_normalized(&multiples)
    }

    pub fn from_affine(point: &AffinePoint) -> Self {
        Self::new(&JacobianPoint::from_affine(point))
    }

    /// Builds tables for many points sharing one field inversion among all of them.
    #[cfg(feature = "alloc")]
    pub fn batch_new(points: &[JacobianPoint]) -> alloc::vec::Vec<Self> {
        use alloc::vec::Vec;
        let mut multiples: Vec<[JacobianPoint; N]> =
            points.iter().map(odd_multiples::<N>).collect();
        let flat = multiples.as_flattened_mut();
        let mut scratch = alloc::vec![FieldElement::ZERO; flat.len()];
        SliceNormalizer::new(flat, &mut scratch).normalize();
        multiples
            .iter()
            .map(|multiples| {
                if multiples[0].is_infinity() {
                    Self::INFINITY
                } else {
                    Self::from_normalized(multiples)
                }
            })
            .collect()
    }

    fn from_normalized(multiples: &[JacobianPoint; N]) -> Self {
        let mut odd_multiples = [AffineStorage::FILLER; N];
        for (storage, point) in odd_multiples.iter_mut().zip(multiples) {
            *storage = point.as_normalized_storage();
        }
        Self {
            odd_multiples: Some(odd_multiples),
        }
    }

    /// Whether this is the table of the point at infinity.
    pub fn is_infinity(&self) -> bool {
        self.odd_multiples.is_none()
    }

    /// The stored multiples, `None` for the point at infinity.
    pub fn entries(&self) -> Option<&[AffineStorage; N]> {
        self.odd_multiples.as_ref()
    }

    /// Returns `odd·P` for an odd `odd < 2N`.
    ///
    /// Panics if `odd` is even or outside the table.
    pub fn odd_multiple(&self, odd: u16) -> AffinePoint {
        assert!(
            odd & 1 == 1 && ((odd >> 1) as usize) < N,
            "digit {odd} is not in a table of {N} odd multiples"
        );
        match &self.odd_multiples {
            Some(entries) => entries[(odd >> 1) as usize].to_affine(),
            None => AffinePoint::IDENTITY,
        }
    }

    /// Reassembles a table from stored entries, checking that they are the odd multiples of the
    /// first one.
    pub fn from_entries(entries: [AffineStorage; N]) -> Option<Self> {
        let expected = Self::from_affine(&entries[0].to_affine());
        if expected.entries() == Some(&entries) {
            Some(expected)
        } else {
            None
        }
    }
}

impl<const N: usize> Default for PreparedTable<N> {
    fn default() -> Self {
        Self::INFINITY
    }
}

/// `P, 3P, …, (2N−1)P` in Jacobian form, built by repeated addition of `2P`.
fn odd_multiples<const N: usize>(point: &JacobianPoint) -> [JacobianPoint; N] {
    let _ = PreparedTable::<N>::WINDOW_BITS;
    let mut multiples = [JacobianPoint::INFINITY; N];
    if point.is_infinity() {
        return multiples;
    }
    multiples[0] = *point;
    let two_p = point.double();
    for i in 1..N {
        multiples[i] = multiples[i - 1].add_point(&two_p);
    }
    multiples
}

/// Computes `Σ scalars[i]·tables[i]`, using `wnafs` as scratch for the digit streams.
///
/// `wnafs` must have room for `scalars.len() * strategy.directions()` entries.
pub fn calculate_with_scratch<const N: usize>(
    scalars: &[Scalar],
    tables: &[PreparedTable<N>],
    wnafs: &mut [Wnaf],
    strategy: Strategy,
) -> JacobianPoint {
    assert_eq!(
        scalars.len(),
        tables.len(),
        "every scalar needs exactly one table"
    );
    let directions = strategy.directions();
    assert!(
        wnafs.len() >= scalars.len() * directions,
        "not enough scratch space for {} digit streams",
        scalars.len() * directions
    );
    let wnd_bits = PreparedTable::<N>::WINDOW_BITS;

    let mut bit_table = BitTable::new();
    for (i, (scalar, table)) in scalars.iter().zip(tables).enumerate() {
        if table.is_infinity() {
            continue;
        }
        let element = i * directions;
        match strategy {
            Strategy::Direct => {
                wnafs[element] = Wnaf::new(&scalar.to_limbs(), SCALAR_BITS, wnd_bits);
            }
            Strategy::SplitPosNeg => {
                let split = scalar.split_pos_neg();
                wnafs[element] = Wnaf::new(&split.pos, SCALAR_BITS + 1, wnd_bits);
                wnafs[element + 1] = Wnaf::new(&split.neg, SCALAR_BITS, wnd_bits);
            }
        }
        for direction in 0..directions {
            bit_table.add(element + direction, &mut wnafs[element + direction]);
        }
    }

    let mut acc = JacobianPoint::INFINITY;
    let top_bit = match bit_table.top_bit() {
        Some(top_bit) => top_bit,
        None => return acc,
    };

    for bit in (0..=top_bit).rev() {
        if !acc.is_infinity() {
            acc = acc.double();
        }
        while let Some((element, digit)) = bit_table.fetch(bit, wnafs) {
            let table = &tables[element / directions];
            let term = table.odd_multiple(digit.odd);
            // odd elements are the negative halves of split scalars
            let negate = digit.negative != (element % directions == 1);
            acc = acc.add_affine(&if negate { -term } else { term });
        }
    }

    acc
}

/// Computes `Σ scalars[i]·tables[i]`.
///
/// Panics if the slices have different lengths.
#[cfg(feature = "alloc")]
pub fn calculate<const N: usize>(
    scalars: &[Scalar],
    tables: &[PreparedTable<N>],
    strategy: Strategy,
) -> JacobianPoint {
    let mut wnafs = alloc::vec![Wnaf::EMPTY; scalars.len() * strategy.directions()];
    calculate_with_scratch(scalars, tables, &mut wnafs, strategy)
}

/// Computes `Σ scalars[i]·points[i]`, preparing the tables on the way.
///
/// Panics if the number of scalars and points differ.
#[cfg(feature = "alloc")]
pub fn lincomb<'a>(
    scalars: impl IntoIterator<Item = &'a Scalar>,
    points: impl IntoIterator<Item = &'a JacobianPoint>,
) -> JacobianPoint {
    use alloc::vec::Vec;
    let scalars: Vec<Scalar> = scalars.into_iter().copied().collect();
    let points: Vec<JacobianPoint> = points.into_iter().copied().collect();
    let tables = PreparedTable::<TABLE_SIZE>::batch_new(&points);
    calculate(&scalars, &tables, Strategy::Direct)
}

/// A fixed capacity multi-scalar multiplication that needs no allocation.
///
/// Pairs are [`push`]ed one at a time and [`calculate`] sums them. The digit buffers live inside
/// the struct so it is large: box it or keep it somewhere long lived for big `MAX`.
///
/// ```
/// use multimac_fun::{AffinePoint, JacobianPoint, MultiMac, PreparedTable, Scalar, Strategy};
/// let g = AffinePoint::generator();
/// let table = PreparedTable::<8>::from_affine(&g);
/// let mut multimac = MultiMac::<2>::new();
/// multimac.push(Scalar::from(2u32), table);
/// multimac.push(Scalar::from(3u32), table);
/// let five_g = multimac.calculate(Strategy::Direct);
/// let expected = JacobianPoint::from_affine(&g).double().double().add_affine(&g);
/// assert_eq!(five_g, expected);
/// ```
///
/// [`push`]: Self::push
/// [`calculate`]: Self::calculate
#[derive(Clone, Debug)]
pub struct MultiMac<const MAX: usize, const N: usize = TABLE_SIZE> {
    scalars: [Scalar; MAX],
    tables: [PreparedTable<N>; MAX],
    wnafs: [[Wnaf; 2]; MAX],
    len: usize,
}

impl<const MAX: usize, const N: usize> MultiMac<MAX, N> {
    pub fn new() -> Self {
        Self {
            scalars: [Scalar::ZERO; MAX],
            tables: [PreparedTable::INFINITY; MAX],
            wnafs: [[Wnaf::EMPTY; 2]; MAX],
            len: 0,
        }
    }

    /// Forgets all the pairs pushed so far.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds `scalar·P` to the sum where `table` was prepared from `P`.
    ///
    /// Panics if `MAX` pairs have already been pushed.
    pub fn push(&mut self, scalar: Scalar, table: PreparedTable<N>) {
        assert!(self.len < MAX, "MultiMac is full ({MAX} pairs)");
        self.scalars[self.len] = scalar;
        self.tables[self.len] = table;
        self.len += 1;
    }

    /// Prepares `point` and pushes it with `scalar`.
    pub fn push_point(&mut self, scalar: Scalar, point: &JacobianPoint) {
        self.push(scalar, PreparedTable::new(point))
    }

    pub fn calculate(&mut self, strategy: Strategy) -> JacobianPoint {
        let len = self.len;
        calculate_with_scratch(
            &self.scalars[..len],
            &self.tables[..len],
            self.wnafs.as_flattened_mut(),
            strategy,
        )
    }
}

impl<const MAX: usize, const N: usize> Default for MultiMac<MAX, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "serde")]
impl<const N: usize> serde::Serialize for PreparedTable<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.odd_multiples {
            Some(entries) => serializer.collect_seq(entries.iter()),
            None => serializer.collect_seq(core::iter::empty::<&AffineStorage>()),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, const N: usize> serde::Deserialize<'de> for PreparedTable<N> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor<const N: usize>;

        impl<'de, const N: usize> serde::de::Visitor<'de> for TableVisitor<N> {
            type Value = PreparedTable<N>;

            fn expecting(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(f, "either no entries or {} odd multiples of a point", N)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut entries = [AffineStorage::FILLER; N];
                for (i, entry) in entries.iter_mut().enumerate() {
                    match seq.next_element()? {
                        Some(element) => *entry = element,
                        None if i == 0 => return Ok(PreparedTable::INFINITY),
                        None => return Err(serde::de::Error::invalid_length(i, &self)),
                    }
                }
                if seq.next_element::<AffineStorage>()?.is_some() {
                    return Err(serde::de::Error::invalid_length(N + 1, &self));
                }
                PreparedTable::from_entries(entries).ok_or_else(|| {
                    serde::de::Error::custom("entries are not the odd multiples of a point")
                })
            }
        }

        deserializer.deserialize_seq(TableVisitor::<N>)
    }
}
