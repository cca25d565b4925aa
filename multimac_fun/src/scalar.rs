//! Scalars: integers mod the secp256k1 group order.
use crate::backend::BackendScalar;
use core::ops::{Add, Mul, Neg, Sub};
use k256::elliptic_curve::ff::Field;
use rand_core::RngCore;
use subtle::{Choice, ConstantTimeEq};

/// A secp256k1 scalar (an integer mod the curve order `q`).
///
/// ```text
/// q = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
/// ```
///
/// The multiplication kernel reads scalars bit by bit through [`to_limbs`] so a `Scalar` is
/// always kept reduced.
///
/// [`to_limbs`]: Self::to_limbs
#[derive(Clone, Copy)]
pub struct Scalar(pub(crate) k256::Scalar);

/// The two halves of a scalar produced by [`Scalar::split_pos_neg`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PosNegSplit {
    /// Little-endian words of the positive part. It may be 257 bits long: `pos[4]` holds the carry.
    pub pos: [u64; 5],
    /// Little-endian words of the negative part.
    pub neg: [u64; 4],
}

impl PosNegSplit {
    /// Whether the positive part overflowed into bit 256.
    pub fn carry(&self) -> bool {
        self.pos[4] != 0
    }
}

impl Scalar {
    pub const ZERO: Self = Scalar(k256::Scalar::ZERO);
    pub const ONE: Self = Scalar(k256::Scalar::ONE);

    /// Generates a uniformly distributed scalar.
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        Scalar(k256::Scalar::random(rng))
    }

    /// Interprets 32 big-endian bytes as an integer and reduces it mod `q`.
    pub fn from_bytes_mod_order(bytes: [u8; 32]) -> Self {
        Scalar(BackendScalar::from_bytes_mod_order(bytes))
    }

    /// Creates a scalar from 32 big-endian bytes, returning `None` if they encode an integer
    /// greater than or equal to `q`.
    ///
    /// # Example
    /// ```
    /// use multimac_fun::Scalar;
    /// assert!(Scalar::from_bytes([0u8; 32]).is_some());
    /// assert!(Scalar::from_bytes([255u8; 32]).is_none());
    /// ```
    pub fn from_bytes(bytes: [u8; 32]) -> Option<Self> {
        <k256::Scalar as BackendScalar>::from_bytes(bytes).map(Scalar)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        BackendScalar::to_bytes(&self.0)
    }

    /// The little-endian 64-bit words of the canonical integer value.
    pub fn to_limbs(&self) -> [u64; 4] {
        self.0.to_limbs()
    }

    /// Reads bit `bit` (0 is the least significant) of the canonical integer value.
    pub fn bit(&self, bit: usize) -> bool {
        self.0.get_bit(bit)
    }

    pub fn is_zero(&self) -> bool {
        bool::from(self.0.is_zero())
    }

    /// Splits the integer value `k` into a positive and a negative part such that
    /// `pos − neg = k` exactly (as integers, not mod `q`).
    ///
    /// The two parts never share a set bit and no two set bits of `pos | neg` are adjacent, so
    /// each part is about half as dense as `k`. This is the non-adjacent form computed with
    /// `h = k >> 1`, `t = k + h`, `pos = t & !h`, `neg = h & !t`.
    pub fn split_pos_neg(&self) -> PosNegSplit {
        let k = self.to_limbs();
        let mut half = [0u64; 4];
        for i in 0..4 {
            half[i] = k[i] >> 1;
            if i < 3 {
                half[i] |= k[i + 1] << 63;
            }
        }

        let mut sum = [0u64; 5];
        let mut carry = 0u64;
        for i in 0..4 {
            (sum[i], carry) = adc64(k[i], half[i], carry);
        }
        sum[4] = carry;

        let mut pos = [0u64; 5];
        let mut neg = [0u64; 4];
        for i in 0..4 {
            pos[i] = sum[i] & !half[i];
            neg[i] = half[i] & !sum[i];
        }
        pos[4] = sum[4];
        PosNegSplit { pos, neg }
    }
}

/// Computes `a + b + carry`, returning the result along with the new carry.
#[inline(always)]
const fn adc64(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let ret = (a as u128) + (b as u128) + (carry as u128);
    (ret as u64, (ret >> 64) as u64)
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::ZERO
    }
}

impl From<u32> for Scalar {
    fn from(int: u32) -> Self {
        Scalar(k256::Scalar::from(int))
    }
}

impl From<u64> for Scalar {
    fn from(int: u64) -> Self {
        Scalar(k256::Scalar::from(int))
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 + rhs.0)
    }
}

impl Sub for Scalar {
    type Output = Scalar;
    fn sub(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 - rhs.0)
    }
}

impl Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 * rhs.0)
    }
}

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        Scalar(-self.0)
    }
}

crate::impl_display_debug_serialize! {
    fn to_bytes(scalar: &Scalar) -> [u8; 32] {
        scalar.to_bytes()
    }
}

crate::impl_fromstr_deserialize! {
    name => "secp256k1 scalar",
    fn from_bytes(bytes: [u8; 32]) -> Option<Scalar> {
        Scalar::from_bytes(bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hex;
    use proptest::prelude::*;
    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::wasm_bindgen_test as test;

    fn backend_bytes(limbs: &[u64; 4]) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, limb) in limbs.iter().enumerate() {
            bytes[32 - 8 * (i + 1)..32 - 8 * i].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    /// `pos − neg` as a 320-bit little-endian integer.
    fn pos_minus_neg(split: &PosNegSplit) -> [u64; 5] {
        let mut out = [0u64; 5];
        let mut borrow = 0u64;
        for i in 0..5 {
            let neg = if i < 4 { split.neg[i] } else { 0 };
            let (d1, b1) = split.pos[i].overflowing_sub(neg);
            let (d2, b2) = d1.overflowing_sub(borrow);
            out[i] = d2;
            borrow = (b1 | b2) as u64;
        }
        assert_eq!(borrow, 0, "negative part exceeds positive part");
        out
    }

    #[test]
    fn limbs_are_little_endian() {
        let x: Scalar = hex::decode_array::<32>(
            "0000000000000004000000000000000300000000000000020000000000000001",
        )
        .ok()
        .and_then(Scalar::from_bytes)
        .unwrap();
        assert_eq!(x.to_limbs(), [1, 2, 3, 4]);
        assert!(x.bit(0));
        assert!(!x.bit(1));
        assert!(x.bit(65));
        assert!(x.bit(128) && x.bit(129));
        assert!(x.bit(194));
        assert_eq!(backend_bytes(&x.to_limbs()), x.to_bytes());
    }

    #[test]
    fn from_bytes_mod_order_reduces() {
        let q_plus_one = hex::decode_array::<32>(
            "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364142",
        )
        .unwrap();
        assert_eq!(Scalar::from_bytes(q_plus_one), None);
        assert_eq!(Scalar::from_bytes_mod_order(q_plus_one), Scalar::ONE);
    }

    #[test]
    fn split_small_values() {
        // 7 = 8 - 1
        let split = Scalar::from(7u32).split_pos_neg();
        assert_eq!(split.pos, [8, 0, 0, 0, 0]);
        assert_eq!(split.neg, [1, 0, 0, 0]);
        assert!(!split.carry());

        let split = Scalar::ZERO.split_pos_neg();
        assert_eq!(split.pos, [0; 5]);
        assert_eq!(split.neg, [0; 4]);
    }

    #[test]
    fn split_carries_for_minus_one() {
        let minus_one = -Scalar::ONE;
        let split = minus_one.split_pos_neg();
        assert!(split.carry());
        let mut expected = [0u64; 5];
        expected[..4].copy_from_slice(&minus_one.to_limbs());
        assert_eq!(pos_minus_neg(&split), expected);
    }

    #[test]
    fn display_fromstr() {
        let x = Scalar::from(0xdeadbeef_u32);
        let hex = format!("{}", x);
        assert_eq!(
            hex,
            "00000000000000000000000000000000000000000000000000000000deadbeef"
        );
        assert_eq!(hex.parse::<Scalar>(), Ok(x));
        assert_eq!(
            format!("{:?}", x),
            "Scalar(00000000000000000000000000000000000000000000000000000000deadbeef)"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialization_roundtrip() {
        let x = Scalar::random(&mut rand::thread_rng());
        let json = serde_json::to_string(&x).unwrap();
        assert_eq!(serde_json::from_str::<Scalar>(&json).unwrap(), x);

        #[cfg(feature = "bincode")]
        {
            let bytes = bincode::encode_to_vec(
                bincode::serde::Compat(&x),
                bincode::config::standard(),
            )
            .unwrap();
            assert_eq!(bytes.len(), 32);
            let (decoded, _) = bincode::decode_from_slice::<bincode::serde::Compat<Scalar>, _>(
                &bytes,
                bincode::config::standard(),
            )
            .unwrap();
            assert_eq!(decoded.0, x);
        }
    }

    proptest! {
        #[test]
        fn split_pos_neg_reconstructs(x in crate::proptest::scalar()) {
            let split = x.split_pos_neg();
            let mut expected = [0u64; 5];
            expected[..4].copy_from_slice(&x.to_limbs());
            prop_assert_eq!(pos_minus_neg(&split), expected);
        }

        #[test]
        fn split_pos_neg_is_sparse(x in crate::proptest::scalar()) {
            let split = x.split_pos_neg();
            for i in 0..4 {
                prop_assert_eq!(split.pos[i] & split.neg[i], 0);
            }
            let mut either = split.pos;
            for i in 0..4 {
                either[i] |= split.neg[i];
            }
            for i in 0..5 {
                let next = if i < 4 { either[i + 1] } else { 0 };
                let shifted = (either[i] >> 1) | (next << 63);
                prop_assert_eq!(either[i] & shifted, 0, "adjacent set bits in word {}", i);
            }
        }

        #[test]
        fn bits_match_bytes(x in crate::proptest::scalar(), bit in 0usize..256) {
            let bytes = x.to_bytes();
            let byte = bytes[31 - bit / 8];
            prop_assert_eq!(x.bit(bit), (byte >> (bit % 8)) & 1 == 1);
        }
    }
}
