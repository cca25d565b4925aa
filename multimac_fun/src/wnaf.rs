//! Width-w non-adjacent form (wNAF) recoding of scalars.
//!
//! A scalar `k` is rewritten as `Σ ±dᵢ·2^bitᵢ` where every `dᵢ` is odd and below `2^w`, and any
//! two non-zero digits are at least `w + 1` bits apart. With a table of the `2^(w−1)` odd
//! multiples `P, 3P, …, (2^w−1)P` each digit costs one point addition.
use crate::bit_table::Link;

/// The number of bit positions a digit can land on. Scalars are 256 bits, recoding may carry one
/// bit past the top and the positive half of a split scalar is itself 257 bits.
pub const BIT_SLOTS: usize = crate::backend::SCALAR_BITS + 2;

/// Upper bound on the number of digits any supported encoding produces.
pub const MAX_WNAF_DIGITS: usize = BIT_SLOTS / 2 + 1;

/// A single non-zero wNAF digit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WnafDigit {
    /// The bit position the digit is aligned to.
    pub bit: u16,
    /// The odd magnitude of the digit.
    pub odd: u16,
    pub negative: bool,
}

/// Produces the wNAF digits of a little-endian integer from the least significant end.
///
/// Each digit consumes a window of `w + 1` bits. When the window would make the digit `2^w` or
/// larger it is emitted negative and a carry is pushed into the next window. Bits at or past
/// `n_bits` read as zero, except that a pending carry still produces a final digit.
#[derive(Clone, Debug)]
pub struct WnafEncoder<'a> {
    limbs: &'a [u64],
    n_bits: usize,
    wnd_bits: u32,
    bit: usize,
    carry: bool,
}

impl<'a> WnafEncoder<'a> {
    /// Panics unless `1 <= wnd_bits <= 15` and the limbs hold at least `n_bits` bits.
    pub fn new(limbs: &'a [u64], n_bits: usize, wnd_bits: u32) -> Self {
        assert!(
            (1..=15).contains(&wnd_bits),
            "window width {wnd_bits} is not supported"
        );
        assert!(
            n_bits <= limbs.len() * 64,
            "{n_bits} bits requested from {} limbs",
            limbs.len()
        );
        Self {
            limbs,
            n_bits,
            wnd_bits,
            bit: 0,
            carry: false,
        }
    }

    fn limb_bit(&self, bit: usize) -> bool {
        (self.limbs[bit / 64] >> (bit % 64)) & 1 == 1
    }
}

impl Iterator for WnafEncoder<'_> {
    type Item = WnafDigit;

    fn next(&mut self) -> Option<WnafDigit> {
        let consume = self.wnd_bits + 1;
        let flag = 1u32 << consume;
        let mut window = 0u32;

        loop {
            let set = if self.bit >= self.n_bits {
                if !self.carry && window == 0 {
                    return None;
                }
                self.carry
            } else {
                self.limb_bit(self.bit) != self.carry
            };

            if set {
                window |= flag;
                self.carry = false;
            }

            self.bit += 1;
            window >>= 1;
            if window & 1 == 1 {
                break;
            }
        }

        let bit = (self.bit - consume as usize) as u16;
        if window >> self.wnd_bits != 0 {
            // 2^w or more: use the negative digit 2^(w+1) - window and carry
            self.carry = true;
            Some(WnafDigit {
                bit,
                odd: (window ^ (flag - 2)) as u16,
                negative: true,
            })
        } else {
            Some(WnafDigit {
                bit,
                odd: window as u16,
                negative: false,
            })
        }
    }
}

/// The wNAF digits of one scalar in a fixed size buffer, plus the link the [`BitTable`] threads
/// through it.
///
/// [`BitTable`]: crate::bit_table::BitTable
#[derive(Clone, Copy, Debug)]
pub struct Wnaf {
    // lowest bit first
    digits: [WnafDigit; MAX_WNAF_DIGITS],
    len: u8,
    pub(crate) next: Option<Link>,
}

impl Wnaf {
    pub const EMPTY: Self = Self {
        digits: [WnafDigit {
            bit: 0,
            odd: 0,
            negative: false,
        }; MAX_WNAF_DIGITS],
        len: 0,
        next: None,
    };

    /// Encodes the `n_bits` low bits of `limbs` with window width `wnd_bits`.
    ///
    /// `n_bits` may be at most `BIT_SLOTS - 1` so that every digit position fits the scheduler.
    pub fn new(limbs: &[u64], n_bits: usize, wnd_bits: u32) -> Self {
        assert!(
            n_bits < BIT_SLOTS,
            "{n_bits} bit integers are too long to schedule"
        );
        let mut wnaf = Self::EMPTY;
        for digit in WnafEncoder::new(limbs, n_bits, wnd_bits) {
            wnaf.digits[wnaf.len as usize] = digit;
            wnaf.len += 1;
        }
        wnaf
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The digit at `entry`, counting from the least significant.
    pub fn digit(&self, entry: usize) -> WnafDigit {
        self.digits[..self.len()][entry]
    }

    /// Digits from the most significant down.
    pub fn digits(&self) -> impl DoubleEndedIterator<Item = &WnafDigit> + ExactSizeIterator + '_ {
        self.digits[..self.len()].iter().rev()
    }
}

impl Default for Wnaf {
    fn default() -> Self {
        Self::EMPTY
    }
}
