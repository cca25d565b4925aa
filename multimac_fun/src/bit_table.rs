//! Scheduling of wNAF digits across many scalars by bit position.
//!
//! Every scalar's digits are visited from the most significant down, and the multiplication
//! loop walks bit positions from the top down. The [`BitTable`] keeps, for every bit position, a
//! linked list of the scalars whose *next* digit sits at that position. The links live inside the
//! [`Wnaf`]s themselves so no allocation is needed and each digit is touched exactly once.
use crate::wnaf::{BIT_SLOTS, Wnaf, WnafDigit};

/// Identifies one digit of one registered [`Wnaf`]: the element's index and the digit's
/// position within it (counting from the least significant).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    element: u32,
    entry: u8,
}

/// Heads of the per-bit linked lists of pending digits.
#[derive(Clone, Debug)]
pub struct BitTable {
    heads: [Option<Link>; BIT_SLOTS],
    top_bit: Option<usize>,
}

impl BitTable {
    pub const fn new() -> Self {
        Self {
            heads: [None; BIT_SLOTS],
            top_bit: None,
        }
    }

    pub fn reset(&mut self) {
        self.heads = [None; BIT_SLOTS];
        self.top_bit = None;
    }

    /// The highest bit position anything was registered at since the last reset.
    pub fn top_bit(&self) -> Option<usize> {
        self.top_bit
    }

    /// Whether every registered digit has been fetched.
    pub fn is_drained(&self) -> bool {
        self.heads.iter().all(Option::is_none)
    }

    /// Registers `wnaf` as element `element` by linking its most significant digit in at that
    /// digit's bit position. A `wnaf` with no digits is ignored.
    ///
    /// The element index is what [`fetch`] returns and what its `wnafs` slice is indexed with.
    ///
    /// [`fetch`]: Self::fetch
    pub fn add(&mut self, element: usize, wnaf: &mut Wnaf) {
        wnaf.next = None;
        if wnaf.is_empty() {
            return;
        }
        let element = u32::try_from(element).expect("element index fits in 32 bits");
        let entry = wnaf.len() - 1;
        let link = Link {
            element,
            entry: entry as u8,
        };
        self.push(wnaf.digit(entry).bit as usize, link, wnaf);
    }

    fn push(&mut self, bit: usize, link: Link, wnaf: &mut Wnaf) {
        wnaf.next = self.heads[bit].replace(link);
        self.top_bit = Some(self.top_bit.map_or(bit, |top| top.max(bit)));
    }

    /// Pops one pending digit at `bit`, returning the element it belongs to and the digit.
    ///
    /// The element's next lower digit (if any) is linked in at its own bit position, which is
    /// always lower than `bit`, so repeatedly fetching while walking `bit` downwards yields every
    /// digit of every registered element exactly once.
    pub fn fetch(&mut self, bit: usize, wnafs: &mut [Wnaf]) -> Option<(usize, WnafDigit)> {
        let link = self.heads[bit]?;
        let element = link.element as usize;
        let wnaf = &mut wnafs[element];
        let digit = wnaf.digit(link.entry as usize);
        debug_assert_eq!(digit.bit as usize, bit);

        self.heads[bit] = wnaf.next.take();
        if link.entry > 0 {
            let lower = Link {
                element: link.element,
                entry: link.entry - 1,
            };
            let lower_bit = wnaf.digit(lower.entry as usize).bit as usize;
            self.push(lower_bit, lower, wnaf);
        }
        Some((element, digit))
    }
}

impl Default for BitTable {
    fn default() -> Self {
        Self::new()
    }
}
