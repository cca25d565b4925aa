//! Variable-time multi-scalar multiplication over secp256k1.
//!
//! Computes `k₁·P₁ + k₂·P₂ + … + kₙ·Pₙ` for public scalars and points:
//!
//! 1. Each point is turned into a [`PreparedTable`] of its odd multiples (one field inversion per
//!    table, or one for a whole batch with [`PreparedTable::batch_new`]).
//! 2. Each scalar is recoded into wNAF digits ([`wnaf`]).
//! 3. Digits of all scalars are scheduled by bit position on a shared [`BitTable`] and summed
//!    with a single double-and-add pass.
//!
//! ```
//! use multimac_fun::{AffinePoint, JacobianPoint, Scalar, lincomb};
//! let g = JacobianPoint::from_affine(&AffinePoint::generator());
//! let h = g.double();
//! // 3G + 4·2G = 11G
//! let sum = lincomb(&[Scalar::from(3u32), Scalar::from(4u32)], &[g, h]);
//! let eleven_g = lincomb(&[Scalar::from(11u32)], &[g]);
//! assert_eq!(sum, eleven_g);
//! ```
//!
//! None of this runs in constant time. It is meant for verification-style workloads where the
//! scalars are public.
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
#[macro_use]
extern crate std;

#[cfg(feature = "serde")]
pub extern crate serde;

pub use k256;
pub use rand_core;

mod backend;
mod k256_compat;
mod macros;
mod multimac;
mod scalar;

pub mod bit_table;
pub mod hex;
pub mod normalize;
pub mod wnaf;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

pub use backend::{AffinePoint, AffineStorage, BackendScalar, FieldElement, JacobianPoint};
pub use bit_table::BitTable;
#[cfg(feature = "alloc")]
pub use multimac::{calculate, lincomb};
pub use multimac::{
    MultiMac, PreparedTable, Strategy, TABLE_SIZE, WINDOW_BITS, calculate_with_scratch,
};
pub use normalize::{BatchNormalizer, SliceNormalizer};
pub use scalar::{PosNegSplit, Scalar};
pub use wnaf::{Wnaf, WnafDigit, WnafEncoder};
