//! Hex encoding and decoding for the fixed length byte encodings in this crate.
#[cfg(feature = "alloc")]
use alloc::string::String;

use core::fmt;

/// Error representing a failed conversion from hex into the bytes for the target type.
#[derive(Debug, Clone, PartialEq)]
pub enum HexError {
    /// The string was not a valid hex string.
    InvalidHex,
    /// The string was not the right length for the target type.
    InvalidLength,
    /// The bytes did not encode a valid value for the target type.
    InvalidEncoding,
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HexError::InvalidHex => write!(f, "invalid hex string"),
            HexError::InvalidLength => write!(f, "hex string had the wrong length for the target"),
            HexError::InvalidEncoding => write!(f, "hex value did not encode the expected type"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HexError {}

#[doc(hidden)]
pub fn hex_val(c: u8) -> Result<u8, HexError> {
    match c {
        b'A'..=b'F' => Ok(c - b'A' + 10),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'0'..=b'9' => Ok(c - b'0'),
        _ => Err(HexError::InvalidHex),
    }
}

/// Encode some bytes as a lowercase hex `String`.
///
/// # Examples
/// ```
/// use multimac_fun::{hex, Scalar};
/// assert_eq!(
///     hex::encode(&Scalar::from(5u32).to_bytes()[28..]),
///     "00000005"
/// );
/// ```
#[cfg(feature = "alloc")]
pub fn encode(bytes: &[u8]) -> String {
    use core::fmt::Write;
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(hex, "{:02x}", byte).unwrap()
    }
    hex
}

/// Decode hex into a fixed length array.
///
/// # Examples
/// ```
/// use multimac_fun::{hex, AffinePoint};
/// let x: [u8; 32] =
///     hex::decode_array("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798").unwrap();
/// assert_eq!(AffinePoint::generator().coordinates().unwrap().0, x);
/// ```
pub fn decode_array<const N: usize>(hex: &str) -> Result<[u8; N], HexError> {
    if hex.len() % 2 != 0 {
        return Err(HexError::InvalidHex);
    }
    if hex.len() != N * 2 {
        return Err(HexError::InvalidLength);
    }
    let mut bytes = [0u8; N];
    for (pair, byte) in hex.as_bytes().chunks_exact(2).zip(bytes.iter_mut()) {
        *byte = (hex_val(pair[0])? << 4) | hex_val(pair[1])?;
    }
    Ok(bytes)
}
