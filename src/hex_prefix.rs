//! Compact (hex-prefix) path encoding, Yellow Paper appendix C.
//!
//! The high nibble of the first byte carries two flag bits: the lowest
//! encodes the oddness of the path length, the second-lowest whether the
//! path terminates at a value (a leaf). For odd lengths the low nibble of
//! the first byte holds the first path nibble; for even lengths it is zero
//! padding. The remaining nibbles pack two per byte.

use crate::rstd::vec::Vec;
use rlp::DecoderError;

const ODD_FLAG: u8 = 0x10;
const TERMINATOR_FLAG: u8 = 0x20;

/// Pack a nibble path and its terminator bit into bytes.
pub fn encode(path: &[u8], terminator: bool) -> Vec<u8> {
    let oddness = path.len() % 2;
    let mut first = if terminator { TERMINATOR_FLAG } else { 0x00 };
    if oddness == 1 {
        first |= ODD_FLAG | path[0];
    }

    let mut encoded = Vec::with_capacity(1 + path.len() / 2);
    encoded.push(first);
    encoded.extend(path[oddness..].chunks(2).map(|pair| pair[0] << 4 | pair[1]));
    encoded
}

/// Recover `(path, terminator)` from a compact encoding.
///
/// Rejects flag nibbles above 3 and nonzero padding in the even case, so
/// every accepted input re-encodes to itself.
pub fn decode(encoded: &[u8]) -> Result<(Vec<u8>, bool), DecoderError> {
    let first = *encoded
        .first()
        .ok_or(DecoderError::Custom("empty hex-prefix payload"))?;
    if first & 0xc0 != 0 {
        return Err(DecoderError::Custom("invalid hex-prefix flag"));
    }
    let terminator = first & TERMINATOR_FLAG != 0;

    let mut path = Vec::with_capacity(encoded.len() * 2 - 1);
    if first & ODD_FLAG != 0 {
        path.push(first & 0x0f);
    } else if first & 0x0f != 0 {
        return Err(DecoderError::Custom("nonzero hex-prefix padding nibble"));
    }
    for byte in &encoded[1..] {
        path.push(byte >> 4);
        path.push(byte & 0x0f);
    }
    Ok((path, terminator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_encode_extension_paths() {
        assert_eq!(encode(&[0, 0, 1, 2, 3, 4, 5], false), vec![0x10, 0x01, 0x23, 0x45]);
        assert_eq!(encode(&[0, 1, 2, 3, 4, 5], false), vec![0x00, 0x01, 0x23, 0x45]);
        assert_eq!(encode(&[1, 2, 3, 4, 5], false), vec![0x11, 0x23, 0x45]);
        assert_eq!(encode(&[1, 2, 3, 4], false), vec![0x00, 0x12, 0x34]);
    }

    #[test]
    fn it_should_encode_leaf_paths() {
        assert_eq!(encode(&[0, 1, 2, 3, 4, 5], true), vec![0x20, 0x01, 0x23, 0x45]);
        assert_eq!(encode(&[1, 2, 3, 4, 5], true), vec![0x31, 0x23, 0x45]);
        assert_eq!(encode(&[4, 1], true), vec![0x20, 0x41]);
        assert_eq!(encode(&[0xf, 0x1, 0xc, 0xb, 0x8], true), vec![0x3f, 0x1c, 0xb8]);
    }

    #[test]
    fn it_should_encode_the_empty_path() {
        assert_eq!(encode(&[], false), vec![0x00]);
        assert_eq!(encode(&[], true), vec![0x20]);
    }

    #[test]
    fn it_should_round_trip_every_parity_and_terminator() {
        for path in [
            &[][..],
            &[0x0][..],
            &[0xf][..],
            &[0x1, 0x2][..],
            &[0x1, 0x2, 0x3][..],
            &[0x0, 0x0, 0x0, 0x0, 0x0][..],
            &[0xa, 0xb, 0xc, 0xd, 0xe, 0xf, 0x0, 0x9, 0x3][..],
        ] {
            for terminator in [false, true] {
                let encoded = encode(path, terminator);
                assert_eq!(decode(&encoded), Ok((path.to_vec(), terminator)));
            }
        }
    }

    #[test]
    fn it_should_reject_malformed_payloads() {
        assert!(decode(&[]).is_err());
        assert!(decode(&[0x40]).is_err());
        assert!(decode(&[0x90, 0x12]).is_err());
        // even-length marker with a nonzero pad nibble
        assert!(decode(&[0x07, 0x12]).is_err());
        assert!(decode(&[0x21]).is_err());
    }
}
