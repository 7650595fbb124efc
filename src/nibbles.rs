//! Byte-string to nibble-sequence conversions.
//!
//! Trie paths are sequences of nibbles (4-bit values); a key entering the
//! trie is expanded high nibble first, so `0xAB` becomes `[0xA, 0xB]`.

use crate::error::TrieError;
use crate::rstd::vec::Vec;

/// Expand a byte string into its nibble sequence, high nibble first.
pub fn to_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(bytes.len() * 2);
    for byte in bytes {
        nibbles.push(byte >> 4);
        nibbles.push(byte & 0x0f);
    }
    nibbles
}

/// Pack a nibble sequence back into bytes. Odd-length sequences cannot
/// fall on a byte boundary (they only exist inside hex-prefix payloads)
/// and are rejected as `InvalidInput`.
pub fn from_nibbles(nibbles: &[u8]) -> Result<Vec<u8>, TrieError> {
    if nibbles.len() % 2 != 0 {
        return Err(TrieError::InvalidInput("odd nibble length"));
    }
    Ok(nibbles.chunks(2).map(|pair| pair[0] << 4 | pair[1]).collect())
}

/// Length of the longest common prefix of two nibble sequences. Slicing
/// either input with the returned length yields the shared prefix itself.
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
