//! Failure modes of trie operations.
//!
//! Errors propagate unchanged to the public API caller; the core never
//! retries and never publishes a new root once an operation has failed.

use crate::rstd::string::String;
use core::fmt;
use rlp::DecoderError;

#[derive(Debug, PartialEq)]
pub enum TrieError {
    /// A referenced child node is not present in the backend.
    MissingNode([u8; 32]),
    /// A stored node failed to decode: bad RLP shape, bad list arity, or a
    /// malformed hex-prefix payload.
    CorruptNode(DecoderError),
    /// The backend reported a read or write failure.
    Backend(String),
    /// Malformed caller input on the public API surface.
    InvalidInput(&'static str),
}

impl fmt::Display for TrieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrieError::MissingNode(hash) => {
                f.write_str("missing trie node 0x")?;
                for byte in hash {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            TrieError::CorruptNode(err) => write!(f, "corrupt trie node: {}", err),
            TrieError::Backend(msg) => write!(f, "backend error: {}", msg),
            TrieError::InvalidInput(what) => write!(f, "invalid input: {}", what),
        }
    }
}

impl From<DecoderError> for TrieError {
    fn from(err: DecoderError) -> Self {
        TrieError::CorruptNode(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TrieError {}
