//! The pluggable key-value backend nodes are persisted in.

use crate::error::TrieError;
use crate::node_codec::NULL_NODE;
use crate::store::KeccakHasher;
use crate::DBValue;
use hash_db::{HashDB, EMPTY_PREFIX};
use memory_db::{HashKey, MemoryDB};

/// Opaque byte store the trie writes encoded nodes into.
///
/// Keys are always the Keccak-256 digest of the stored bytes, which makes
/// `put` idempotent: concurrent writers of equal content write equal
/// entries, and distinct content under one key cannot occur.
pub trait TrieDB {
    fn get(&self, key: &[u8; 32]) -> Result<Option<DBValue>, TrieError>;
    fn put(&mut self, key: [u8; 32], value: DBValue) -> Result<(), TrieError>;
}

/// In-memory backend keyed by node hash.
pub type TrieMemoryDB = MemoryDB<KeccakHasher, HashKey<KeccakHasher>, DBValue>;

/// Fresh in-memory backend, seeded with the null-node entry so the empty
/// trie root always resolves.
pub fn empty_db() -> TrieMemoryDB {
    TrieMemoryDB::new(&NULL_NODE)
}

impl TrieDB for TrieMemoryDB {
    fn get(&self, key: &[u8; 32]) -> Result<Option<DBValue>, TrieError> {
        Ok(HashDB::get(self, key, EMPTY_PREFIX))
    }

    fn put(&mut self, key: [u8; 32], value: DBValue) -> Result<(), TrieError> {
        HashDB::emplace(self, key, EMPTY_PREFIX, value);
        Ok(())
    }
}
