//! Content-addressed node persistence.
//!
//! Nodes cross this boundary in canonical RLP form. The 32-byte threshold
//! below is part of the wire format, applied at encoding time: a parent's
//! encoding (and therefore its hash) depends on whether each child is
//! carried inline or by digest.

use crate::db::TrieDB;
use crate::error::TrieError;
use crate::node::{Node, NodeRef};
use crate::node_codec::{decode_node, encode_node};
use log::trace;
use tiny_keccak::{Hasher as CoreHasher, Keccak};

/// Encodings at or above this length are stored by hash; shorter ones are
/// inlined into the parent.
pub const HASH_THRESHOLD: usize = 32;

/// One-shot Keccak-256. Every node reference and the trie root itself are
/// digests of node encodings computed here.
pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    let mut output = [0u8; 32];

    keccak.update(bytes);
    keccak.finalize(&mut output);

    output
}

/// Keccak-256 parameterizing the backend's key function, so the in-memory
/// backend keys entries exactly the way [`NodeStore`] addresses them.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct KeccakHasher;

impl hash_db::Hasher for KeccakHasher {
    type Out = [u8; 32];
    const LENGTH: usize = 32;

    fn hash(x: &[u8]) -> Self::Out {
        keccak256(x)
    }

    type StdHasher = KeccakStdHasher;
}

/// Streaming shim satisfying the `StdHasher` bound of `hash_db::Hasher`;
/// nothing in the trie itself hashes incrementally.
pub struct KeccakStdHasher {
    keccak: Keccak,
}

impl Default for KeccakStdHasher {
    fn default() -> Self {
        Self {
            keccak: Keccak::v256(),
        }
    }
}

impl core::hash::Hasher for KeccakStdHasher {
    fn finish(&self) -> u64 {
        let mut output = [0u8; 32];
        self.keccak.clone().finalize(&mut output);
        let mut word = [0u8; 8];
        word.copy_from_slice(&output[..8]);
        u64::from_be_bytes(word)
    }

    fn write(&mut self, bytes: &[u8]) {
        self.keccak.update(bytes);
    }
}

/// Resolve a node reference: decode inline bytes directly, or fetch the
/// encoding from the backend by digest.
pub fn load_node(db: &dyn TrieDB, node_ref: &NodeRef) -> Result<Node, TrieError> {
    match node_ref {
        NodeRef::Inline(rlp) => decode_node(rlp),
        NodeRef::Hash(hash) => {
            let bytes = db.get(hash)?.ok_or(TrieError::MissingNode(*hash))?;
            decode_node(&bytes)
        }
    }
}

/// Write half of the store. Builder and Destroyer push every new child
/// through here before referencing it from a parent, so child hashes are
/// always known when the parent is encoded.
pub struct NodeStore<'db> {
    db: &'db mut dyn TrieDB,
}

impl<'db> NodeStore<'db> {
    pub fn new(db: &'db mut dyn TrieDB) -> Self {
        Self { db }
    }

    /// Encode `node` and either hand the encoding back inline (when it is
    /// shorter than the hash threshold, without touching the backend) or
    /// persist it under its Keccak-256 digest.
    pub fn store_node(&mut self, node: &Node) -> Result<NodeRef, TrieError> {
        let encoded = encode_node(node);
        if encoded.len() < HASH_THRESHOLD {
            return Ok(NodeRef::Inline(encoded));
        }
        let hash = keccak256(&encoded);
        trace!("storing {} byte node under {:02x?}", encoded.len(), hash);
        self.db.put(hash, encoded)?;
        Ok(NodeRef::Hash(hash))
    }

    pub fn load(&self, node_ref: &NodeRef) -> Result<Node, TrieError> {
        load_node(&*self.db, node_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::empty_db;
    use hex_literal::hex;

    #[test]
    fn it_should_hash_the_empty_input() {
        assert_eq!(
            keccak256(&[]),
            hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn it_should_inline_nodes_below_the_threshold() {
        let mut db = empty_db();
        let mut store = NodeStore::new(&mut db);
        let leaf = Node::Leaf(vec![1, 2, 3], b"value".to_vec());
        let node_ref = store.store_node(&leaf).unwrap();
        assert_eq!(node_ref, NodeRef::Inline(encode_node(&leaf)));
        assert_eq!(store.load(&node_ref).unwrap(), leaf);
    }

    #[test]
    fn it_should_hash_and_persist_larger_nodes() {
        let mut db = empty_db();
        let mut store = NodeStore::new(&mut db);
        let leaf = Node::Leaf(
            vec![1, 2, 3],
            b"a value long enough to exceed the inline threshold".to_vec(),
        );
        let node_ref = store.store_node(&leaf).unwrap();
        match &node_ref {
            NodeRef::Hash(hash) => {
                assert_eq!(*hash, keccak256(&encode_node(&leaf)));
            }
            NodeRef::Inline(_) => panic!("expected a hashed reference"),
        }
        assert_eq!(store.load(&node_ref).unwrap(), leaf);
    }

    #[test]
    fn it_should_report_missing_nodes() {
        let db = empty_db();
        let absent = NodeRef::Hash([0xab; 32]);
        assert_eq!(
            load_node(&db, &absent),
            Err(TrieError::MissingNode([0xab; 32]))
        );
    }
}
