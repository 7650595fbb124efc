#![cfg_attr(not(feature = "std"), no_std)]

//! An authenticated, persistent, hexary Merkle Patricia Trie.
//!
//! Keys map to opaque byte values through a radix-16 node graph whose
//! structural hashes commit to the entire contents: equal content yields
//! an equal root hash independent of insertion order, and every subtree is
//! retrievable from the backend by the Keccak-256 of its RLP encoding.
//!
//! Mutation never touches stored nodes. An update builds a new node graph
//! that shares unchanged children with the old one, so readers holding an
//! earlier root hash keep a consistent view.

pub mod builder;
pub mod db;
pub mod destroyer;
pub mod error;
pub mod hex_prefix;
pub mod nibbles;
pub mod node;
pub mod node_codec;
pub mod store;

#[cfg(feature = "std")]
mod rstd {
    pub use std::{string, vec};
}

#[cfg(not(feature = "std"))]
mod rstd {
    extern crate alloc;
    pub use alloc::{string, vec};
}

pub use db::{empty_db, TrieDB, TrieMemoryDB};
pub use error::TrieError;
pub use node::{Node, NodeRef};
pub use node_codec::{HASHED_NULL_NODE, NULL_NODE};
pub use store::{keccak256, KeccakHasher, NodeStore};

use crate::rstd::vec::Vec;
use primitive_types::H256;

/// Node payloads as stored in the backend.
pub type DBValue = Vec<u8>;

/// A Merkle Patricia Trie over a node backend.
///
/// All updates go through a single logical writer (`&mut self`); the trie
/// chains roots, so callers serialize concurrent updates by adopting each
/// returned root before issuing the next operation.
pub struct Trie<DB> {
    db: DB,
    root: Node,
}

impl<DB> core::fmt::Debug for Trie<DB> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Trie").field("root", &self.root).finish()
    }
}

impl<DB: TrieDB> Trie<DB> {
    /// Empty trie over a backend.
    pub fn new(db: DB) -> Self {
        Self {
            db,
            root: Node::Empty,
        }
    }

    /// Reattach to a previously committed root hash.
    pub fn open(db: DB, root: H256) -> Result<Self, TrieError> {
        if root.0 == HASHED_NULL_NODE {
            return Ok(Self::new(db));
        }
        let bytes = db.get(&root.0)?.ok_or(TrieError::MissingNode(root.0))?;
        let root = node_codec::decode_node(&bytes)?;
        Ok(Self { db, root })
    }

    /// The trie's identity: Keccak-256 of the root node's encoding, or the
    /// well-known empty-trie root when nothing is stored.
    pub fn root(&self) -> H256 {
        H256(keccak256(&node_codec::encode_node(&self.root)))
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Look up the value stored under a byte key.
    pub fn get(&self, key: &[u8]) -> Result<Option<DBValue>, TrieError> {
        let path = nibbles::to_nibbles(checked_key(key)?);
        lookup(&self.db, &self.root, &path)
    }

    /// Map a byte key to a value. An empty value is treated as deletion,
    /// since a well-formed trie never stores one.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
        if value.is_empty() {
            return self.delete(key);
        }
        let path = nibbles::to_nibbles(checked_key(key)?);
        let mut store = NodeStore::new(&mut self.db);
        let new_root = builder::put_key(&mut store, self.root.clone(), &path, value.to_vec())?;
        self.commit_root(new_root)
    }

    /// Remove a byte key. Removing an absent key leaves the root unchanged.
    pub fn delete(&mut self, key: &[u8]) -> Result<(), TrieError> {
        let path = nibbles::to_nibbles(checked_key(key)?);
        let mut store = NodeStore::new(&mut self.db);
        let new_root = destroyer::remove_key(&mut store, self.root.clone(), &path)?;
        self.commit_root(new_root)
    }

    /// Hand the backend back, e.g. to reopen the trie at a committed root.
    pub fn into_db(self) -> DB {
        self.db
    }

    /// Adopt a new root node, persisting its encoding under its hash. The
    /// root is always addressed by hash regardless of encoded size, so
    /// `open` can find it again.
    fn commit_root(&mut self, root: Node) -> Result<(), TrieError> {
        if !root.is_empty() {
            let encoded = node_codec::encode_node(&root);
            let hash = keccak256(&encoded);
            self.db.put(hash, encoded)?;
        }
        self.root = root;
        Ok(())
    }
}

fn checked_key(key: &[u8]) -> Result<&[u8], TrieError> {
    if key.is_empty() {
        return Err(TrieError::InvalidInput("empty key"));
    }
    Ok(key)
}

fn lookup(db: &dyn TrieDB, node: &Node, key: &[u8]) -> Result<Option<DBValue>, TrieError> {
    match node {
        Node::Empty => Ok(None),
        Node::Leaf(path, value) => Ok(if path.as_slice() == key {
            Some(value.clone())
        } else {
            None
        }),
        Node::Extension(path, child_ref) => match key.strip_prefix(path.as_slice()) {
            Some(suffix) => {
                let child = store::load_node(db, child_ref)?;
                lookup(db, &child, suffix)
            }
            None => Ok(None),
        },
        Node::Branch(children, value) => {
            if key.is_empty() {
                return Ok(value.clone());
            }
            match &children[key[0] as usize] {
                Some(child_ref) => {
                    let child = store::load_node(db, child_ref)?;
                    lookup(db, &child, &key[1..])
                }
                None => Ok(None),
            }
        }
    }
}
