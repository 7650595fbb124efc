//! Structural deletion.
//!
//! `remove_key` erases a nibble path from a subtree and repairs normal
//! form on the way back up: branches left with a single edge collapse into
//! their remaining child, and extensions fuse with whatever that collapse
//! produced. Omitting any of the collapse sub-cases would silently break
//! root-hash determinism, so all three (leaf, extension, branch child) are
//! handled explicitly.

use crate::error::TrieError;
use crate::node::{Node, NodeRef};
use crate::rstd::vec::Vec;
use crate::store::NodeStore;
use rlp::DecoderError;

/// Remove `key` (a nibble path) from `node`, returning the replacement
/// subtree in normal form, or `Node::Empty` when nothing remains.
pub fn remove_key(store: &mut NodeStore<'_>, node: Node, key: &[u8]) -> Result<Node, TrieError> {
    match node {
        Node::Empty => Ok(Node::Empty),
        Node::Leaf(path, value) => Ok(if path.as_slice() == key {
            Node::Empty
        } else {
            Node::Leaf(path, value)
        }),
        Node::Extension(path, child_ref) => {
            let Some(suffix) = key.strip_prefix(path.as_slice()) else {
                // the key diverges inside the extension path, so it was
                // never present
                return Ok(Node::Extension(path, child_ref));
            };
            let child = store.load(&child_ref)?;
            let new_child = remove_key(store, child, suffix)?;
            fuse_extension(store, path, new_child)
        }
        Node::Branch(mut children, mut value) => {
            if key.is_empty() {
                value = None;
            } else {
                let slot = key[0] as usize;
                match children[slot].take() {
                    None => return Ok(Node::Branch(children, value)),
                    Some(child_ref) => {
                        let child = store.load(&child_ref)?;
                        let new_child = remove_key(store, child, &key[1..])?;
                        children[slot] = match new_child {
                            Node::Empty => None,
                            changed => Some(store.store_node(&changed)?),
                        };
                    }
                }
            }
            collapse_branch(store, children, value)
        }
    }
}

/// Rejoin an extension path with the node its child became after deletion.
fn fuse_extension(
    store: &mut NodeStore<'_>,
    path: Vec<u8>,
    child: Node,
) -> Result<Node, TrieError> {
    Ok(match child {
        // a well-formed extension child is a branch with at least two
        // populated edges, so deletion cannot empty it outright
        Node::Empty => Node::Empty,
        Node::Leaf(tail, value) => Node::Leaf(concat_paths(path, &tail), value),
        Node::Extension(tail, grandchild) => {
            Node::Extension(concat_paths(path, &tail), grandchild)
        }
        branch @ Node::Branch(..) => {
            let child_ref = store.store_node(&branch)?;
            Node::Extension(path, child_ref)
        }
    })
}

/// Restore branch density after one of its slots changed. A branch keeps
/// its shape with two or more edges, or one edge plus a value; anything
/// sparser is rewritten into a smaller node.
fn collapse_branch(
    store: &mut NodeStore<'_>,
    mut children: [Option<NodeRef>; 16],
    value: Option<Vec<u8>>,
) -> Result<Node, TrieError> {
    let occupied = children.iter().filter(|slot| slot.is_some()).count();
    if occupied >= 2 || (occupied == 1 && value.is_some()) {
        return Ok(Node::Branch(children, value));
    }
    if occupied == 0 {
        return Ok(match value {
            Some(value) => Node::Leaf(Vec::new(), value),
            None => Node::Empty,
        });
    }
    for (index, slot) in children.iter_mut().enumerate() {
        if let Some(child_ref) = slot.take() {
            return absorb_orphan(store, index as u8, child_ref);
        }
    }
    unreachable!("branch has exactly one occupied slot")
}

/// Pull a branch's sole remaining child up one level, prefixing it with
/// the edge nibble it hung from.
fn absorb_orphan(
    store: &mut NodeStore<'_>,
    nibble: u8,
    child_ref: NodeRef,
) -> Result<Node, TrieError> {
    let child = store.load(&child_ref)?;
    Ok(match child {
        Node::Empty => {
            return Err(DecoderError::Custom("branch child is an empty node").into());
        }
        Node::Leaf(tail, value) => Node::Leaf(prepend_nibble(nibble, &tail), value),
        Node::Extension(tail, grandchild) => {
            Node::Extension(prepend_nibble(nibble, &tail), grandchild)
        }
        // the child keeps its identity; reference it from a one-nibble
        // extension instead of re-storing
        Node::Branch(..) => Node::Extension(prepend_nibble(nibble, &[]), child_ref),
    })
}

fn concat_paths(mut head: Vec<u8>, tail: &[u8]) -> Vec<u8> {
    head.extend_from_slice(tail);
    head
}

fn prepend_nibble(nibble: u8, tail: &[u8]) -> Vec<u8> {
    let mut path = Vec::with_capacity(1 + tail.len());
    path.push(nibble);
    path.extend_from_slice(tail);
    path
}
