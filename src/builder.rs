//! Structural insertion.
//!
//! `put_key` rewrites a subtree so that it maps a nibble path to a value,
//! reading existing children through the store and writing every new child
//! back before the parent that references it. The result is always in
//! normal form: no chained extensions, no underpopulated branches.

use crate::error::TrieError;
use crate::nibbles::common_prefix_len;
use crate::node::{Node, NodeRef};
use crate::rstd::vec::Vec;
use crate::store::NodeStore;

/// Insert or update `key` in `node`, returning the replacement root of the
/// subtree. `key` is a nibble path; `value` must be non-empty (the public
/// API maps empty values to deletion before reaching this point).
pub fn put_key(
    store: &mut NodeStore<'_>,
    node: Node,
    key: &[u8],
    value: Vec<u8>,
) -> Result<Node, TrieError> {
    match node {
        Node::Empty => Ok(Node::Leaf(key.to_vec(), value)),
        Node::Leaf(path, old_value) => {
            if path.as_slice() == key {
                return Ok(Node::Leaf(path, value));
            }
            split_leaf(store, path, old_value, key, value)
        }
        Node::Extension(path, child_ref) => {
            let common = common_prefix_len(&path, key);
            if common == path.len() {
                // the key runs through the whole extension; recurse into
                // the child branch with the remainder
                let child = store.load(&child_ref)?;
                let new_child = put_key(store, child, &key[common..], value)?;
                let new_ref = store.store_node(&new_child)?;
                Ok(Node::Extension(path, new_ref))
            } else {
                split_extension(store, path, child_ref, common, key, value)
            }
        }
        Node::Branch(mut children, branch_value) => {
            if key.is_empty() {
                return Ok(Node::Branch(children, Some(value)));
            }
            let slot = key[0] as usize;
            let new_child = match children[slot].take() {
                None => Node::Leaf(key[1..].to_vec(), value),
                Some(child_ref) => {
                    let child = store.load(&child_ref)?;
                    put_key(store, child, &key[1..], value)?
                }
            };
            children[slot] = Some(store.store_node(&new_child)?);
            Ok(Node::Branch(children, branch_value))
        }
    }
}

/// Replace a leaf whose path diverges from `key` with a branch holding
/// both entries, prefixed by an extension over any shared head.
fn split_leaf(
    store: &mut NodeStore<'_>,
    path: Vec<u8>,
    old_value: Vec<u8>,
    key: &[u8],
    value: Vec<u8>,
) -> Result<Node, TrieError> {
    let common = common_prefix_len(&path, key);
    let mut children: [Option<NodeRef>; 16] = Default::default();
    let mut branch_value = None;

    if common == path.len() {
        branch_value = Some(old_value);
    } else {
        let leaf = Node::Leaf(path[common + 1..].to_vec(), old_value);
        children[path[common] as usize] = Some(store.store_node(&leaf)?);
    }
    if common == key.len() {
        branch_value = Some(value);
    } else {
        let leaf = Node::Leaf(key[common + 1..].to_vec(), value);
        children[key[common] as usize] = Some(store.store_node(&leaf)?);
    }

    wrap_in_extension(store, &key[..common], Node::Branch(children, branch_value))
}

/// Split an extension at nibble `common` of its path, pushing the old
/// child down one side of a fresh branch and the new entry down the other.
fn split_extension(
    store: &mut NodeStore<'_>,
    path: Vec<u8>,
    child_ref: NodeRef,
    common: usize,
    key: &[u8],
    value: Vec<u8>,
) -> Result<Node, TrieError> {
    let mut children: [Option<NodeRef>; 16] = Default::default();
    let mut branch_value = None;

    // a one-nibble remainder dissolves into the branch edge itself
    children[path[common] as usize] = if path.len() == common + 1 {
        Some(child_ref)
    } else {
        let tail = Node::Extension(path[common + 1..].to_vec(), child_ref);
        Some(store.store_node(&tail)?)
    };
    if common == key.len() {
        branch_value = Some(value);
    } else {
        let leaf = Node::Leaf(key[common + 1..].to_vec(), value);
        children[key[common] as usize] = Some(store.store_node(&leaf)?);
    }

    wrap_in_extension(store, &key[..common], Node::Branch(children, branch_value))
}

fn wrap_in_extension(
    store: &mut NodeStore<'_>,
    shared: &[u8],
    branch: Node,
) -> Result<Node, TrieError> {
    if shared.is_empty() {
        return Ok(branch);
    }
    let branch_ref = store.store_node(&branch)?;
    Ok(Node::Extension(shared.to_vec(), branch_ref))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::empty_db;

    fn insert_all(store: &mut NodeStore<'_>, entries: &[(&[u8], &[u8])]) -> Node {
        let mut node = Node::Empty;
        for (key, value) in entries {
            node = put_key(store, node, key, value.to_vec()).unwrap();
        }
        node
    }

    #[test]
    fn it_should_turn_the_empty_node_into_a_leaf() {
        let mut db = empty_db();
        let mut store = NodeStore::new(&mut db);
        let node = put_key(&mut store, Node::Empty, &[1, 2, 3], b"value".to_vec()).unwrap();
        assert_eq!(node, Node::Leaf(vec![1, 2, 3], b"value".to_vec()));
    }

    #[test]
    fn it_should_overwrite_a_leaf_value_in_place() {
        let mut db = empty_db();
        let mut store = NodeStore::new(&mut db);
        let node = insert_all(&mut store, &[(&[1, 2, 3], b"old"), (&[1, 2, 3], b"new")]);
        assert_eq!(node, Node::Leaf(vec![1, 2, 3], b"new".to_vec()));
    }

    #[test]
    fn it_should_split_a_leaf_on_a_shorter_key() {
        let mut db = empty_db();
        let mut store = NodeStore::new(&mut db);
        let node = insert_all(&mut store, &[(&[1, 2, 3], b"value"), (&[1, 2], b"value2")]);

        let Node::Extension(path, branch_ref) = node else {
            panic!("expected an extension");
        };
        assert_eq!(path, vec![1, 2]);
        let Node::Branch(children, value) = store.load(&branch_ref).unwrap() else {
            panic!("extension child is not a branch");
        };
        assert_eq!(value, Some(b"value2".to_vec()));
        let slot = children[3].as_ref().expect("slot 3 is populated");
        assert_eq!(
            store.load(slot).unwrap(),
            Node::Leaf(vec![], b"value".to_vec())
        );
        assert!(children
            .iter()
            .enumerate()
            .all(|(index, slot)| index == 3 || slot.is_none()));
    }

    #[test]
    fn it_should_branch_at_the_root_when_nothing_is_shared() {
        let mut db = empty_db();
        let mut store = NodeStore::new(&mut db);
        let node = insert_all(&mut store, &[(&[1, 2], b"a"), (&[5, 6], b"b")]);

        let Node::Branch(children, value) = node else {
            panic!("expected a branch");
        };
        assert_eq!(value, None);
        assert_eq!(
            store.load(children[1].as_ref().unwrap()).unwrap(),
            Node::Leaf(vec![2], b"a".to_vec())
        );
        assert_eq!(
            store.load(children[5].as_ref().unwrap()).unwrap(),
            Node::Leaf(vec![6], b"b".to_vec())
        );
    }

    #[test]
    fn it_should_recurse_through_an_extension_on_a_shared_path() {
        let mut db = empty_db();
        let mut store = NodeStore::new(&mut db);
        let node = insert_all(
            &mut store,
            &[
                (&[1, 2, 3], b"value"),
                (&[1, 2], b"value2"),
                (&[1, 2, 7], b"value3"),
            ],
        );

        let Node::Extension(path, branch_ref) = node else {
            panic!("expected an extension");
        };
        assert_eq!(path, vec![1, 2]);
        let Node::Branch(children, value) = store.load(&branch_ref).unwrap() else {
            panic!("extension child is not a branch");
        };
        assert_eq!(value, Some(b"value2".to_vec()));
        assert_eq!(
            store.load(children[3].as_ref().unwrap()).unwrap(),
            Node::Leaf(vec![], b"value".to_vec())
        );
        assert_eq!(
            store.load(children[7].as_ref().unwrap()).unwrap(),
            Node::Leaf(vec![], b"value3".to_vec())
        );
    }

    #[test]
    fn it_should_split_an_extension_on_a_diverging_key() {
        let mut db = empty_db();
        let mut store = NodeStore::new(&mut db);
        // builds Extension([1], Branch) then diverges at the first nibble
        let node = insert_all(
            &mut store,
            &[(&[1, 2], b"a"), (&[1, 3], b"b"), (&[5], b"c")],
        );

        let Node::Branch(children, value) = node else {
            panic!("expected a top-level branch");
        };
        assert_eq!(value, None);
        // the old extension had a single-nibble path, so its child branch
        // hangs off edge 1 directly
        let inner = store.load(children[1].as_ref().unwrap()).unwrap();
        let Node::Branch(inner_children, None) = inner else {
            panic!("expected the old child branch under edge 1");
        };
        assert!(inner_children[2].is_some() && inner_children[3].is_some());
        assert_eq!(
            store.load(children[5].as_ref().unwrap()).unwrap(),
            Node::Leaf(vec![], b"c".to_vec())
        );
    }

    #[test]
    fn it_should_set_the_branch_value_when_the_key_ends_at_a_split() {
        let mut db = empty_db();
        let mut store = NodeStore::new(&mut db);
        let node = insert_all(&mut store, &[(&[1, 2, 3], b"deep"), (&[1], b"shallow")]);

        let Node::Extension(path, branch_ref) = node else {
            panic!("expected an extension");
        };
        assert_eq!(path, vec![1]);
        let Node::Branch(children, value) = store.load(&branch_ref).unwrap() else {
            panic!("extension child is not a branch");
        };
        assert_eq!(value, Some(b"shallow".to_vec()));
        assert_eq!(
            store.load(children[2].as_ref().unwrap()).unwrap(),
            Node::Leaf(vec![3], b"deep".to_vec())
        );
    }
}
