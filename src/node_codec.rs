// Copyright 2015-2020 Parity Technologies (UK) Ltd.
// This file is part of OpenEthereum.

// OpenEthereum is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// OpenEthereum is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with OpenEthereum.  If not, see <http://www.gnu.org/licenses/>.

//! Canonical node serialization with Rlp.
//!
//! The encoding of each node is a pure function of its logical content,
//! so equal content always yields an equal hash.

use crate::error::TrieError;
use crate::hex_prefix;
use crate::node::{Node, NodeRef};
use crate::rstd::vec::Vec;
use log::trace;
use rlp::{DecoderError, Prototype, Rlp, RlpStream};

// rlp of empty string
pub const NULL_NODE: [u8; 1] = [0x80];
pub const HASHED_NULL_NODE: [u8; 32] = [
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
];

/// Encode a node to its canonical RLP bytes.
pub fn encode_node(node: &Node) -> Vec<u8> {
    match node {
        Node::Empty => NULL_NODE.to_vec(),
        Node::Leaf(path, value) => {
            trace!("encoding leaf node, partial: {:?}", path);
            let mut stream = RlpStream::new_list(2);
            stream.append(&hex_prefix::encode(path, true));
            stream.append(&value.as_slice());
            stream.out().to_vec()
        }
        Node::Extension(path, child) => {
            trace!("encoding extension node, partial: {:?}", path);
            let mut stream = RlpStream::new_list(2);
            stream.append(&hex_prefix::encode(path, false));
            append_child(&mut stream, child);
            stream.out().to_vec()
        }
        Node::Branch(children, value) => {
            trace!("encoding branch node");
            let mut stream = RlpStream::new_list(17);
            for slot in children.iter() {
                match slot {
                    Some(child) => append_child(&mut stream, child),
                    None => {
                        stream.append_empty_data();
                    }
                }
            }
            match value {
                Some(value) => stream.append(&value.as_slice()),
                None => stream.append_empty_data(),
            };
            stream.out().to_vec()
        }
    }
}

fn append_child(stream: &mut RlpStream, child: &NodeRef) {
    match child {
        NodeRef::Hash(hash) => stream.append(&hash.as_slice()),
        // sub-32-byte encodings are spliced in verbatim, not as a string
        NodeRef::Inline(rlp) => stream.append_raw(rlp, 1),
    };
}

/// Decode canonical RLP bytes back into a node.
///
/// A 2-item list is a leaf or an extension, told apart by the terminator
/// bit of the hex-prefix payload; a 17-item list is a branch; the empty
/// byte string is the empty node. Anything else is corrupt.
pub fn decode_node(data: &[u8]) -> Result<Node, TrieError> {
    let r = Rlp::new(data);
    match r.prototype()? {
        Prototype::Data(0) => Ok(Node::Empty),
        Prototype::List(2) => {
            let (path, terminator) = hex_prefix::decode(r.at(0)?.data()?)?;
            if terminator {
                Ok(Node::Leaf(path, r.at(1)?.data()?.to_vec()))
            } else {
                let child = decode_child(r.at(1)?)?
                    .ok_or(DecoderError::Custom("extension node without a child"))?;
                Ok(Node::Extension(path, child))
            }
        }
        Prototype::List(17) => {
            let mut children: [Option<NodeRef>; 16] = Default::default();
            for (index, slot) in children.iter_mut().enumerate() {
                *slot = decode_child(r.at(index)?)?;
            }
            let value_item = r.at(16)?;
            let value = if value_item.is_empty() {
                None
            } else {
                Some(value_item.data()?.to_vec())
            };
            Ok(Node::Branch(children, value))
        }
        _ => Err(DecoderError::Custom("rlp is not a valid trie node").into()),
    }
}

fn decode_child(item: Rlp<'_>) -> Result<Option<NodeRef>, TrieError> {
    if item.is_data() {
        let data = item.data()?;
        if data.is_empty() {
            return Ok(None);
        }
        if data.len() != 32 {
            return Err(DecoderError::Custom("child hash is not 32 bytes").into());
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(data);
        Ok(Some(NodeRef::Hash(hash)))
    } else {
        // an inlined child: its complete encoding sits in the parent list
        Ok(Some(NodeRef::Inline(item.as_raw().to_vec())))
    }
}
