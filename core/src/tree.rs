//! This module defines the types of an AVL+ tree as seen by a verifier.
//!
//! An AVL+ tree is a height-balanced binary search tree in which only the leaves carry keys and
//! values. Every leaf additionally records the key of the next leaf in sorted order, so the
//! leaves form a sorted chain. Absence of a key is proven by exhibiting the leaf whose key is
//! below it and whose next-leaf key is above it.
//!
//! All nodes are identified by a 256 bit label:
//!   1. Leaves are labeled by hashing their key, value, and next-leaf key.
//!   2. Internal nodes are labeled by hashing their balance and the labels of both children.
//!
//! A verifier only ever knows a small part of the tree. Subtrees off the proof path are
//! represented by [`Node::LabelOnly`] placeholders: their committed label is used as a hashing
//! input and they are never traversed.

use crate::hasher::LabelHasher;

use alloc::{boxed::Box, vec, vec::Vec};

/// The label of a node. In this schema, it is always 256 bits.
pub type Label = [u8; 32];

/// A key in the dictionary. Keys are ordered lexicographically, byte-wise.
pub type Key = Vec<u8>;

/// A value stored in the dictionary.
pub type Value = Vec<u8>;

/// The smallest key of the given length. A fresh dictionary starts with a single sentinel leaf
/// carrying this key.
pub fn negative_infinity(key_length: usize) -> Key {
    vec![0x00; key_length]
}

/// The largest key of the given length. The last leaf in the chain points at this key.
pub fn positive_infinity(key_length: usize) -> Key {
    vec![0xFF; key_length]
}

/// The balance factor of an internal node: the height of its right subtree minus the height of
/// its left subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub enum Balance {
    /// The left subtree is taller by one.
    LeftHeavy,
    /// Both subtrees have the same height.
    Even,
    /// The right subtree is taller by one.
    RightHeavy,
}

impl Balance {
    /// Decode a balance from its proof encoding: 0, 1, 2 for -1, 0, +1.
    pub fn from_proof_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Balance::LeftHeavy),
            1 => Some(Balance::Even),
            2 => Some(Balance::RightHeavy),
            _ => None,
        }
    }

    /// The proof encoding of this balance.
    pub fn proof_byte(self) -> u8 {
        match self {
            Balance::LeftHeavy => 0,
            Balance::Even => 1,
            Balance::RightHeavy => 2,
        }
    }

    /// The byte mixed into an internal node's label: the signed balance in two's complement.
    pub fn label_byte(self) -> u8 {
        self.as_i8() as u8
    }

    /// The signed balance factor.
    pub fn as_i8(self) -> i8 {
        match self {
            Balance::LeftHeavy => -1,
            Balance::Even => 0,
            Balance::RightHeavy => 1,
        }
    }

    /// Convert a signed balance factor. Anything outside of -1..=1 is not a valid AVL balance.
    pub fn from_i8(balance: i8) -> Option<Self> {
        match balance {
            -1 => Some(Balance::LeftHeavy),
            0 => Some(Balance::Even),
            1 => Some(Balance::RightHeavy),
            _ => None,
        }
    }
}

/// The data of an internal node, as required to compute its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalData {
    /// The label of the left child of this node.
    pub left: Label,
    /// The label of the right child of this node.
    pub right: Label,
    /// The balance of this node.
    pub balance: Balance,
}

/// The data of a leaf node.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub struct LeafData {
    /// The key stored in this leaf.
    pub key: Key,
    /// The value stored under the key.
    pub value: Value,
    /// The key of the next leaf in sorted order across the whole dictionary.
    pub next_leaf_key: Key,
}

/// An internal node whose children are owned by the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalNode {
    /// The left child.
    pub left: Node,
    /// The right child.
    pub right: Node,
    /// The balance of this node.
    pub balance: Balance,
}

impl InternalNode {
    /// Create an internal node from the child on `side` and the child on the opposite side.
    pub fn from_sides(side: Side, near: Node, far: Node, balance: Balance) -> Self {
        let (left, right) = match side {
            Side::Left => (near, far),
            Side::Right => (far, near),
        };
        InternalNode {
            left,
            right,
            balance,
        }
    }

    /// Split this node into the child on `side` and the child on the opposite side.
    pub fn into_sides(self, side: Side) -> (Node, Node) {
        match side {
            Side::Left => (self.left, self.right),
            Side::Right => (self.right, self.left),
        }
    }
}

impl From<InternalNode> for Node {
    fn from(node: InternalNode) -> Self {
        Node::Internal(Box::new(node))
    }
}

/// A node of the partially known tree reconstructed during verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A leaf, fully known.
    Leaf(LeafData),
    /// An internal node with both children known at least by label.
    Internal(Box<InternalNode>),
    /// A subtree known only by its committed label.
    LabelOnly(Label),
}

impl Node {
    /// Build an internal node.
    pub fn internal(left: Node, right: Node, balance: Balance) -> Self {
        Node::Internal(Box::new(InternalNode {
            left,
            right,
            balance,
        }))
    }

    /// Compute the label of this node.
    ///
    /// Label-only placeholders return their committed label. All other labels are recomputed
    /// from their contents.
    pub fn label<H: LabelHasher>(&self) -> Label {
        match self {
            Node::Leaf(leaf) => H::hash_leaf(leaf),
            Node::LabelOnly(label) => *label,
            Node::Internal(internal) => H::hash_internal(&InternalData {
                left: internal.left.label::<H>(),
                right: internal.right.label::<H>(),
                balance: internal.balance,
            }),
        }
    }
}

/// A side of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The left child.
    Left,
    /// The right child.
    Right,
}

impl Side {
    /// The change in balance caused by the subtree on this side growing by one.
    pub fn skew(self) -> i8 {
        self.leaning().as_i8()
    }

    /// The balance of a node whose subtree on this side is taller.
    pub fn leaning(self) -> Balance {
        match self {
            Side::Left => Balance::LeftHeavy,
            Side::Right => Balance::RightHeavy,
        }
    }

    /// The other side.
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}
