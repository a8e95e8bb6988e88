//! The tokens making up a modify proof.

use crate::tree::{Key, Label, Value};

use core::fmt;

/// The step taken at a node along the proof path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub enum Direction {
    /// The path ends in the leaf holding the target key.
    LeafFound,
    /// The path ends in the leaf immediately preceding the absent target key.
    LeafNotFound,
    /// The path continues into the left child.
    GoingLeft,
    /// The path continues into the right child.
    GoingRight,
}

/// A single token of a modify proof.
///
/// The balance token carries its raw proof byte; only 0, 1 and 2 are legal and anything else is
/// rejected when the proof is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub enum ProofElement {
    /// Where the path goes next.
    Direction(Direction),
    /// The key of a neighboring leaf, in an absence witness.
    Key(Key),
    /// The value stored in the terminal leaf.
    Value(Value),
    /// The next-leaf key of the terminal leaf.
    NextLeafKey(Key),
    /// The label of the left sibling subtree.
    LeftLabel(Label),
    /// The label of the right sibling subtree.
    RightLabel(Label),
    /// The balance of an internal node on the path.
    Balance(u8),
}

impl ProofElement {
    /// The kind of this element.
    pub fn kind(&self) -> ElementKind {
        match self {
            ProofElement::Direction(_) => ElementKind::Direction,
            ProofElement::Key(_) => ElementKind::Key,
            ProofElement::Value(_) => ElementKind::Value,
            ProofElement::NextLeafKey(_) => ElementKind::NextLeafKey,
            ProofElement::LeftLabel(_) => ElementKind::LeftLabel,
            ProofElement::RightLabel(_) => ElementKind::RightLabel,
            ProofElement::Balance(_) => ElementKind::Balance,
        }
    }
}

/// The kind of a [`ProofElement`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Direction,
    Key,
    Value,
    NextLeafKey,
    LeftLabel,
    RightLabel,
    Balance,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Direction => "direction",
            ElementKind::Key => "key",
            ElementKind::Value => "value",
            ElementKind::NextLeafKey => "next-leaf key",
            ElementKind::LeftLabel => "left label",
            ElementKind::RightLabel => "right label",
            ElementKind::Balance => "balance",
        };
        f.write_str(name)
    }
}
