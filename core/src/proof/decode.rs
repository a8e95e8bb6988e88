//! Decoding of the proof element stream.
//!
//! A modify proof follows a fixed grammar:
//!
//! ```text
//! Node := Direction
//!   | LeafFound     NextLeafKey Value
//!   | LeafNotFound  NeighborKey NextLeafKey Value
//!   | GoingLeft     RightLabel Balance Node
//!   | GoingRight    LeftLabel  Balance Node
//! ```
//!
//! [`ProofStream::next_step`] decodes one production at a time, leaving recursion into the child
//! `Node` to the caller.

use super::element::{Direction, ElementKind, ProofElement};
use crate::tree::{Balance, Key, Label, Value};

use core::fmt;

/// The default bound on the length of a proof path.
///
/// An AVL tree of height 128 holds more than 2^88 leaves.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Limits applied while decoding a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofLimits {
    /// If set, every key in the proof, as well as the target key, must have exactly this length.
    pub key_length: Option<usize>,
    /// If set, every value in the proof must have exactly this length.
    pub value_length: Option<usize>,
    /// The maximum number of internal nodes on the proof path.
    pub max_depth: usize,
}

impl Default for ProofLimits {
    fn default() -> Self {
        ProofLimits {
            key_length: None,
            value_length: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ProofLimits {
    pub(crate) fn check_key(&self, key: &[u8]) -> Result<(), DecodeError> {
        match self.key_length {
            Some(expected) if expected != key.len() => Err(DecodeError::KeyLength {
                expected,
                found: key.len(),
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_value(&self, value: &[u8]) -> Result<(), DecodeError> {
        match self.value_length {
            Some(expected) if expected != value.len() => Err(DecodeError::ValueLength {
                expected,
                found: value.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// Errors encountered while decoding a proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The proof ended where the grammar requires another element.
    UnexpectedEnd {
        /// The kind of element the grammar required.
        expected: ElementKind,
    },
    /// The next element was not of the kind the grammar requires.
    UnexpectedElement {
        /// The kind of element the grammar required.
        expected: ElementKind,
        /// The kind of element found in the proof.
        found: ElementKind,
    },
    /// A balance byte other than 0, 1 or 2.
    InvalidBalance(u8),
    /// Elements remained after the terminal leaf was decoded.
    TrailingElements(usize),
    /// A key did not have the configured length.
    KeyLength { expected: usize, found: usize },
    /// A value did not have the configured length.
    ValueLength { expected: usize, found: usize },
    /// The proof path is longer than the configured maximum depth.
    TooDeep(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEnd { expected } => {
                write!(f, "proof ended, expected {}", expected)
            }
            DecodeError::UnexpectedElement { expected, found } => {
                write!(f, "expected {} element, found {}", expected, found)
            }
            DecodeError::InvalidBalance(byte) => write!(f, "invalid balance byte {}", byte),
            DecodeError::TrailingElements(n) => {
                write!(f, "{} elements left after terminal leaf", n)
            }
            DecodeError::KeyLength { expected, found } => {
                write!(f, "key length {}, expected {}", found, expected)
            }
            DecodeError::ValueLength { expected, found } => {
                write!(f, "value length {}, expected {}", found, expected)
            }
            DecodeError::TooDeep(max) => write!(f, "proof path deeper than {}", max),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// One decoded production of the proof grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The target key is stored in this leaf.
    LeafFound { next_leaf_key: Key, value: Value },
    /// The target key is absent; this is the leaf preceding it.
    LeafNotFound {
        neighbor_key: Key,
        next_leaf_key: Key,
        value: Value,
    },
    /// An internal node whose left child is on the path.
    GoingLeft { right_label: Label, balance: Balance },
    /// An internal node whose right child is on the path.
    GoingRight { left_label: Label, balance: Balance },
}

/// A cursor over the elements of a proof.
pub struct ProofStream<'a> {
    elements: &'a [ProofElement],
    limits: ProofLimits,
}

impl<'a> ProofStream<'a> {
    /// Create a new stream over the given elements.
    pub fn new(elements: &'a [ProofElement], limits: ProofLimits) -> Self {
        ProofStream { elements, limits }
    }

    /// The limits this stream enforces.
    pub fn limits(&self) -> &ProofLimits {
        &self.limits
    }

    /// Decode the next production.
    pub fn next_step(&mut self) -> Result<Step, DecodeError> {
        Ok(match self.direction()? {
            Direction::LeafFound => {
                let next_leaf_key = self.next_leaf_key()?;
                let value = self.value()?;
                Step::LeafFound {
                    next_leaf_key,
                    value,
                }
            }
            Direction::LeafNotFound => {
                let neighbor_key = self.key()?;
                let next_leaf_key = self.next_leaf_key()?;
                let value = self.value()?;
                Step::LeafNotFound {
                    neighbor_key,
                    next_leaf_key,
                    value,
                }
            }
            Direction::GoingLeft => {
                let right_label = self.right_label()?;
                let balance = self.balance()?;
                Step::GoingLeft {
                    right_label,
                    balance,
                }
            }
            Direction::GoingRight => {
                let left_label = self.left_label()?;
                let balance = self.balance()?;
                Step::GoingRight {
                    left_label,
                    balance,
                }
            }
        })
    }

    /// Ensure that every element has been consumed.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.elements.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingElements(self.elements.len()))
        }
    }

    fn pop(&mut self, expected: ElementKind) -> Result<&'a ProofElement, DecodeError> {
        let (first, rest) = self
            .elements
            .split_first()
            .ok_or(DecodeError::UnexpectedEnd { expected })?;
        self.elements = rest;
        Ok(first)
    }

    fn direction(&mut self) -> Result<Direction, DecodeError> {
        match self.pop(ElementKind::Direction)? {
            ProofElement::Direction(d) => Ok(*d),
            other => Err(mismatch(ElementKind::Direction, other)),
        }
    }

    fn key(&mut self) -> Result<Key, DecodeError> {
        match self.pop(ElementKind::Key)? {
            ProofElement::Key(key) => {
                self.limits.check_key(key)?;
                Ok(key.clone())
            }
            other => Err(mismatch(ElementKind::Key, other)),
        }
    }

    fn next_leaf_key(&mut self) -> Result<Key, DecodeError> {
        match self.pop(ElementKind::NextLeafKey)? {
            ProofElement::NextLeafKey(key) => {
                self.limits.check_key(key)?;
                Ok(key.clone())
            }
            other => Err(mismatch(ElementKind::NextLeafKey, other)),
        }
    }

    fn value(&mut self) -> Result<Value, DecodeError> {
        match self.pop(ElementKind::Value)? {
            ProofElement::Value(value) => {
                self.limits.check_value(value)?;
                Ok(value.clone())
            }
            other => Err(mismatch(ElementKind::Value, other)),
        }
    }

    fn left_label(&mut self) -> Result<Label, DecodeError> {
        match self.pop(ElementKind::LeftLabel)? {
            ProofElement::LeftLabel(label) => Ok(*label),
            other => Err(mismatch(ElementKind::LeftLabel, other)),
        }
    }

    fn right_label(&mut self) -> Result<Label, DecodeError> {
        match self.pop(ElementKind::RightLabel)? {
            ProofElement::RightLabel(label) => Ok(*label),
            other => Err(mismatch(ElementKind::RightLabel, other)),
        }
    }

    fn balance(&mut self) -> Result<Balance, DecodeError> {
        match self.pop(ElementKind::Balance)? {
            ProofElement::Balance(byte) => {
                Balance::from_proof_byte(*byte).ok_or(DecodeError::InvalidBalance(*byte))
            }
            other => Err(mismatch(ElementKind::Balance, other)),
        }
    }
}

fn mismatch(expected: ElementKind, found: &ProofElement) -> DecodeError {
    DecodeError::UnexpectedElement {
        expected,
        found: found.kind(),
    }
}
