//! Verification of single-key modify proofs.
//!
//! The verifier walks the proof from the root down to a single leaf, applies the update there,
//! and then works its way back up. Every frame recomputes two labels: the label of its subtree
//! before the edit, which must add up to the claimed root, and the shape of its subtree after the
//! edit, which yields the new root. Insertions may grow the height of a subtree; the frames above
//! it then adjust balances and rotate exactly as the prover does when inserting into the full
//! tree.

use super::decode::{DecodeError, ProofLimits, ProofStream, Step};
use super::element::ProofElement;
use crate::hasher::LabelHasher;
use crate::modification::Modification;
use crate::tree::{
    Balance, InternalData, InternalNode, Key, Label, LeafData, Node, Side, Value,
};

use alloc::vec::Vec;
use core::fmt;

/// Errors in modify-proof verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The proof did not follow the grammar.
    Decode(DecodeError),
    /// The absence witness does not straddle the target key.
    KeyOrdering,
    /// The proof decoded but the tree it describes cannot be rebalanced.
    StructuralContradiction(&'static str),
    /// The update function refused the modification.
    UpdateRejected,
    /// The recomputed root before the edit differs from the claimed digest.
    DigestMismatch,
}

impl From<DecodeError> for VerifyError {
    fn from(e: DecodeError) -> Self {
        VerifyError::Decode(e)
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Decode(e) => write!(f, "malformed proof: {}", e),
            VerifyError::KeyOrdering => f.write_str("absence witness does not bracket the key"),
            VerifyError::StructuralContradiction(what) => {
                write!(f, "structural contradiction: {}", what)
            }
            VerifyError::UpdateRejected => f.write_str("update rejected"),
            VerifyError::DigestMismatch => f.write_str("root digest mismatch"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VerifyError {}

/// A proof of a modification to a single key of an AVL+ tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub struct ModifyProof {
    /// The key being modified.
    pub key: Key,
    /// The proof path from the root to the leaf holding the key or preceding it.
    pub elements: Vec<ProofElement>,
}

/// The outcome of a successfully verified modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedModification {
    /// The root before the modification. Equal to the claimed digest.
    pub old_root: Label,
    /// The root after the modification.
    pub new_root: Label,
    /// Whether the modification touched the tree at all.
    pub changed: bool,
    /// The value stored under the key before the modification, or `None` if the proof shows the
    /// key to be absent.
    pub old_value: Option<Value>,
    /// The number of internal nodes along the proof path.
    pub depth: usize,
}

impl ModifyProof {
    /// Verify this proof against the claimed root and return the root after the update.
    ///
    /// `update` receives the current value, or `None` if the key is absent, and returns the value
    /// to store; returning `None` refuses the modification. If the key is absent and
    /// `insert_if_absent` is false, nothing is modified and the returned root is the claimed one.
    ///
    /// Any failure, whether a malformed proof or a stale digest, yields `None`.
    pub fn verify<H: LabelHasher>(
        &self,
        claimed_root: &Label,
        update: impl FnOnce(Option<&[u8]>) -> Option<Value>,
        insert_if_absent: bool,
    ) -> Option<Label> {
        self.verify_with::<H>(
            claimed_root,
            update,
            insert_if_absent,
            &ProofLimits::default(),
        )
        .ok()
        .map(|verified| verified.new_root)
    }

    /// Verify this proof, applying a predefined [`Modification`].
    pub fn verify_modification<H: LabelHasher>(
        &self,
        claimed_root: &Label,
        modification: &Modification,
        limits: &ProofLimits,
    ) -> Result<VerifiedModification, VerifyError> {
        self.verify_with::<H>(
            claimed_root,
            |old| modification.apply(old),
            modification.insert_if_absent(),
            limits,
        )
    }

    /// Verify this proof against the claimed root, reporting why verification failed.
    pub fn verify_with<H: LabelHasher>(
        &self,
        claimed_root: &Label,
        update: impl FnOnce(Option<&[u8]>) -> Option<Value>,
        insert_if_absent: bool,
        limits: &ProofLimits,
    ) -> Result<VerifiedModification, VerifyError> {
        limits.check_key(&self.key)?;

        let mut walk = Walk {
            stream: ProofStream::new(&self.elements, *limits),
            key: &self.key,
            update: Some(update),
            insert_if_absent,
            old_value: None,
            depth: 0,
        };

        let outcome = walk.descend::<H>(0)?;
        let Walk {
            stream,
            old_value,
            depth,
            ..
        } = walk;
        stream.finish()?;

        if &outcome.old_label != claimed_root {
            return Err(VerifyError::DigestMismatch);
        }

        let new_root = if outcome.changed {
            outcome.node.label::<H>()
        } else {
            outcome.old_label
        };

        Ok(VerifiedModification {
            old_root: outcome.old_label,
            new_root,
            changed: outcome.changed,
            old_value,
            depth,
        })
    }
}

/// The result of verifying one subtree.
struct Outcome {
    /// The subtree after the edit.
    node: Node,
    /// Whether the subtree differs from before the edit.
    changed: bool,
    /// Whether the height of the subtree increased.
    height_grew: bool,
    /// The label of the subtree before the edit.
    old_label: Label,
}

struct Walk<'a, F> {
    stream: ProofStream<'a>,
    key: &'a [u8],
    update: Option<F>,
    insert_if_absent: bool,
    old_value: Option<Value>,
    depth: usize,
}

impl<'a, F> Walk<'a, F>
where
    F: FnOnce(Option<&[u8]>) -> Option<Value>,
{
    fn descend<H: LabelHasher>(&mut self, depth: usize) -> Result<Outcome, VerifyError> {
        match self.stream.next_step()? {
            Step::LeafFound {
                next_leaf_key,
                value,
            } => {
                self.depth = depth;
                let mut leaf = LeafData {
                    key: self.key.to_vec(),
                    value,
                    next_leaf_key,
                };
                let old_label = H::hash_leaf(&leaf);
                let new_value = self.apply(Some(leaf.value.as_slice()))?;
                self.old_value = Some(core::mem::replace(&mut leaf.value, new_value));
                Ok(Outcome {
                    node: Node::Leaf(leaf),
                    changed: true,
                    height_grew: false,
                    old_label,
                })
            }
            Step::LeafNotFound {
                neighbor_key,
                next_leaf_key,
                value,
            } => {
                self.depth = depth;
                if !(neighbor_key.as_slice() < self.key && self.key < next_leaf_key.as_slice()) {
                    return Err(VerifyError::KeyOrdering);
                }

                let mut neighbor = LeafData {
                    key: neighbor_key,
                    value,
                    next_leaf_key,
                };
                let old_label = H::hash_leaf(&neighbor);

                if !self.insert_if_absent {
                    return Ok(Outcome {
                        node: Node::Leaf(neighbor),
                        changed: false,
                        height_grew: false,
                        old_label,
                    });
                }

                let inserted = LeafData {
                    key: self.key.to_vec(),
                    value: self.apply(None)?,
                    next_leaf_key: core::mem::replace(
                        &mut neighbor.next_leaf_key,
                        self.key.to_vec(),
                    ),
                };

                Ok(Outcome {
                    node: Node::internal(
                        Node::Leaf(neighbor),
                        Node::Leaf(inserted),
                        Balance::Even,
                    ),
                    changed: true,
                    height_grew: true,
                    old_label,
                })
            }
            Step::GoingLeft {
                right_label,
                balance,
            } => self.descend_internal::<H>(depth, Side::Left, right_label, balance),
            Step::GoingRight {
                left_label,
                balance,
            } => self.descend_internal::<H>(depth, Side::Right, left_label, balance),
        }
    }

    fn descend_internal<H: LabelHasher>(
        &mut self,
        depth: usize,
        side: Side,
        sibling_label: Label,
        balance: Balance,
    ) -> Result<Outcome, VerifyError> {
        if depth >= self.stream.limits().max_depth {
            return Err(DecodeError::TooDeep(self.stream.limits().max_depth).into());
        }

        let child = self.descend::<H>(depth + 1)?;

        let (left, right) = match side {
            Side::Left => (child.old_label, sibling_label),
            Side::Right => (sibling_label, child.old_label),
        };
        let old_label = H::hash_internal(&InternalData {
            left,
            right,
            balance,
        });

        let sibling = Node::LabelOnly(sibling_label);
        if !child.changed {
            return Ok(Outcome {
                node: InternalNode::from_sides(side, child.node, sibling, balance).into(),
                changed: false,
                height_grew: false,
                old_label,
            });
        }

        let (node, height_grew) = attach(side, child.node, sibling, balance, child.height_grew)?;
        Ok(Outcome {
            node,
            changed: true,
            height_grew,
            old_label,
        })
    }

    fn apply(&mut self, old: Option<&[u8]>) -> Result<Value, VerifyError> {
        let update = self
            .update
            .take()
            .ok_or(VerifyError::StructuralContradiction("proof reaches a second leaf"))?;
        update(old).ok_or(VerifyError::UpdateRejected)
    }
}

/// Attach a changed child on `side` of a node with the given sibling and pre-edit balance,
/// rebalancing if the child's growth leaves the node out of balance.
///
/// Returns the new root of this subtree and whether its height increased.
fn attach(
    side: Side,
    child: Node,
    sibling: Node,
    balance: Balance,
    child_height_grew: bool,
) -> Result<(Node, bool), VerifyError> {
    if !child_height_grew {
        let node = InternalNode::from_sides(side, child, sibling, balance);
        return Ok((node.into(), false));
    }

    if let Some(adjusted) = Balance::from_i8(balance.as_i8() + side.skew()) {
        // a node leaning toward the grown side becomes even and absorbs the growth. an even node
        // starts leaning and grows by one.
        let node = InternalNode::from_sides(side, child, sibling, adjusted);
        return Ok((node.into(), balance == Balance::Even));
    }

    let Node::Internal(child) = child else {
        return Err(VerifyError::StructuralContradiction(
            "grown subtree to rotate is not an internal node",
        ));
    };
    let child_balance = child.balance;
    let (outer, inner) = child.into_sides(side);

    let root = if child_balance == side.leaning() {
        // single rotation: the child becomes the root, this node takes over the child's inner
        // subtree.
        let demoted = InternalNode::from_sides(side, inner, sibling, Balance::Even);
        InternalNode::from_sides(side, outer, demoted.into(), Balance::Even)
    } else if child_balance == side.opposite().leaning() {
        // double rotation through the child's inner subtree.
        let Node::Internal(pivot) = inner else {
            return Err(VerifyError::StructuralContradiction(
                "double rotation pivot is not an internal node",
            ));
        };
        let pivot_balance = pivot.balance;
        let (pivot_near, pivot_far) = pivot.into_sides(side);

        let (child_balance, this_balance) = if pivot_balance == side.leaning() {
            (Balance::Even, side.opposite().leaning())
        } else if pivot_balance == side.opposite().leaning() {
            (side.leaning(), Balance::Even)
        } else {
            (Balance::Even, Balance::Even)
        };

        let child = InternalNode::from_sides(side, outer, pivot_near, child_balance);
        let demoted = InternalNode::from_sides(side, pivot_far, sibling, this_balance);
        InternalNode::from_sides(side, child.into(), demoted.into(), Balance::Even)
    } else {
        return Err(VerifyError::StructuralContradiction(
            "grown subtree is balanced but requires rotation",
        ));
    };

    Ok((root.into(), false))
}
