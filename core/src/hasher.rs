//! Hashers (feature-gated) and utilities for implementing them.

use crate::tree::{InternalData, Label, LeafData};

/// The domain tag prepended to leaf preimages.
pub const LEAF_TAG: u8 = 0;

/// The domain tag prepended to internal node preimages.
pub const INTERNAL_TAG: u8 = 1;

/// A label function for the nodes of an AVL+ tree.
///
/// The exact preimage layout is a compatibility contract with the prover: both sides must
/// produce identical labels bit-for-bit, otherwise no proof will ever verify.
pub trait LabelHasher {
    /// Compute the label of a leaf from its key, value and next-leaf key.
    fn hash_leaf(data: &LeafData) -> Label;

    /// Compute the label of an internal node from its child labels and balance.
    fn hash_internal(data: &InternalData) -> Label;
}

/// A simple trait for representing binary hash functions.
pub trait BinaryHash {
    /// Given a bit-string, produce a 32-byte hash.
    fn hash(input: &[u8]) -> [u8; 32];

    /// Hash the concatenation of all `parts`.
    ///
    /// The default implementation copies the parts into a single buffer. Hash functions with a
    /// streaming interface should override this.
    fn hash_parts(parts: &[&[u8]]) -> [u8; 32] {
        let len = parts.iter().map(|p| p.len()).sum();
        let mut buf = alloc::vec::Vec::with_capacity(len);
        for part in parts {
            buf.extend_from_slice(part);
        }
        Self::hash(&buf)
    }
}

/// A label hasher constructed from a simple binary hasher.
///
/// Leaves are labeled `H(0x00 ++ key ++ value ++ next_leaf_key)` and internal nodes are
/// labeled `H(0x01 ++ balance ++ left ++ right)`, where the balance is the signed balance
/// factor as a two's complement byte.
///
/// The binary hash wrapped by this structure must be collision resistant. Functions like
/// Sha2/Blake3/Keccak all meet this criterion.
pub struct BinaryHasher<H>(core::marker::PhantomData<H>);

impl<H: BinaryHash> LabelHasher for BinaryHasher<H> {
    fn hash_leaf(data: &LeafData) -> Label {
        H::hash_parts(&[
            &[LEAF_TAG][..],
            &data.key[..],
            &data.value[..],
            &data.next_leaf_key[..],
        ])
    }

    fn hash_internal(data: &InternalData) -> Label {
        H::hash_parts(&[
            &[INTERNAL_TAG, data.balance.label_byte()][..],
            &data.left[..],
            &data.right[..],
        ])
    }
}

#[cfg(any(feature = "blake3-hasher", test))]
pub use blake3::Blake3Hasher;

/// A label hasher making use of blake3.
#[cfg(any(feature = "blake3-hasher", test))]
pub mod blake3 {
    use super::{BinaryHash, BinaryHasher};

    /// A [`BinaryHash`] implementation for Blake3.
    pub struct Blake3BinaryHasher;

    /// A wrapper around Blake3 for labeling AVL+ nodes.
    pub type Blake3Hasher = BinaryHasher<Blake3BinaryHasher>;

    impl BinaryHash for Blake3BinaryHasher {
        fn hash(value: &[u8]) -> [u8; 32] {
            blake3::hash(value).into()
        }

        fn hash_parts(parts: &[&[u8]]) -> [u8; 32] {
            let mut hasher = blake3::Hasher::new();
            for part in parts {
                hasher.update(part);
            }
            hasher.finalize().into()
        }
    }
}

#[cfg(any(feature = "sha2-hasher", test))]
pub use sha2::Sha2Hasher;

/// A label hasher making use of sha2-256.
#[cfg(any(feature = "sha2-hasher", test))]
pub mod sha2 {
    use super::{BinaryHash, BinaryHasher};
    use sha2::{Digest, Sha256};

    /// A [`BinaryHash`] implementation for Sha2.
    pub struct Sha2BinaryHasher;

    /// A wrapper around sha2-256 for labeling AVL+ nodes.
    pub type Sha2Hasher = BinaryHasher<Sha2BinaryHasher>;

    impl BinaryHash for Sha2BinaryHasher {
        fn hash(value: &[u8]) -> [u8; 32] {
            let mut hasher = Sha256::new();
            hasher.update(value);
            hasher.finalize().into()
        }

        fn hash_parts(parts: &[&[u8]]) -> [u8; 32] {
            let mut hasher = Sha256::new();
            for part in parts {
                hasher.update(part);
            }
            hasher.finalize().into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BinaryHash, LabelHasher, Sha2Hasher};
    use crate::tree::{Balance, InternalData, LeafData};

    struct Concat;

    impl BinaryHash for Concat {
        // not a hash: exposes the preimage length and first bytes.
        fn hash(input: &[u8]) -> [u8; 32] {
            let mut out = [0u8; 32];
            out[0] = input.len() as u8;
            let n = core::cmp::min(31, input.len());
            out[1..1 + n].copy_from_slice(&input[..n]);
            out
        }
    }

    type ConcatHasher = super::BinaryHasher<Concat>;

    #[test]
    fn leaf_preimage_layout() {
        let leaf = LeafData {
            key: b"k".to_vec(),
            value: b"vv".to_vec(),
            next_leaf_key: b"n".to_vec(),
        };
        let label = ConcatHasher::hash_leaf(&leaf);
        assert_eq!(label[0], 5);
        assert_eq!(&label[1..6], &[0, b'k', b'v', b'v', b'n']);
    }

    #[test]
    fn internal_preimage_layout() {
        let data = InternalData {
            left: [7; 32],
            right: [9; 32],
            balance: Balance::LeftHeavy,
        };
        let label = ConcatHasher::hash_internal(&data);
        assert_eq!(label[0], 66);
        assert_eq!(&label[1..4], &[1, 0xFF, 7]);
    }

    #[test]
    fn balance_is_part_of_internal_label() {
        let mut data = InternalData {
            left: [1; 32],
            right: [2; 32],
            balance: Balance::Even,
        };
        let even = Sha2Hasher::hash_internal(&data);
        data.balance = Balance::RightHeavy;
        assert_ne!(even, Sha2Hasher::hash_internal(&data));
    }
}
