//! Predefined modifications of a single key.
//!
//! A modify proof is verified together with an update function deciding what to store given the
//! current value. [`Modification`] offers the common ones.

use crate::tree::Value;

use alloc::vec::Vec;

/// A modification of the value stored under a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modification {
    /// Read the value without changing anything. Never inserts.
    Lookup,
    /// Insert a value. Rejected if the key already exists.
    Insert(Value),
    /// Replace the value. Rejected if the key is absent.
    Update(Value),
    /// Replace the value, or insert it if the key is absent.
    InsertOrUpdate(Value),
    /// Add a signed delta to a value holding a big-endian `i64`. An absent key counts as zero.
    /// Rejected on malformed stored values, on overflow, and on negative results.
    UpdateLongBy(i64),
}

impl Modification {
    /// Whether an absent key should be inserted.
    pub fn insert_if_absent(&self) -> bool {
        !matches!(self, Modification::Lookup)
    }

    /// Compute the value to store, given the current value. `None` rejects the modification.
    pub fn apply(&self, old: Option<&[u8]>) -> Option<Value> {
        match (self, old) {
            (Modification::Lookup, Some(old)) => Some(old.to_vec()),
            (Modification::Lookup, None) => None,
            (Modification::Insert(value), None) => Some(value.clone()),
            (Modification::Insert(_), Some(_)) => None,
            (Modification::Update(value), Some(_)) => Some(value.clone()),
            (Modification::Update(_), None) => None,
            (Modification::InsertOrUpdate(value), _) => Some(value.clone()),
            (Modification::UpdateLongBy(delta), old) => {
                let current = match old {
                    None => 0,
                    Some(bytes) => i64::from_be_bytes(bytes.try_into().ok()?),
                };
                let updated = current.checked_add(*delta)?;
                if updated < 0 {
                    return None;
                }
                Some(updated.to_be_bytes().to_vec())
            }
        }
    }
}

/// Encode a counter value the way [`Modification::UpdateLongBy`] stores it.
pub fn encode_long(value: i64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}
