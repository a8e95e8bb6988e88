//! A verifier for single-key modifications of an AVL+ authenticated dictionary.
//!
//! A party holding only the root label of a remote dictionary can use a [`Verifier`] to check a
//! proof produced by the party holding the full tree, and to learn the root label the dictionary
//! will have after the modification. See [`avlplus_core::proof`] for the proof format.

use std::marker::PhantomData;

use anyhow::Context as _;
use avlplus_core::proof::VerifyError;

pub use avlplus_core::{
    hasher::{self, LabelHasher},
    modification::{self, Modification},
    proof::{self, ModifyProof, ProofElement, VerifiedModification},
    tree::{self, Key, Label, LeafData, Value},
};

#[cfg(feature = "blake3-hasher")]
pub use avlplus_core::hasher::Blake3Hasher;

#[cfg(feature = "sha2-hasher")]
pub use avlplus_core::hasher::Sha2Hasher;

pub use options::Options;

use metrics::{Metric, Metrics};

pub mod benches;
pub mod metrics;
mod options;

/// Verifies modify proofs against claimed root labels.
///
/// A verifier holds no state besides its configuration and metrics. Verifications are independent
/// of one another and may run concurrently from multiple threads.
pub struct Verifier<H> {
    options: Options,
    metrics: Metrics,
    _marker: PhantomData<fn() -> H>,
}

impl<H: LabelHasher> Verifier<H> {
    /// Create a new verifier with the given options.
    pub fn new(o: Options) -> Self {
        let metrics = Metrics::new(o.metrics);
        Self {
            options: o,
            metrics,
            _marker: PhantomData,
        }
    }

    /// The options this verifier was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The metrics collected by this verifier.
    pub fn metrics(&self) -> Metrics {
        self.metrics.clone()
    }

    /// Verify `proof` against `claimed_root`, applying `update` to the proven key.
    ///
    /// `update` receives the current value, or `None` if the key is absent, and returns the value
    /// to store, or `None` to refuse the modification. An absent key is only inserted if
    /// `insert_if_absent` is set.
    ///
    /// Returns the root label after the modification. Any failure yields `None`: a malformed proof
    /// cannot be distinguished from a stale root. Use [`Verifier::try_verify`] for the reason.
    pub fn verify(
        &self,
        claimed_root: &Label,
        proof: &ModifyProof,
        update: impl FnOnce(Option<&[u8]>) -> Option<Value>,
        insert_if_absent: bool,
    ) -> Option<Label> {
        self.check(claimed_root, proof, update, insert_if_absent)
            .ok()
            .map(|verified| verified.new_root)
    }

    /// Verify `proof` against `claimed_root`, applying a predefined [`Modification`].
    pub fn verify_modification(
        &self,
        claimed_root: &Label,
        proof: &ModifyProof,
        modification: &Modification,
    ) -> Option<VerifiedModification> {
        self.check(
            claimed_root,
            proof,
            |old| modification.apply(old),
            modification.insert_if_absent(),
        )
        .ok()
    }

    /// Read the value of the proven key from a dictionary with the given root.
    ///
    /// Returns `Some(None)` if the proof shows the key to be absent, and `None` if the proof does
    /// not verify.
    pub fn lookup(&self, claimed_root: &Label, proof: &ModifyProof) -> Option<Option<Value>> {
        self.verify_modification(claimed_root, proof, &Modification::Lookup)
            .map(|verified| verified.old_value)
    }

    /// Verify `proof` like [`Verifier::verify`], reporting why verification failed.
    pub fn try_verify(
        &self,
        claimed_root: &Label,
        proof: &ModifyProof,
        update: impl FnOnce(Option<&[u8]>) -> Option<Value>,
        insert_if_absent: bool,
    ) -> anyhow::Result<VerifiedModification> {
        self.check(claimed_root, proof, update, insert_if_absent)
            .with_context(|| format!("modify proof for key {}", hex::encode(&proof.key)))
    }

    fn check(
        &self,
        claimed_root: &Label,
        proof: &ModifyProof,
        update: impl FnOnce(Option<&[u8]>) -> Option<Value>,
        insert_if_absent: bool,
    ) -> Result<VerifiedModification, VerifyError> {
        let _timer = self.metrics.record(Metric::VerifyTime);
        let limits = self.options.limits();
        let result = proof.verify_with::<H>(claimed_root, update, insert_if_absent, &limits);

        match result {
            Ok(ref verified) => {
                self.metrics.count(Metric::Verified);
                tracing::debug!(
                    key = %hex::encode(&proof.key),
                    old_root = %hex::encode(verified.old_root),
                    new_root = %hex::encode(verified.new_root),
                    depth = verified.depth,
                    changed = verified.changed,
                    "verified modify proof",
                );
            }
            Err(ref err) => {
                self.metrics.count(Metric::Rejected);
                match err {
                    VerifyError::DigestMismatch => {
                        self.metrics.count(Metric::DigestMismatches);
                        tracing::debug!(
                            key = %hex::encode(&proof.key),
                            claimed_root = %hex::encode(claimed_root),
                            "rejected modify proof: {}",
                            err,
                        );
                    }
                    VerifyError::UpdateRejected => {
                        tracing::debug!(
                            key = %hex::encode(&proof.key),
                            "rejected modify proof: {}",
                            err,
                        );
                    }
                    _ => {
                        tracing::warn!(
                            key = %hex::encode(&proof.key),
                            elements = proof.elements.len(),
                            "rejected modify proof: {}",
                            err,
                        );
                    }
                }
            }
        }

        result
    }
}
