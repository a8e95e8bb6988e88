//! Modify proofs and their verification.
//!
//! The AVL+ tree is an authenticated data structure: a prover holding the whole tree can
//! convince a verifier holding only the root label of the effect of modifying a single key. This
//! module exposes the proof tokens ([`ProofElement`]), their decoder ([`ProofStream`]), and the
//! verification routine ([`ModifyProof::verify`]) which recomputes both the old and the new root.

pub use decode::{DecodeError, ProofLimits, ProofStream, Step, DEFAULT_MAX_DEPTH};
pub use element::{Direction, ElementKind, ProofElement};
pub use verify::{ModifyProof, VerifiedModification, VerifyError};

mod decode;
mod element;
mod verify;
