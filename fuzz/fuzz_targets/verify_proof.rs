#![no_main]

mod common;

use avlplus::{proof::ProofLimits, Blake3Hasher};
use common::Run;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|run: Run| {
    let Run {
        claimed_root,
        proof,
        new_value,
        insert_if_absent,
    } = run;

    let limits = ProofLimits {
        max_depth: 16,
        ..ProofLimits::default()
    };
    let result = proof.verify_with::<Blake3Hasher>(
        &claimed_root,
        |_| new_value,
        insert_if_absent,
        &limits,
    );

    // random labels never add up to the claimed root, but nothing may panic on the way.
    if let Ok(verified) = result {
        assert_eq!(verified.old_root, claimed_root);
        assert!(verified.depth <= limits.max_depth);
    }
});
