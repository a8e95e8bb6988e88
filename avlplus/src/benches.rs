#![cfg(feature = "benchmarks")]

use crate::{
    proof::Direction,
    tree::{Balance, InternalData},
    Blake3Hasher, Label, LabelHasher, LeafData, ModifyProof, Options, ProofElement, Verifier,
};
use criterion::{BenchmarkId, Criterion};

pub fn verify_benchmark(c: &mut Criterion) {
    let verifier = Verifier::<Blake3Hasher>::new(Options::new());

    let mut group = c.benchmark_group("verify_update");
    for depth in [4, 16, 32, 64] {
        let (root, proof) = synthetic_path::<Blake3Hasher>(depth, true);
        group.bench_function(BenchmarkId::new("depth", depth), |b| {
            b.iter(|| verifier.verify(&root, &proof, |_| Some(vec![1; 32]), false))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("verify_insert");
    for depth in [4, 16, 32, 64] {
        let (root, proof) = synthetic_path::<Blake3Hasher>(depth, false);
        group.bench_function(BenchmarkId::new("depth", depth), |b| {
            b.iter(|| verifier.verify(&root, &proof, |_| Some(vec![1; 32]), true))
        });
    }
    group.finish();
}

// builds a proof through `depth` even internal nodes with random siblings, and the matching root.
fn synthetic_path<H: LabelHasher>(depth: usize, found: bool) -> (Label, ModifyProof) {
    use rand::{Rng, RngCore};

    let mut rng = rand::thread_rng();
    let key = vec![0x80; 32];
    let leaf = LeafData {
        key: if found { key.clone() } else { vec![0x40; 32] },
        value: vec![0; 32],
        next_leaf_key: vec![0xC0; 32],
    };

    let mut label = H::hash_leaf(&leaf);
    let mut frames = Vec::with_capacity(depth);
    for _ in 0..depth {
        let mut sibling = [0; 32];
        rng.fill_bytes(&mut sibling);
        let going_left = rng.gen::<bool>();
        let (left, right) = if going_left {
            (label, sibling)
        } else {
            (sibling, label)
        };
        label = H::hash_internal(&InternalData {
            left,
            right,
            balance: Balance::Even,
        });
        frames.push((going_left, sibling));
    }

    let mut elements = Vec::new();
    for (going_left, sibling) in frames.into_iter().rev() {
        if going_left {
            elements.push(ProofElement::Direction(Direction::GoingLeft));
            elements.push(ProofElement::RightLabel(sibling));
        } else {
            elements.push(ProofElement::Direction(Direction::GoingRight));
            elements.push(ProofElement::LeftLabel(sibling));
        }
        elements.push(ProofElement::Balance(Balance::Even.proof_byte()));
    }
    if found {
        elements.push(ProofElement::Direction(Direction::LeafFound));
    } else {
        elements.push(ProofElement::Direction(Direction::LeafNotFound));
        elements.push(ProofElement::Key(leaf.key.clone()));
    }
    elements.push(ProofElement::NextLeafKey(leaf.next_leaf_key));
    elements.push(ProofElement::Value(leaf.value));

    (label, ModifyProof { key, elements })
}
