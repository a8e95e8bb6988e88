use avlplus::{
    proof::Direction,
    tree::{negative_infinity, positive_infinity, Balance, InternalData},
    Key, Label, LabelHasher, LeafData, ModifyProof, Options, ProofElement, Value, Verifier,
};
use std::{marker::PhantomData, mem};

pub const KEY_LENGTH: usize = 8;

pub fn account_key(id: u64) -> Key {
    // Keys should be spread over the key space, but we don't want to spend time on a good hash. So
    // the next best option is to use a PRNG seeded with the id.
    use rand::{RngCore as _, SeedableRng as _};
    let mut seed = [0; 16];
    seed[0..8].copy_from_slice(&id.to_le_bytes());
    let mut rng = rand_pcg::Lcg64Xsh32::from_seed(seed);
    let mut key = vec![0; KEY_LENGTH];
    rng.fill_bytes(&mut key);
    // sentinels are reserved.
    if key == negative_infinity(KEY_LENGTH) || key == positive_infinity(KEY_LENGTH) {
        key[KEY_LENGTH - 1] = 0x42;
    }
    key
}

#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn verifier<H: LabelHasher>() -> Verifier<H> {
    let mut o = Options::new();
    o.key_length(Some(KEY_LENGTH));
    o.metrics(true);
    Verifier::new(o)
}

#[derive(Clone)]
enum Node {
    Leaf(LeafData),
    Internal(Box<Internal>),
}

#[derive(Clone)]
struct Internal {
    // the smallest key in the right subtree. keys below go left.
    key: Key,
    left: Node,
    right: Node,
    height: usize,
}

impl Node {
    fn height(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Internal(i) => i.height,
        }
    }

    fn label<H: LabelHasher>(&self) -> Label {
        match self {
            Node::Leaf(leaf) => H::hash_leaf(leaf),
            Node::Internal(i) => H::hash_internal(&InternalData {
                left: i.left.label::<H>(),
                right: i.right.label::<H>(),
                balance: i.balance(),
            }),
        }
    }

    fn placeholder() -> Self {
        Node::Leaf(LeafData::default())
    }

    fn into_internal(self) -> Box<Internal> {
        match self {
            Node::Internal(i) => i,
            Node::Leaf(_) => panic!("rotation through a leaf"),
        }
    }
}

impl Internal {
    fn balance(&self) -> Balance {
        let bf = self.right.height() as isize - self.left.height() as isize;
        Balance::from_i8(bf as i8).expect("tree out of balance")
    }

    fn fix_height(&mut self) {
        self.height = 1 + std::cmp::max(self.left.height(), self.right.height());
    }
}

/// A reference prover holding the full tree.
///
/// Rebalancing is done by comparing subtree heights directly rather than by tracking balance
/// factors, so that it is independent from the verifier's arithmetic.
pub struct Prover<H> {
    root: Node,
    _marker: PhantomData<H>,
}

impl<H> Clone for Prover<H> {
    fn clone(&self) -> Self {
        Prover {
            root: self.root.clone(),
            _marker: PhantomData,
        }
    }
}

#[allow(dead_code)]
impl<H: LabelHasher> Prover<H> {
    /// A dictionary holding only the sentinel leaf.
    pub fn new() -> Self {
        Prover {
            root: Node::Leaf(LeafData {
                key: negative_infinity(KEY_LENGTH),
                value: Vec::new(),
                next_leaf_key: positive_infinity(KEY_LENGTH),
            }),
            _marker: PhantomData,
        }
    }

    pub fn root(&self) -> Label {
        self.root.label::<H>()
    }

    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// The number of internal nodes on the path to `key`.
    pub fn depth(&self, key: &[u8]) -> usize {
        self.prove(key)
            .elements
            .iter()
            .filter(|e| matches!(e, ProofElement::Balance(_)))
            .count()
    }

    pub fn get(&self, key: &[u8]) -> Option<Value> {
        let leaf = self.terminal(key);
        if leaf.key == key {
            Some(leaf.value.clone())
        } else {
            None
        }
    }

    /// Produce a proof for modifying `key` in the current tree.
    pub fn prove(&self, key: &[u8]) -> ModifyProof {
        let mut elements = Vec::new();
        let mut node = &self.root;
        loop {
            match node {
                Node::Internal(i) => {
                    let balance = ProofElement::Balance(i.balance().proof_byte());
                    if key < i.key.as_slice() {
                        elements.push(ProofElement::Direction(Direction::GoingLeft));
                        elements.push(ProofElement::RightLabel(i.right.label::<H>()));
                        elements.push(balance);
                        node = &i.left;
                    } else {
                        elements.push(ProofElement::Direction(Direction::GoingRight));
                        elements.push(ProofElement::LeftLabel(i.left.label::<H>()));
                        elements.push(balance);
                        node = &i.right;
                    }
                }
                Node::Leaf(leaf) => {
                    if leaf.key == key {
                        elements.push(ProofElement::Direction(Direction::LeafFound));
                    } else {
                        elements.push(ProofElement::Direction(Direction::LeafNotFound));
                        elements.push(ProofElement::Key(leaf.key.clone()));
                    }
                    elements.push(ProofElement::NextLeafKey(leaf.next_leaf_key.clone()));
                    elements.push(ProofElement::Value(leaf.value.clone()));
                    break;
                }
            }
        }

        ModifyProof {
            key: key.to_vec(),
            elements,
        }
    }

    /// Apply the update to `key`, returning the new root, or `None` if the update is refused.
    pub fn apply(
        &mut self,
        key: &[u8],
        update: impl FnOnce(Option<&[u8]>) -> Option<Value>,
        insert_if_absent: bool,
    ) -> Option<Label> {
        let old = self.get(key);
        if old.is_none() && !insert_if_absent {
            return Some(self.root());
        }
        let value = update(old.as_deref())?;
        let root = mem::replace(&mut self.root, Node::placeholder());
        self.root = insert(root, key, value);
        Some(self.root())
    }

    /// Prove and apply an update, returning the proof, the old root and the new root.
    pub fn prove_and_apply(
        &mut self,
        key: &[u8],
        update: impl FnOnce(Option<&[u8]>) -> Option<Value>,
        insert_if_absent: bool,
    ) -> (ModifyProof, Label, Option<Label>) {
        let proof = self.prove(key);
        let old_root = self.root();
        let new_root = self.apply(key, update, insert_if_absent);
        (proof, old_root, new_root)
    }

    /// Check the AVL and leaf-chain invariants of the whole tree.
    pub fn check_invariants(&self) {
        let mut leaves = Vec::new();
        check_node(&self.root, &mut leaves);
        for pair in leaves.windows(2) {
            assert!(pair[0].key < pair[1].key);
            assert_eq!(pair[0].next_leaf_key, pair[1].key);
        }
        let last = leaves.last().expect("tree has at least one leaf");
        assert_eq!(last.next_leaf_key, positive_infinity(KEY_LENGTH));
        assert_eq!(leaves[0].key, negative_infinity(KEY_LENGTH));
    }

    fn terminal(&self, key: &[u8]) -> &LeafData {
        let mut node = &self.root;
        loop {
            match node {
                Node::Internal(i) if key < i.key.as_slice() => node = &i.left,
                Node::Internal(i) => node = &i.right,
                Node::Leaf(leaf) => return leaf,
            }
        }
    }
}

fn check_node<'a>(node: &'a Node, leaves: &mut Vec<&'a LeafData>) {
    match node {
        Node::Leaf(leaf) => leaves.push(leaf),
        Node::Internal(i) => {
            let bf = i.right.height() as isize - i.left.height() as isize;
            assert!(bf.abs() <= 1, "balance factor {} out of range", bf);
            assert_eq!(i.height, 1 + std::cmp::max(i.left.height(), i.right.height()));
            check_node(&i.left, leaves);
            let first_right = leaves.len();
            check_node(&i.right, leaves);
            assert_eq!(leaves[first_right].key, i.key);
        }
    }
}

fn insert(node: Node, key: &[u8], value: Value) -> Node {
    match node {
        Node::Leaf(mut leaf) => {
            if leaf.key == key {
                leaf.value = value;
                return Node::Leaf(leaf);
            }
            assert!(leaf.key.as_slice() < key && key < leaf.next_leaf_key.as_slice());
            let new_leaf = LeafData {
                key: key.to_vec(),
                value,
                next_leaf_key: mem::replace(&mut leaf.next_leaf_key, key.to_vec()),
            };
            Node::Internal(Box::new(Internal {
                key: key.to_vec(),
                left: Node::Leaf(leaf),
                right: Node::Leaf(new_leaf),
                height: 1,
            }))
        }
        Node::Internal(mut i) => {
            if key < i.key.as_slice() {
                let left = mem::replace(&mut i.left, Node::placeholder());
                i.left = insert(left, key, value);
            } else {
                let right = mem::replace(&mut i.right, Node::placeholder());
                i.right = insert(right, key, value);
            }
            rebalance(i)
        }
    }
}

fn rebalance(mut i: Box<Internal>) -> Node {
    i.fix_height();
    let bf = i.right.height() as isize - i.left.height() as isize;
    if bf < -1 {
        let left = mem::replace(&mut i.left, Node::placeholder()).into_internal();
        i.left = if left.left.height() >= left.right.height() {
            Node::Internal(left)
        } else {
            rotate_left(left)
        };
        rotate_right(i)
    } else if bf > 1 {
        let right = mem::replace(&mut i.right, Node::placeholder()).into_internal();
        i.right = if right.right.height() >= right.left.height() {
            Node::Internal(right)
        } else {
            rotate_right(right)
        };
        rotate_left(i)
    } else {
        Node::Internal(i)
    }
}

fn rotate_right(mut i: Box<Internal>) -> Node {
    let mut pivot = mem::replace(&mut i.left, Node::placeholder()).into_internal();
    i.left = mem::replace(&mut pivot.right, Node::placeholder());
    i.fix_height();
    pivot.right = Node::Internal(i);
    pivot.fix_height();
    Node::Internal(pivot)
}

fn rotate_left(mut i: Box<Internal>) -> Node {
    let mut pivot = mem::replace(&mut i.right, Node::placeholder()).into_internal();
    i.right = mem::replace(&mut pivot.left, Node::placeholder());
    i.fix_height();
    pivot.left = Node::Internal(i);
    pivot.fix_height();
    Node::Internal(pivot)
}

#[allow(dead_code)]
pub fn replace_with(value: Value) -> impl FnOnce(Option<&[u8]>) -> Option<Value> {
    move |_| Some(value)
}
