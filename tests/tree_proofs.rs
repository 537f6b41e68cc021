//! Inclusion proofs against a five-leaf tree and the proof verifier's edge cases

use ctlog::{
    merkle::leaf_hash, ser::encode_leaf, verify_leaf_proof_hashes, InclusionProof,
    MemoryRepository, MerkleTree, NodeRange, Ownership, Timestamp, TreeLeaf, ZERO_HASH,
};
use ctlog_primitives::{hash_children, hash_leaf};

fn leaves() -> Vec<TreeLeaf> {
    (1..=5u8)
        .map(|i| TreeLeaf {
            created: Timestamp::from_unix(1_600_000_000 + i64::from(i), 0).unwrap(),
            ownership: Ownership {
                content_hash: [0u8; 32],
                name: format!("leaf{i}"),
            },
            public_key: vec![],
            private_claim_data: b"aaa".to_vec(),
            public_claim_data: b"bbbb".to_vec(),
        })
        .collect()
}

fn five() -> MerkleTree<MemoryRepository> {
    let tree = MerkleTree::new(MemoryRepository::new()).unwrap();
    for l in leaves() {
        tree.append(&l).unwrap();
    }
    tree
}

#[test]
fn empty_head() {
    let tree = MerkleTree::new(MemoryRepository::new()).unwrap();
    let head = tree.head().unwrap();
    assert_eq!(head.size, 0);
    assert_eq!(head.hash, ZERO_HASH);
}

#[test]
fn five_leaf_root_by_hand() {
    let h: Vec<_> = leaves()
        .iter()
        .map(|l| hash_leaf(&encode_leaf(l).unwrap()))
        .collect();
    let left = hash_children(&hash_children(&h[0], &h[1]), &hash_children(&h[2], &h[3]));
    let right = hash_children(&hash_children(&h[4], &ZERO_HASH), &ZERO_HASH);
    let expected = hash_children(&left, &right);

    assert_eq!(five().head().unwrap().hash, expected);
}

#[test]
fn every_index_proves_against_head() {
    let tree = five();
    let head = tree.head().unwrap();
    for (i, l) in leaves().iter().enumerate() {
        let proof = tree.get_leaf_proof(i as u64).unwrap();
        assert_eq!(proof.head.size, 5);
        assert_eq!(proof.head.hash, head.hash);
        assert_eq!(&proof.leaf, l);
        assert!(verify_leaf_proof_hashes(&proof), "index {i}");
    }
}

#[test]
fn last_leaf_path_carries_zero_padding() {
    let proof = five().get_leaf_proof(4).unwrap();
    assert_eq!(proof.hashes.len(), 3);
    assert_eq!(proof.hashes[0], ZERO_HASH);
    assert_eq!(proof.hashes[1], ZERO_HASH);
    assert_ne!(proof.hashes[2], ZERO_HASH);
}

#[test]
fn proof_past_the_end_is_refused() {
    assert!(five().get_leaf_proof(5).is_err());
}

#[test]
fn single_bit_flips_fail() {
    let tree = five();
    for i in 0..5u64 {
        let proof = tree.get_leaf_proof(i).unwrap();
        for h in 0..proof.hashes.len() {
            for bit in [0usize, 7, 100, 255] {
                let mut bad = proof.clone();
                bad.hashes[h][bit / 8] ^= 1 << (bit % 8);
                assert!(!verify_leaf_proof_hashes(&bad), "index {i} hash {h} bit {bit}");
            }
        }
    }
}

#[test]
fn changed_index_fails() {
    let tree = five();
    for i in 0..5u64 {
        for j in (0..8u64).filter(|&j| j != i) {
            let mut bad = tree.get_leaf_proof(i).unwrap();
            bad.index = j;
            assert!(!verify_leaf_proof_hashes(&bad), "index {i} as {j}");
        }
    }
}

#[test]
fn size_changes_that_move_the_end_fail() {
    let tree = five();
    let proof = tree.get_leaf_proof(4).unwrap();
    // shrinking past the leaf, or growing over a zero-padded sibling
    for size in [0u64, 1, 4, 6, 7, 8, 9, 16] {
        let mut bad = proof.clone();
        bad.head.size = size;
        assert!(!verify_leaf_proof_hashes(&bad), "size {size}");
    }
    // a different root range changes the path length
    for i in 0..5u64 {
        let mut bad = tree.get_leaf_proof(i).unwrap();
        bad.head.size = 9;
        assert!(!verify_leaf_proof_hashes(&bad), "index {i}");
        bad.head.size = 4;
        assert!(!verify_leaf_proof_hashes(&bad), "index {i}");
    }
}

#[test]
fn extra_or_missing_hashes_fail() {
    let proof = five().get_leaf_proof(2).unwrap();
    let mut longer = proof.clone();
    longer.hashes.push(ZERO_HASH);
    assert!(!verify_leaf_proof_hashes(&longer));
    let mut shorter = proof;
    shorter.hashes.pop();
    assert!(!verify_leaf_proof_hashes(&shorter));
}

#[test]
fn forged_padding_fails() {
    // a proof for a lone leaf that claims a larger tree padded with zeros
    let l = leaves().remove(0);
    let lh = leaf_hash(&l).unwrap();
    let mut acc = lh;
    let mut pos = NodeRange::leaf(0);
    let mut hashes = Vec::new();
    while !pos.is_root(2) {
        acc = pos.combine(&acc, &ZERO_HASH);
        hashes.push(ZERO_HASH);
        pos = pos.parent();
    }
    let mut head = five().head().unwrap();
    head.size = 2;
    head.hash = acc;
    let forged = InclusionProof {
        head,
        index: 0,
        leaf: l,
        hashes,
    };
    // sibling [1, 2) lies below the size and may not be zero
    assert!(!verify_leaf_proof_hashes(&forged));
}
