//! Property-based tests for the ctlog codecs and tree engine

use ctlog::ser::*;
use ctlog::*;
use ctlog_primitives::{constants::MAX_FIELD_LEN, CodecError};
use ed25519_dalek::SigningKey;
use proptest::prelude::*;

fn timestamp() -> impl Strategy<Value = Timestamp> {
    (-62_135_596_800i64..253_402_300_799i64, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| Timestamp::from_unix(secs, nanos).unwrap())
}

fn ownership() -> impl Strategy<Value = Ownership> {
    (prop::array::uniform32(any::<u8>()), "[a-zA-Z0-9 ._-]{0,255}").prop_map(
        |(content_hash, name)| Ownership { content_hash, name },
    )
}

fn bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..96)
}

fn leaf() -> impl Strategy<Value = TreeLeaf> {
    (timestamp(), ownership(), bytes(), bytes(), bytes()).prop_map(
        |(created, ownership, public_key, private_claim_data, public_claim_data)| TreeLeaf {
            created,
            ownership,
            public_key,
            private_claim_data,
            public_claim_data,
        },
    )
}

fn head() -> impl Strategy<Value = SignedTreeHead> {
    (
        any::<u64>(),
        timestamp(),
        prop::array::uniform32(any::<u8>()),
        prop::option::of(prop::collection::vec(any::<u8>(), 64..=64)),
    )
        .prop_map(|(size, timestamp, hash, sig)| SignedTreeHead {
            size,
            timestamp,
            hash,
            signature: sig.map(|s| <[u8; 64]>::try_from(s.as_slice()).unwrap()),
        })
}

/// Tree with `n` distinct leaves in memory.
fn tree_of(n: usize) -> MerkleTree<MemoryRepository> {
    let tree = MerkleTree::new(MemoryRepository::new()).unwrap();
    for i in 0..n {
        let i = u8::try_from(i).unwrap();
        tree.append(&TreeLeaf {
            created: Timestamp::from_unix(1_700_000_000, u32::from(i)).unwrap(),
            ownership: Ownership {
                content_hash: [i; 32],
                name: format!("leaf{i}"),
            },
            public_key: vec![],
            private_claim_data: vec![i],
            public_claim_data: vec![i, i],
        })
        .unwrap();
    }
    tree
}

// Codec round-trips
proptest! {
    #[test]
    fn ownership_round_trip(o in ownership()) {
        prop_assert_eq!(decode_ownership(&encode_ownership(&o).unwrap()).unwrap(), o);
    }

    #[test]
    fn sot_round_trip(
        timestamp in timestamp(),
        ownership in ownership(),
        sig in prop::collection::vec(any::<u8>(), 64..=64),
    ) {
        let sot = SignedOwnershipTimestamp {
            timestamp,
            ownership,
            signature: sig.try_into().unwrap(),
        };
        prop_assert_eq!(decode_sot(&encode_sot(&sot).unwrap()).unwrap(), sot);
    }

    #[test]
    fn sth_round_trip(h in head()) {
        prop_assert_eq!(decode_sth(&encode_sth(&h)).unwrap(), h);
    }

    #[test]
    fn leaf_round_trip(l in leaf()) {
        prop_assert_eq!(decode_leaf(&encode_leaf(&l).unwrap()).unwrap(), l);
    }

    #[test]
    fn proof_round_trip(
        head in head(),
        index in any::<u64>(),
        leaf in leaf(),
        hashes in prop::collection::vec(prop::array::uniform32(any::<u8>()), 0..40),
    ) {
        let p = InclusionProof { head, index, leaf, hashes };
        prop_assert_eq!(decode_proof(&encode_proof(&p).unwrap()).unwrap(), p);
    }

    #[test]
    fn truncated_leaf_never_decodes(l in leaf(), cut in 1usize..16) {
        let enc = encode_leaf(&l).unwrap();
        let cut = cut.min(enc.len());
        prop_assert!(decode_leaf(&enc[..enc.len() - cut]).is_err());
    }
}

/// Bytes left for the key and both payloads once a leaf named `name` is at
/// `MAX_FIELD_LEN`.
fn leaf_budget(name: &str) -> usize {
    // created + prefixed ownership + three more prefixes
    MAX_FIELD_LEN - (15 + 2 + 33 + name.len() + 3 * 2)
}

/// Leaf encoding to exactly `MAX_FIELD_LEN` bytes; the public data takes
/// whatever `key` and `private` leave of the budget.
fn maximal_leaf(created: Timestamp, ownership: Ownership, key: usize, private: usize) -> TreeLeaf {
    let budget = leaf_budget(&ownership.name);
    TreeLeaf {
        created,
        ownership,
        public_key: vec![0xA5; key],
        private_claim_data: vec![0x5A; private],
        public_claim_data: vec![0xC3; budget - key - private],
    }
}

// Field limits
proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn maximal_leaf_round_trips_inside_a_proof(
        created in timestamp(),
        ownership in ownership(),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
        h in head(),
    ) {
        let budget = leaf_budget(&ownership.name);
        let key = a.index(budget + 1);
        let leaf = maximal_leaf(created, ownership, key, b.index(budget - key + 1));
        let enc = encode_leaf(&leaf).unwrap();
        prop_assert_eq!(enc.len(), MAX_FIELD_LEN);
        prop_assert_eq!(decode_leaf(&enc).unwrap(), leaf.clone());

        let p = InclusionProof { head: h, index: 0, leaf, hashes: vec![[7; 32]; 3] };
        prop_assert_eq!(decode_proof(&encode_proof(&p).unwrap()).unwrap(), p);
    }

    #[test]
    fn one_byte_past_the_limit_is_refused(
        created in timestamp(),
        ownership in ownership(),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
        field in 0usize..3,
    ) {
        let budget = leaf_budget(&ownership.name);
        let key = a.index(budget + 1);
        let mut leaf = maximal_leaf(created, ownership, key, b.index(budget - key + 1));
        match field {
            0 => leaf.public_key.push(0),
            1 => leaf.private_claim_data.push(0),
            _ => leaf.public_claim_data.push(0),
        }
        prop_assert_eq!(
            encode_leaf(&leaf),
            Err(CodecError::TooLong { got: MAX_FIELD_LEN + 1, max: MAX_FIELD_LEN })
        );

        let tree = MerkleTree::new(MemoryRepository::new()).unwrap();
        prop_assert!(tree.append(&leaf).is_err());
        prop_assert_eq!(tree.size(), 0);
    }
}

#[test]
fn maximal_leaf_appends_and_proves() {
    let tree = tree_of(3);
    let leaf = maximal_leaf(
        Timestamp::from_unix(1_700_000_100, 0).unwrap(),
        Ownership { content_hash: [9; 32], name: "max".to_owned() },
        32,
        20_000,
    );
    assert_eq!(tree.append(&leaf).unwrap(), 3);
    let proof = tree.get_leaf_proof(3).unwrap();
    assert_eq!(proof.leaf, leaf);
    assert!(verify_leaf_proof_hashes(&proof));
    assert_eq!(decode_proof(&encode_proof(&proof).unwrap()).unwrap(), proof);
}

// Tree behaviour
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn append_assigns_sequential_indices(leaves in prop::collection::vec(leaf(), 1..24)) {
        let tree = MerkleTree::new(MemoryRepository::new()).unwrap();
        for (i, l) in leaves.iter().enumerate() {
            prop_assert_eq!(tree.append(l).unwrap(), i as u64);
        }
        prop_assert_eq!(tree.size(), leaves.len() as u64);
        for (i, l) in leaves.iter().enumerate() {
            let got = tree.get_leaf(i as u64).unwrap();
            prop_assert_eq!(got.as_ref(), Some(l));
        }
    }

    #[test]
    fn any_bit_flip_in_path_is_detected(
        n in 2usize..40,
        pick in any::<prop::sample::Index>(),
        hash_pick in any::<prop::sample::Index>(),
        bit in 0usize..256,
    ) {
        let tree = tree_of(n);
        let index = pick.index(n) as u64;
        let mut proof = tree.get_leaf_proof(index).unwrap();
        prop_assert!(verify_leaf_proof_hashes(&proof));

        let h = hash_pick.index(proof.hashes.len());
        proof.hashes[h][bit / 8] ^= 1 << (bit % 8);
        prop_assert!(!verify_leaf_proof_hashes(&proof));
    }

    #[test]
    fn moving_the_index_is_detected(
        n in 2usize..40,
        pick in any::<prop::sample::Index>(),
        other in any::<u64>(),
    ) {
        let tree = tree_of(n);
        let index = pick.index(n) as u64;
        let mut proof = tree.get_leaf_proof(index).unwrap();
        prop_assume!(other != index);
        proof.index = other;
        prop_assert!(!verify_leaf_proof_hashes(&proof));
    }

    #[test]
    fn resizing_a_signed_head_is_detected(
        n in 1usize..40,
        pick in any::<prop::sample::Index>(),
        size in any::<u64>(),
    ) {
        let tree = tree_of(n);
        let authority = LogAuthority::new(SigningKey::from_bytes(&[9u8; 32]));
        let index = pick.index(n) as u64;
        let mut proof = tree.get_leaf_proof(index).unwrap();
        proof.head = authority.sign_tree_head(proof.head);
        prop_assert!(verify_proof(&authority.public_key(), &proof));

        prop_assume!(size != n as u64);
        proof.head.size = size;
        prop_assert!(!verify_proof(&authority.public_key(), &proof));
    }
}
