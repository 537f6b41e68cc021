//! Full pipeline: register, prove, dispute

use ctlog::{Adjudicator, KeyMaterial, LogService, MemoryRepository, SqliteRepository};
use e2e::{Client, Filing};
use ed25519_dalek::SigningKey;

fn keys() -> KeyMaterial {
    KeyMaterial::from_bytes(&[31u8; 32], [32u8; 32])
}

fn content(tag: u8) -> [u8; 32] {
    ctlog_primitives::hash_leaf(&[tag])
}

#[test]
fn public_dispute_between_two_clients() {
    let keys = keys();
    let log = LogService::new(MemoryRepository::new(), &keys, 16).unwrap();
    let monitor = Adjudicator::new(log.get_pubkey(), keys.cipher());

    let alice = Client::new(&log, &monitor, SigningKey::from_bytes(&[1u8; 32]));
    let bob = Client::new(&log, &monitor, SigningKey::from_bytes(&[2u8; 32]));

    let (size, _) = alice.show().unwrap();
    assert_eq!(size, 0);

    let song = content(1);
    let (a_idx, a_filing) = alice
        .register(&song, "alice", "alice-private", "alice@example.org")
        .unwrap();
    let (b_idx, b_filing) = bob
        .register(&song, "bob", "bob-private", "bob@example.org")
        .unwrap();
    assert!(matches!(a_filing, Filing::Proof(_)));
    assert!(a_idx < b_idx);

    let won = alice.claim(&a_filing, b_idx).unwrap();
    assert!(won.granted, "{}", won.data);
    assert_eq!(won.data, "bob@example.org");

    let lost = bob.claim(&b_filing, a_idx).unwrap();
    assert!(!lost.granted);

    // bob presenting alice's filing cannot sign for alice's key
    let stolen = bob.claim(&a_filing, b_idx).unwrap();
    assert!(!stolen.granted);
    assert_eq!(stolen.data, "invalid claiming leaf signature");
}

#[test]
fn private_preregistration_beats_later_registration() {
    let dir = tempfile::tempdir().unwrap();
    let keys = keys();
    let log = LogService::new(
        SqliteRepository::open(dir.path().join("log.db")).unwrap(),
        &keys,
        16,
    )
    .unwrap();
    let monitor = Adjudicator::new(log.get_pubkey(), keys.cipher());

    let carol = Client::new(&log, &monitor, SigningKey::from_bytes(&[3u8; 32]));
    let dave = Client::new(&log, &monitor, SigningKey::from_bytes(&[4u8; 32]));

    let film = content(2);
    let sot = carol.preregister(&film, "carol").unwrap();
    assert!(matches!(sot, Filing::Sot(_)));
    std::thread::sleep(std::time::Duration::from_millis(2));

    let (idx, _) = dave
        .register(&film, "dave", "dave@example.org", "dave-public")
        .unwrap();
    let resp = carol.claim(&sot, idx).unwrap();
    assert!(resp.granted, "{}", resp.data);
    assert_eq!(resp.data, "dave@example.org");

    let (other_idx, _) = dave
        .register(&content(3), "dave", "x", "y")
        .unwrap();
    let resp = carol.claim(&sot, other_idx).unwrap();
    assert!(!resp.granted);

    let (size, root) = carol.show().unwrap();
    assert_eq!(size, 2);
    assert_eq!(root.len(), 64);
}

#[test]
fn claim_on_missing_index_is_an_error() {
    let keys = keys();
    let log = LogService::new(MemoryRepository::new(), &keys, 16).unwrap();
    let monitor = Adjudicator::new(log.get_pubkey(), keys.cipher());
    let erin = Client::new(&log, &monitor, SigningKey::from_bytes(&[5u8; 32]));
    let sot = erin.preregister(&content(4), "erin").unwrap();
    assert!(erin.claim(&sot, 0).is_err());
}
