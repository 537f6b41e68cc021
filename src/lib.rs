#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

//! ctlog - tamper-evident ownership transparency log
//!
//! Clients register a content hash under a name; the log appends the record to
//! an append-only Merkle tree and hands out signed heads and inclusion proofs.
//! A disputing party later presents those proofs (or a privately held signed
//! ownership timestamp) to the adjudicator, which releases the contact data of
//! the later registrant when the earlier claim checks out.

// Fixed choices:
// - Hash: SHA3-256 (32-byte output), leaves over their full serialization
// - Signature: Ed25519 over tagged checksums ("sth", "ownership"), strict verification
// - Tree: pointerless, nodes addressed by leaf range [left, right), zero hash past the end
// - Payloads: AES-256-GCM with a per-domain associated-data tag

// Core modules
pub mod types;
pub mod errors;
pub mod ser;
pub mod merkle;
pub mod storage;
pub mod tree;
pub mod signatures;
pub mod encryption;
pub mod claims;
pub mod service;
pub mod follower;
pub mod config;
pub mod logging;

// Re-export commonly used types and functions
pub use types::*;
pub use errors::{ClaimDenied, LogError, LogResult};
pub use merkle::{verify_leaf_proof_hashes, NodeRange, MAX_TREE_SIZE};
pub use storage::{AnyRepository, MemoryRepository, Repository, SqliteRepository};
pub use tree::MerkleTree;
pub use signatures::{sign_leaf, verify_leaf, verify_ownership, verify_tree_head, LogAuthority};
pub use encryption::{PayloadCipher, PayloadDomain};
pub use claims::{verify_proof, Adjudicator, ClaimResponse};
pub use service::LogService;
pub use follower::{LeafSource, LogFollower};
pub use config::{KeyMaterial, LogConfig, StorageConfig};

pub use ctlog_primitives::{Hash256, Pk32, Sig64, ZERO_HASH};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
