#![forbid(unsafe_code)]

/// Checksum tag for signed tree heads.
pub const TAG_STH: &str = "sth";
/// Checksum tag for signed ownership timestamps.
pub const TAG_OWNERSHIP: &str = "ownership";

/// Storage key of the persisted tree size counter.
pub const KEY_SIZE: &[u8] = b"size";

pub const HASH_LEN: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

/// Serialized timestamp width (version, seconds, nanoseconds, zone offset).
pub const TIMESTAMP_LEN: usize = 15;
pub const TIMESTAMP_VERSION: u8 = 1;
/// Seconds between 0001-01-01T00:00:00Z and the Unix epoch.
pub const UNIX_TO_ABSOLUTE_SECS: i64 = 62_135_596_800;
/// Zone offset written for UTC timestamps.
pub const UTC_OFFSET_MARKER: i16 = -1;

/// Longest ownership name (single length byte).
pub const MAX_NAME_LEN: usize = u8::MAX as usize;
/// Longest length-prefixed byte field (u16 prefix).
pub const MAX_FIELD_LEN: usize = u16::MAX as usize;
/// Longest hash list in an inclusion proof (u16 count).
pub const MAX_PROOF_HASHES: usize = u16::MAX as usize;

/// Largest page `get_entries` serves unless configured otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 16;
