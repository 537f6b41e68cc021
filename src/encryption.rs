//! Claim payload sealing.
//!
//! Payloads are sealed with AES-256-GCM under the process-wide key. Output is
//! `nonce(12) || ciphertext || tag(16)`; the domain tag is bound as associated
//! data so a private payload cannot be opened as a public one.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use rand_core::{OsRng, RngCore};

use crate::errors::{LogError, LogResult};

const NONCE_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadDomain {
    PrivateClaim,
    PublicClaim,
}

impl PayloadDomain {
    #[must_use]
    pub const fn tag(self) -> [u8; 2] {
        match self {
            Self::PrivateClaim => [0x00, 0x01],
            Self::PublicClaim => [0x00, 0x02],
        }
    }
}

#[derive(Clone)]
pub struct PayloadCipher {
    cipher: Aes256Gcm,
}

impl PayloadCipher {
    #[must_use]
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    pub fn encrypt(&self, domain: PayloadDomain, plaintext: &[u8]) -> LogResult<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let aad = domain.tag();
        let sealed = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|_| LogError::Encryption)?;
        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// `None` on short input, tampering, wrong key or wrong domain.
    #[must_use]
    pub fn decrypt(&self, domain: PayloadDomain, sealed: &[u8]) -> Option<Vec<u8>> {
        if sealed.len() < NONCE_LEN {
            return None;
        }
        let (nonce, body) = sealed.split_at(NONCE_LEN);
        let aad = domain.tag();
        self.cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: body,
                    aad: &aad,
                },
            )
            .ok()
    }
}
