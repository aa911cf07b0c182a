//! At-rest encryption for digital goods.
//!
//! Ebook payloads never touch the disk in plaintext. [`AssetVault::store`] encrypts with XChaCha20-Poly1305 under a
//! single configured key and writes the nonce-prefixed ciphertext to a file named by a random hex handle; only that
//! opaque handle is recorded on the catalog entry. The AEAD tag means any on-disk tampering or a wrong key surfaces
//! as [`VaultError::Decryption`], not as silently corrupt bytes.
//!
//! Both operations are blocking and CPU-bound. They hold no locks; callers on async executors should wrap them in
//! their runtime's blocking facility.

use std::{fs, io, path::PathBuf};

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305,
    XNonce,
};
use log::warn;
use rand::RngCore;
use storefront_common::Secret;
use thiserror::Error;

use crate::helpers::random_hex;

const NONCE_LEN: usize = 24;
const HANDLE_LEN: usize = 32;

#[derive(Clone)]
pub struct AssetVault {
    cipher: XChaCha20Poly1305,
    dir: PathBuf,
}

impl AssetVault {
    /// Opens the vault. `key_hex` must be 32 bytes of hex; the directory is created if it does not exist.
    pub fn new(key_hex: &Secret<String>, dir: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let key = hex_decode(key_hex.reveal()).ok_or(VaultError::InvalidKey)?;
        if key.len() != 32 {
            return Err(VaultError::InvalidKey);
        }
        let cipher = XChaCha20Poly1305::new_from_slice(&key).map_err(|_| VaultError::InvalidKey)?;
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { cipher, dir })
    }

    /// Encrypts and persists a payload, returning the opaque handle.
    pub fn store(&self, plaintext: &[u8]) -> Result<String, VaultError> {
        let handle = random_hex(HANDLE_LEN / 2);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = XNonce::from_slice(&nonce_bytes);
        let ciphertext = self.cipher.encrypt(nonce, plaintext).map_err(|_| VaultError::Decryption)?;
        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        fs::write(self.dir.join(&handle), blob)?;
        Ok(handle)
    }

    /// Decrypts the payload behind a handle.
    pub fn retrieve(&self, handle: &str) -> Result<Vec<u8>, VaultError> {
        // Handles are generated in-house; anything else is either a corrupt record or a traversal attempt.
        if handle.len() != HANDLE_LEN || !handle.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(VaultError::NotFound(handle.to_string()));
        }
        let blob = match fs::read(self.dir.join(handle)) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(VaultError::NotFound(handle.to_string())),
            Err(e) => return Err(e.into()),
        };
        if blob.len() < NONCE_LEN {
            warn!("🔏️ Vault blob {handle} is truncated");
            return Err(VaultError::Decryption);
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = XNonce::from_slice(nonce_bytes);
        self.cipher.decrypt(nonce, ciphertext).map_err(|_| {
            warn!("🔏️ Decryption failed for vault blob {handle}. Tampered file or wrong key.");
            VaultError::Decryption
        })
    }
}

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("The vault key is not a valid 32-byte hex string")]
    InvalidKey,
    #[error("No vault entry exists for handle '{0}'")]
    NotFound(String),
    #[error("The stored file could not be decrypted. It may be corrupted, or the vault key may be wrong.")]
    Decryption,
    #[error("Vault I/O error: {0}")]
    Io(#[from] io::Error),
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok()).collect()
}
