use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use thiserror::Error;

use crate::key_provider::KeyMaterial;

/// AES-GCM nonce length in bytes.
pub(crate) const NONCE_LEN: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CipherError {
    #[error("cipher init failed")]
    Init,
    #[error("encrypt failed")]
    Encrypt,
    #[error("decrypt failed")]
    Decrypt,
    #[error("nonce must be {NONCE_LEN} bytes, got {0}")]
    NonceLength(usize),
}

/// Nonce and ciphertext (tag included) from one encryption.
pub(crate) struct Sealed {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl Sealed {
    /// `nonce || ciphertext`, the compact single-field form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.nonce.len() + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }
}

/// Encrypt under a fresh random nonce.
pub(crate) fn seal(material: &KeyMaterial, plaintext: &[u8]) -> Result<Sealed, CipherError> {
    let cipher = build_cipher(material)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CipherError::Encrypt)?;
    Ok(Sealed {
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

pub(crate) fn open(
    material: &KeyMaterial,
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    // from_slice panics on a wrong length.
    if nonce.len() != NONCE_LEN {
        return Err(CipherError::NonceLength(nonce.len()));
    }
    let cipher = build_cipher(material)?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CipherError::Decrypt)
}

fn build_cipher(material: &KeyMaterial) -> Result<Aes256Gcm, CipherError> {
    Aes256Gcm::new_from_slice(&material.bytes).map_err(|_| CipherError::Init)
}
