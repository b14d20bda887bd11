// Sealstore — Hybrid encryption primitive
//
// One-shot ECIES: a fresh ephemeral P-256 keypair per encryption, cofactor
// Diffie-Hellman against the recipient key (cofactor 1 on P-256, so this
// coincides with plain ECDH), ANSI X9.63 KDF with SHA-256 to derive the
// AES-256-GCM key and nonce, ephemeral public point bound in as SharedInfo.
//
// Wire layout of a sealed record:
//   [ SEC1 uncompressed ephemeral point, 65 bytes | GCM ciphertext + tag ]
//
// The nonce is derived rather than transmitted: the ephemeral scalar is
// fresh per call, so the (key, nonce) pair never repeats.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{ecdh, PublicKey, SecretKey};
use rand_core::OsRng;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::EnclaveError;

/// SEC1 uncompressed point length for P-256.
const POINT_LEN: usize = 65;

/// AES-256 key length.
const KEY_LEN: usize = 32;

/// AES-GCM nonce length (96 bits).
const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length.
const TAG_LEN: usize = 16;

/// Encrypt `plaintext` to the holder of the private half of `recipient`.
pub fn seal(recipient: &PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, EnclaveError> {
    let ephemeral = ecdh::EphemeralSecret::random(&mut OsRng);
    let ephemeral_point = ephemeral.public_key().to_encoded_point(false);
    let shared = ephemeral.diffie_hellman(recipient);

    let (key, nonce) = derive_key_and_nonce(shared.raw_secret_bytes().as_slice(), ephemeral_point.as_bytes())
        .map_err(|e| EnclaveError::EncryptFailed(format!("key derivation: {}", e)))?;

    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| EnclaveError::EncryptFailed(format!("cipher init: {}", e)))?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| EnclaveError::EncryptFailed("AEAD encryption failed".to_string()))?;

    let mut out = Vec::with_capacity(POINT_LEN + sealed.len());
    out.extend_from_slice(ephemeral_point.as_bytes());
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypt a record produced by [`seal`] using the recipient's private scalar.
/// Any parse, agreement, or authentication failure collapses into
/// `DecryptFailed`; no partial plaintext is ever returned.
pub fn open(recipient: &SecretKey, record: &[u8]) -> Result<Zeroizing<Vec<u8>>, EnclaveError> {
    if record.len() < POINT_LEN + TAG_LEN {
        return Err(EnclaveError::DecryptFailed);
    }
    let (point_bytes, sealed) = record.split_at(POINT_LEN);

    let ephemeral =
        PublicKey::from_sec1_bytes(point_bytes).map_err(|_| EnclaveError::DecryptFailed)?;
    let shared = ecdh::diffie_hellman(recipient.to_nonzero_scalar(), ephemeral.as_affine());

    let (key, nonce) = derive_key_and_nonce(shared.raw_secret_bytes().as_slice(), point_bytes)
        .map_err(|_| EnclaveError::DecryptFailed)?;

    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| EnclaveError::DecryptFailed)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), sealed)
        .map_err(|_| EnclaveError::DecryptFailed)?;

    Ok(Zeroizing::new(plaintext))
}

/// X9.63 KDF over the raw shared secret, SharedInfo = ephemeral point bytes.
/// Output is split into the AES key and the GCM nonce.
fn derive_key_and_nonce(
    shared_secret: &[u8],
    shared_info: &[u8],
) -> Result<(Zeroizing<[u8; KEY_LEN]>, [u8; NONCE_LEN]), ansi_x963_kdf::Error> {
    let mut okm = Zeroizing::new([0u8; KEY_LEN + NONCE_LEN]);
    ansi_x963_kdf::derive_key_into::<Sha256>(shared_secret, shared_info, &mut okm[..])?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&okm[..KEY_LEN]);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&okm[KEY_LEN..]);
    Ok((key, nonce))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
