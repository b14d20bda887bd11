// Sealstore — Secure Key Providers
//
// Manages the lifecycle of the envelope keypair. The private scalar lives
// inside a provider and is never returned through any API: callers hold a
// `KeyHandle` token and a derived `PublicKey`, nothing more.
//
// Flow:
//   1. `generate_key(policy)` — mints a P-256 keypair under the policy's tag
//   2. `public_key(handle)` — derives the exportable public half
//   3. `decrypt(handle, record, algorithm)` — private-key operation, gated
//      by the platform in the keyring-backed provider
//
// Encryption needs only the public key and is a provided trait method, so
// any caller can seal records without ever touching a private scalar.

use std::collections::HashMap;
use std::sync::Mutex;

use p256::SecretKey;
use rand_core::OsRng;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::ecies;
use super::{Algorithm, EnclaveError, KeyHandle, KeyPolicy, PublicKey};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Service name identifying sealstore entries in the platform secret store.
const KEYRING_SERVICE: &str = "sealstore";

/// P-256 private scalar length in bytes.
const SCALAR_LEN: usize = 32;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the secure element holding the private half of the
/// envelope keypair. Exactly two private-key operations exist: deriving the
/// public key and decrypting. Private scalars never cross this interface.
pub trait SecureKeyStore: Send + Sync {
    /// Create a fresh keypair under `policy`. No handle exists after a
    /// failure; callers must not retry on the provider's behalf.
    fn generate_key(&self, policy: &KeyPolicy) -> Result<KeyHandle, EnclaveError>;

    /// Derive the exportable public half for a handle.
    fn public_key(&self, handle: &KeyHandle) -> Result<PublicKey, EnclaveError>;

    /// Private-key decryption of a sealed record. Tampered or mismatched
    /// input fails with `DecryptFailed`; no partial plaintext is returned.
    fn decrypt(
        &self,
        handle: &KeyHandle,
        record: &[u8],
        algorithm: Algorithm,
    ) -> Result<Zeroizing<Vec<u8>>, EnclaveError>;

    /// Public-key encryption. Usable by any caller holding the public key;
    /// no private state is involved.
    fn encrypt(
        &self,
        public: &PublicKey,
        plaintext: &[u8],
        algorithm: Algorithm,
    ) -> Result<Vec<u8>, EnclaveError> {
        if !self.supports_encryption(public, algorithm) {
            return Err(EnclaveError::AlgorithmUnsupported(algorithm));
        }
        ecies::seal(public.as_point(), plaintext)
    }

    /// Whether `algorithm` can encrypt to `public`. Callers check this
    /// before encrypting and fail fast instead of attempting.
    fn supports_encryption(&self, _public: &PublicKey, algorithm: Algorithm) -> bool {
        matches!(algorithm, Algorithm::EciesCofactorX963Sha256AesGcm)
    }

    /// Whether `algorithm` matches what the handle's keypair performs.
    fn supports_decryption(&self, handle: &KeyHandle, algorithm: Algorithm) -> bool {
        handle.algorithm() == algorithm
    }
}

// ─── Platform Implementation ─────────────────────────────────────────────────

/// Provider backed by the platform secret store via the `keyring` crate:
/// Keychain on macOS, Credential Manager on Windows, Secret Service on
/// Linux. The scalar is loaded into process memory only for the duration of
/// a single operation, wrapped in `Zeroizing`. Unlock policy (the device
/// gate) is enforced by the platform; a locked store surfaces here as a
/// failed read.
pub struct KeyringKeyStore {
    service: String,
}

impl KeyringKeyStore {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    /// Custom service name, useful for isolating test entries.
    #[allow(dead_code)]
    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, tag: &str) -> Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(&self.service, tag)
    }

    /// Load the private scalar for a handle, transiently. Every failure
    /// collapses into `NoPrivateKey`: from the caller's perspective the
    /// private key is simply not available.
    fn load_secret(&self, handle: &KeyHandle) -> Result<SecretKey, EnclaveError> {
        let entry = self.entry(handle.tag()).map_err(|e| {
            tracing::debug!(error = %e, "keyring entry lookup failed");
            EnclaveError::NoPrivateKey
        })?;
        let scalar = Zeroizing::new(entry.get_secret().map_err(|e| {
            tracing::debug!(error = %e, "keyring read failed");
            EnclaveError::NoPrivateKey
        })?);
        if scalar.len() != SCALAR_LEN {
            return Err(EnclaveError::NoPrivateKey);
        }
        SecretKey::from_slice(&scalar).map_err(|_| EnclaveError::NoPrivateKey)
    }
}

impl Default for KeyringKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureKeyStore for KeyringKeyStore {
    fn generate_key(&self, policy: &KeyPolicy) -> Result<KeyHandle, EnclaveError> {
        let secret = SecretKey::random(&mut OsRng);
        let scalar = Zeroizing::new(secret.to_bytes().to_vec());

        let entry = self.entry(&policy.application_tag).map_err(|e| {
            EnclaveError::KeyGenFailed(format!("keyring entry for tag: {}", e))
        })?;
        // Same tag, same slot: a permanent key replaces any previous scalar
        // rather than accumulating entries.
        entry
            .set_secret(scalar.as_slice())
            .map_err(|e| EnclaveError::KeyGenFailed(format!("keyring write: {}", e)))?;

        tracing::info!(
            tag = %policy.application_tag,
            "envelope keypair generated in platform secret store"
        );
        Ok(KeyHandle::new(
            Algorithm::EciesCofactorX963Sha256AesGcm,
            policy.clone(),
        ))
    }

    fn public_key(&self, handle: &KeyHandle) -> Result<PublicKey, EnclaveError> {
        let secret = self.load_secret(handle)?;
        Ok(PublicKey::new(secret.public_key()))
    }

    fn decrypt(
        &self,
        handle: &KeyHandle,
        record: &[u8],
        algorithm: Algorithm,
    ) -> Result<Zeroizing<Vec<u8>>, EnclaveError> {
        if !self.supports_decryption(handle, algorithm) {
            return Err(EnclaveError::AlgorithmUnsupported(algorithm));
        }
        let secret = self.load_secret(handle)?;
        ecies::open(&secret, record)
    }
}

// ─── Software Implementation ─────────────────────────────────────────────────

/// In-memory provider with the same contract: scalars live in a private
/// table and never leave it. Deterministically constructible, so tests and
/// hosts without a usable platform secret store can run the full flow.
/// There is no device gate to delegate to; the policy is recorded on the
/// handle and otherwise advisory.
pub struct SoftwareKeyStore {
    keys: Mutex<HashMap<Uuid, SecretKey>>,
}

impl SoftwareKeyStore {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
        }
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, SecretKey>> {
        // A poisoned lock means a panic mid-insert; the table itself is
        // still structurally sound.
        self.keys.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SoftwareKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureKeyStore for SoftwareKeyStore {
    fn generate_key(&self, policy: &KeyPolicy) -> Result<KeyHandle, EnclaveError> {
        let handle = KeyHandle::new(Algorithm::EciesCofactorX963Sha256AesGcm, policy.clone());
        let secret = SecretKey::random(&mut OsRng);
        self.table().insert(handle.id(), secret);
        tracing::debug!(tag = %policy.application_tag, "software envelope keypair generated");
        Ok(handle)
    }

    fn public_key(&self, handle: &KeyHandle) -> Result<PublicKey, EnclaveError> {
        self.table()
            .get(&handle.id())
            .map(|secret| PublicKey::new(secret.public_key()))
            .ok_or(EnclaveError::NoPrivateKey)
    }

    fn decrypt(
        &self,
        handle: &KeyHandle,
        record: &[u8],
        algorithm: Algorithm,
    ) -> Result<Zeroizing<Vec<u8>>, EnclaveError> {
        if !self.supports_decryption(handle, algorithm) {
            return Err(EnclaveError::AlgorithmUnsupported(algorithm));
        }
        let secret = self
            .table()
            .get(&handle.id())
            .cloned()
            .ok_or(EnclaveError::NoPrivateKey)?;
        ecies::open(&secret, record)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
