// Sealstore — Envelope Store Manager
//
// Owns the envelope key handle and the ordered ciphertext store, and
// orchestrates seeding and lookup. Sole mutator of the store: `seed`
// appends under `&mut self`, every other operation is a shared read, so
// concurrent lookups after seeding need no extra synchronization.

use zeroize::Zeroizing;

use crate::enclave::{Algorithm, EnclaveError, KeyHandle, KeyPolicy, SecureKeyStore};

use super::StoreError;

/// The single scheme every record in a store is sealed under.
const ALGORITHM: Algorithm = Algorithm::EciesCofactorX963Sha256AesGcm;

// ─── Ciphertext record ───────────────────────────────────────────────────────

/// One sealed record. Opaque bytes; authenticity lives entirely in the
/// underlying scheme, there is no separate version or integrity tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiphertextRecord(Vec<u8>);

impl CiphertextRecord {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Envelope-encryption manager over a secure key boundary.
///
/// Exactly one keypair per instance; every stored record was sealed under
/// that keypair's public half. If key generation fails at initialization
/// the manager stays usable as a value but refuses every key operation
/// with `KeyUnavailable`; nothing is ever silently returned.
pub struct EnvelopeManager<S: SecureKeyStore> {
    boundary: S,
    key: Option<KeyHandle>,
    records: Vec<CiphertextRecord>,
}

impl<S: SecureKeyStore> EnvelopeManager<S> {
    /// Generate the envelope keypair and return an empty manager. A
    /// generation failure is logged and leaves the manager keyless; it is
    /// not retried.
    pub fn initialize(boundary: S) -> Self {
        let key = match boundary.generate_key(&KeyPolicy::default()) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "envelope key generation failed; all operations will be refused");
                None
            }
        };
        Self {
            boundary,
            key,
            records: Vec::new(),
        }
    }

    /// `initialize` followed by `seed`, the implicit construction the
    /// presentation layer uses.
    pub fn with_corpus<I, T>(boundary: S, corpus: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut manager = Self::initialize(boundary);
        manager.seed(corpus);
        manager
    }

    fn handle(&self) -> Result<&KeyHandle, StoreError> {
        self.key.as_ref().ok_or(StoreError::KeyUnavailable)
    }

    /// Seal `plaintext` under the manager's public key.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<CiphertextRecord, StoreError> {
        let handle = self.handle()?;
        let public = self.boundary.public_key(handle)?;
        if !self.boundary.supports_encryption(&public, ALGORITHM) {
            return Err(EnclaveError::AlgorithmUnsupported(ALGORITHM).into());
        }
        let sealed = self.boundary.encrypt(&public, plaintext, ALGORITHM)?;
        Ok(CiphertextRecord(sealed))
    }

    /// Recover the plaintext of a sealed record via the boundary.
    pub fn decrypt(&self, record: &CiphertextRecord) -> Result<Zeroizing<Vec<u8>>, StoreError> {
        let handle = self.handle()?;
        if !self.boundary.supports_decryption(handle, ALGORITHM) {
            return Err(EnclaveError::AlgorithmUnsupported(ALGORITHM).into());
        }
        Ok(self.boundary.decrypt(handle, record.as_bytes(), ALGORITHM)?)
    }

    /// Seal each record in order and append it to the store. A record that
    /// fails to seal is logged and skipped; no placeholder is inserted, so
    /// the store may end up shorter than the input and later records shift
    /// down. The rest of the corpus still goes through.
    pub fn seed<I, T>(&mut self, records: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for (position, record) in records.into_iter().enumerate() {
            match self.encrypt(record.as_ref().as_bytes()) {
                Ok(sealed) => {
                    self.records.push(sealed);
                    tracing::debug!(position, "record sealed and stored");
                }
                Err(e) => {
                    tracing::warn!(position, error = %e, "record skipped: sealing failed");
                }
            }
        }
        tracing::info!(count = self.records.len(), "store seeded");
    }

    /// Decrypt the record at `index` and decode it as UTF-8. Bounds are
    /// checked first; an out-of-range index never reaches the boundary.
    pub fn get(&self, index: usize) -> Result<String, StoreError> {
        let len = self.records.len();
        let record = self
            .records
            .get(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        let plaintext = self.decrypt(record)?;
        let text = std::str::from_utf8(&plaintext).map_err(|_| StoreError::Utf8DecodeFailed)?;
        Ok(text.to_string())
    }

    /// Number of stored records. Non-decreasing: the store is append-only
    /// and errors never remove records.
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::enclave::{EnclaveError, PublicKey, SoftwareKeyStore};

    use super::*;

    /// Boundary that injects an encrypt failure at one seeding position.
    struct FlakyBoundary {
        inner: SoftwareKeyStore,
        fail_at: usize,
        calls: AtomicUsize,
    }

    impl FlakyBoundary {
        fn new(fail_at: usize) -> Self {
            Self {
                inner: SoftwareKeyStore::new(),
                fail_at,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SecureKeyStore for FlakyBoundary {
        fn generate_key(&self, policy: &KeyPolicy) -> Result<KeyHandle, EnclaveError> {
            self.inner.generate_key(policy)
        }

        fn public_key(&self, handle: &KeyHandle) -> Result<PublicKey, EnclaveError> {
            self.inner.public_key(handle)
        }

        fn decrypt(
            &self,
            handle: &KeyHandle,
            record: &[u8],
            algorithm: Algorithm,
        ) -> Result<Zeroizing<Vec<u8>>, EnclaveError> {
            self.inner.decrypt(handle, record, algorithm)
        }

        fn encrypt(
            &self,
            public: &PublicKey,
            plaintext: &[u8],
            algorithm: Algorithm,
        ) -> Result<Vec<u8>, EnclaveError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == self.fail_at {
                return Err(EnclaveError::EncryptFailed("injected failure".to_string()));
            }
            self.inner.encrypt(public, plaintext, algorithm)
        }
    }

    /// Boundary whose key generation always fails.
    struct BrokenBoundary;

    impl SecureKeyStore for BrokenBoundary {
        fn generate_key(&self, _policy: &KeyPolicy) -> Result<KeyHandle, EnclaveError> {
            Err(EnclaveError::KeyGenFailed("no secure element".to_string()))
        }

        fn public_key(&self, _handle: &KeyHandle) -> Result<PublicKey, EnclaveError> {
            Err(EnclaveError::NoPrivateKey)
        }

        fn decrypt(
            &self,
            _handle: &KeyHandle,
            _record: &[u8],
            _algorithm: Algorithm,
        ) -> Result<Zeroizing<Vec<u8>>, EnclaveError> {
            Err(EnclaveError::NoPrivateKey)
        }
    }

    #[test]
    fn test_seed_and_get_preserve_order() {
        let mut manager = EnvelopeManager::initialize(SoftwareKeyStore::new());
        manager.seed(["hello", "world"]);

        assert_eq!(manager.count(), 2);
        assert_eq!(manager.get(0).unwrap(), "hello");
        assert_eq!(manager.get(1).unwrap(), "world");
    }

    #[test]
    fn test_with_corpus_seeds_at_construction() {
        let manager =
            EnvelopeManager::with_corpus(SoftwareKeyStore::new(), ["one", "two", "three"]);
        assert_eq!(manager.count(), 3);
        assert_eq!(manager.get(2).unwrap(), "three");
    }

    #[test]
    fn test_failed_record_is_skipped_and_indices_shift() {
        // Seeding makes one encrypt call per record; fail the second.
        let mut manager = EnvelopeManager::initialize(FlakyBoundary::new(1));
        manager.seed(["first", "second", "third"]);

        assert_eq!(manager.count(), 2, "The failed record must simply be absent");
        assert_eq!(manager.get(0).unwrap(), "first");
        assert_eq!(
            manager.get(1).unwrap(),
            "third",
            "Records after a skipped one shift down; no placeholder is inserted"
        );
    }

    #[test]
    fn test_get_out_of_range() {
        let mut manager = EnvelopeManager::initialize(SoftwareKeyStore::new());
        manager.seed(["only"]);

        let result = manager.get(manager.count());
        assert!(matches!(
            result,
            Err(StoreError::IndexOutOfRange { index: 1, len: 1 })
        ));

        let result = manager.get(usize::MAX);
        assert!(matches!(result, Err(StoreError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_encrypt_decrypt_round_trip_through_manager() {
        let manager = EnvelopeManager::initialize(SoftwareKeyStore::new());

        let record = manager.encrypt(b"round trip").unwrap();
        let plaintext = manager.decrypt(&record).unwrap();
        assert_eq!(plaintext.as_slice(), b"round trip");
    }

    #[test]
    fn test_tampered_record_fails_decrypt() {
        let manager = EnvelopeManager::initialize(SoftwareKeyStore::new());

        let record = manager.encrypt(b"authentic").unwrap();
        let mut bytes = record.as_bytes().to_vec();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0x01;
        let tampered = CiphertextRecord(bytes);

        let result = manager.decrypt(&tampered);
        assert!(
            matches!(result, Err(StoreError::Enclave(EnclaveError::DecryptFailed))),
            "A flipped bit must surface as DecryptFailed, never as plaintext"
        );
    }

    #[test]
    fn test_key_generation_failure_refuses_operations() {
        let mut manager = EnvelopeManager::initialize(BrokenBoundary);

        let result = manager.encrypt(b"data");
        assert!(matches!(result, Err(StoreError::KeyUnavailable)));

        // Seeding encrypts per record, so every record is skipped.
        manager.seed(["a", "b"]);
        assert_eq!(manager.count(), 0);

        // With an empty store the bounds check fires before the boundary
        // would be touched; nothing is silently returned either way.
        let result = manager.get(0);
        assert!(matches!(
            result,
            Err(StoreError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_non_utf8_plaintext_is_reported_distinctly() {
        let mut manager = EnvelopeManager::initialize(SoftwareKeyStore::new());

        // Seal raw non-UTF-8 bytes and append the record directly.
        let record = manager.encrypt(&[0xff, 0xfe, 0xfd]).unwrap();
        manager.records.push(record);

        let result = manager.get(0);
        assert!(
            matches!(result, Err(StoreError::Utf8DecodeFailed)),
            "Decode failure must be distinguishable from decrypt failure"
        );
    }

    #[test]
    fn test_count_is_monotonic_across_seeds() {
        let mut manager = EnvelopeManager::initialize(SoftwareKeyStore::new());
        manager.seed(["a"]);
        let first = manager.count();
        manager.seed(["b", "c"]);
        assert!(manager.count() >= first, "Appends never shrink the store");
        assert_eq!(manager.count(), 3);
    }

    #[test]
    fn test_default_corpus_scenario() {
        let manager = EnvelopeManager::with_corpus(
            SoftwareKeyStore::new(),
            crate::store::corpus::DEFAULT_CORPUS,
        );

        assert_eq!(manager.count(), crate::store::corpus::DEFAULT_CORPUS.len());
        for (i, expected) in crate::store::corpus::DEFAULT_CORPUS.iter().enumerate() {
            assert_eq!(manager.get(i).unwrap(), *expected);
        }
    }
}
