// Sealstore — Key handles, public keys, and generation policy
//
// SECURITY: none of the types in this file carry private key material.
// A `KeyHandle` is a reference token; the scalar it points at lives inside
// the provider that minted it and is reachable only through provider calls.

use std::fmt;

use p256::elliptic_curve::sec1::ToEncodedPoint;
use uuid::Uuid;

// ─── Algorithm ───────────────────────────────────────────────────────────────

/// Identifier for the hybrid encryption scheme requested by a caller.
///
/// The providers in this crate implement exactly one scheme: elliptic-curve
/// Diffie-Hellman with cofactor handling (a no-op on P-256, where the
/// cofactor is 1), ANSI X9.63 key derivation with SHA-256, and AES-256-GCM
/// for the payload. The non-cofactor sibling is listed so that algorithm
/// negotiation has a real unsupported case instead of being vacuous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Cofactor ECDH + X9.63-SHA256 KDF + AES-256-GCM. The only scheme the
    /// built-in providers accept.
    EciesCofactorX963Sha256AesGcm,
    /// Plain (non-cofactor) ECDH variant. Recognized but not implemented.
    EciesStandardX963Sha256AesGcm,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::EciesCofactorX963Sha256AesGcm => "ecies-cofactor-x963-sha256-aes-gcm",
            Algorithm::EciesStandardX963Sha256AesGcm => "ecies-standard-x963-sha256-aes-gcm",
        };
        f.write_str(name)
    }
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// When the platform is allowed to release the private key for an operation.
/// Enforcement is delegated to the platform secret store; the software
/// provider records the policy but has no gate to enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAccessibility {
    /// Usable only while the device is unlocked, and never migrated to
    /// another device.
    WhenUnlockedThisDeviceOnly,
    /// Usable while the device is unlocked; may roam with platform backups.
    WhenUnlocked,
}

/// Generation policy for a new keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPolicy {
    pub accessibility: KeyAccessibility,
    /// Whether the key outlives the process in the platform store. The
    /// software provider treats this as advisory.
    pub is_permanent: bool,
    /// Identifies the key inside the platform store. Generating twice with
    /// the same tag replaces the stored scalar.
    pub application_tag: String,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self {
            accessibility: KeyAccessibility::WhenUnlockedThisDeviceOnly,
            is_permanent: true,
            application_tag: "sealstore.envelope-key".to_string(),
        }
    }
}

// ─── Handle ──────────────────────────────────────────────────────────────────

/// Opaque reference to a keypair held inside a provider.
#[derive(Debug, Clone)]
pub struct KeyHandle {
    id: Uuid,
    algorithm: Algorithm,
    policy: KeyPolicy,
}

impl KeyHandle {
    pub(crate) fn new(algorithm: Algorithm, policy: KeyPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            algorithm,
            policy,
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    /// The application tag the key was generated under.
    pub fn tag(&self) -> &str {
        &self.policy.application_tag
    }

    /// The single scheme this keypair performs.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn policy(&self) -> &KeyPolicy {
        &self.policy
    }
}

// ─── Public key ──────────────────────────────────────────────────────────────

/// Exportable public half of a keypair. Immutable once derived; safe to hand
/// to any caller that wants to encrypt.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    point: p256::PublicKey,
}

impl PublicKey {
    pub(crate) fn new(point: p256::PublicKey) -> Self {
        Self { point }
    }

    pub(crate) fn as_point(&self) -> &p256::PublicKey {
        &self.point
    }

    /// SEC1 uncompressed encoding (`0x04 || x || y`, 65 bytes).
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.point.to_encoded_point(false).as_bytes().to_vec()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sec1 = self.to_sec1_bytes();
        let hex: String = sec1.iter().map(|b| format!("{:02x}", b)).collect();
        f.debug_struct("PublicKey").field("sec1", &hex).finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
