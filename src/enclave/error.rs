// Sealstore — Enclave error types

use thiserror::Error;

use super::Algorithm;

#[derive(Debug, Error)]
pub enum EnclaveError {
    #[error("Key generation failed: {0}")]
    KeyGenFailed(String),

    #[error("No private key available for this handle")]
    NoPrivateKey,

    #[error("Algorithm not supported for this key: {0}")]
    AlgorithmUnsupported(Algorithm),

    #[error("Encryption failed: {0}")]
    EncryptFailed(String),

    // Carries no cause: the failure message must not reveal whether the
    // point, the payload, or the tag was at fault.
    #[error("Decryption failed")]
    DecryptFailed,
}
