// Sealstore — Store error types

use thiserror::Error;

use crate::enclave::EnclaveError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No usable envelope key — key generation failed at initialization")]
    KeyUnavailable,

    #[error("Index {index} out of range — store holds {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Decrypted bytes are not valid UTF-8")]
    Utf8DecodeFailed,

    #[error(transparent)]
    Enclave(#[from] EnclaveError),
}
