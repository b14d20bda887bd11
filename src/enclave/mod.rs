// Sealstore — Enclave Module
//
// Models the secure element holding the envelope keypair. The private
// scalar is generated inside a provider and never crosses the provider
// boundary; callers see only an opaque handle and the derived public key.

mod ecies;
mod error;
mod key;
mod provider;

pub use error::EnclaveError;
pub use key::{Algorithm, KeyAccessibility, KeyHandle, KeyPolicy, PublicKey};
pub use provider::{KeyringKeyStore, SecureKeyStore, SoftwareKeyStore};
