// Sealstore — Store Module
//
// In-memory envelope store: an ordered, append-only sequence of sealed
// records plus the manager that seeds and serves it. Nothing here persists
// across process restarts; the store lives exactly as long as its manager.

pub mod corpus;
mod error;
mod manager;

pub use error::StoreError;
pub use manager::{CiphertextRecord, EnvelopeManager};
