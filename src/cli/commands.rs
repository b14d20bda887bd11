// Sealstore — CLI Command Handlers
//
// Each function handles one CLI subcommand against a freshly constructed
// manager: the corpus is sealed at startup and lives only for this process.
// The presentation layer does not discriminate manager error kinds; any
// failure past index validation renders as one generic message.

use crate::enclave::{KeyringKeyStore, SecureKeyStore, SoftwareKeyStore};
use crate::error::SealstoreError;
use crate::store::{corpus::DEFAULT_CORPUS, EnvelopeManager};

use super::{Cli, Commands};

/// What the user sees for any decryption-path failure.
const DECRYPTION_FAILED: &str = "decryption failed";

/// Execute the parsed CLI command.
pub fn execute(cli: Cli) -> Result<(), SealstoreError> {
    if cli.software {
        run(SoftwareKeyStore::new(), cli.command)
    } else {
        run(KeyringKeyStore::new(), cli.command)
    }
}

fn run<S: SecureKeyStore>(boundary: S, command: Commands) -> Result<(), SealstoreError> {
    let manager = EnvelopeManager::with_corpus(boundary, DEFAULT_CORPUS);

    match command {
        Commands::Count => cmd_count(&manager),
        Commands::Get { index } => cmd_get(&manager, index),
    }
}

fn cmd_count<S: SecureKeyStore>(manager: &EnvelopeManager<S>) -> Result<(), SealstoreError> {
    println!("{}", manager.count());
    Ok(())
}

fn cmd_get<S: SecureKeyStore>(
    manager: &EnvelopeManager<S>,
    index: i64,
) -> Result<(), SealstoreError> {
    let count = manager.count();

    // Index validation belongs to the presentation layer; the manager is
    // only consulted with an index it could hold.
    if index < 0 || index as u64 >= count as u64 {
        return Err(SealstoreError::Other(format!(
            "invalid index {} — enter an index from 0 to {}",
            index,
            count.saturating_sub(1)
        )));
    }

    match manager.get(index as usize) {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "lookup failed");
            println!("{}", DECRYPTION_FAILED);
            Ok(())
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_rejects_negative_and_past_end_indices() {
        let manager = EnvelopeManager::with_corpus(SoftwareKeyStore::new(), ["a", "b"]);

        assert!(cmd_get(&manager, -1).is_err());
        assert!(cmd_get(&manager, 2).is_err());
        assert!(cmd_get(&manager, 0).is_ok());
        assert!(cmd_get(&manager, 1).is_ok());
    }

    #[test]
    fn test_count_never_fails_on_seeded_manager() {
        let manager = EnvelopeManager::with_corpus(SoftwareKeyStore::new(), DEFAULT_CORPUS);
        assert!(cmd_count(&manager).is_ok());
    }
}
