// Sealstore — CLI Module
//
// Thin presentation layer over the envelope manager, using clap derive
// macros. Subcommands: count, get.

mod commands;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// Sealstore — hardware-backed envelope encryption for a fixed record corpus.
#[derive(Parser, Debug)]
#[command(name = "sealstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Use the in-memory software key store instead of the platform one.
    #[arg(long, global = true)]
    pub software: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the number of sealed records in the store.
    Count,

    /// Decrypt and print the record at the given index.
    Get {
        /// Index of the record, from 0 to count - 1.
        index: i64,
    },
}
