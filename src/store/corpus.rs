// Sealstore — Seed corpus
//
// The fixed set of records the manager seals at construction. The
// presentation layer has no control over its contents.

/// Ten plaintext records, sealed in order at startup.
pub const DEFAULT_CORPUS: [&str; 10] = [
    "The quick brown fox jumps over the lazy dog.",
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
    "In cryptography, encryption is the process of encoding messages or \
     information so that only authorized parties can read them.",
    "The history of cryptography spans thousands of years; one of the \
     earliest and simplest schemes was the Caesar cipher.",
    "Modern cryptography rests on hard mathematical problems behind \
     algorithms such as RSA and AES, which secure communication across the \
     internet.",
    "Encrypting data is vital for protecting sensitive information in \
     today's digital world, especially as cyberattacks keep growing.",
    "Public-key cryptography relies on key pairs: a public key that may be \
     shared openly and a private key that must remain secret.",
    "Blockchain technology uses cryptographic methods to keep transactions \
     secure and immutable.",
    "Quantum computing is seen as both a threat and an opportunity for \
     cryptography.",
    "Security practitioners must constantly adapt to new threats.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_shape() {
        assert_eq!(DEFAULT_CORPUS.len(), 10);
        for record in DEFAULT_CORPUS {
            assert!(!record.is_empty(), "Corpus records must be non-empty");
        }
    }
}
