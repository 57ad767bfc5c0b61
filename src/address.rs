use std::sync::LazyLock;

use regex::Regex;
use sha3::{Digest, Keccak256};

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0x)?[0-9a-fA-F]{40}$").expect("regexp should be valid")
});

/// Suffix of names served by the name service.
pub const NAME_SUFFIX: &str = ".eth";

/// What the user typed into a receiver field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverInput {
    /// A human-readable name that must be resolved first.
    Name(String),
    /// Anything else, taken as an address as typed.
    Literal(String),
}

impl ReceiverInput {
    pub fn classify(input: &str) -> Self {
        if !input.is_empty()
            && input != "0"
            && !input.starts_with("0x")
            && input.ends_with(NAME_SUFFIX)
        {
            Self::Name(input.to_owned())
        } else {
            Self::Literal(input.to_owned())
        }
    }
}

/// Checks a 20-byte hex address, `0x` prefix optional.
///
/// All-lowercase and all-uppercase addresses are accepted as is, mixed case
/// must carry a valid checksum (upper-case letters where the matching nibble
/// of the keccak hash of the lowercase address is 8 or above).
pub fn is_address(candidate: &str) -> bool {
    if !ADDRESS_RE.is_match(candidate) {
        return false;
    }
    let hex_part = candidate.strip_prefix("0x").unwrap_or(candidate);
    if hex_part == hex_part.to_ascii_lowercase() || hex_part == hex_part.to_ascii_uppercase() {
        return true;
    }
    has_valid_checksum(hex_part)
}

/// Encodes a lowercase address with mixed-case checksum.
pub fn to_checksum_address(hex_part: &str) -> String {
    let lowercase = hex_part.to_ascii_lowercase();
    let hash = hex::encode(Keccak256::digest(lowercase.as_bytes()));
    let encoded: String = lowercase
        .chars()
        .zip(hash.chars())
        .map(|(ch, nibble)| {
            if nibble_is_high(nibble) {
                ch.to_ascii_uppercase()
            } else {
                ch
            }
        })
        .collect();
    format!("0x{encoded}")
}

fn has_valid_checksum(hex_part: &str) -> bool {
    let hash = hex::encode(Keccak256::digest(hex_part.to_ascii_lowercase().as_bytes()));
    hex_part.chars().zip(hash.chars()).all(|(ch, nibble)| {
        if !ch.is_ascii_alphabetic() {
            return true;
        }
        if nibble_is_high(nibble) {
            ch.is_ascii_uppercase()
        } else {
            ch.is_ascii_lowercase()
        }
    })
}

fn nibble_is_high(nibble: char) -> bool {
    nibble.to_digit(16).is_some_and(|value| value >= 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn accepts_checksummed_addresses() {
        for address in CHECKSUMMED {
            assert!(is_address(address), "{address}");
            assert_eq!(to_checksum_address(&address[2..]), address);
        }
    }

    #[test]
    fn accepts_single_case_addresses() {
        assert!(is_address("0xab5801a7d398351b8be11c439e05c5b3259aec9b"));
        assert!(is_address("0xAB5801A7D398351B8BE11C439E05C5B3259AEC9B"));
        assert!(is_address("ab5801a7d398351b8be11c439e05c5b3259aec9b"));
    }

    #[test]
    fn rejects_bad_addresses() {
        // one letter flipped to lowercase
        assert!(!is_address("0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!is_address("0xab5801a7d398351b8be11c439e05c5b3259aec9"));
        assert!(!is_address("0xab5801a7d398351b8be11c439e05c5b3259aec9bb"));
        assert!(!is_address("0xzb5801a7d398351b8be11c439e05c5b3259aec9b"));
        assert!(!is_address(""));
        assert!(!is_address("0"));
        assert!(!is_address("alice.eth"));
    }

    #[test]
    fn classifies_receiver_input() {
        assert_eq!(
            ReceiverInput::classify("alice.eth"),
            ReceiverInput::Name("alice.eth".to_string())
        );
        assert_eq!(
            ReceiverInput::classify("0xalice.eth"),
            ReceiverInput::Literal("0xalice.eth".to_string())
        );
        assert_eq!(
            ReceiverInput::classify("alice.et"),
            ReceiverInput::Literal("alice.et".to_string())
        );
        assert_eq!(ReceiverInput::classify(""), ReceiverInput::Literal(String::new()));
        assert_eq!(
            ReceiverInput::classify(".eth"),
            ReceiverInput::Name(".eth".to_string())
        );
    }
}
