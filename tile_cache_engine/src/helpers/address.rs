use std::str::FromStr;

use alloy_primitives::Address;
use log::trace;

/// Returns the EIP-55 checksum form of `address`.
///
/// Addresses that do not parse as 20 hex bytes are returned trimmed and lower-cased instead, so that every comparison
/// has a well-defined answer even for junk written by an external indexer.
pub fn to_checksum_address(address: &str) -> String {
    let trimmed = address.trim();
    match Address::from_str(trimmed) {
        Ok(addr) => addr.to_checksum(None),
        Err(e) => {
            trace!("🔖️ '{trimmed}' is not a valid address ({e}). Using its lower-case form.");
            trimmed.to_ascii_lowercase()
        },
    }
}

/// Compares two addresses by their canonical form.
pub fn same_address(a: &str, b: &str) -> bool {
    to_checksum_address(a) == to_checksum_address(b)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn checksums_any_casing() {
        let expected = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(to_checksum_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"), expected);
        assert_eq!(to_checksum_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED"), expected);
        assert_eq!(to_checksum_address(" 0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed "), expected);
    }

    #[test]
    fn invalid_addresses_fall_back_to_lower_case() {
        assert_eq!(to_checksum_address("Not-An-Address"), "not-an-address");
        assert!(same_address("ALICE", "alice"));
        assert!(!same_address("alice", "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn same_address_ignores_case() {
        assert!(same_address(
            "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        ));
        assert!(!same_address(
            "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        ));
    }
}
