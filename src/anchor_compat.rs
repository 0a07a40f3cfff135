/// Anchor-compatible discriminators for the gumball machine accounts.
///
/// The machine account discriminator is pinned as a constant so decoding
/// never hashes. `account_discriminator()` derives any other name the same
/// way Anchor does, `sha256("account:<Name>")[..8]`.
use sha2::{Digest, Sha256};

pub const ANCHOR_DISCRIMINATOR_LEN: usize = 8;

pub const GUMBALL_MACHINE_DISCRIMINATOR: [u8; ANCHOR_DISCRIMINATOR_LEN] =
    [87, 13, 57, 25, 98, 234, 26, 27];

pub fn account_discriminator(name: &str) -> [u8; ANCHOR_DISCRIMINATOR_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(b"account");
    hasher.update(b":");
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; ANCHOR_DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..ANCHOR_DISCRIMINATOR_LEN]);
    out
}

pub fn has_gumball_machine_discriminator(data: &[u8]) -> bool {
    data.get(..ANCHOR_DISCRIMINATOR_LEN) == Some(&GUMBALL_MACHINE_DISCRIMINATOR[..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_machine_discriminator_matches_sha256() {
        assert_eq!(
            account_discriminator("GumballMachine"),
            GUMBALL_MACHINE_DISCRIMINATOR
        );
    }

    #[test]
    fn other_account_names_differ() {
        let request = account_discriminator("AddItemRequest");
        assert_ne!(request, GUMBALL_MACHINE_DISCRIMINATOR);
        assert_ne!(request, [0u8; 8]);
    }

    #[test]
    fn detects_discriminator_prefix() {
        let mut data = [0u8; 16];
        assert!(!has_gumball_machine_discriminator(&data));
        data[..8].copy_from_slice(&GUMBALL_MACHINE_DISCRIMINATOR);
        assert!(has_gumball_machine_discriminator(&data));
        assert!(!has_gumball_machine_discriminator(&data[..4]));
    }
}
