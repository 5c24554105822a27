//! Placeholder content identifiers.
//!
//! Encrypted content and key shares are not actually pinned anywhere; a will
//! only carries identifiers shaped like IPFS v0 hashes so that callers can
//! display and compare them.

use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const BODY_LEN: usize = 26;

/// Mints the identifiers stamped onto a will at creation.
pub trait CidMinter: Send + Sync {
    fn mint(&self) -> String;
}

/// `Qm` followed by 26 random lowercase base36 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderCid;

impl CidMinter for PlaceholderCid {
    fn mint(&self) -> String {
        let mut rng = rand::thread_rng();
        let body: String = (0..BODY_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("Qm{body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_shape() {
        let cid = PlaceholderCid.mint();
        assert!(cid.starts_with("Qm"));
        assert_eq!(cid.len(), 2 + BODY_LEN);
        assert!(
            cid[2..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_placeholders_differ() {
        assert_ne!(PlaceholderCid.mint(), PlaceholderCid.mint());
    }
}
