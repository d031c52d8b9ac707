//! Client fingerprinting.
//!
//! The raw network address of a submitter is never stored. Instead a
//! truncated SHA-256 digest is kept so repeat posters can be correlated
//! without retaining the address itself.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the address digest.
pub const IP_HASH_LEN: usize = 16;

/// Maximum number of characters kept from a `User-Agent` header.
pub const USER_AGENT_MAX_CHARS: usize = 255;

/// Placeholder hashed when no client address can be determined.
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Hash a client address into a short, one-way hex fingerprint.
pub fn ip_hash(addr: &str) -> String {
    let digest = Sha256::digest(addr.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(IP_HASH_LEN);
    hex
}

/// Truncate a user agent to [`USER_AGENT_MAX_CHARS`] characters.
pub fn truncate_user_agent(user_agent: &str) -> String {
    user_agent.chars().take(USER_AGENT_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_hash_is_truncated_sha256() {
        // sha256("127.0.0.1") = 12ca17b49af2289436f303e0166030a21e525d266e209267433801a8fd4071a0
        assert_eq!(ip_hash("127.0.0.1"), "12ca17b49af22894");
        assert_eq!(ip_hash("127.0.0.1").len(), IP_HASH_LEN);
    }

    #[test]
    fn ip_hash_is_deterministic() {
        assert_eq!(ip_hash("203.0.113.7"), ip_hash("203.0.113.7"));
        assert_ne!(ip_hash("203.0.113.7"), ip_hash("203.0.113.8"));
    }

    #[test]
    fn short_user_agent_is_unchanged() {
        assert_eq!(truncate_user_agent("curl/8.0"), "curl/8.0");
    }

    #[test]
    fn long_user_agent_is_cut_on_char_boundary() {
        let ua = "é".repeat(300);
        let truncated = truncate_user_agent(&ua);
        assert_eq!(truncated.chars().count(), USER_AGENT_MAX_CHARS);
    }
}
