//! Random identifiers for resource providers
//!
//! Capping the length to `max_len` necessarily increases the risk of
//! collisions; callers choose that tradeoff.

use thiserror::Error;

use super::id::ResourceId;

#[derive(Debug, Error)]
#[error("Failed to read random bytes: {0}")]
pub struct EntropyError(#[from] getrandom::Error);

/// Generates `prefix` followed by `random_bytes` hex-encoded random bytes,
/// truncated to at most `max_len` characters
pub fn new_unique_hex(
    prefix: &str,
    random_bytes: usize,
    max_len: usize,
) -> Result<String, EntropyError> {
    let mut bytes = vec![0u8; random_bytes];
    getrandom::getrandom(&mut bytes)?;

    let mut id = format!("{}{}", prefix, hex::encode(&bytes));
    if let Some((cut, _)) = id.char_indices().nth(max_len) {
        id.truncate(cut);
    }
    Ok(id)
}

/// Like [`new_unique_hex`], typed as a provider ID
pub fn new_unique_hex_id(
    prefix: &str,
    random_bytes: usize,
    max_len: usize,
) -> Result<ResourceId, EntropyError> {
    new_unique_hex(prefix, random_bytes, max_len).map(ResourceId::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_max_len() {
        let id = new_unique_hex("r-", 8, 6).unwrap();
        assert_eq!(id.len(), 6);
        assert!(id.starts_with("r-"));
        assert!(id[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn untruncated_length() {
        let id = new_unique_hex("bucket-", 4, 64).unwrap();
        assert_eq!(id.len(), "bucket-".len() + 8);
    }

    #[test]
    fn prefix_itself_can_be_cut() {
        let id = new_unique_hex("prefix-", 8, 3).unwrap();
        assert_eq!(id, "pre");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let id = new_unique_hex("äö", 2, 1).unwrap();
        assert_eq!(id, "ä");
    }

    #[test]
    fn successive_ids_differ() {
        let a = new_unique_hex("", 16, 64).unwrap();
        let b = new_unique_hex("", 16, 64).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn typed_id() {
        let id = new_unique_hex_id("i-", 4, 10).unwrap();
        assert!(id.as_str().starts_with("i-"));
        assert_eq!(id.as_str().len(), 10);
    }
}
