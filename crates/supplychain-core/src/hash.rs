use sha2::{Digest, Sha256};

use crate::BlockData;

/// SHA-256 of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hash over an already-encoded block data string. The preimage is
/// `previous_hash || decimal(nonce) || data_json`.
pub fn hash_encoded(previous_hash: &str, nonce: u64, data_json: &str) -> String {
    sha256_hex(format!("{previous_hash}{nonce}{data_json}").as_bytes())
}

pub fn hash_block(
    previous_hash: &str,
    nonce: u64,
    data: &BlockData<'_>,
) -> Result<String, serde_json::Error> {
    Ok(hash_encoded(previous_hash, nonce, &data.canonical_json()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HASH_HEX_SIZE;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn block_hash_is_concatenated_preimage() {
        let data = BlockData {
            transactions: &[],
            index: 2,
        };
        let expected = sha256_hex(br#"042{"transactions":[],"index":2}"#);
        assert_eq!(hash_block("0", 42, &data).unwrap(), expected);
        assert_eq!(expected.len(), HASH_HEX_SIZE);
        assert!(expected.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn encoded_hash_is_digest_of_joined_parts() {
        let hash = hash_encoded("0000ab", 7, "{}");
        assert_eq!(hash, sha256_hex(b"0000ab7{}"));
        assert_eq!(hash.len(), HASH_HEX_SIZE);
    }

    #[test]
    fn nonce_changes_hash() {
        let data = BlockData {
            transactions: &[],
            index: 2,
        };
        assert_ne!(
            hash_block("0", 1, &data).unwrap(),
            hash_block("0", 2, &data).unwrap()
        );
    }
}
